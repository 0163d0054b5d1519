//! Embedded bootstrap SQL
//!
//! Steps are embedded at compile time using include_str!

/// One bootstrap step
pub struct BootstrapStep {
    pub id: &'static str,
    pub sql: &'static str,
}

/// All bootstrap steps, in application order
pub fn get_steps() -> Vec<BootstrapStep> {
    vec![
        BootstrapStep {
            id: "001_ledger_table",
            sql: include_str!("../../migrations/001_ledger_table.sql"),
        },
        BootstrapStep {
            id: "002_ledger_status_index",
            sql: include_str!("../../migrations/002_ledger_status_index.sql"),
        },
    ]
}
