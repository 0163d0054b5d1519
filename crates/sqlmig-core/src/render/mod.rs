//! Text rendering for reporter output

pub mod status_table;

pub use status_table::render_status_table;
