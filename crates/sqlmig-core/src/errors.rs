use sqlmig_core_types::RunId;
use thiserror::Error;

/// Result type alias using MigError
pub type Result<T> = std::result::Result<T, MigError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure the engine, the ledger or the loader can produce is
/// classified by one of these kinds. Each kind maps to a stable error code
/// usable in tests, scripts and log queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MigErrorKind {
    // Operation level
    /// Acquiring the ledger connection failed
    Connect,
    /// Releasing the ledger connection failed
    Close,
    /// An `up` run failed
    Apply,
    /// A `down` run failed
    Revert,
    /// A `redo` run failed
    Redo,
    /// Reading the ledger for `status` failed
    StatusQuery,
    /// Reading the ledger for `dbversion` failed
    VersionQuery,

    // Ledger consistency
    /// The ledger references a version the local change-set list does not define
    UnexpectedVersion,
    /// A status filter or stored status value outside the recognised set
    UnexpectedStatus,
    /// No record matched; callers that tolerate absence treat this as "empty"
    NotFound,
    /// A transient status (applying/reverting) survived a previous run
    InterruptedRun,

    // Local change-sets
    InvalidChangeSet,

    // Integration/IO
    Io,
    Persistence,

    // Internal
    Internal,
}

impl MigErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            MigErrorKind::Connect => "ERR_CONNECT",
            MigErrorKind::Close => "ERR_CLOSE",
            MigErrorKind::Apply => "ERR_APPLY",
            MigErrorKind::Revert => "ERR_REVERT",
            MigErrorKind::Redo => "ERR_REDO",
            MigErrorKind::StatusQuery => "ERR_STATUS_QUERY",
            MigErrorKind::VersionQuery => "ERR_VERSION_QUERY",
            MigErrorKind::UnexpectedVersion => "ERR_UNEXPECTED_VERSION",
            MigErrorKind::UnexpectedStatus => "ERR_UNEXPECTED_STATUS",
            MigErrorKind::NotFound => "ERR_NOT_FOUND",
            MigErrorKind::InterruptedRun => "ERR_INTERRUPTED_RUN",
            MigErrorKind::InvalidChangeSet => "ERR_INVALID_CHANGE_SET",
            MigErrorKind::Io => "ERR_IO",
            MigErrorKind::Persistence => "ERR_PERSISTENCE",
            MigErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Short human description, used as the lead of reported error lines
    pub fn describe(&self) -> &'static str {
        match self {
            MigErrorKind::Connect => "error connect",
            MigErrorKind::Close => "error close",
            MigErrorKind::Apply => "error migration up",
            MigErrorKind::Revert => "error migration down",
            MigErrorKind::Redo => "error migration redo",
            MigErrorKind::StatusQuery => "error db status",
            MigErrorKind::VersionQuery => "error db version",
            MigErrorKind::UnexpectedVersion => "unexpected migration version",
            MigErrorKind::UnexpectedStatus => "unexpected status",
            MigErrorKind::NotFound => "migration not found",
            MigErrorKind::InterruptedRun => "interrupted migration run",
            MigErrorKind::InvalidChangeSet => "invalid change-set",
            MigErrorKind::Io => "io error",
            MigErrorKind::Persistence => "ledger error",
            MigErrorKind::Internal => "internal error",
        }
    }
}

/// Canonical structured error type
///
/// Carries a kind for programmatic handling plus optional context: the
/// operation, the change-set version and name, the run id, a message and
/// the underlying cause.
#[derive(Debug, Clone)]
pub struct MigError {
    kind: MigErrorKind,
    op: Option<String>,
    version: Option<u32>,
    name: Option<String>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<MigError>>,
}

impl MigError {
    /// Create a new error with the specified kind
    pub fn new(kind: MigErrorKind) -> Self {
        Self {
            kind,
            op: None,
            version: None,
            name: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add change-set version context
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Add change-set name context
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add run id context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: MigError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> MigErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&MigError> {
        self.source.as_deref()
    }

    /// Kind of the innermost error in the source chain
    pub fn root_kind(&self) -> MigErrorKind {
        let mut current = self;
        while let Some(next) = current.source_error() {
            current = next;
        }
        current.kind
    }

    /// True for the distinguished "no record" signal
    pub fn is_not_found(&self) -> bool {
        self.kind == MigErrorKind::NotFound
    }
}

impl std::fmt::Display for MigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if self.message.is_empty() {
            write!(f, ": {}", self.kind.describe())?;
        } else {
            write!(f, ": {}", self.message)?;
        }
        if let Some(version) = self.version {
            write!(f, " (version: {})", version)?;
        }
        if let Some(name) = &self.name {
            write!(f, " (change_set: {})", name)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for MigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Validation failures for locally defined change-sets
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChangeSetError {
    /// A digit-prefixed file that is not `<version>_<name>_{up,down}.sql`
    #[error("Invalid change-set file name: {file_name}")]
    InvalidFileName { file_name: String },

    /// Change-set name unusable in a file name
    #[error("Invalid change-set name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Only one half of an up/down pair exists
    #[error("Change-set {version} has no {direction} script")]
    MissingScript {
        version: u32,
        direction: &'static str,
    },

    /// Two files claim the same version and direction
    #[error("Change-set {version} has more than one {direction} script")]
    DuplicateScript {
        version: u32,
        direction: &'static str,
    },

    /// Up and down files disagree on the change-set name
    #[error("Change-set {version} is named '{up_name}' by its up script and '{down_name}' by its down script")]
    NameMismatch {
        version: u32,
        up_name: String,
        down_name: String,
    },

    /// Versions are not the contiguous sequence 1..N
    #[error("Change-set versions must be contiguous from 1: expected {expected}, found {found}")]
    VersionGap { expected: u32, found: u32 },

    /// A generated file would overwrite an existing one
    #[error("Change-set file already exists: {path}")]
    AlreadyExists { path: String },
}

impl ChangeSetError {
    fn version(&self) -> Option<u32> {
        match self {
            ChangeSetError::MissingScript { version, .. }
            | ChangeSetError::DuplicateScript { version, .. }
            | ChangeSetError::NameMismatch { version, .. } => Some(*version),
            ChangeSetError::VersionGap { found, .. } => Some(*found),
            _ => None,
        }
    }
}

impl From<ChangeSetError> for MigError {
    fn from(err: ChangeSetError) -> Self {
        let version = err.version();
        let mut mig_err = MigError::new(MigErrorKind::InvalidChangeSet)
            .with_op("load_change_sets")
            .with_message(err.to_string());
        if let Some(version) = version {
            mig_err = mig_err.with_version(version);
        }
        mig_err
    }
}
