//! Domain error types.

/// Failures raised while reducing a delta series to summary statistics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatisticsError {
    #[error("cannot compute statistics over an empty delta series")]
    EmptySeries,

    #[error("standard deviation is zero: every benchmark delta is identical")]
    ZeroStandardDeviation,

    #[error("first benchmark delta is zero: overall cumulative return is undefined")]
    ZeroFirstDelta,

    #[error("decimal arithmetic failed during {operation}")]
    Arithmetic { operation: &'static str },
}

/// A symbol list that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("symbol {0} is not in the configured universe")]
    NotInUniverse(String),
}

/// An allocation string that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("invalid weight {token:?}: expected 0.d or 1.0")]
    InvalidWeight { token: String },

    #[error("expected {expected} weights, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("weights must total 1.0, got {total}")]
    BadTotal { total: String },
}

/// Top-level error type for sharpefolio.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Symbols(#[from] SymbolError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error("weight vector has {actual} entries but {expected} assets are loaded")]
    WeightCountMismatch { expected: usize, actual: usize },

    #[error("invalid weight vector: {reason}")]
    InvalidWeights { reason: String },

    #[error("no return records loaded")]
    EmptyHistory,

    #[error("misaligned history: {reason}")]
    MisalignedHistory { reason: String },

    #[error("no feasible allocation over {assets} assets")]
    NoFeasibleAllocation { assets: usize },

    #[error(transparent)]
    Statistics(#[from] StatisticsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SimulationError> for std::process::ExitCode {
    fn from(err: &SimulationError) -> Self {
        let code: u8 = match err {
            SimulationError::Io(_) => 1,
            SimulationError::ConfigParse { .. }
            | SimulationError::ConfigMissing { .. }
            | SimulationError::ConfigInvalid { .. } => 2,
            SimulationError::Database { .. } | SimulationError::DatabaseQuery { .. } => 3,
            SimulationError::Symbols(_)
            | SimulationError::Allocation(_)
            | SimulationError::WeightCountMismatch { .. }
            | SimulationError::InvalidWeights { .. } => 4,
            SimulationError::EmptyHistory | SimulationError::MisalignedHistory { .. } => 5,
            SimulationError::NoFeasibleAllocation { .. } | SimulationError::Statistics(_) => 6,
        };
        std::process::ExitCode::from(code)
    }
}
