use serde::Serialize;
use std::fmt;

/// Error taxonomy for the simulation core.
///
/// The Game Engine itself is total and never returns this type; it is
/// returned only by the Season Engine and Playoff Engine, which surface
/// typed failures to callers instead of panicking on user input.
#[derive(Debug)]
pub enum SimError {
    /// Requested team, game, or season does not exist.
    NotFound(String),
    /// Week out of range, negative scores, or otherwise malformed input.
    InvalidArgument(String),
    /// Completing an already-completed game, or advancing a round whose
    /// predecessor is incomplete.
    Conflict(String),
    /// Internal invariant violated. Always a bug; never return this to a
    /// user as a recoverable condition.
    Unreachable(String),
}

/// Error response body for the reference binary's JSON output.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl SimError {
    /// Error-code/message pair, mirroring how the core's caller (UI or
    /// persistence layer) would translate a typed failure to a user message.
    pub fn to_response(&self) -> ErrorResponse {
        let (error, message) = match self {
            SimError::NotFound(msg) => ("not_found".to_string(), msg.clone()),
            SimError::InvalidArgument(msg) => ("invalid_argument".to_string(), msg.clone()),
            SimError::Conflict(msg) => ("conflict".to_string(), msg.clone()),
            SimError::Unreachable(msg) => ("unreachable".to_string(), msg.clone()),
        };
        ErrorResponse { error, message }
    }

    /// Process exit code for the reference binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            SimError::NotFound(_) => 2,
            SimError::InvalidArgument(_) => 3,
            SimError::Conflict(_) => 4,
            SimError::Unreachable(_) => 70,
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::NotFound(msg) => write!(f, "not found: {msg}"),
            SimError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            SimError::Conflict(msg) => write!(f, "conflict: {msg}"),
            SimError::Unreachable(msg) => write!(f, "unreachable (bug): {msg}"),
        }
    }
}

impl std::error::Error for SimError {}

pub type SimResult<T> = Result<T, SimError>;
