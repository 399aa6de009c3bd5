pub mod angle;

pub mod animation;

pub mod audio;

pub mod backend;

pub mod gate;

pub mod render;

pub mod session;

pub mod tracker;

pub mod wheel;

pub type Result<T, E = SpinError> = std::result::Result<T, E>;

/// Failures of the spin flow. Audio problems never appear here; the sound
/// port swallows them itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpinError {
    /// Request rejected, non-success status, or a payload that did not parse.
    Network(String),
    /// Server-side fault while the spin was being recorded. Consumed tickets
    /// or cooldowns are reviewed server-side; the client must not retry on
    /// its own.
    ServerFault,
    /// The server runs a different wheel configuration than we loaded.
    /// Unrecoverable locally: the session must be restarted to resync.
    VersionConflict { expected: String },
    /// Outcome index outside `[0, total)`.
    InvalidOutcome { index: i64, total: usize },
}

impl std::fmt::Display for SpinError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpinError::Network(msg) => write!(f, "network error: {msg}"),
            SpinError::ServerFault => {
                write!(f, "server fault; spin consumption will be reviewed")
            }
            SpinError::VersionConflict { expected } => {
                write!(f, "wheel configuration out of sync (server has {expected})")
            }
            SpinError::InvalidOutcome { index, total } => {
                write!(f, "outcome index {index} outside 0..{total}")
            }
        }
    }
}

impl std::error::Error for SpinError {}
