use serde::Serialize;
use std::fmt;

/// Coarse failure classification shared by every service error.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub enum ErrorKind {
    /// Backend unreachable, timed out or returned something undecodable.
    Transport,
    /// Invalid credentials, or a missing/expired token.
    Authentication,
    /// Per-field input errors reported by the backend.
    Validation,
    NotFound,
    /// Duplicate request or a request in the wrong state.
    Conflict,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}
