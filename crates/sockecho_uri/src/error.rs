use sockecho_pattern::{CompileError, MatchError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    #[error("no address given")]
    WrongArgs,
    #[error("address grammar: {0}")]
    Compile(#[from] CompileError),
    #[error("address: {0}")]
    Match(#[from] MatchError),
    #[error("unexpected scheme `{0}`")]
    Scheme(String),
    #[error("host missing")]
    HostMissing,
    #[error("port `{0}` is not in 1..=65535")]
    PortInvalid(String),
    #[error("unix socket path `{0}` is empty or longer than {max} bytes", max = crate::UNIX_PATH_MAX)]
    PathInvalid(String),
}

/// The failure classes callers branch on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    WrongArgs,
    WrongPattern,
    NoMatch,
    ResourceError,
    PortInvalid,
    PathInvalid,
}

impl UriError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UriError::WrongArgs => ErrorKind::WrongArgs,
            UriError::Compile(CompileError::WrongArgs) => ErrorKind::WrongArgs,
            UriError::Compile(CompileError::WrongPattern { .. }) => ErrorKind::WrongPattern,
            UriError::Compile(CompileError::ResourceError) => ErrorKind::ResourceError,
            UriError::Match(MatchError::WrongArgs) => ErrorKind::WrongArgs,
            UriError::Match(MatchError::NoMatch) => ErrorKind::NoMatch,
            UriError::Match(MatchError::ResourceError(_)) => ErrorKind::ResourceError,
            UriError::Scheme(_) | UriError::HostMissing => ErrorKind::WrongPattern,
            UriError::PortInvalid(_) => ErrorKind::PortInvalid,
            UriError::PathInvalid(_) => ErrorKind::PathInvalid,
        }
    }
}
