use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("no pattern given")]
    WrongArgs,
    #[error("wrong pattern{}: {}", at(.offset), .message)]
    WrongPattern {
        message: String,
        /// Byte offset into the pattern as passed to `compile`.
        offset: Option<usize>,
    },
    #[error("compiled pattern exceeds the size limit")]
    ResourceError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("no group names given")]
    WrongArgs,
    #[error("subject does not match")]
    NoMatch,
    #[error("could not store a captured group: {0}")]
    ResourceError(#[source] AllocError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("allocation of {requested} bytes failed")]
pub struct AllocError {
    pub requested: usize,
}

fn at(offset: &Option<usize>) -> String {
    offset.map(|o| format!(" at byte {}", o)).unwrap_or_default()
}
