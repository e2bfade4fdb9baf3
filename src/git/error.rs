use crate::subprocess::ProcessError;

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("unexpected structured output from `{command}`")]
    UnexpectedOutput { command: String },
}
