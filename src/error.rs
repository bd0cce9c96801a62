use thiserror::Error;

/// Failures the shell itself can hit. Child-side failures (bad redirection,
/// failed exec) never surface here: the child reports and exits on its own.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("pipe: {0}")]
    Pipe(#[source] nix::Error),
    #[error("fork: {0}")]
    Fork(#[source] nix::Error),
    #[error("waitpid: {0}")]
    Wait(#[source] nix::Error),
    #[error("stage has no program to run")]
    EmptyStage,
    #[error("{0:?}: contains a NUL byte")]
    InteriorNul(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
