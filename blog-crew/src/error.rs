//! Error types for a pipeline run.

/// The submitted topic cannot start a run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a topic before generating.")]
    BlankTopic,
}

/// The orchestration engine failed mid-run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("task `{task}` failed: {source}")]
    Task {
        task: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("pipeline finished without producing a blog post")]
    EmptyArtifact,
    #[error("failed to write progress output: {0}")]
    Output(#[from] std::io::Error),
}

/// Why a submitted run did not produce a blog post.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a blog post is already being generated")]
    Busy,
    #[error("agents failed: {0}")]
    Orchestration(#[from] EngineError),
}
