use thiserror::Error;

/// Errors from the text generation backend.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model load error: {0}")]
    ModelLoad(String),

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("generation input is empty")]
    EmptyInput,
}

/// Errors from transcript file operations.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("transcript read failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("transcript append failed: {0}")]
    Append(#[source] std::io::Error),
}

/// Errors surfaced by a chat exchange.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error("generation task failed: {0}")]
    Task(String),
}
