//! Application state wiring the chat service together.
//!
//! AppState holds the concrete service instance used by both the CLI and the
//! REST API. `ChatService` is generic over the transcript store; AppState
//! pins it to the file-backed implementation.

use std::sync::Arc;

use anyhow::Context;
use parley_core::chat::service::ChatService;
use parley_core::generation::SharedGenerator;
use parley_infra::model::LocalCausalLm;
use parley_infra::transcript::FileTranscript;
use parley_types::config::AppConfig;

/// Concrete chat service pinned to the file transcript.
pub type ConcreteChatService = ChatService<FileTranscript>;

/// Shared application state.
///
/// Cloned into every request handler; the service itself is shared, so
/// every request threads through the same running context.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Load the model and wire the chat service.
    ///
    /// Model loading runs on the blocking pool; it maps the weights and
    /// builds every layer before the first request is accepted.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let model_path = config.model_path.clone();
        let generator = tokio::task::spawn_blocking(move || LocalCausalLm::load(&model_path))
            .await?
            .with_context(|| format!("failed to load model from {}", config.model_path.display()))?;

        Ok(Self::with_generator(Arc::new(generator), config))
    }

    /// Wire the chat service around an already loaded generator.
    pub fn with_generator(generator: SharedGenerator, config: AppConfig) -> Self {
        let chat_service = ChatService::new(
            generator,
            FileTranscript::new(&config.history_path),
            config.generation.clone(),
            config.history_mode,
        );

        Self {
            chat_service: Arc::new(chat_service),
            config: Arc::new(config),
        }
    }
}
