//! Chat service producing one reply per user sentence.
//!
//! ChatService coordinates the transcript store and the text generator:
//! read and encode the transcript, record the question, run the model over
//! the running context plus the new turn, record the answer.

use std::sync::Arc;
use std::time::Instant;

use parley_types::config::HistoryMode;
use parley_types::error::ChatError;
use parley_types::generation::GenerationParams;
use parley_types::transcript::{flatten_transcript, Turn};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::chat::context::{fit_window, prompt_window, RunningContext};
use crate::generation::SharedGenerator;
use crate::transcript::TranscriptStore;

/// Orchestrates a conversational exchange.
///
/// Generic over `TranscriptStore` to keep parley-core free of IO crates;
/// the generator is type-erased because the model is chosen at startup.
///
/// Every exchange holds `context` from the transcript read to the final
/// append, so concurrent callers are served one at a time and the
/// transcript never interleaves.
pub struct ChatService<S: TranscriptStore> {
    generator: SharedGenerator,
    transcript: S,
    params: GenerationParams,
    history_mode: HistoryMode,
    context: Mutex<RunningContext>,
}

impl<S: TranscriptStore> ChatService<S> {
    /// Create a chat service with an empty running context.
    pub fn new(
        generator: SharedGenerator,
        transcript: S,
        params: GenerationParams,
        history_mode: HistoryMode,
    ) -> Self {
        Self {
            generator,
            transcript,
            params,
            history_mode,
            context: Mutex::new(RunningContext::new()),
        }
    }

    /// Name of the underlying model.
    pub fn model_name(&self) -> &str {
        self.generator.name()
    }

    /// Produce the bot's reply to `input`.
    ///
    /// The question is appended to the transcript before generation starts,
    /// so a failed generation still leaves the question on record. The
    /// running context is only replaced when generation succeeds.
    pub async fn reply(&self, input: &str) -> Result<String, ChatError> {
        let mut context = self.context.lock().await;
        let start = Instant::now();

        let history = flatten_transcript(&self.transcript.read_all().await?);
        let history_ids = self.generator.encode_turn(&history)?;
        let turn_ids = self.generator.encode_turn(input)?;
        debug!(
            history_tokens = history_ids.len(),
            input_tokens = turn_ids.len(),
            context_tokens = context.len(),
            "Encoded exchange"
        );

        self.transcript.append(&Turn::user(input)).await?;

        let seed = match self.history_mode {
            HistoryMode::Seed if context.is_empty() && !history.is_empty() => {
                Some(history_ids.as_slice())
            }
            _ => None,
        };
        let limit = self.params.length_limit(self.generator.max_context_len());
        let window = prompt_window(limit, self.params.reply_reserve);
        let full_input = context.build_input(seed, &turn_ids);
        let full_len = full_input.len();
        let bot_input = fit_window(full_input, window, self.generator.eos_token_id());
        if bot_input.len() < full_len {
            warn!(
                dropped_tokens = full_len - bot_input.len(),
                window,
                "Model input exceeded the context window, oldest turns dropped"
            );
        }
        let input_len = bot_input.len();

        let generator = Arc::clone(&self.generator);
        let params = self.params.clone();
        let output = tokio::task::spawn_blocking(move || generator.generate(&bot_input, &params))
            .await
            .map_err(|e| ChatError::Task(e.to_string()))??;

        let new_tokens = &output[input_len.min(output.len())..];
        let reply = self.generator.decode(new_tokens)?;
        let new_token_count = new_tokens.len();
        context.replace(output);

        self.transcript.append(&Turn::bot(reply.as_str())).await?;

        info!(
            model = %self.generator.name(),
            input_tokens = input_len,
            output_tokens = new_token_count,
            response_ms = start.elapsed().as_millis() as u64,
            "Reply generated"
        );
        Ok(reply)
    }

    /// Number of tokens in the running context.
    pub async fn context_len(&self) -> usize {
        self.context.lock().await.len()
    }

    /// Forget the running context. The transcript is left untouched.
    pub async fn reset_context(&self) {
        self.context.lock().await.clear();
        info!("Running context cleared");
    }

    /// Raw transcript text.
    pub async fn transcript(&self) -> Result<String, ChatError> {
        let _guard = self.context.lock().await;
        Ok(self.transcript.read_all().await?)
    }
}
