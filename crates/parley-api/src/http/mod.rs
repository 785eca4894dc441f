//! REST API: router, handlers, extractors and error mapping.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use parley_core::generation::{SharedGenerator, TextGenerator};
    use parley_types::config::AppConfig;
    use parley_types::error::GenerationError;
    use parley_types::generation::GenerationParams;
    use tempfile::TempDir;

    use crate::state::AppState;

    const EOS: u32 = 0;

    fn encode_bytes(text: &str) -> Vec<u32> {
        text.bytes().map(|b| b as u32 + 1).collect()
    }

    /// Byte-level generator that answers `re: <last turn>`.
    pub struct EchoGenerator;

    impl EchoGenerator {
        pub fn shared() -> SharedGenerator {
            Arc::new(Self)
        }
    }

    impl TextGenerator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        fn eos_token_id(&self) -> u32 {
            EOS
        }

        fn max_context_len(&self) -> usize {
            4096
        }

        fn encode(&self, text: &str) -> Result<Vec<u32>, GenerationError> {
            Ok(encode_bytes(text))
        }

        fn decode(&self, ids: &[u32]) -> Result<String, GenerationError> {
            let bytes: Vec<u8> = ids
                .iter()
                .filter(|&&id| id != EOS)
                .map(|&id| (id - 1) as u8)
                .collect();
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }

        fn generate(
            &self,
            input: &[u32],
            _params: &GenerationParams,
        ) -> Result<Vec<u32>, GenerationError> {
            let body = input.strip_suffix(&[EOS]).unwrap_or(input);
            let last_turn = match body.iter().rposition(|&id| id == EOS) {
                Some(pos) => &body[pos + 1..],
                None => body,
            };

            let mut output = input.to_vec();
            output.extend(encode_bytes("re: "));
            output.extend_from_slice(last_turn);
            output.push(EOS);
            Ok(output)
        }
    }

    pub struct FailingGenerator;

    impl FailingGenerator {
        pub fn shared() -> SharedGenerator {
            Arc::new(Self)
        }
    }

    impl TextGenerator for FailingGenerator {
        fn name(&self) -> &str {
            "failing"
        }

        fn eos_token_id(&self) -> u32 {
            EOS
        }

        fn max_context_len(&self) -> usize {
            1024
        }

        fn encode(&self, text: &str) -> Result<Vec<u32>, GenerationError> {
            Ok(encode_bytes(text))
        }

        fn decode(&self, _ids: &[u32]) -> Result<String, GenerationError> {
            Ok(String::new())
        }

        fn generate(
            &self,
            _input: &[u32],
            _params: &GenerationParams,
        ) -> Result<Vec<u32>, GenerationError> {
            Err(GenerationError::Inference("out of memory".to_string()))
        }
    }

    /// State whose transcript lives at `<tmp>/history.txt`.
    pub fn test_state(tmp: &TempDir, generator: SharedGenerator, debug: bool) -> AppState {
        let config = AppConfig {
            debug,
            history_path: tmp.path().join("history.txt"),
            ..AppConfig::default()
        };
        AppState::with_generator(generator, config)
    }
}
