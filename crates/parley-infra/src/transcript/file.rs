//! Plain-text transcript file.
//!
//! One line per turn, opened in append mode for every write. The file and
//! its parent directory are created on the first append.

use std::path::{Path, PathBuf};

use parley_core::transcript::TranscriptStore;
use parley_types::error::TranscriptError;
use parley_types::transcript::Turn;
use tokio::io::AsyncWriteExt;

/// File-backed implementation of `TranscriptStore`.
///
/// All operations go through `tokio::fs`.
pub struct FileTranscript {
    path: PathBuf,
}

impl FileTranscript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TranscriptStore for FileTranscript {
    async fn read_all(&self) -> Result<String, TranscriptError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No transcript at {}, reading as empty", self.path.display());
                Ok(String::new())
            }
            Err(err) => Err(TranscriptError::Read(err)),
        }
    }

    async fn append(&self, turn: &Turn) -> Result<(), TranscriptError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(TranscriptError::Append)?;
            }
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(TranscriptError::Append)?;
        file.write_all(turn.to_line().as_bytes())
            .await
            .map_err(TranscriptError::Append)?;
        file.flush().await.map_err(TranscriptError::Append)?;

        tracing::trace!(speaker = %turn.speaker, bytes = turn.text.len(), "Transcript turn appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let transcript = FileTranscript::new(dir.path().join("history.txt"));
        assert_eq!(transcript.read_all().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_append_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deep").join("history.txt");
        let transcript = FileTranscript::new(&path);

        transcript.append(&Turn::user("Hello")).await.unwrap();
        assert!(path.exists());
        assert_eq!(transcript.read_all().await.unwrap(), "Hello\n");
    }

    #[tokio::test]
    async fn test_append_preserves_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.txt");
        tokio::fs::write(&path, "earlier\n").await.unwrap();

        let transcript = FileTranscript::new(&path);
        transcript.append(&Turn::user("Hello")).await.unwrap();
        transcript.append(&Turn::bot("Hi there")).await.unwrap();

        assert_eq!(
            transcript.read_all().await.unwrap(),
            "earlier\nHello\nHi there\n"
        );
    }

    #[tokio::test]
    async fn test_read_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let transcript = FileTranscript::new(dir.path());
        let err = transcript.read_all().await.unwrap_err();
        assert!(matches!(err, TranscriptError::Read(_)));
    }
}
