//! On-disk copies of every uploaded and synthesized clip.
//!
//! Layout under the archive root:
//!
//! ```text
//! user/user_<unix-ts>.mp3   uploads
//! ai/ai_<unix-ts>.mp3       synthesized replies
//! output_<unix-ts>.mp3      voice demo results
//! ```
//!
//! An upload and its reply share one timestamp so they can be paired later.
//! Two clips in the same directory and second get `_1`, `_2`, ... appended.

use crate::error::VoiceError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct AudioArchive {
    root: PathBuf,
}

impl AudioArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn user_dir(&self) -> PathBuf {
        self.root.join("user")
    }

    pub fn ai_dir(&self) -> PathBuf {
        self.root.join("ai")
    }

    /// Creates the `user/` and `ai/` directories.
    pub async fn ensure_dirs(&self) -> Result<(), VoiceError> {
        tokio::fs::create_dir_all(self.user_dir()).await?;
        tokio::fs::create_dir_all(self.ai_dir()).await?;
        Ok(())
    }

    /// Current Unix timestamp in seconds, used in clip names.
    pub fn timestamp() -> i64 {
        chrono::Utc::now().timestamp()
    }

    pub async fn save_user(&self, ts: i64, audio: &[u8]) -> Result<PathBuf, VoiceError> {
        write_unique(&self.user_dir(), "user", ts, audio).await
    }

    pub async fn save_ai(&self, ts: i64, audio: &[u8]) -> Result<PathBuf, VoiceError> {
        write_unique(&self.ai_dir(), "ai", ts, audio).await
    }

    pub async fn save_output(&self, audio: &[u8]) -> Result<PathBuf, VoiceError> {
        write_unique(&self.root, "output", Self::timestamp(), audio).await
    }

    /// Reads a file relative to the archive root.
    pub async fn read(&self, relative: impl AsRef<Path>) -> Result<Vec<u8>, VoiceError> {
        Ok(tokio::fs::read(self.root.join(relative)).await?)
    }
}

async fn write_unique(
    dir: &Path,
    prefix: &str,
    ts: i64,
    audio: &[u8],
) -> Result<PathBuf, VoiceError> {
    tokio::fs::create_dir_all(dir).await?;

    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            format!("{}_{}.mp3", prefix, ts)
        } else {
            format!("{}_{}_{}.mp3", prefix, ts, attempt)
        };
        let path = dir.join(name);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(mut file) => {
                file.write_all(audio).await?;
                file.flush().await?;
                tracing::debug!(path = %path.display(), bytes = audio.len(), "audio archived");
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}
