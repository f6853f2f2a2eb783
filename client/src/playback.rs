use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::PlaybackError;

#[async_trait]
pub trait Player: Send + Sync {
    async fn play(&self, path: &Path) -> Result<(), PlaybackError>;
}

// Plays through an external program, e.g. `ffplay -nodisp -autoexit <file>`
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }
}

#[async_trait]
impl Player for CommandPlayer {
    async fn play(&self, path: &Path) -> Result<(), PlaybackError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .await
            .map_err(PlaybackError::Spawn)?;

        debug!("{} stdout: {}", &self.program, String::from_utf8_lossy(&output.stdout));

        if !output.status.success() {
            return Err(PlaybackError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            })
        }

        Ok(())
    }
}
