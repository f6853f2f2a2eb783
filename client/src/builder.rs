//! Builder to assemble a supervised client from its configuration
//! Each step sets up one collaborator, build ties them together

use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use protocol::ClientIdentity;

use crate::config::ClientConfig;
use crate::file_cache::LocalFileCache;
use crate::file_sync::{FileSync, HttpFileSource};
use crate::playback::CommandPlayer;
use crate::supervisor::{Supervisor, RECONNECT_DELAY};
use crate::transport::WsConnector;

pub type DesktopClient = Supervisor<WsConnector, HttpFileSource, CommandPlayer>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{0}")]
    Url(String),
    #[error("unable to open media directory: {0}")]
    MediaDir(#[from] io::Error),
}

pub struct ClientBuilder {
    config: ClientConfig,
    shutdown: CancellationToken,
    backoff: Duration,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            shutdown: CancellationToken::new(),
            backoff: RECONNECT_DELAY,
        }
    }

    pub fn shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn setup_connection(&self) -> WsConnector {
        WsConnector::new(self.config.server.clone())
    }

    fn setup_files(&self) -> Result<FileSync<HttpFileSource>, BuildError> {
        let files_url = self.config.files_url().map_err(BuildError::Url)?;
        let cache = LocalFileCache::load(&self.config.media_dir)?;
        info!("Files fetched from {}", files_url);

        Ok(FileSync::new(HttpFileSource::new(files_url), cache))
    }

    fn setup_player(&self) -> CommandPlayer {
        CommandPlayer::new(self.config.player.clone(), self.config.player_args.clone())
    }

    pub fn build(self) -> Result<DesktopClient, BuildError> {
        let connector = self.setup_connection();
        let sync = self.setup_files()?;
        let player = self.setup_player();
        let identity = ClientIdentity::new(self.config.name.clone());

        Ok(Supervisor::new(identity, connector, sync, player, self.shutdown).with_backoff(self.backoff))
    }
}
