//! One run of the client session state machine:
//! `Connecting -> Identifying -> Syncing -> Active -> (Restarting | Closing)`.
//!
//! A run never retries anything itself, it reports how it ended and leaves
//! reconnecting to the supervisor.

use tracing::{info, debug, warn};

use protocol::{ClientIdentity, Codec, Message};

use crate::error::SessionError;
use crate::file_sync::{FileSource, FileSync};
use crate::playback::Player;
use crate::transport::{Connector, Transport};
use crate::types::{RunOutcome, SessionState, Step};

pub struct ClientSession<'a, S, P> {
    identity: &'a ClientIdentity,
    sync: &'a mut FileSync<S>,
    player: &'a P,
    state: SessionState,
}

impl<'a, S: FileSource, P: Player> ClientSession<'a, S, P> {
    pub fn new(identity: &'a ClientIdentity, sync: &'a mut FileSync<S>, player: &'a P) -> Self {
        Self {
            identity,
            sync,
            player,
            state: SessionState::Connecting,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        debug!(client = %self.identity, "session {} -> {}", self.state, next);
        self.state = next;
    }

    pub async fn run<C: Connector>(&mut self, connector: &C) -> RunOutcome {
        self.transition(SessionState::Connecting);

        let mut transport = match connector.connect().await {
            Ok(transport) => transport,
            Err(e) => {
                self.transition(SessionState::Closing);
                return RunOutcome::Closed(e)
            }
        };

        let outcome = match self.drive(&mut transport).await {
            Ok(()) => {
                self.transition(SessionState::Restarting);
                RunOutcome::Restart
            },
            Err(e) => {
                self.transition(SessionState::Closing);
                RunOutcome::Closed(e)
            }
        };

        transport.close().await;
        outcome
    }

    // Returns Ok only when the server asked for a restart, everything else ends in Err
    async fn drive<T: Transport>(&mut self, transport: &mut T) -> Result<(), SessionError> {
        self.transition(SessionState::Identifying);
        let id = Codec::encode(&Message::Identify { id: self.identity.clone() })?;
        transport.send(id).await?;

        // the server always opens with its file list
        self.transition(SessionState::Syncing);
        let first = transport.recv().await?;
        match Codec::decode(&first) {
            Ok(Message::FileList { files }) => self.reconcile(&files).await,
            Ok(other) => return Err(SessionError::ProtocolViolation(
                format!("expected file_list, got {}", other.kind()))),
            Err(e) => return Err(SessionError::ProtocolViolation(
                format!("undecodable first message: {}", e))),
        }

        self.transition(SessionState::Active);
        info!(client = %self.identity, "Session active");

        loop {
            let text = transport.recv().await?;
            if self.dispatch(&text).await? == Step::Restart {
                return Ok(())
            }
        }
    }

    pub async fn dispatch(&mut self, text: &str) -> Result<Step, SessionError> {
        let msg = match Codec::decode(text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Ignoring malformed message {:?}: {}", text, e);
                return Ok(Step::Continue)
            }
        };

        match msg {
            Message::FileList { files } => self.reconcile(&files).await,
            Message::PlaySound { filename } => self.play(&filename).await?,
            Message::Restart => {
                info!("Server requested restart");
                return Ok(Step::Restart)
            },
            Message::Broadcast { message } => info!("Received from server: {}", message),
            Message::Identify { .. } => warn!("Ignoring id message from server"),
            Message::Unrecognized => warn!("Ignoring unrecognized message {:?}", text),
        }

        Ok(Step::Continue)
    }

    async fn reconcile(&mut self, files: &[String]) {
        let available = self.sync.ensure_local(files).await;
        info!("{} of {} server files available locally", available.len(), files.len());
    }

    // Playing something that was never synced is a contract violation, fatal to the run
    async fn play(&self, filename: &str) -> Result<(), SessionError> {
        if !self.sync.cache().contains(filename) {
            return Err(SessionError::MissingFile(filename.to_owned()))
        }

        let path = self.sync.cache().path_of(filename);
        match self.player.play(&path).await {
            Ok(()) => info!("Played {}", filename),
            Err(e) => warn!("Playback of {} failed: {}", filename, e),
        }

        Ok(())
    }
}
