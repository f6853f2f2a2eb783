use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use protocol::{ClientIdentity, Message};

use crate::registry::Registry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("client {0} not found")]
    ClientNotFound(ClientIdentity),
}

// handles msg delivery to a single named client
#[derive(Clone)]
pub struct Delivery {
    registry: Registry,
}

impl Delivery {
    pub fn new(clients: &Registry) -> Self {
        Delivery {
            registry: clients.clone(),
        }
    }

    // Fire and forget: a session that is already closing or backed up just
    // drops the msg, the caller never waits on the socket
    pub async fn route(&self, target: &ClientIdentity, msg: Message) -> Result<(), RouteError> {
        let session = self.registry.lookup(target).await
            .ok_or_else(|| RouteError::ClientNotFound(target.clone()))?;

        let kind = msg.kind();
        match session.enqueue(msg) {
            Ok(()) => debug!(client = %target, session = %session.id(), kind, "message queued"),
            Err(TrySendError::Full(_)) =>
                warn!(client = %target, session = %session.id(), kind, "outbound queue full, message dropped"),
            Err(TrySendError::Closed(_)) =>
                warn!(client = %target, session = %session.id(), kind, "session closing, message dropped"),
        }

        Ok(())
    }

    pub async fn play_sound(&self, target: &ClientIdentity, filename: String) -> Result<(), RouteError> {
        self.route(target, Message::PlaySound { filename }).await
    }

    pub async fn restart(&self, target: &ClientIdentity) -> Result<(), RouteError> {
        self.route(target, Message::Restart).await
    }

    pub async fn broadcast(&self, target: &ClientIdentity, message: String) -> Result<(), RouteError> {
        self.route(target, Message::Broadcast { message }).await
    }
}
