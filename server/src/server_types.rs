use std::fmt;

use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::sync::mpsc::error::TrySendError;

use protocol::Message;

// server type definitions

// bounded outbound queue per connected client
pub const OUTBOUND_CHANNEL_SIZE: usize = 64;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to one live client connection.
///
/// Cloning hands out another sender onto the same outbound queue, two handles
/// compare equal only when they belong to the same connection.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    tx: Sender<Message>,
}

impl Session {
    pub fn new(id: SessionId) -> (Self, Receiver<Message>) {
        let (tx, rx) = mpsc::channel::<Message>(OUTBOUND_CHANNEL_SIZE);
        (Session { id, tx }, rx)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    // queue msg for the connection task without waiting on the socket
    pub fn enqueue(&self, msg: Message) -> Result<(), TrySendError<Message>> {
        self.tx.try_send(msg)
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Session {}
