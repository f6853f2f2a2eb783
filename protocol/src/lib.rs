//! Wire messages exchanged between the jukebox server and its desktop clients.
//! Every message is a flat JSON object tagged by its `type` field.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

// type discriminants as they appear on the wire
pub const TYPE_IDENTIFY: &str = "id";
pub const TYPE_FILE_LIST: &str = "file_list";
pub const TYPE_PLAY_SOUND: &str = "play_sound";
pub const TYPE_RESTART: &str = "restart";
pub const TYPE_BROADCAST: &str = "server";

/// Operator chosen name of a desktop client, unique among live connections only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        ClientIdentity(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientIdentity {
    fn from(id: &str) -> Self {
        ClientIdentity::new(id)
    }
}

impl From<String> for ClientIdentity {
    fn from(id: String) -> Self {
        ClientIdentity(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    // client -> server, handshake only
    #[serde(rename = "id")]
    Identify { id: ClientIdentity },

    // server -> client
    #[serde(rename = "file_list")]
    FileList { files: Vec<String> },
    #[serde(rename = "play_sound")]
    PlaySound { filename: String },
    #[serde(rename = "restart")]
    Restart,
    #[serde(rename = "server")]
    Broadcast { message: String },

    // any discriminant we don't know about, decode only
    #[serde(other, skip_serializing)]
    Unrecognized,
}

impl Message {
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Identify { .. } => TYPE_IDENTIFY,
            Message::FileList { .. } => TYPE_FILE_LIST,
            Message::PlaySound { .. } => TYPE_PLAY_SOUND,
            Message::Restart => TYPE_RESTART,
            Message::Broadcast { .. } => TYPE_BROADCAST,
            Message::Unrecognized => "unrecognized",
        }
    }
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unrecognized messages can't be encoded")]
    Unencodable,
}

pub struct Codec; // unit struct

impl Codec {
    // convert message to its json text frame
    pub fn encode(msg: &Message) -> Result<String, CodecError> {
        if let Message::Unrecognized = msg {
            return Err(CodecError::Unencodable)
        }

        Ok(serde_json::to_string(msg)?)
    }

    // convert json text frame back into a message, unknown types decode to Unrecognized
    pub fn decode(text: &str) -> Result<Message, CodecError> {
        let msg: Message = serde_json::from_str(text)?;
        if let Message::Unrecognized = msg {
            debug!("decoded unrecognized message {:?}", text);
        }
        Ok(msg)
    }
}
