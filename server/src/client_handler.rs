use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use bytes::Bytes;
use futures::{SinkExt, Stream};
use thiserror::Error;
use tokio::select;
use tokio::time::{self, Instant};
use tokio_stream::StreamExt;
use tracing::{info, debug, warn};

use protocol::{ClientIdentity, Codec, CodecError, Message};

use crate::catalog::Catalog;
use crate::registry::Registry;
use crate::server_types::Session;

pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("connection closed before identifying")]
    Closed,
    #[error("first frame was not text")]
    NotText,
    #[error(transparent)]
    Malformed(#[from] CodecError),
    #[error("expected id message, got {0}")]
    UnexpectedMessage(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
}

// Handles one websocket client on the server side
// Essentially this models a client actor on the server side
pub struct ClientHandler {
    registry: Registry,
    catalog: Arc<Catalog>,
    keepalive: Duration,
}

impl ClientHandler {
    pub fn new(registry: Registry, catalog: Arc<Catalog>, keepalive: Duration) -> Self {
        Self { registry, catalog, keepalive }
    }

    pub async fn run(self, socket: WebSocket) {
        let (mut sink, mut stream) = futures::StreamExt::split(socket);

        // Wait for id msg, nothing is registered unless it arrives first
        let id = match handshake(&mut stream).await {
            Ok(id) => id,
            Err(e) => {
                warn!("Handshake failed: {}", e);
                let _ = sink.send(WsMessage::Close(None)).await;
                return
            }
        };

        let (session, mut rx) = Session::new(self.registry.next_session_id());

        // file list goes into the queue ahead of anything routed after registration
        let file_list = Message::FileList { files: self.catalog.files().to_vec() };
        if session.enqueue(file_list).is_err() {
            warn!(client = %id, "unable to queue file list");
            return
        }

        self.registry.register(id.clone(), session.clone()).await;
        info!(client = %id, session = %session.id(), "Client connected");

        let mut keepalive = time::interval(self.keepalive);
        keepalive.tick().await; // skip the immediate first tick
        let mut last_seen = Instant::now();

        loop {
            select! {
                Some(msg) = rx.recv() => {
                    let text = match Codec::encode(&msg) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(client = %id, "Unable to encode {}: {}", msg.kind(), e);
                            continue
                        }
                    };

                    if let Err(e) = sink.send(WsMessage::Text(text.into())).await {
                        debug!(client = %id, "write failed: {}", e);
                        break
                    }
                }
                frame = stream.next() => {
                    match frame {
                        Some(Ok(WsMessage::Close(_))) | None => {
                            debug!(client = %id, "client closed connection");
                            break
                        },
                        Some(Ok(WsMessage::Text(text))) => {
                            last_seen = Instant::now();
                            debug!(client = %id, "ignoring inbound message {:?}", text.as_str());
                        },
                        Some(Ok(_)) => last_seen = Instant::now(), // ping, pong, binary
                        Some(Err(e)) => {
                            debug!(client = %id, "read failed: {}", e);
                            break
                        },
                    }
                }
                _ = keepalive.tick() => {
                    if last_seen.elapsed() > self.keepalive * 2 {
                        warn!(client = %id, "client unresponsive, closing");
                        break
                    }
                    if sink.send(WsMessage::Ping(Bytes::new())).await.is_err() {
                        break
                    }
                }
            }
        }

        info!(client = %id, session = %session.id(), "Client connection has closed");
        self.registry.unregister(&id, &session).await;
    }
}

// Block on the first frame, it has to be an id msg
pub async fn handshake<S, E>(stream: &mut S) -> Result<ClientIdentity, HandshakeError>
where
    S: Stream<Item = Result<WsMessage, E>> + Unpin,
    E: Display,
{
    loop {
        let text = match stream.next().await {
            None | Some(Ok(WsMessage::Close(_))) => return Err(HandshakeError::Closed),
            Some(Err(e)) => return Err(HandshakeError::Transport(e.to_string())),
            Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Pong(_))) => continue,
            Some(Ok(WsMessage::Text(text))) => text.to_string(),
            Some(Ok(WsMessage::Binary(data))) => String::from_utf8(data.to_vec())
                .map_err(|_| HandshakeError::NotText)?,
        };

        return match Codec::decode(&text)? {
            Message::Identify { id } => Ok(id),
            other => Err(HandshakeError::UnexpectedMessage(other.kind())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    type Frames = Vec<Result<WsMessage, std::io::Error>>;

    async fn run(frames: Frames) -> Result<ClientIdentity, HandshakeError> {
        let mut s = stream::iter(frames);
        handshake(&mut s).await
    }

    fn text(s: &str) -> Result<WsMessage, std::io::Error> {
        Ok(WsMessage::Text(s.to_owned().into()))
    }

    #[tokio::test]
    async fn accepts_identify() {
        let id = run(vec![text(r#"{"type":"id","id":"colin-desktop"}"#)]).await.unwrap();
        assert_eq!(id, ClientIdentity::new("colin-desktop"));
    }

    #[tokio::test]
    async fn skips_control_frames() {
        let frames = vec![
            Ok(WsMessage::Ping(Bytes::new())),
            text(r#"{"type":"id","id":"kitchen"}"#),
        ];
        assert_eq!(run(frames).await.unwrap(), ClientIdentity::new("kitchen"));
    }

    #[tokio::test]
    async fn rejects_other_discriminants() {
        let res = run(vec![text(r#"{"type":"restart"}"#)]).await;
        assert!(matches!(res, Err(HandshakeError::UnexpectedMessage("restart"))));

        let res = run(vec![text(r#"{"type":"hello"}"#)]).await;
        assert!(matches!(res, Err(HandshakeError::UnexpectedMessage(_))));
    }

    #[tokio::test]
    async fn rejects_malformed_and_closed() {
        assert!(matches!(run(vec![text("{not json")]).await, Err(HandshakeError::Malformed(_))));
        assert!(matches!(run(vec![]).await, Err(HandshakeError::Closed)));
        assert!(matches!(run(vec![Ok(WsMessage::Close(None))]).await, Err(HandshakeError::Closed)));
    }

    #[tokio::test]
    async fn rejects_non_utf8_binary() {
        let frames = vec![Ok(WsMessage::Binary(Bytes::from_static(&[0xff, 0xfe])))];
        assert!(matches!(run(frames).await, Err(HandshakeError::NotText)));
    }
}
