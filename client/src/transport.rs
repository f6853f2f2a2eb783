//! Session transport: one ordered, message oriented connection to the server.
//! The state machine only sees text frames, keepalive lives down here.
//!
//! The websocket is owned by a pump task that keeps reading, answering and
//! sending pings whether or not the session is currently waiting in `recv`,
//! so a client busy playing or fetching stays alive.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::SinkExt; // provides send on top of the websocket Sink
use tokio::net::TcpStream;
use tokio::select;
use tokio::sync::mpsc::{self, Receiver, Sender, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_stream::StreamExt; // provides next on top of the websocket Stream
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};

use tracing::{debug, warn};

use crate::error::SessionError;

pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);

const OUTBOUND_CHANNEL_SIZE: usize = 16;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, text: String) -> Result<(), SessionError>;

    // next text frame, fails once the connection is gone
    async fn recv(&mut self) -> Result<String, SessionError>;

    async fn close(&mut self);
}

// Opens a fresh transport for every run of the session state machine
#[async_trait]
pub trait Connector: Send + Sync {
    type Conn: Transport;

    async fn connect(&self) -> Result<Self::Conn, SessionError>;
}

pub struct WsConnector {
    url: String,
    keepalive: Duration,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), keepalive: KEEPALIVE_INTERVAL }
    }

    pub fn with_keepalive(mut self, keepalive: Duration) -> Self {
        self.keepalive = keepalive;
        self
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Conn = WsTransport;

    async fn connect(&self) -> Result<WsTransport, SessionError> {
        debug!("Client connecting to server {:?}", &self.url);

        let (ws, _response) = connect_async(self.url.as_str()).await
            .map_err(|e| SessionError::Connect(e.to_string()))?;

        Ok(WsTransport::new(ws, self.keepalive))
    }
}

enum Outbound {
    Text(String),
    Close,
}

pub struct WsTransport {
    outbound: Sender<Outbound>,
    inbound: UnboundedReceiver<Result<String, SessionError>>,
    pump: Option<JoinHandle<()>>,
}

impl WsTransport {
    pub fn new(ws: WsStream, keepalive: Duration) -> Self {
        let (outbound, out_rx) = mpsc::channel(OUTBOUND_CHANNEL_SIZE);
        let (in_tx, inbound) = mpsc::unbounded_channel();

        let pump = tokio::spawn(pump(ws, keepalive, out_rx, in_tx));

        Self { outbound, inbound, pump: Some(pump) }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, text: String) -> Result<(), SessionError> {
        self.outbound.send(Outbound::Text(text)).await
            .map_err(|_| SessionError::TransportClosed)
    }

    async fn recv(&mut self) -> Result<String, SessionError> {
        match self.inbound.recv().await {
            Some(res) => res,
            None => Err(SessionError::TransportClosed),
        }
    }

    async fn close(&mut self) {
        let _ = self.outbound.send(Outbound::Close).await;
        if let Some(pump) = self.pump.take() {
            let _ = pump.await;
        }
    }
}

// Owns the socket until the connection fails, goes silent or is closed.
// Any failure is handed to the reader as the last inbound item.
async fn pump(mut ws: WsStream, keepalive: Duration,
              mut outbound: Receiver<Outbound>, inbound: UnboundedSender<Result<String, SessionError>>) {
    let mut ticker = time::interval_at(Instant::now() + keepalive, keepalive);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_seen = Instant::now();

    let failure = loop {
        select! {
            cmd = outbound.recv() => {
                match cmd {
                    Some(Outbound::Text(text)) => {
                        if let Err(e) = ws.send(WsMessage::Text(text.into())).await {
                            break transport_error(e)
                        }
                    },
                    // an explicit close or the transport handle was dropped
                    Some(Outbound::Close) | None => {
                        let _ = ws.close(None).await;
                        return
                    },
                }
            }
            frame = ws.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        last_seen = Instant::now();
                        let _ = inbound.send(Ok(text.to_string()));
                    },
                    Some(Ok(WsMessage::Binary(data))) => {
                        last_seen = Instant::now();
                        match String::from_utf8(data.to_vec()) {
                            Ok(text) => { let _ = inbound.send(Ok(text)); },
                            Err(_) => warn!("dropping non utf8 binary frame of {} bytes", data.len()),
                        }
                    },
                    Some(Ok(WsMessage::Close(frame))) => {
                        debug!("server sent close {:?}", frame);
                        break SessionError::TransportClosed
                    },
                    Some(Ok(_)) => last_seen = Instant::now(), // ping, pong
                    Some(Err(e)) => break transport_error(e),
                    None => break SessionError::TransportClosed,
                }
            }
            _ = ticker.tick() => {
                if last_seen.elapsed() > keepalive * 2 {
                    warn!("no traffic from server for {:?}, dropping connection", last_seen.elapsed());
                    break SessionError::TransportClosed
                }
                if let Err(e) = ws.send(WsMessage::Ping(Bytes::new())).await {
                    break transport_error(e)
                }
            }
        }
    };

    let _ = inbound.send(Err(failure));
}

fn transport_error(e: WsError) -> SessionError {
    match e {
        WsError::ConnectionClosed | WsError::AlreadyClosed => SessionError::TransportClosed,
        e => SessionError::Transport(e.to_string()),
    }
}
