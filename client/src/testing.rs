// Scripted stand-ins for the transport and the collaborators

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use protocol::{Codec, Message};

use crate::error::{FetchError, PlaybackError, SessionError};
use crate::file_sync::FileSource;
use crate::playback::Player;
use crate::transport::{Connector, Transport};

pub fn encode(msg: Message) -> String {
    Codec::encode(&msg).unwrap()
}

pub fn file_list(files: &[&str]) -> String {
    encode(Message::FileList { files: files.iter().map(|f| f.to_string()).collect() })
}

pub fn play(filename: &str) -> String {
    encode(Message::PlaySound { filename: filename.to_owned() })
}

pub fn restart() -> String {
    encode(Message::Restart)
}

pub fn identify(id: &str) -> String {
    encode(Message::Identify { id: id.into() })
}

pub struct ScriptedTransport {
    inbound: VecDeque<String>,
    sent: Arc<Mutex<Vec<String>>>,
    hang_when_empty: bool,
}

impl ScriptedTransport {
    pub fn new(inbound: Vec<String>) -> Self {
        Self { inbound: inbound.into(), sent: Arc::default(), hang_when_empty: false }
    }

    pub fn sent(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&mut self, text: String) -> Result<(), SessionError> {
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn recv(&mut self) -> Result<String, SessionError> {
        match self.inbound.pop_front() {
            Some(text) => Ok(text),
            None if self.hang_when_empty => std::future::pending().await,
            None => Err(SessionError::TransportClosed),
        }
    }

    async fn close(&mut self) {}
}

// Hands out one scripted transport per connect, cancels the token once it runs dry
#[derive(Default)]
pub struct ScriptedConnector {
    scripts: Mutex<VecDeque<(Vec<String>, bool)>>,
    pub connects: Arc<Mutex<Vec<Instant>>>,
    pub sent: Arc<Mutex<Vec<Arc<Mutex<Vec<String>>>>>>,
    pub stop_when_empty: Option<CancellationToken>,
}

impl ScriptedConnector {
    pub fn new(scripts: Vec<Vec<String>>) -> Self {
        let c = Self::default();
        for script in scripts {
            c.push(script, false);
        }
        c
    }

    pub fn push(&self, script: Vec<String>, hang_when_empty: bool) {
        self.scripts.lock().unwrap().push_back((script, hang_when_empty));
    }

    pub fn stop_with(mut self, token: CancellationToken) -> Self {
        self.stop_when_empty = Some(token);
        self
    }

    pub fn sent_on(&self, run: usize) -> Vec<String> {
        self.sent.lock().unwrap()[run].lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Conn = ScriptedTransport;

    async fn connect(&self) -> Result<ScriptedTransport, SessionError> {
        self.connects.lock().unwrap().push(Instant::now());

        let next = self.scripts.lock().unwrap().pop_front();
        match next {
            Some((script, hang_when_empty)) => {
                let mut transport = ScriptedTransport::new(script);
                transport.hang_when_empty = hang_when_empty;
                self.sent.lock().unwrap().push(transport.sent());
                Ok(transport)
            },
            None => {
                if let Some(token) = &self.stop_when_empty {
                    token.cancel();
                }
                Err(SessionError::Connect("server unreachable".into()))
            }
        }
    }
}

#[derive(Default, Clone)]
pub struct FakeSource {
    pub fetched: Arc<Mutex<Vec<String>>>,
}

impl FakeSource {
    pub fn fetch_count(&self, name: &str) -> usize {
        self.fetched.lock().unwrap().iter().filter(|n| *n == name).count()
    }
}

#[async_trait]
impl FileSource for FakeSource {
    async fn fetch(&self, name: &str) -> Result<Bytes, FetchError> {
        self.fetched.lock().unwrap().push(name.to_owned());
        Ok(Bytes::from_static(b"RIFF"))
    }
}

#[derive(Default, Clone)]
pub struct RecordingPlayer {
    pub played: Arc<Mutex<Vec<PathBuf>>>,
    pub fail: bool,
}

#[async_trait]
impl Player for RecordingPlayer {
    async fn play(&self, path: &Path) -> Result<(), PlaybackError> {
        self.played.lock().unwrap().push(path.to_owned());
        if self.fail {
            return Err(PlaybackError::Spawn(std::io::Error::new(std::io::ErrorKind::NotFound, "no player")))
        }
        Ok(())
    }
}
