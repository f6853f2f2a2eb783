use std::io;
use std::process::ExitStatus;

use thiserror::Error;

use protocol::CodecError;

// Fatal to one session run, the supervisor turns every one of these into a delayed retry
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unable to connect: {0}")]
    Connect(String),
    #[error("transport closed")]
    TransportClosed,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
    #[error("asked to play {0} which was never synced")]
    MissingFile(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

// Per file, a failed fetch only skips that name
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid file name {0:?}")]
    InvalidName(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {status} for {name}")]
    Status { name: String, status: u16 },
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("unable to start player: {0}")]
    Spawn(#[source] io::Error),
    #[error("player exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
}
