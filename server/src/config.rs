use std::path::PathBuf;

use clap::Parser;

/// Jukebox control plane server
#[derive(Parser, Debug, Clone)]
#[command(name = "jukebox-server", version, about = "Remote sound playback control plane")]
pub struct ServerConfig {
    /// Address to listen on for the operator page and client websockets
    #[arg(long, env = "JUKEBOX_BIND", default_value = "127.0.0.1:8000")]
    pub bind: String,

    /// Directory holding the media files offered to clients
    #[arg(long, env = "JUKEBOX_MEDIA_DIR", default_value = "./media")]
    pub media_dir: PathBuf,

    /// Log at debug level
    #[arg(long, short)]
    pub verbose: bool,
}
