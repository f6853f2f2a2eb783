use std::path::PathBuf;

use clap::Parser;
use reqwest::Url;

/// Jukebox desktop client
#[derive(Parser, Debug, Clone)]
#[command(name = "jukebox-client", version, about = "Plays sounds on request of the jukebox server")]
pub struct ClientConfig {
    /// Name this client registers under
    #[arg(long, env = "JUKEBOX_NAME", default_value = "desktop")]
    pub name: String,

    /// Websocket endpoint of the server
    #[arg(long, env = "JUKEBOX_SERVER", default_value = "ws://localhost:8000/ws")]
    pub server: String,

    /// Base url for file downloads, derived from --server when omitted
    #[arg(long, env = "JUKEBOX_FILES_URL")]
    pub files_url: Option<String>,

    /// Where synced sound files are kept
    #[arg(long, env = "JUKEBOX_MEDIA_DIR", default_value = "./sounds")]
    pub media_dir: PathBuf,

    /// Program used to play a sound file, the file path is its last argument
    #[arg(long, env = "JUKEBOX_PLAYER", default_value = "ffplay")]
    pub player: String,

    /// Extra argument for the player, repeat for more
    #[arg(long = "player-arg", allow_hyphen_values = true,
          default_values = ["-nodisp", "-autoexit", "-loglevel", "quiet"])]
    pub player_args: Vec<String>,

    /// Log at debug level
    #[arg(long, short)]
    pub verbose: bool,
}

impl ClientConfig {
    // ws://host:port/ws -> http://host:port/
    pub fn files_url(&self) -> Result<Url, String> {
        if let Some(url) = &self.files_url {
            return Url::parse(url).map_err(|e| format!("invalid files url {url}: {e}"))
        }

        let mut url = Url::parse(&self.server)
            .map_err(|e| format!("invalid server url {}: {e}", self.server))?;
        let scheme = match url.scheme() {
            "ws" => "http",
            "wss" => "https",
            other => return Err(format!("unsupported server scheme {other}")),
        };

        url.set_scheme(scheme)
            .map_err(|_| format!("unable to derive files url from {}", self.server))?;
        url.set_path("/");
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::parse_from(["jukebox-client"]);
        assert_eq!(config.name, "desktop");
        assert_eq!(config.server, "ws://localhost:8000/ws");
        assert_eq!(config.player, "ffplay");
        assert_eq!(config.player_args, vec!["-nodisp", "-autoexit", "-loglevel", "quiet"]);
    }

    #[test]
    fn player_args_can_be_replaced() {
        let config = ClientConfig::parse_from(
            ["jukebox-client", "--name", "colin-desktop", "--player", "aplay", "--player-arg", "-q"]
        );
        assert_eq!(config.name, "colin-desktop");
        assert_eq!(config.player, "aplay");
        assert_eq!(config.player_args, vec!["-q"]);
    }

    #[test]
    fn files_url_is_derived_from_server() {
        let config = ClientConfig::parse_from(["jukebox-client", "--server", "ws://10.0.0.5:8000/ws"]);
        assert_eq!(config.files_url().unwrap().as_str(), "http://10.0.0.5:8000/");

        let config = ClientConfig::parse_from(["jukebox-client", "--server", "wss://jukebox.lan/ws?x=1"]);
        assert_eq!(config.files_url().unwrap().as_str(), "https://jukebox.lan/");
    }

    #[test]
    fn explicit_files_url_wins() {
        let config = ClientConfig::parse_from(
            ["jukebox-client", "--files-url", "http://cdn.lan/sounds/"]
        );
        assert_eq!(config.files_url().unwrap().as_str(), "http://cdn.lan/sounds/");
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let config = ClientConfig::parse_from(["jukebox-client", "--server", "ftp://x/ws"]);
        assert!(config.files_url().is_err());
    }
}
