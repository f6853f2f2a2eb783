use std::time::Duration;

use tokio::select;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use protocol::ClientIdentity;

use crate::file_sync::{FileSource, FileSync};
use crate::playback::Player;
use crate::session::ClientSession;
use crate::transport::Connector;
use crate::types::{RunOutcome, RunStats};

// cool down after a failed run, restarts skip it
pub const RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// Keeps a client session alive until interrupted.
///
/// Every run starts from a fresh session, only the local file cache (held by
/// the file sync) carries over between runs.
pub struct Supervisor<C, S, P> {
    identity: ClientIdentity,
    connector: C,
    sync: FileSync<S>,
    player: P,
    backoff: Duration,
    shutdown: CancellationToken,
    stats: RunStats,
}

impl<C: Connector, S: FileSource, P: Player> Supervisor<C, S, P> {
    pub fn new(identity: ClientIdentity, connector: C, sync: FileSync<S>, player: P,
               shutdown: CancellationToken) -> Self {
        Self {
            identity,
            connector,
            sync,
            player,
            backoff: RECONNECT_DELAY,
            shutdown,
            stats: RunStats::default(),
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn sync(&self) -> &FileSync<S> {
        &self.sync
    }

    pub async fn run(&mut self) -> RunStats {
        let shutdown = self.shutdown.clone();

        while !shutdown.is_cancelled() {
            self.stats.runs += 1;

            let outcome = {
                let mut session = ClientSession::new(&self.identity, &mut self.sync, &self.player);
                select! {
                    _ = shutdown.cancelled() => {
                        info!("Interrupted, closing session");
                        break
                    }
                    outcome = session.run(&self.connector) => outcome,
                }
            };

            match outcome {
                RunOutcome::Restart => {
                    self.stats.restarts += 1;
                    info!(client = %self.identity, "Restarting session");
                },
                RunOutcome::Closed(e) => {
                    self.stats.failures += 1;
                    warn!(client = %self.identity, "Session ended: {}, reconnecting in {:?}", e, self.backoff);

                    select! {
                        _ = shutdown.cancelled() => {
                            info!("Interrupted while waiting to reconnect");
                            break
                        }
                        _ = time::sleep(self.backoff) => {}
                    }
                },
            }
        }

        self.stats
    }
}
