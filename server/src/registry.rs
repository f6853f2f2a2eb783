use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, info};

use protocol::ClientIdentity;

use crate::server_types::{Session, SessionId};

const COUNTER_SEED: u64 = 1;

/// Live connections keyed by client identity.
///
/// Handles are cheap to clone, every clone shares the same map and the same
/// session id counter.
#[derive(Clone)]
pub struct Registry {
    clients: Arc<Mutex<HashMap<ClientIdentity, Session>>>,
    counter: Arc<AtomicU64>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            clients: Arc::new(Mutex::new(HashMap::new())),
            counter: Arc::new(AtomicU64::new(COUNTER_SEED)),
        }
    }

    pub fn next_session_id(&self) -> SessionId {
        SessionId(self.counter.fetch_add(1, Ordering::Relaxed))
    }

    // Last registration wins, the displaced session is not told about it
    pub async fn register(&self, id: ClientIdentity, session: Session) {
        let sid = session.id();
        let displaced = { // keep lock scope - mutex guard - small
            let mut mg = self.clients.lock().await;
            mg.insert(id.clone(), session)
        };

        match displaced {
            Some(old) => info!(client = %id, session = %sid, displaced = %old.id(), "client re-registered"),
            None => info!(client = %id, session = %sid, "client registered"),
        }
    }

    // Only removes the entry if it still belongs to session, so cleanup from a
    // superseded connection can't evict the newer one
    pub async fn unregister(&self, id: &ClientIdentity, session: &Session) -> bool {
        let mut mg = self.clients.lock().await;

        match mg.get(id) {
            Some(current) if current == session => {
                mg.remove(id);
                info!(client = %id, session = %session.id(), "client unregistered");
                true
            },
            Some(current) => {
                debug!(client = %id, session = %session.id(), current = %current.id(),
                       "stale unregister ignored");
                false
            },
            None => false,
        }
    }

    pub async fn lookup(&self, id: &ClientIdentity) -> Option<Session> {
        self.clients.lock().await.get(id).cloned()
    }

    pub async fn list_ids(&self) -> BTreeSet<ClientIdentity> {
        self.clients.lock().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
