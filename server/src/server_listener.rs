use std::net::SocketAddr;

use tokio::io;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use tracing::{info, error};

use crate::web::{self, AppState};

pub struct ServerListener;

impl ServerListener {

    // Bind first so callers learn the actual address (port 0 picks a free one),
    // then serve the operator routes and client websockets on a spawned task
    pub async fn spawn_accept(addr: &str, state: AppState) -> io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(addr).await
            .map_err(|e| { error!("Unable to bind to server address {}", addr); e })?;
        let local_addr = listener.local_addr()?;

        info!("Server starting.. {:?}", &local_addr);

        let app = web::router(state);
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Server abnormally exiting: {}", e);
            }
        });

        Ok((local_addr, handle))
    }
}
