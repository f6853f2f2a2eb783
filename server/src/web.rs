//! Operator facing HTTP surface plus the websocket upgrade endpoint.
//! Every command here is a thin wrapper over `Delivery::route`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State, WebSocketUpgrade},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{info, warn};

use protocol::ClientIdentity;

use crate::catalog::Catalog;
use crate::client_handler::{ClientHandler, KEEPALIVE_INTERVAL};
use crate::delivery::{Delivery, RouteError};
use crate::registry::Registry;

const CLIENT_NOT_FOUND: &str = "/?error_msg=Client+not+found";
const FILE_NOT_FOUND: &str = "/?error_msg=File+not+found";

#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    pub delivery: Delivery,
    pub catalog: Arc<Catalog>,
    pub keepalive: Duration,
}

impl AppState {
    pub fn new(registry: Registry, catalog: Catalog) -> Self {
        let delivery = Delivery::new(&registry);
        Self {
            registry,
            delivery,
            catalog: Arc::new(catalog),
            keepalive: KEEPALIVE_INTERVAL,
        }
    }

    // ping interval for websocket clients, silence for twice as long drops them
    pub fn with_keepalive(mut self, keepalive: Duration) -> Self {
        self.keepalive = keepalive;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/clients", get(clients))
        .route("/files", get(files))
        .route("/files/{name}", get(download))
        .route("/send/{client_id}", post(send_message))
        .route("/play/{client_id}", post(play_sound))
        .route("/restart/{client_id}", post(restart))
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    error_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlayForm {
    filename: String,
}

async fn index(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Html<String> {
    let clients = state.registry.list_ids().await;
    let clients: Vec<String> = clients.iter().map(|c| c.to_string()).collect();
    Html(render_index(&clients, state.catalog.files(), query.error_msg.as_deref()))
}

async fn clients(State(state): State<AppState>) -> Json<Vec<ClientIdentity>> {
    Json(state.registry.list_ids().await.into_iter().collect())
}

async fn files(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.files().to_vec())
}

async fn download(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let Some(path) = state.catalog.path_of(&name) else {
        return (StatusCode::NOT_FOUND, "file not found").into_response()
    };

    match tokio::fs::read(&path).await {
        Ok(body) => ([(header::CONTENT_TYPE, "application/octet-stream")], body).into_response(),
        Err(e) => {
            warn!("Unable to read {:?}: {}", &path, e);
            (StatusCode::NOT_FOUND, "file not found").into_response()
        }
    }
}

async fn send_message(State(state): State<AppState>, Path(client_id): Path<String>, body: String) -> Redirect {
    info!("Sending message to client {}", client_id);
    redirect(state.delivery.broadcast(&client_id.into(), body).await)
}

async fn play_sound(State(state): State<AppState>, Path(client_id): Path<String>,
                    Form(form): Form<PlayForm>) -> Redirect {
    if !state.catalog.contains(&form.filename) {
        return Redirect::to(FILE_NOT_FOUND)
    }

    info!("Playing {} on client {}", form.filename, client_id);
    redirect(state.delivery.play_sound(&client_id.into(), form.filename).await)
}

async fn restart(State(state): State<AppState>, Path(client_id): Path<String>) -> Redirect {
    info!("Restarting client {}", client_id);
    redirect(state.delivery.restart(&client_id.into()).await)
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let handler = ClientHandler::new(state.registry.clone(), Arc::clone(&state.catalog), state.keepalive);
    ws.on_upgrade(move |socket| handler.run(socket))
}

fn redirect(res: Result<(), RouteError>) -> Redirect {
    match res {
        Ok(()) => Redirect::to("/"),
        Err(e) => {
            warn!("{}", e);
            Redirect::to(CLIENT_NOT_FOUND)
        }
    }
}

fn render_index(clients: &[String], files: &[String], error_msg: Option<&str>) -> String {
    let mut page = String::from("<!doctype html>\n<html><head><title>Jukebox</title></head><body>\n<h1>Jukebox</h1>\n");

    if let Some(msg) = error_msg {
        page.push_str(&format!("<p class=\"error\">{}</p>\n", escape(msg)));
    }

    if clients.is_empty() {
        page.push_str("<p>No clients connected</p>\n");
    }

    for client in clients {
        let c = escape(client);
        page.push_str(&format!("<h2>{c}</h2>\n"));
        page.push_str(&format!("<form method=\"post\" action=\"/play/{c}\"><select name=\"filename\">"));
        for file in files {
            let f = escape(file);
            page.push_str(&format!("<option value=\"{f}\">{f}</option>"));
        }
        page.push_str("</select><button>Play</button></form>\n");
        page.push_str(&format!("<form method=\"post\" action=\"/restart/{c}\"><button>Restart</button></form>\n"));
    }

    page.push_str("<h2>Files</h2>\n<ul>\n");
    for file in files {
        let f = escape(file);
        page.push_str(&format!("<li><a href=\"/files/{f}\">{f}</a></li>\n"));
    }
    page.push_str("</ul>\n</body></html>\n");
    page
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
