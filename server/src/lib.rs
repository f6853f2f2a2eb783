// types
pub mod server_types;

// connection registry and routing
pub mod registry;
pub mod delivery;

// media offered to clients
pub mod catalog;

// websocket lifecycle
pub mod client_handler;

// http
pub mod web;
pub mod server_listener;

pub mod config;
