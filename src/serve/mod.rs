// src/serve/mod.rs

//! Development server.
//!
//! - [`server`] owns the watch-session server state: a static file server
//!   over the destination root and the reload control channel on port+1.
//! - [`reload`] defines the notification payloads and the browser client
//!   helper.

pub mod reload;
pub mod server;

pub use reload::{ReloadMessage, client_script};
pub use server::ServerSession;
