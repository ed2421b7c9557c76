// src/serve/server.rs

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Result;
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::errors::PipelineError;
use crate::serve::reload::{ReloadMessage, client_script};

/// Process-wide server state for one watch session: the static file server
/// over the destination root, the reload control channel on port+1, and the
/// fan-out sender connected clients subscribe to.
///
/// Created when watch mode starts; torn down on drop (process exit).
#[derive(Debug)]
pub struct ServerSession {
    reload_tx: broadcast::Sender<ReloadMessage>,
    static_task: JoinHandle<()>,
    control_task: JoinHandle<()>,
}

#[derive(Clone)]
struct ControlState {
    reload_tx: broadcast::Sender<ReloadMessage>,
    control_port: u16,
}

impl ServerSession {
    /// Bind both listeners and start serving.
    ///
    /// A bind failure (e.g. port in use) is fatal to the watch command: it
    /// prevents every task from being observable, so the error propagates
    /// instead of being retried.
    pub async fn start(dest_root: &Path, port: u16) -> Result<Self> {
        let (reload_tx, _) = broadcast::channel::<ReloadMessage>(16);
        let control_port = port
            .checked_add(1)
            .ok_or_else(|| anyhow::anyhow!("port {port} leaves no room for the reload channel"))?;

        let static_addr = SocketAddr::from(([127, 0, 0, 1], port));
        let static_listener = bind(static_addr).await?;
        let static_app = Router::new()
            .fallback_service(ServeDir::new(dest_root))
            .layer(TraceLayer::new_for_http());

        let control_addr = SocketAddr::from(([127, 0, 0, 1], control_port));
        let control_listener = bind(control_addr).await?;
        let control_app = Router::new()
            .route("/reload", get(reload_socket))
            .route("/client.js", get(client_js))
            .with_state(ControlState {
                reload_tx: reload_tx.clone(),
                control_port,
            });

        info!("serving {:?} on http://{}", dest_root, static_addr);
        info!("reload channel on ws://{}/reload", control_addr);

        let static_task = tokio::spawn(async move {
            if let Err(err) = axum::serve(static_listener, static_app).await {
                warn!(error = %err, "static file server stopped");
            }
        });
        let control_task = tokio::spawn(async move {
            if let Err(err) = axum::serve(control_listener, control_app).await {
                warn!(error = %err, "reload channel stopped");
            }
        });

        Ok(Self {
            reload_tx,
            static_task,
            control_task,
        })
    }

    /// Sender the runtime uses to push notifications to connected clients.
    pub fn reload_tx(&self) -> broadcast::Sender<ReloadMessage> {
        self.reload_tx.clone()
    }
}

impl Drop for ServerSession {
    fn drop(&mut self) {
        self.static_task.abort();
        self.control_task.abort();
    }
}

async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| PipelineError::Bind { addr, source }.into())
}

async fn reload_socket(ws: WebSocketUpgrade, State(state): State<ControlState>) -> Response {
    ws.on_upgrade(move |socket| client_session(socket, state.reload_tx.subscribe()))
}

async fn client_js(State(state): State<ControlState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        client_script(state.control_port),
    )
}

/// Forward reload notifications to one connected client until either side
/// goes away.
async fn client_session(mut socket: WebSocket, mut rx: broadcast::Receiver<ReloadMessage>) {
    debug!("reload client connected");

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(_)) => {} // clients only listen; ignore anything sent
                Some(Err(_)) | None => break,
            },
            outgoing = rx.recv() => match outgoing {
                Ok(message) => {
                    let Ok(text) = serde_json::to_string(&message) else {
                        continue;
                    };
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "reload client lagged behind notifications");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    debug!("reload client disconnected");
}
