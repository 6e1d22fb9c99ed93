//! Network transport for the note service.
//!
//! [`Server`] binds a TCP listener, serves the routes from [`routes`], and
//! shuts down gracefully when asked or dropped.

pub mod error;
pub mod extract;
pub mod routes;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::{Config, ServerConfig};
use crate::error::{Error, Result};
use crate::registry::InMemoryNoteRegistry;
use crate::service::NoteService;

pub use error::{ApiError, ErrorResponse};
pub use routes::router;

/// A running note server.
#[derive(Debug)]
pub struct Server {
    addr: SocketAddr,
    service: Arc<NoteService>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl Server {
    /// Build a registry and service from `config` and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(config: &Config) -> Result<Self> {
        let registry = Arc::new(InMemoryNoteRegistry::bounded(config.registry.capacity()));
        let service = Arc::new(NoteService::new(registry));
        Self::bind(&config.server, service).await
    }

    /// Start serving `service` on the address in `config`.
    ///
    /// Port 0 binds a free port; see [`Server::addr`].
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn bind(config: &ServerConfig, service: Arc<NoteService>) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_address()).await?;
        let addr = listener.local_addr()?;
        let app = router(Arc::clone(&service), config);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!("Note server listening on {}{}", addr, config.endpoint);
        Ok(Self {
            addr,
            service,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// The bound address.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The service behind the routes.
    #[must_use]
    pub fn service(&self) -> &Arc<NoteService> {
        &self.service
    }

    /// Ask the server to stop accepting connections.
    ///
    /// Calling this more than once is harmless.
    pub fn shutdown(&mut self) {
        if let Some(sender) = self.shutdown.take() {
            debug!("Signalling note server shutdown");
            let _ = sender.send(());
        }
    }

    /// Serve until `signal` resolves, then shut down and wait for the server
    /// task to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the server task failed.
    pub async fn run_until(mut self, signal: impl Future<Output = ()>) -> Result<()> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        tokio::pin!(task);

        tokio::select! {
            () = signal => {
                info!("Shutting down note server");
                self.shutdown();
                finish(task.await)
            }
            result = &mut task => finish(result),
        }
    }
}

fn finish(
    joined: std::result::Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<()> {
    match joined {
        Ok(result) => result.map_err(Error::from),
        Err(err) => Err(Error::internal(format!("server task failed: {err}"))),
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::DEFAULT_ENDPOINT;

    fn test_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            ..ServerConfig::default()
        }
    }

    async fn start() -> Server {
        crate::logging::init_test_logging();
        let service = Arc::new(NoteService::new(Arc::new(InMemoryNoteRegistry::new())));
        Server::bind(&test_config(), service).await.expect("bind")
    }

    #[tokio::test]
    async fn test_binds_free_port() {
        let mut server = start().await;
        assert_ne!(server.addr().port(), 0);
        server.shutdown();
    }

    #[tokio::test]
    async fn test_health_and_service_header() {
        let server = start().await;
        let response = reqwest::get(format!("http://{}/health", server.addr()))
            .await
            .unwrap();

        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("x-service").unwrap(),
            "notebook"
        );
        assert_eq!(response.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_invalid_note_returns_error_body() {
        let server = start().await;
        let response = reqwest::Client::new()
            .post(format!("http://{}/api/notes/create", server.addr()))
            .json(&serde_json::json!({ "title": "", "content": "x" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let body: ErrorResponse = response.json().await.unwrap();
        assert_eq!(body.error, "invalid_note");
        assert!(body.timestamp > 0);
    }

    #[tokio::test]
    async fn test_update_missing_returns_404() {
        let server = start().await;
        let response = reqwest::Client::new()
            .post(format!("http://{}/api/notes/update", server.addr()))
            .json(&serde_json::json!({ "id": "missing", "title": "T" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 404);
        let body: ErrorResponse = response.json().await.unwrap();
        assert_eq!(body.error, "not_found");
        assert_eq!(body.message.as_deref(), Some("missing"));
    }

    #[tokio::test]
    async fn test_get_missing_returns_null() {
        let server = start().await;
        let response = reqwest::Client::new()
            .post(format!("http://{}/api/notes/get", server.addr()))
            .json(&serde_json::json!({ "id": "missing" }))
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "null");
    }

    #[tokio::test]
    async fn test_run_until_stops_on_signal() {
        let server = start().await;
        let result = server.run_until(async {}).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_malformed_body_returns_error_body() {
        let server = start().await;
        let response = reqwest::Client::new()
            .post(format!("http://{}/api/notes/get", server.addr()))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        assert_eq!(response.headers().get("x-service").unwrap(), "notebook");
        let body: ErrorResponse = response.json().await.unwrap();
        assert_eq!(body.error, error::CODE_INVALID_REQUEST);
        assert!(body.message.is_some());
    }

    #[tokio::test]
    async fn test_mistyped_body_returns_error_body() {
        let server = start().await;
        let response = reqwest::Client::new()
            .post(format!("http://{}/api/notes/search", server.addr()))
            .json(&serde_json::json!({ "query": 42 }))
            .send()
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        let body: ErrorResponse = response.json().await.unwrap();
        assert_eq!(body.error, error::CODE_INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_snapshot_socket_sends_pings() {
        use futures_util::StreamExt;
        use tokio_tungstenite::tungstenite::Message;

        let config = ServerConfig {
            keepalive_ms: 50,
            ..test_config()
        };
        let service = Arc::new(NoteService::new(Arc::new(InMemoryNoteRegistry::new())));
        let server = Server::bind(&config, service).await.unwrap();

        let url = format!("ws://{}/api/notes/stream", server.addr());
        let (mut socket, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();

        let pinged = tokio::time::timeout(std::time::Duration::from_secs(2), async {
            while let Some(Ok(message)) = socket.next().await {
                if matches!(message, Message::Ping(_)) {
                    return true;
                }
            }
            false
        })
        .await
        .unwrap();
        assert!(pinged);
    }

    #[tokio::test]
    async fn test_start_from_config() {
        let mut config = Config::default();
        config.server.port = 0;

        let mut server = Server::start(&config).await.unwrap();
        assert_ne!(server.addr().port(), 0);
        server.shutdown();
    }

    #[tokio::test]
    async fn test_configured_capacity_evicts_oldest() {
        use crate::api::NoteApi;
        use crate::client::NoteClient;
        use crate::config::ClientConfig;
        use crate::note::CreateNoteRequest;

        let mut config = Config::default();
        config.server.port = 0;
        config.registry.max_notes = 2;
        let server = Server::start(&config).await.unwrap();

        let client = NoteClient::new(&ClientConfig {
            host: "127.0.0.1".to_string(),
            port: server.addr().port(),
            ..ClientConfig::default()
        })
        .unwrap();

        let mut ids = Vec::new();
        for title in ["first", "second", "third"] {
            let note = client
                .create_note(CreateNoteRequest::new(title, None))
                .await
                .unwrap();
            ids.push(note.id);
            // Distinct timestamps so "oldest" is unambiguous.
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let notes = client.get_all_notes().await.unwrap();
        let titles: Vec<_> = notes.iter().filter_map(|n| n.title.as_deref()).collect();
        assert_eq!(titles, vec!["third", "second"]);
        assert!(client.get_note_by_id(&ids[0]).await.unwrap().is_none());
    }
}
