//! Remote access to a note server.
//!
//! [`NoteClient`] speaks the HTTP and WebSocket protocol of
//! [`crate::server`] and implements [`NoteApi`], so callers see the same
//! results and typed errors as with a local [`NoteService`](crate::NoteService).
//! Most code should go through a [`ConnectionManager`] instead of building
//! clients directly.

mod connection;

pub use connection::{Connection, ConnectionManager};

use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};

use crate::api::{NoteApi, SnapshotStream};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::note::{CreateNoteRequest, Note, UpdateNoteRequest};
use crate::server::routes::{
    DeleteResponse, IdParams, SearchParams, UpdateParams, ROUTE_CREATE, ROUTE_DELETE, ROUTE_GET,
    ROUTE_HEALTH, ROUTE_LIST, ROUTE_SEARCH, ROUTE_UPDATE,
};
use crate::server::ErrorResponse;

/// HTTP client for the note routes.
#[derive(Debug, Clone)]
pub struct NoteClient {
    http: reqwest::Client,
    base_url: String,
    notes_url: String,
    stream_url: String,
}

impl NoteClient {
    /// Build a client for the server described by `config`.
    ///
    /// No request is made; see [`NoteClient::health`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        let base_url = config.base_url();

        Ok(Self {
            http,
            notes_url: format!("{base_url}{}", config.endpoint),
            stream_url: config.stream_url(),
            base_url,
        })
    }

    /// The server's base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the server is up.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with a
    /// non-success status.
    pub async fn health(&self) -> Result<()> {
        let response = self
            .http
            .get(format!("{}{ROUTE_HEALTH}", self.base_url))
            .send()
            .await?;
        response.error_for_status()?;
        Ok(())
    }

    async fn call<P, R>(&self, route: &str, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{route}", self.notes_url);
        trace!("POST {}", url);

        let response = self.http.post(&url).json(params).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await?;
        debug!("{} answered {}: {}", url, status, body);
        Err(match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error) => Error::from_remote(status.as_u16(), &error.error, error.message),
            Err(_) => Error::Remote {
                status: status.as_u16(),
                code: Error::CODE_INTERNAL.to_string(),
                message: (!body.is_empty()).then_some(body),
            },
        })
    }
}

#[async_trait::async_trait]
impl NoteApi for NoteClient {
    async fn create_note(&self, request: CreateNoteRequest) -> Result<Note> {
        self.call(ROUTE_CREATE, &request).await
    }

    async fn get_note_by_id(&self, id: &str) -> Result<Option<Note>> {
        let params = IdParams { id: id.to_string() };
        self.call(ROUTE_GET, &params).await
    }

    async fn get_all_notes(&self) -> Result<Vec<Note>> {
        self.call(ROUTE_LIST, &serde_json::json!({})).await
    }

    async fn update_note(&self, id: &str, request: UpdateNoteRequest) -> Result<Note> {
        let params = UpdateParams {
            id: id.to_string(),
            request,
        };
        self.call(ROUTE_UPDATE, &params).await
    }

    async fn delete_note(&self, id: &str) -> Result<bool> {
        let params = IdParams { id: id.to_string() };
        let response: DeleteResponse = self.call(ROUTE_DELETE, &params).await?;
        Ok(response.deleted)
    }

    async fn search_notes(&self, query: &str) -> Result<Vec<Note>> {
        let params = SearchParams {
            query: query.to_string(),
        };
        self.call(ROUTE_SEARCH, &params).await
    }

    async fn subscribe(&self) -> Result<SnapshotStream> {
        let (socket, _) = tokio_tungstenite::connect_async(self.stream_url.as_str()).await?;
        debug!("Subscribed to {}", self.stream_url);

        let snapshots = futures_util::stream::unfold(socket, |mut socket| async move {
            loop {
                match socket.next().await? {
                    Ok(Message::Text(text)) => match serde_json::from_str::<Vec<Note>>(&text) {
                        Ok(notes) => return Some((notes, socket)),
                        Err(err) => warn!("Skipping undecodable snapshot: {}", err),
                    },
                    Ok(Message::Close(_)) => return None,
                    Ok(_) => {}
                    Err(err) => {
                        warn!("Snapshot stream failed: {}", err);
                        return None;
                    }
                }
            }
        });
        Ok(Box::pin(snapshots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::timeout;

    use crate::config::{ServerConfig, DEFAULT_ENDPOINT};
    use crate::registry::InMemoryNoteRegistry;
    use crate::server::Server;
    use crate::service::NoteService;

    async fn start_server() -> Server {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            ..ServerConfig::default()
        };
        let service = Arc::new(NoteService::new(Arc::new(InMemoryNoteRegistry::new())));
        Server::bind(&config, service).await.unwrap()
    }

    fn client_for(server: &Server) -> NoteClient {
        let config = ClientConfig {
            host: "127.0.0.1".to_string(),
            port: server.addr().port(),
            ..ClientConfig::default()
        };
        NoteClient::new(&config).unwrap()
    }

    async fn next_with(snapshots: &mut SnapshotStream, len: usize) -> Vec<Note> {
        while let Some(notes) = snapshots.next().await {
            if notes.len() == len {
                return notes;
            }
        }
        panic!("snapshot stream ended");
    }

    #[test]
    fn test_client_urls() {
        let client = NoteClient::new(&ClientConfig::default()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.notes_url, "http://localhost:8080/api/notes");
        assert_eq!(client.stream_url, "ws://localhost:8080/api/notes/stream");
    }

    #[tokio::test]
    async fn test_remote_crud() {
        let server = start_server().await;
        let client = client_for(&server);
        client.health().await.unwrap();

        let created = client
            .create_note(CreateNoteRequest::new("Shopping", Some("milk, eggs".to_string())))
            .await
            .unwrap();
        assert_eq!(created.title.as_deref(), Some("Shopping"));

        let fetched = client.get_note_by_id(&created.id).await.unwrap();
        assert_eq!(fetched, Some(created.clone()));

        let updated = client
            .update_note(
                &created.id,
                UpdateNoteRequest {
                    title: None,
                    content: Some("milk, eggs, bread".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title.as_deref(), Some("Shopping"));
        assert_eq!(updated.content.as_deref(), Some("milk, eggs, bread"));
        assert!(updated.last_modified > created.last_modified);

        let found = client.search_notes("BREAD").await.unwrap();
        assert_eq!(found.len(), 1);

        assert_eq!(client.get_all_notes().await.unwrap().len(), 1);
        assert!(client.delete_note(&created.id).await.unwrap());
        assert!(!client.delete_note(&created.id).await.unwrap());
        assert!(client.get_note_by_id(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remote_errors_are_typed() {
        let server = start_server().await;
        let client = client_for(&server);

        let err = client
            .create_note(CreateNoteRequest::new("   ", Some("x".to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidNote { .. }));

        let err = client.get_note_by_id("  ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { .. }));

        let err = client
            .update_note("missing", UpdateNoteRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { ref id } if id == "missing"));
    }

    #[tokio::test]
    async fn test_remote_subscribe_replays_latest() {
        let server = start_server().await;
        let client = client_for(&server);
        client
            .create_note(CreateNoteRequest::new("First", Some("one".to_string())))
            .await
            .unwrap();

        let mut snapshots = client.subscribe().await.unwrap();
        let first = timeout(Duration::from_secs(2), next_with(&mut snapshots, 1))
            .await
            .unwrap();
        assert_eq!(first[0].title.as_deref(), Some("First"));

        client
            .create_note(CreateNoteRequest::new("Second", Some("two".to_string())))
            .await
            .unwrap();
        let next = timeout(Duration::from_secs(2), next_with(&mut snapshots, 2))
            .await
            .unwrap();
        assert_eq!(next[0].title.as_deref(), Some("Second"));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let config = ClientConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            request_timeout_ms: 500,
            ..ClientConfig::default()
        };
        let client = NoteClient::new(&config).unwrap();
        assert!(matches!(client.health().await, Err(Error::Http(_))));
    }
}
