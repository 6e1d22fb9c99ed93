//! Connection handles.
//!
//! A [`ConnectionManager`] owns the client configuration and hands out
//! [`Connection`]s. Handles taken while another is alive share one
//! [`NoteClient`]; once the last handle is dropped the client goes with it
//! and the next [`ConnectionManager::connect`] checks the server again.

use std::ops::Deref;
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::NoteClient;
use crate::api::{NoteApi, SnapshotStream};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::note::{CreateNoteRequest, Note, UpdateNoteRequest};

/// Hands out shared connections to one note server.
#[derive(Debug)]
pub struct ConnectionManager {
    config: ClientConfig,
    active: Mutex<Weak<NoteClient>>,
}

impl ConnectionManager {
    /// Create a manager for the server described by `config`.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            active: Mutex::new(Weak::new()),
        }
    }

    /// The configuration connections are built from.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get a connection, reusing the live client if there is one.
    ///
    /// A new client is only handed out after the server answers its health
    /// check.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionFailed`] if the server cannot be reached.
    pub async fn connect(&self) -> Result<Connection> {
        let mut active = self.active.lock().await;
        if let Some(client) = active.upgrade() {
            debug!("Reusing connection to {}", client.base_url());
            return Ok(Connection { client });
        }

        let client = NoteClient::new(&self.config)?;
        client
            .health()
            .await
            .map_err(|err| Error::ConnectionFailed {
                url: client.base_url().to_string(),
                message: err.to_string(),
            })?;

        let client = Arc::new(client);
        *active = Arc::downgrade(&client);
        info!("Connected to note server at {}", client.base_url());
        Ok(Connection { client })
    }

    /// Whether any connection handed out by this manager is still alive.
    pub async fn is_connected(&self) -> bool {
        self.active.lock().await.strong_count() > 0
    }
}

/// A live connection. Clone it to share; drop every clone to disconnect.
#[derive(Debug, Clone)]
pub struct Connection {
    client: Arc<NoteClient>,
}

impl Connection {
    /// Whether `self` and `other` use the same underlying client.
    #[must_use]
    pub fn same_client(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.client, &other.client)
    }
}

impl Deref for Connection {
    type Target = NoteClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if Arc::strong_count(&self.client) == 1 {
            debug!("Releasing connection to {}", self.client.base_url());
        }
    }
}

#[async_trait::async_trait]
impl NoteApi for Connection {
    async fn create_note(&self, request: CreateNoteRequest) -> Result<Note> {
        self.client.create_note(request).await
    }

    async fn get_note_by_id(&self, id: &str) -> Result<Option<Note>> {
        self.client.get_note_by_id(id).await
    }

    async fn get_all_notes(&self) -> Result<Vec<Note>> {
        self.client.get_all_notes().await
    }

    async fn update_note(&self, id: &str, request: UpdateNoteRequest) -> Result<Note> {
        self.client.update_note(id, request).await
    }

    async fn delete_note(&self, id: &str) -> Result<bool> {
        self.client.delete_note(id).await
    }

    async fn search_notes(&self, query: &str) -> Result<Vec<Note>> {
        self.client.search_notes(query).await
    }

    async fn subscribe(&self) -> Result<SnapshotStream> {
        self.client.subscribe().await
    }
}
