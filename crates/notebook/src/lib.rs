//! `notebook` - A small note service and its remote client
//!
//! This library provides an in-memory note registry, a note service that
//! validates requests and publishes snapshots, an HTTP/WebSocket transport,
//! and a client that speaks it.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod note;
pub mod registry;
pub mod server;
pub mod service;

pub use api::{NoteApi, SnapshotStream};
pub use client::{Connection, ConnectionManager, NoteClient};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use note::{CreateNoteRequest, Note, UpdateNoteRequest};
pub use registry::{InMemoryNoteRegistry, NoteRepository};
pub use server::Server;
pub use service::NoteService;
