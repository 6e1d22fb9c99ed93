//! Command-line interface for notebook.
//!
//! This module provides the CLI structure, command arguments, and output
//! rendering for the `notebook` binary.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, CreateCommand, DeleteCommand, GetCommand, ListCommand, OutputFormat,
    SearchCommand, ServeCommand, UpdateCommand, WatchCommand,
};
pub use output::{render_note, render_notes, render_snapshot};

/// notebook - A small note service and its client
///
/// Run `notebook serve` to host notes in memory, then use the other commands
/// to create, read, update, delete, search, and watch them.
#[derive(Debug, Parser)]
#[command(name = "notebook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the note server in the foreground
    Serve(ServeCommand),

    /// Create a note
    Create(CreateCommand),

    /// Show a note
    Get(GetCommand),

    /// List all notes, newest first
    List(ListCommand),

    /// Change a note's title or content
    Update(UpdateCommand),

    /// Delete a note
    Delete(DeleteCommand),

    /// Search notes
    Search(SearchCommand),

    /// Print every snapshot of the notes as it changes
    Watch(WatchCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}
