//! `notebook` - CLI for the note service
//!
//! This binary runs the note server and drives it through the client.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use clap::Parser;
use futures_util::StreamExt;

use notebook::cli::{self, Cli, Command, ConfigCommand, OutputFormat};
use notebook::{init_logging, Config, ConnectionManager, NoteApi, Server};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> CliResult {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Serve(cmd) => {
            cmd.apply(&mut config.server);
            handle_serve(&config).await
        }
        Command::Config(cmd) => handle_config(&config, cmd),
        command => {
            let manager = ConnectionManager::new(config.client.clone());
            handle_note_command(&manager, command).await
        }
    }
}

async fn handle_serve(config: &Config) -> CliResult {
    let server = Server::start(config).await?;
    println!(
        "Serving notes on http://{}{}",
        server.addr(),
        config.server.endpoint
    );
    println!("Press Ctrl-C to stop.");

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

async fn handle_note_command(manager: &ConnectionManager, command: Command) -> CliResult {
    let connection = manager.connect().await?;

    match command {
        Command::Create(cmd) => {
            let note = connection.create_note(cmd.request()).await?;
            println!("{}", cli::render_note(&note, cmd.format)?);
        }
        Command::Get(cmd) => match connection.get_note_by_id(&cmd.id).await? {
            Some(note) => println!("{}", cli::render_note(&note, cmd.format)?),
            None if cmd.format == OutputFormat::Json => println!("null"),
            None => println!("No note with id {}", cmd.id),
        },
        Command::List(cmd) => {
            let notes = connection.get_all_notes().await?;
            println!("{}", cli::render_notes(&notes, cmd.format)?);
        }
        Command::Update(cmd) => {
            let note = connection.update_note(&cmd.id, cmd.request()).await?;
            println!("{}", cli::render_note(&note, cmd.format)?);
        }
        Command::Delete(cmd) => {
            if connection.delete_note(&cmd.id).await? {
                println!("Deleted {}", cmd.id);
            } else {
                println!("No note with id {}", cmd.id);
            }
        }
        Command::Search(cmd) => {
            let notes = connection.search_notes(&cmd.query).await?;
            println!("{}", cli::render_notes(&notes, cmd.format)?);
        }
        Command::Watch(cmd) => {
            let mut snapshots = connection.subscribe().await?;
            loop {
                tokio::select! {
                    snapshot = snapshots.next() => match snapshot {
                        Some(notes) => println!("{}", cli::render_snapshot(&notes, cmd.format)?),
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        Command::Serve(_) | Command::Config(_) => {
            return Err("command does not use a server connection".into());
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> CliResult {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Bind address:       {}", config.server.bind_address());
                println!("  Endpoint:           {}", config.server.endpoint);
                println!();
                println!("[Registry]");
                match config.registry.capacity() {
                    Some(max) => println!("  Max notes:          {max}"),
                    None => println!("  Max notes:          unlimited"),
                }
                println!();
                println!("[Client]");
                println!("  Server URL:         {}", config.client.base_url());
                println!("  Endpoint:           {}", config.client.endpoint);
                println!(
                    "  Request timeout:    {} ms",
                    config.client.request_timeout_ms
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
