//! medialib CLI: command-line client for the media library API.
//!
//! Reads MEDIALIB_API_URL and MEDIALIB_TOKEN (see `ClientConfig`). `login` prints a token to
//! export for subsequent commands.

use anyhow::Context;
use clap::{Parser, Subcommand};
use medialib_api_client::ApiClient;
use medialib_cli::{
    render_media_table, render_notification, render_stats, to_pretty_json, OutputFormat,
};
use medialib_client::{init_tracing, LibraryController, Notifier, PlaybackPhase, SessionProvider};
use medialib_core::models::{
    Credentials, MediaId, ProfileUpdate, Registration, UploadFile, UploadMetadata, User,
};
use medialib_core::{ClientConfig, Session};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "medialib", about = "Media library API CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and print the access token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Create an account and sign in with it
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Show the signed-in user
    Me,
    /// Update the signed-in user's profile
    Profile {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Replace the profile picture
    Avatar {
        /// Path to an image file
        file: PathBuf,
    },
    /// List the first page of media
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Search media by filename, tags or description
    Search {
        query: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show status counts for the first page of media
    Stats {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Upload one or more files with shared metadata
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Genre (video and audio only)
        #[arg(long)]
        genre: Option<String>,
    },
    /// Show one media item with its metadata
    Show { id: MediaId },
    /// Edit filename, description, tags or genre
    Edit {
        id: MediaId,
        #[arg(long)]
        filename: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        genre: Option<String>,
    },
    /// Delete a media item
    Delete {
        id: MediaId,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Resolve a video stream, optionally switching quality
    Play {
        id: MediaId,
        #[arg(long)]
        quality: Option<String>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", to_pretty_json(value).context("Serialize response")?);
    Ok(())
}

async fn require_user(accounts: &SessionProvider) -> anyhow::Result<User> {
    accounts
        .restore()
        .await?
        .context("Not signed in. Run `medialib login` and export MEDIALIB_TOKEN")
}

async fn run(
    command: Commands,
    accounts: &SessionProvider,
    library: &LibraryController,
) -> anyhow::Result<()> {
    match command {
        Commands::Login { username, password } => {
            let user = accounts.login(&Credentials { username, password }).await?;
            print_json(&serde_json::json!({
                "access_token": accounts.session().token(),
                "user": user,
            }))?;
        }
        Commands::Logout => {
            accounts.logout().await;
            print_json(&serde_json::json!({ "message": "Logged out" }))?;
        }
        Commands::Register {
            full_name,
            username,
            email,
            password,
            confirm_password,
            description,
        } => {
            let user = accounts
                .register(Registration {
                    full_name,
                    username,
                    email,
                    password,
                    confirm_password,
                    description,
                })
                .await?;
            print_json(&serde_json::json!({
                "access_token": accounts.session().token(),
                "user": user,
            }))?;
        }
        Commands::Me => {
            let user = require_user(accounts).await?;
            print_json(&user)?;
        }
        Commands::Profile {
            full_name,
            description,
            password,
        } => {
            let user = require_user(accounts).await?;
            let update = ProfileUpdate::from_changes(
                &user,
                full_name.as_deref().unwrap_or(&user.full_name),
                description
                    .as_deref()
                    .unwrap_or(user.description.as_deref().unwrap_or("")),
                password.as_deref().unwrap_or(""),
            );
            let user = accounts.update_profile(update).await?;
            print_json(&user)?;
        }
        Commands::Avatar { file } => {
            require_user(accounts).await?;
            let file = UploadFile::from_path(&file)?;
            let user = accounts.upload_profile_picture(&file).await?;
            print_json(&user)?;
        }
        Commands::List { format } => {
            library.load(None).await?;
            print_items(library, format)?;
        }
        Commands::Search { query, format } => {
            library.search(&query).await?;
            print_items(library, format)?;
        }
        Commands::Stats { format } => {
            library.load(None).await?;
            match format {
                OutputFormat::Json => print_json(&library.stats())?,
                OutputFormat::Table => print!("{}", render_stats(&library.stats())),
            }
        }
        Commands::Upload {
            files,
            description,
            tags,
            genre,
        } => {
            let files = files
                .iter()
                .map(UploadFile::from_path)
                .collect::<Result<Vec<_>, _>>()?;
            let metadata = UploadMetadata {
                description,
                tags,
                genre,
            };
            let count = library.upload(files, metadata).await?;
            print_json(&serde_json::json!({ "uploaded": count, "media": library.items() }))?;
        }
        Commands::Show { id } => {
            let item = library.open(id).await?;
            print_json(&serde_json::json!({
                "detail": item.detail,
                "playback": item.playback.map(|p| p.state()),
            }))?;
        }
        Commands::Edit {
            id,
            filename,
            description,
            tags,
            genre,
        } => {
            library.open(id).await?;
            let mut form = library.begin_edit(id)?;
            if let Some(filename) = filename {
                form.filename = filename;
            }
            if let Some(description) = description {
                form.description = description;
            }
            if let Some(tags) = tags {
                form.tags = tags;
            }
            if let Some(genre) = genre {
                form.genre = genre;
            }
            let updated = library.edit(id, &form).await?;
            print_json(&updated)?;
        }
        Commands::Delete { id, yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete media {} without --yes", id);
            }
            library.delete(id).await?;
            print_json(&serde_json::json!({
                "success": true,
                "message": format!("Media {} deleted", id),
            }))?;
        }
        Commands::Play { id, quality } => {
            let item = library.open(id).await?;
            let playback = item
                .playback
                .with_context(|| format!("Media {} is not a video", id))?;
            if let Some(quality) = quality {
                playback.select_quality(&quality).await?;
            }
            let state = playback.state();
            if let PlaybackPhase::Error { message, .. } = &state.phase {
                anyhow::bail!("{}", message);
            }
            print_json(&serde_json::json!({
                "qualities": playback.qualities(),
                "state": state,
            }))?;
        }
    }
    Ok(())
}

fn print_items(library: &LibraryController, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&library.items()),
        OutputFormat::Table => {
            print!("{}", render_media_table(&library.items()));
            Ok(())
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ClientConfig::from_env()
        .context("Invalid configuration. Check the MEDIALIB_* environment variables")?;
    init_tracing(config.log_format)?;

    let session = Arc::new(match &config.token {
        Some(token) => Session::with_token(token.clone()),
        None => Session::new(),
    });
    let api = Arc::new(
        ApiClient::from_config(&config, session.clone()).context("Failed to create API client")?,
    );
    let notifier = Notifier::new();
    let accounts = SessionProvider::new(api.clone(), session, notifier.clone());
    let library = LibraryController::from_config(api, notifier.clone(), &config);

    let result = run(cli.command, &accounts, &library).await;
    if let Some(notification) = notifier.current() {
        eprintln!("{}", render_notification(&notification));
    }
    result
}
