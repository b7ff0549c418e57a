//! Earthie command-line driver.
//!
//! Wires configuration into the feature services: compose and submit a
//! lobbyist post, upload images into the post bucket, or fetch a static map
//! preview to disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use earthie_backend::{PostType, RestBackend, Session, SharedBackend, UserProfile};
use earthie_common::Config;
use earthie_core::{
    MapPreview, MapState, PostComposer, PostDraft, SubLobby, UploadFile, UploadService,
    map_preview::{self, Coordinates},
};

#[derive(Parser, Debug)]
#[command(name = "earthie", about = "Earthie hub lobbyist tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose and submit a lobbyist post.
    Post(PostArgs),
    /// Upload images into the post bucket and print their public URLs.
    Upload(UploadArgs),
    /// Fetch a static map preview image and write it to disk.
    Map(MapArgs),
}

#[derive(Args, Debug)]
struct PostArgs {
    /// Post title (at most 140 characters; longer input is truncated).
    #[arg(long)]
    title: String,

    /// Post body.
    #[arg(long)]
    content: String,

    /// Post type: text, image, trade, poll, dev_diary, raid, showcase.
    #[arg(long, default_value = "text")]
    post_type: String,

    /// Sub-lobby id to file the post under (sl1..sl5).
    #[arg(long)]
    sub_lobby: Option<String>,

    /// Tag to attach; repeatable.
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Image file to upload and attach; repeatable.
    #[arg(long = "image")]
    images: Vec<PathBuf>,

    /// Already-hosted image URL to attach; repeatable.
    #[arg(long = "image-url")]
    image_urls: Vec<String>,

    /// Mark the post private.
    #[arg(long)]
    private: bool,

    /// Restrict the post to followers.
    #[arg(long)]
    followers_only: bool,
}

#[derive(Args, Debug)]
struct UploadArgs {
    /// Files to upload, in order.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct MapArgs {
    /// Longitude in degrees.
    #[arg(long, allow_negative_numbers = true)]
    longitude: f64,

    /// Latitude in degrees.
    #[arg(long, allow_negative_numbers = true)]
    latitude: f64,

    /// Zoom level, clamped to 1..=20.
    #[arg(long, default_value_t = map_preview::DEFAULT_ZOOM)]
    zoom: u8,

    /// Location name used in the image caption.
    #[arg(long, default_value = "selected property")]
    location: String,

    /// Output file.
    #[arg(long, default_value = "map.png")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "earthie=debug,info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Command::Post(args) => run_post(&config, args).await,
        Command::Upload(args) => run_upload(&config, &args.files).await,
        Command::Map(args) => run_map(&config, args).await,
    }
}

async fn run_post(config: &Config, args: PostArgs) -> anyhow::Result<()> {
    let backend = connect(config)?;
    let mut composer = PostComposer::new(backend, config.storage.bucket.clone(), viewer_from(config));

    composer.open();
    composer.set_title(&args.title);
    composer.set_content(args.content);

    let post_type = PostType::from_id(&args.post_type)
        .with_context(|| format!("Unknown post type '{}'", args.post_type))?;
    composer.set_post_type(post_type);

    if let Some(sub_lobby) = args.sub_lobby {
        match SubLobby::find(&sub_lobby) {
            Some(lobby) => info!(sub_lobby = lobby.id, name = lobby.name, "Filing under sub-lobby"),
            None => info!(sub_lobby = %sub_lobby, "Filing under unlisted sub-lobby"),
        }
        composer.set_sub_lobby(Some(sub_lobby));
    }

    for tag in &args.tags {
        composer.add_tag(tag);
    }
    for url in args.image_urls {
        composer.add_image_url(url);
    }
    composer.set_private(args.private);
    composer.set_followers_only(args.followers_only);

    if !args.images.is_empty() {
        let files = read_upload_files(&args.images).await?;
        let appended = composer.upload_images(&files).await?;
        info!(appended, "Uploaded post images");
    }

    let post = composer.submit().await?;
    println!("{}", serde_json::to_string_pretty(&post)?);
    Ok(())
}

async fn run_upload(config: &Config, paths: &[PathBuf]) -> anyhow::Result<()> {
    let backend = connect(config)?;
    let service = UploadService::new(backend, config.storage.bucket.clone());

    let files = read_upload_files(paths).await?;
    let mut draft = PostDraft::default();
    service.upload_to_draft(&mut draft, &files).await?;

    for url in &draft.image_urls {
        println!("{url}");
    }
    Ok(())
}

async fn run_map(config: &Config, args: MapArgs) -> anyhow::Result<()> {
    let coordinates = Coordinates {
        longitude: args.longitude,
        latitude: args.latitude,
    };
    let mut preview =
        MapPreview::new(config.map.access(), Some(coordinates), args.location).with_zoom(args.zoom);

    if preview.state() == MapState::MissingToken {
        anyhow::bail!(
            "{}. {}",
            map_preview::MISSING_TOKEN_MESSAGE,
            MapPreview::missing_token_detail()
        );
    }

    info!(
        longitude = args.longitude,
        latitude = args.latitude,
        zoom = preview.zoom(),
        "Fetching static map"
    );

    let bytes = match preview.load().await {
        Ok(bytes) => bytes,
        Err(e) => {
            if let Some(panel) = preview.error_panel() {
                eprintln!("{}: {}", panel.title, panel.message);
                eprintln!("{}: {}", panel.link_label, panel.link_url);
            }
            return Err(e.into());
        }
    };

    tokio::fs::write(&args.output, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "{} ({} bytes) - {}",
        args.output.display(),
        bytes.len(),
        preview.alt_text()
    );
    if let Some(label) = preview.coordinate_label() {
        println!("{label}");
    }
    Ok(())
}

/// Build the REST backend, holding a session when the config carries one.
fn connect(config: &Config) -> anyhow::Result<SharedBackend> {
    let backend = match session_from(config) {
        Some(session) => RestBackend::with_session(config.backend.clone(), session)?,
        None => RestBackend::new(config.backend.clone())?,
    };
    Ok(Arc::new(backend))
}

/// A pre-issued session from the auth config, when both parts are present.
fn session_from(config: &Config) -> Option<Session> {
    match (&config.auth.access_token, &config.auth.user_id) {
        (Some(token), Some(user_id)) => Some(Session::new(token.clone(), user_id.clone())),
        _ => None,
    }
}

/// The viewer identity from the auth config, when a user id is present.
fn viewer_from(config: &Config) -> Option<UserProfile> {
    config.auth.user_id.as_ref().map(|id| UserProfile {
        id: id.clone(),
        name: config.auth.display_name.clone(),
        username: config.auth.username.clone(),
        avatar: config.auth.avatar_url.clone(),
    })
}

/// Read files from disk into upload inputs, guessing MIME types from names.
async fn read_upload_files(paths: &[PathBuf]) -> anyhow::Result<Vec<UploadFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(UploadFile::new(file_name(path), data));
    }
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
