//! noteful-seed - load demo data
//!
//! Creates a demo account with a few folders, tags and notes in the database
//! named by `DATABASE_URL`. Does nothing if the account already exists.
//!
//! Environment variables:
//!   DATABASE_URL   - target database (default: "postgres://localhost/noteful")
//!   SEED_USERNAME  - demo account name (default: "demo")
//!   SEED_PASSWORD  - demo account password (default: "password123")

use anyhow::Context;
use tracing::info;

use noteful_api::config::ServerConfig;
use noteful_api::password::hash_password_async;
use noteful_db::{CreateNoteRequest, Database, NewUser};

const FOLDERS: [&str; 4] = ["Archive", "Drafts", "Personal", "Work"];
const TAGS: [&str; 3] = ["breed", "hybrid", "domestic"];

/// (title, content, folder index, tag indexes)
const NOTES: [(&str, &str, Option<usize>, &[usize]); 5] = [
    (
        "5 life lessons learned from cats",
        "Lorem ipsum dolor sit amet, consectetur adipiscing elit.",
        Some(2),
        &[0],
    ),
    (
        "What the government doesn't want you to know about cats",
        "Posuere sollicitudin aliquam ultrices sagittis orci.",
        Some(1),
        &[0, 1],
    ),
    (
        "The most boring article about cats you'll ever read",
        "Id aliquet risus feugiat in ante metus dictum at tempor.",
        Some(0),
        &[2],
    ),
    (
        "7 things Lady Gaga has in common with cats",
        "Ac tortor dignissim convallis aenean et tortor.",
        None,
        &[],
    ),
    (
        "10 ways cats can help you live to 100",
        "Tempor orci dapibus ultrices in iaculis nunc sed augue lacus.",
        Some(3),
        &[1, 2],
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "noteful_seed=info,noteful_db=info".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    let username = std::env::var("SEED_USERNAME").unwrap_or_else(|_| "demo".to_string());
    let password = std::env::var("SEED_PASSWORD").unwrap_or_else(|_| "password123".to_string());

    let db = Database::connect_with_config(&config.database_url, config.pool_config())
        .await
        .context("connecting to database")?;
    db.migrate().await.context("running migrations")?;

    if db.users.find_by_username(&username).await?.is_some() {
        info!(username = %username, "Seed user already exists, nothing to do");
        return Ok(());
    }

    let user = db
        .users
        .create(NewUser {
            username: username.clone(),
            password_hash: hash_password_async(password).await?,
            fullname: Some("Demo User".to_string()),
        })
        .await?;

    let mut folder_ids = Vec::with_capacity(FOLDERS.len());
    for name in FOLDERS {
        folder_ids.push(db.folders.create(name, user.id).await?.id);
    }

    let mut tag_ids = Vec::with_capacity(TAGS.len());
    for name in TAGS {
        tag_ids.push(db.tags.create(name, user.id).await?.id);
    }

    for (title, content, folder, tags) in NOTES {
        db.notes
            .create(
                user.id,
                CreateNoteRequest {
                    title: title.to_string(),
                    content: Some(content.to_string()),
                    folder_id: folder.map(|i| folder_ids[i]),
                    tag_ids: tags.iter().map(|&i| tag_ids[i]).collect(),
                },
            )
            .await?;
    }

    info!(
        username = %username,
        user_id = %user.id,
        folders = folder_ids.len(),
        tags = tag_ids.len(),
        notes = NOTES.len(),
        backend = db.backend(),
        "Seed data inserted"
    );
    Ok(())
}
