// Routine builder entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open database and restore the saved selection
// 4. Load the product catalog
// 5. Build the chat client
// 6. Create mpsc channels
// 7. Spawn app logic task
// 8. Run the TUI until the user quits
// 9. Cleanup on exit

use routine_builder::app;
use routine_builder::catalog::Catalog;
use routine_builder::chat::ChatClient;
use routine_builder::config;
use routine_builder::db::Database;
use routine_builder::selection::SelectionStore;
use routine_builder::tui;

use std::path::Path;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Routine builder starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!("Config loaded: catalog={}", config.catalog.path);

    // 3. Open database
    let db_path = config
        .storage
        .resolve_db_path()
        .context("failed to resolve database path")?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db_path = db_path.to_string_lossy().into_owned();
    let db = Database::open(&db_path).context("failed to open database")?;
    info!("Database opened at {}", db_path);

    let selection = SelectionStore::open(Box::new(db), config.storage.selection_key.clone());
    info!("Restored {} selected products", selection.len());

    // 4. Load the catalog
    let catalog = Catalog::load(Path::new(&config.catalog.path))
        .context("failed to load product catalog")?;
    info!(
        "Loaded {} products in {} categories",
        catalog.len(),
        catalog.categories().len()
    );

    // 5. Chat client
    let chat_client = ChatClient::from_config(&config);
    match &chat_client {
        ChatClient::Active(client) => info!(
            "Chat client initialized (streaming: {})",
            client.streaming()
        ),
        ChatClient::Disabled => info!("Chat client disabled (no endpoint configured)"),
    }

    // 6. Channels
    let (chat_tx, chat_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_state = app::AppState::new(catalog, selection, chat_client, chat_tx);

    // 7. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(chat_rx, cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 8. Run the TUI event loop until the user presses 'q' or Ctrl+C.
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    // 9. Cleanup: wait for the app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Routine builder shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (the terminal belongs to the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("routine-builder.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("routine_builder=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
