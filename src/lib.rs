pub mod config;
pub mod models;
pub mod motion;
pub mod share;
pub mod stats;
pub mod store;
pub mod tracker;
pub mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use config::{AppConfig, MotionSourceKind, StoreBackend};
use motion::{InlineSource, MotionSource, SimulatedWalk, UnsupportedSource};
use store::{JsonFileStore, KeyValueStore, MemoryStore, PersistenceStore, SqliteStore};
use tracker::{
    commands::{dispatch, parse_command, Command, CommandOutput},
    TrackerController,
};

pub fn open_store(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.store {
        StoreBackend::Sqlite => {
            Arc::new(SqliteStore::new(config.data_dir.join("steptrack.sqlite3"))?)
        }
        StoreBackend::Json => Arc::new(JsonFileStore::new(config.data_dir.join("counters.json"))?),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

/// Builds the configured motion source. `stdin` samples are applied inline
/// by [`handle_host_line`], interleaved with the other commands.
pub fn motion_source(kind: MotionSourceKind) -> Box<dyn MotionSource> {
    match kind {
        MotionSourceKind::Stdin => Box::new(InlineSource),
        MotionSourceKind::Simulated => Box::new(SimulatedWalk::default()),
        MotionSourceKind::None => Box::new(UnsupportedSource),
    }
}

/// Runs one host input line. Returns `None` for lines that produce no
/// output: samples, and blank lines.
pub async fn handle_host_line(
    controller: &TrackerController,
    line: &str,
    motion: MotionSourceKind,
) -> Result<Option<CommandOutput>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let command = parse_command(line)?;
    if let Command::Sample(_) = command {
        if motion == MotionSourceKind::Stdin {
            dispatch(controller, command).await;
        } else {
            debug!("sample ignored: motion source is {motion:?}");
        }
        return Ok(None);
    }

    Ok(Some(dispatch(controller, command).await))
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config_dir = std::env::current_dir().context("failed to resolve working directory")?;
    let config = AppConfig::load(&config_dir)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?
        .block_on(serve(config))
}

/// Runs the tracker against stdin/stdout until EOF or Ctrl-C.
pub async fn serve(config: AppConfig) -> Result<()> {
    info!("steptrack starting up ({:?} store, {:?} motion)", config.store, config.motion);

    let store_config = config.clone();
    let backend = tokio::task::spawn_blocking(move || open_store(&store_config))
        .await
        .context("store setup task failed")??;
    let store = PersistenceStore::new(backend, config.tracker.default_sensitivity);
    let controller = TrackerController::open(config.tracker.clone(), store).await?;

    controller.attach_motion(motion_source(config.motion)).await?;

    if config.debug {
        let mut updates = controller.subscribe();
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let snapshot = updates.borrow_and_update().clone();
                match serde_json::to_string(&snapshot) {
                    Ok(json) => info!("snapshot {json}"),
                    Err(err) => warn!("failed to serialize snapshot: {err}"),
                }
            }
        });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                None
            }
        };
        let Some(line) = line else {
            break;
        };

        let output = match handle_host_line(&controller, &line, config.motion).await {
            Ok(Some(output)) => output,
            Ok(None) => continue,
            Err(err) => {
                warn!("{err}");
                continue;
            }
        };

        let mut json = serde_json::to_string(&output)?;
        json.push('\n');
        stdout.write_all(json.as_bytes()).await?;
        stdout.flush().await?;
    }

    controller.shutdown().await?;
    info!("steptrack shut down");
    Ok(())
}
