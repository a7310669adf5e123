mod app;
mod checklist;
mod components;
mod config;
mod error;
mod event;
mod handler;
mod remote;
mod tree;
mod tui;
mod ui;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::app::App;
use crate::checklist::Checklist;
use crate::config::{AppConfig, FilterConfig, GeneralConfig, LogConfig, RemoteConfig};
use crate::error::AppError;
use crate::event::{Event, EventHandler};
use crate::remote::cache::DocIdCache;
use crate::remote::client::DocumentClient;
use crate::remote::sync::{self, PersistenceObserver};
use crate::tree::{sample_checklist, FilterMode};
use crate::tui::{install_panic_hook, Tui};

/// A terminal checklist with live filtering and optional remote persistence.
#[derive(Parser, Debug)]
#[command(name = "ckl", version, about)]
struct Cli {
    /// Path to a config file (overrides the default locations)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Filter mode: "prune" removes non-matching items, "hide" flags them
    #[arg(long, value_name = "MODE")]
    filter_mode: Option<String>,

    /// Persist the checklist to the document store at this URL
    #[arg(long, value_name = "URL")]
    remote: Option<String>,

    /// Disable remote persistence even if configured
    #[arg(long, conflicts_with = "remote")]
    offline: bool,

    /// Write logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Disable mouse support
    #[arg(long)]
    no_mouse: bool,
}

impl Cli {
    /// Flags that were given, as a partial config layered over the files.
    fn overrides(&self) -> AppConfig {
        let remote_enabled = if self.offline {
            Some(false)
        } else if self.remote.is_some() {
            Some(true)
        } else {
            None
        };
        AppConfig {
            general: GeneralConfig {
                confirm_delete: None,
                mouse: self.no_mouse.then_some(false),
            },
            filter: FilterConfig {
                mode: self.filter_mode.clone(),
            },
            remote: RemoteConfig {
                enabled: remote_enabled,
                base_url: self.remote.clone(),
                ..Default::default()
            },
            log: LogConfig {
                file: self
                    .log_file
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
                level: None,
            },
        }
    }
}

/// Filter directive used when `RUST_LOG` is unset. Event targets are module
/// paths rooted at the binary crate's name.
fn default_log_directive(level: &str) -> String {
    format!("{}={}", env!("CARGO_CRATE_NAME"), level)
}

/// Install a file-backed subscriber. The terminal owns stdout and stderr
/// while the UI runs, so logs only ever go to a file.
fn init_tracing(path: &Path, level: &str) -> error::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_log_directive(level)),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn validate(config: &AppConfig) -> error::Result<()> {
    if let Some(mode) = &config.filter.mode {
        if FilterMode::parse(mode).is_none() {
            return Err(AppError::InvalidConfig(format!(
                "unknown filter mode {:?} (expected \"prune\" or \"hide\")",
                mode
            )));
        }
    }
    if config.remote_enabled() {
        reqwest::Url::parse(config.remote_url()).map_err(|e| {
            AppError::InvalidConfig(format!("remote URL {}: {}", config.remote_url(), e))
        })?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    validate(&config)?;

    if let Some(log_file) = config.log_file() {
        if let Err(e) = init_tracing(&log_file, config.log_level()) {
            eprintln!("Warning: logging disabled ({}): {}", log_file.display(), e);
        }
    }
    tracing::info!(
        mode = config.filter_mode().label(),
        remote = config.remote_enabled(),
        "starting checklist"
    );

    let remote = config.remote_enabled();
    let mut checklist = Checklist::new(sample_checklist(), config.filter_mode(), remote);

    let mut events = EventHandler::new(Duration::from_millis(50));

    if remote {
        let cache_path = config.cache_file().ok_or_else(|| {
            AppError::InvalidConfig(
                "no location for the document id cache; set [remote] cache_file".into(),
            )
        })?;
        let client = DocumentClient::new(
            config.remote_url(),
            config.api_key().map(str::to_string),
        );
        let cache = DocIdCache::new(cache_path);
        tracing::info!(
            url = client.base_url(),
            cache = %cache.path().display(),
            "remote persistence enabled"
        );
        let sync = sync::spawn(client, cache, events.sender());
        checklist.subscribe(Rc::new(RefCell::new(PersistenceObserver::new(sync.clone()))));
        sync.open(checklist.roots().to_vec());
    }

    let mut app = App::new(checklist, config.confirm_delete(), remote);

    install_panic_hook();
    let mut tui = Tui::new(config.mouse_enabled())?;

    loop {
        tui.draw(&mut app)?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse),
            Event::Tick => app.clear_expired_status(),
            Event::Resize(_, _) => {}
            Event::Remote(event) => app.handle_remote(event),
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    tracing::info!("exiting");
    Ok(())
}
