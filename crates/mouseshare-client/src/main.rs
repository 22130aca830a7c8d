//! MouseShare client entry point.
//!
//! Loads the config, wires the TCP connector, the touch injector and the
//! session view into a [`Session`], connects to the host, and runs until
//! Ctrl-C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()                 -- TOML settings, defaults on first run
//!  └─ Session::new()                -- TcpConnector + injector + SessionView
//!  └─ spawn_session()               -- one task owns all session state
//!       ├─ SessionCommand  (connect / disconnect / shutdown from here)
//!       └─ TransportEvent  (bytes from the host → pairing → input dispatch)
//!  └─ Ctrl-C                        -- shutdown, print final status
//! ```
//!
//! # Usage
//!
//! ```text
//! mouseshare-client --endpoint 192.168.1.10:5555 --code 123456
//! mouseshare-client --payload '{"ip":"192.168.1.10","port":"5555","code":"123456","app":"MouseShare"}'
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mouseshare_client::application::dispatch_input::TouchInjector;
use mouseshare_client::application::session::{spawn_session, Session, SessionObserver};
use mouseshare_client::infrastructure::{
    input_injection::select_injector,
    network::TcpConnector,
    storage::config::{self, ClientConfig, ConfigError},
    ui_bridge::{connect_to_host, disconnect_from_host, get_session_status, SessionView},
};
use mouseshare_core::PairingPayload;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Pairs with a MouseShare desktop host and replays its pointer input.
#[derive(Debug, Parser)]
#[command(name = "mouseshare-client", version)]
struct Cli {
    /// Host address as `host` or `host:port` (default port 5555).
    #[arg(long, env = "MOUSESHARE_ENDPOINT")]
    endpoint: Option<String>,

    /// Six-digit pairing code shown by the desktop host.
    #[arg(long, env = "MOUSESHARE_CODE")]
    code: Option<String>,

    /// Decoded QR payload text; replaces `--endpoint` and `--code`.
    #[arg(long, conflicts_with_all = ["endpoint", "code"])]
    payload: Option<String>,

    /// Config file to use instead of the platform default.
    #[arg(long, env = "MOUSESHARE_CONFIG")]
    config: Option<PathBuf>,

    /// Screen width reported to the host.
    #[arg(long)]
    width: Option<u32>,

    /// Screen height reported to the host.
    #[arg(long)]
    height: Option<u32>,

    /// Skip touch injection entirely (overrides `[injection] enabled`).
    #[arg(long)]
    no_inject: bool,
}

impl Cli {
    /// Resolves the endpoint and code from `--payload`, the flags, or the
    /// last endpoint stored in the config.
    fn target(&self, config: &ClientConfig) -> anyhow::Result<(String, String)> {
        if let Some(text) = &self.payload {
            let payload = PairingPayload::parse(text).context("invalid --payload")?;
            return Ok((payload.endpoint_string(), payload.code));
        }

        let Some(endpoint) = self
            .endpoint
            .clone()
            .or_else(|| config.connection.last_endpoint.clone())
        else {
            bail!("no host given: pass --endpoint or --payload");
        };
        let Some(code) = self.code.clone() else {
            bail!("no pairing code given: pass --code or --payload");
        };
        Ok((endpoint, code))
    }
}

fn load(cli: &Cli) -> anyhow::Result<(ClientConfig, Option<PathBuf>)> {
    let path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => match config::config_file_path() {
            Ok(path) => Some(path),
            Err(ConfigError::NoPlatformConfigDir) => None,
            Err(e) => return Err(e.into()),
        },
    };
    let cfg = match &path {
        Some(path) => config::load_config_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ClientConfig::default(),
    };
    Ok((cfg, path))
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (mut cfg, config_path) = load(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.client.log_level)),
        )
        .init();

    info!("MouseShare client starting");
    if config_path.is_none() {
        warn!("no platform config directory; using defaults");
    }

    if let Some(width) = cli.width {
        cfg.screen.width = width;
    }
    if let Some(height) = cli.height {
        cfg.screen.height = height;
    }
    let (endpoint, code) = cli.target(&cfg)?;

    // ── Session wiring ────────────────────────────────────────────────────────
    let injector = select_injector(cfg.injection.enabled && !cli.no_inject);
    if !injector.is_enabled() {
        warn!("touch injection disabled; input will only be logged");
    }
    let view = Arc::new(SessionView::new());
    let (session, events) = Session::new(
        cfg.session_config(),
        Arc::new(TcpConnector::new()),
        injector,
        Arc::clone(&view) as Arc<dyn SessionObserver>,
    );
    let (handle, task) = spawn_session(session, events);

    let result = connect_to_host(&handle, &endpoint, &code).await;
    if !result.success {
        handle.shutdown();
        let _ = task.await;
        bail!(
            "could not start session: {}",
            result.error.unwrap_or_default()
        );
    }

    cfg.connection.last_endpoint = Some(endpoint);
    if let Some(path) = &config_path {
        if let Err(e) = config::save_config_to(&cfg, path) {
            warn!("could not save config: {e}");
        }
    }

    // ── Run until Ctrl-C ──────────────────────────────────────────────────────
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    info!("shutdown signal received");

    disconnect_from_host(&handle);
    handle.shutdown();
    task.await.context("session task panicked")?;

    if let Some(status) = get_session_status(&view).data {
        info!(
            state = %status.state,
            last_error = status.last_error.as_deref().unwrap_or("none"),
            "MouseShare client stopped"
        );
    }
    Ok(())
}
