use clap::Parser;
use std::{
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;

use cityfeedback_core::{
    api::{self, AppState},
    clock::Zone,
    dashboard::Dashboard,
    latency::Latency,
    license::BroadcastNotifier,
    session::Credentials,
    store::{KeyValueStore, MemoryStore, SqliteStore},
};

const DEFAULT_PORT: u16 = 17800;
const IN_MEMORY_DB: &str = ":memory:";
const LICENSE_EVENT_BUFFER: usize = 16;

#[derive(Parser, Debug)]
#[command(name = "cityfeedback_core", version)]
struct Args {
    /// Listen address.
    ///
    /// Accepts:
    /// - ip:port (recommended), e.g. 127.0.0.1:17800
    /// - ip (implies port 17800), e.g. 127.0.0.1
    #[arg(long, default_value = "127.0.0.1:17800")]
    listen: String,

    /// SQLite database path. `:memory:` keeps everything in process memory.
    #[arg(long, default_value = "./data/cityfeedback.db")]
    db: PathBuf,

    /// Offset of the dashboard timezone from UTC, in minutes.
    #[arg(long, default_value_t = 3 * 60, allow_hyphen_values = true)]
    tz_offset_minutes: i32,

    /// Timezone label stored with schedules.
    #[arg(long, default_value = "Europe/Moscow")]
    tz_label: String,

    /// Short timezone suffix used in previews.
    #[arg(long, default_value = "МСК")]
    tz_abbreviation: String,

    #[arg(long, default_value = "admin")]
    username: String,

    #[arg(long, default_value = "admin123")]
    password: String,

    /// Fixed part of the simulated backend delay.
    #[arg(long, default_value_t = 350)]
    latency_ms: u64,

    /// Upper bound of the random extra delay.
    #[arg(long, default_value_t = 250)]
    jitter_ms: u64,
}

fn open_store(db: &Path) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    if db.as_os_str() == IN_MEMORY_DB {
        return Ok(Arc::new(MemoryStore::default()));
    }
    if let Some(parent) = db.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Arc::new(SqliteStore::open(db)?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cityfeedback_core=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    let store = open_store(&args.db)?;
    let license_events = Arc::new(BroadcastNotifier::new(LICENSE_EVENT_BUFFER));
    let zone = Zone::from_minutes(args.tz_offset_minutes, &args.tz_label, &args.tz_abbreviation);

    let dashboard = Dashboard::new(store, license_events.clone())
        .with_zone(zone)
        .with_credentials(Credentials {
            username: args.username.trim().to_string(),
            password: args.password,
        })
        .with_latency(Latency::new(args.latency_ms, args.jitter_ms));

    let app = api::router(AppState {
        dashboard: Arc::new(dashboard),
        license_events,
    });

    let addr = parse_listen(&args.listen)?;
    info!("CityFeedback listening on http://{addr}");
    info!("DB: {}", args.db.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn parse_listen(input: &str) -> anyhow::Result<SocketAddr> {
    if let Ok(addr) = input.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = input.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    if input == "localhost" {
        return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), DEFAULT_PORT));
    }

    if let Some(port) = input.strip_prefix("localhost:") {
        let port: u16 = port.parse().map_err(|_| {
            anyhow::anyhow!("invalid --listen '{input}': bad port. Example: 127.0.0.1:{DEFAULT_PORT}")
        })?;
        return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), port));
    }

    Err(anyhow::anyhow!(
        "invalid --listen '{input}'. Use ip:port (e.g. 127.0.0.1:{DEFAULT_PORT}) or ip (e.g. 127.0.0.1)."
    ))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
}
