use anyhow::Context;
use clap::Parser;
use flux_config::{ConfigLoader, LogFormat, LoggingConfig};
use flux_rtp::RtpSession;
use tokio::net::UdpSocket;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "FLUX RTP receive monitor")]
struct Args {
    #[arg(long, default_value = "./config")]
    config_dir: String,

    /// 覆盖配置中的 RTP 监听地址
    #[arg(long)]
    media_bind: Option<String>,

    /// 覆盖配置中的 RTCP 监听地址
    #[arg(long)]
    control_bind: Option<String>,

    #[arg(long)]
    log_level: Option<String>,
}

fn init_logging(logging: &LoggingConfig) {
    // RUST_LOG 优先
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    match logging.format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ConfigLoader::new(&args.config_dir)
        .load()
        .with_context(|| format!("Failed to load config from {}", args.config_dir))?;
    if let Some(media) = args.media_bind {
        config.listen.media = media;
    }
    if let Some(control) = args.control_bind {
        config.listen.control = control;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging);

    let media = UdpSocket::bind(config.listen.media.as_str())
        .await
        .with_context(|| format!("Failed to bind RTP socket {}", config.listen.media))?;
    let control = UdpSocket::bind(config.listen.control.as_str())
        .await
        .with_context(|| format!("Failed to bind RTCP socket {}", config.listen.control))?;

    info!(
        target: "flux_rtp",
        "Listening for RTP on {} and RTCP on {}",
        media.local_addr()?,
        control.local_addr()?
    );

    let session = RtpSession::with_config(media, control, &config.session)?;
    let stats = session.stats_handle();
    let (mut media_rx, mut control_rx) = session.into_receivers();
    let mut media_open = true;
    let mut control_open = true;

    while media_open || control_open {
        tokio::select! {
            packet = media_rx.recv(), if media_open => match packet {
                Some(packet) => info!(target: "flux_rtp", "{}", packet),
                None => {
                    warn!(target: "flux_rtp", "Media channel closed");
                    media_open = false;
                }
            },
            value = control_rx.recv(), if control_open => match value {
                Some(value) => info!(target: "flux_rtp", "RTCP {} bytes", value.raw.len()),
                None => {
                    warn!(target: "flux_rtp", "Control channel closed");
                    control_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!(target: "flux_rtp", "Received Ctrl-C, shutting down");
                break;
            }
        }
    }

    let summary = serde_json::to_string_pretty(&stats.snapshot())?;
    info!(target: "flux_rtp", "Session statistics:\n{}", summary);

    Ok(())
}
