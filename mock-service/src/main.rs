use clap::Parser;
use mock_service::MockConfig;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(version, about = "In-memory payment, order and favourite services")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0:3002")]
    addr: SocketAddr,

    /// Answer 429 above this many requests per second.
    #[arg(long)]
    max_rps: Option<NonZeroU32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_service=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    tokio::spawn(mock_service::rps_log_task());

    let listener = TcpListener::bind(args.addr).await?;
    info!("Mock service listening on {}", listener.local_addr()?);
    mock_service::serve(
        listener,
        MockConfig {
            max_rps: args.max_rps,
        },
    )
    .await?;
    Ok(())
}
