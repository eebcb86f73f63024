use std::{net::SocketAddr, process::ExitCode, sync::Arc, time::Duration};

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use chorus_node::{Node, NodeConfig};
use chorus_transport::{broadcast_addr, BroadcastUdp, DRIVER_PORT};

/// One node of the chorus broadcast traffic simulation.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// This node's identity, between 1 and --max-sources.
    id: i32,

    /// UDP port shared by all peers.
    #[arg(long, default_value_t = DRIVER_PORT)]
    port: u16,

    /// Number of rounds to run before terminating.
    #[arg(long, default_value_t = 20)]
    rounds: usize,

    /// Packets sent per round.
    #[arg(long, default_value_t = 100)]
    burst: usize,

    /// Milliseconds between consecutive packet sends.
    #[arg(long, value_name = "MS", default_value_t = 10)]
    spacing: u64,

    /// Per-attempt receive timeout in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 12)]
    recv_timeout: u64,

    /// Number of known source identities covered by the report.
    #[arg(long, default_value_t = 10)]
    max_sources: usize,

    /// Send to the loopback address instead of the broadcast address, for
    /// single-host runs without broadcast permission.
    #[arg(long)]
    loopback: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = NodeConfig::new(args.id)
        .with_port(args.port)
        .with_rounds(args.rounds)
        .with_burst_size(args.burst)
        .with_spacing(Duration::from_millis(args.spacing))
        .with_recv_timeout(Duration::from_millis(args.recv_timeout))
        .with_max_sources(args.max_sources);

    // Socket setup is fatal: without a working channel there is no node.
    let channel = match BroadcastUdp::bind(config.port).await {
        Ok(channel) => Arc::new(channel),
        Err(e) => {
            error!(port = config.port, err = %e, "unable to set up the broadcast socket");
            return ExitCode::FAILURE;
        }
    };

    let destination: SocketAddr = if args.loopback {
        ([127, 0, 0, 1], config.port).into()
    } else {
        broadcast_addr(config.port)
    };

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            signal_cancel.cancel();
        }
    });

    let node = match Node::new(config, channel, destination, cancel) {
        Ok(node) => node,
        Err(e) => {
            error!(err = %e, "invalid node configuration");
            return ExitCode::FAILURE;
        }
    };

    match node.run().await {
        Ok(stats) => {
            info!(
                sent = stats.packets_sent(),
                received = stats.packets_received(),
                discarded = stats.malformed_discarded(),
                rounds = stats.rounds_completed(),
                "run complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(err = %e, "node run failed");
            ExitCode::FAILURE
        }
    }
}
