use clap::Parser;
use log::{error, info};
use server::directory::{ChatSink, LogChat, PlayerDirectory, SessionDirectory};
use server::dispatch::Dispatcher;
use server::hub::ObserverHub;
use server::network::ObserverServer;
use server::sim::run_session_simulator;
use server::ticker::run_status_ticker;
use std::sync::Arc;
use std::time::Duration;

/// Parses command-line arguments, wires the detection engine to the
/// observer transport, and runs until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// Observer port to listen on
        #[clap(short, long, default_value = "8080")]
        port: u16,
        /// Seconds between STATUS broadcasts
        #[clap(short, long, default_value = "10")]
        status_interval: u64,
        /// Feed randomized session traffic through the detector (dev harness)
        #[clap(long)]
        simulate: bool,
    }

    env_logger::init();
    let args = Args::parse();

    let hub = Arc::new(ObserverHub::new());
    let directory = Arc::new(SessionDirectory::new());
    let chat: Arc<dyn ChatSink> = Arc::new(LogChat);

    let address = format!("{}:{}", args.host, args.port);
    let server = ObserverServer::bind(
        &address,
        Arc::clone(&hub),
        Arc::clone(&directory) as Arc<dyn PlayerDirectory>,
        Arc::clone(&chat),
    )
    .await?;

    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("Observer server failed: {}", e);
        }
    });

    let ticker_handle = {
        let hub = Arc::clone(&hub);
        let directory = Arc::clone(&directory) as Arc<dyn PlayerDirectory>;
        tokio::spawn(run_status_ticker(
            hub,
            directory,
            Duration::from_secs(args.status_interval),
        ))
    };

    if args.simulate {
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&hub), Arc::clone(&chat)));
        tokio::spawn(run_session_simulator(dispatcher, Arc::clone(&directory)));
    }

    tokio::select! {
        result = server_handle => {
            if let Err(e) = result {
                error!("Observer server task panicked: {}", e);
            }
        }
        result = ticker_handle => {
            if let Err(e) = result {
                error!("Status ticker task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
