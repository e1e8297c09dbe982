//! anf-sample - Azure NetApp Files provisioning sample
//!
//! Exits 0 when every stage succeeds and 1 otherwise.

use anf_sample::cli::Cli;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    init_logging(cli.debug);
    info!("Starting anf-sample");

    let code = match cli.execute().await {
        Ok(status) => status.code(),
        Err(e) => {
            error!("Error: {}", e);
            eprintln!("Error: {}", e);
            1
        }
    };

    std::process::exit(code);
}

fn init_logging(debug: bool) {
    let default_filter = if debug {
        "anf_sample=debug"
    } else {
        "anf_sample=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
