//! CLI for the Moustique client
//!
//! Subcommands:
//! - `publish`: publish one message
//! - `putval`: store one value
//! - `getval`: read one value
//! - `listen`: subscribe to topics and poll until Ctrl-C

use std::time::Duration;

use clap::Parser;
use moustique_client::Client;
use moustique_client::config::load_config;
use moustique_client::utils::logging;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "moustique")]
enum Command {
    /// Publish a message on a topic
    Publish { topic: String, message: String },
    /// Store a value under a name
    Putval { name: String, value: String },
    /// Print a stored value
    Getval { name: String },
    /// Subscribe to one or more topics and print what arrives
    Listen {
        #[arg(required = true)]
        topics: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info");
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    logging::init(&settings.logging.level);

    let cmd = Command::parse();
    let interval = Duration::from_millis(settings.client.pickup_interval_ms);

    let client = match Client::from_settings(&settings) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create client: {}", e);
            std::process::exit(1);
        }
    };
    info!("Client name: {}", client.identity());

    if let Err(e) = run(&client, cmd, interval).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(
    client: &Client,
    cmd: Command,
    interval: Duration,
) -> Result<(), moustique_client::ClientError> {
    match cmd {
        Command::Publish { topic, message } => client.publish(&topic, &message).await,
        Command::Putval { name, value } => client.putval(&name, &value).await,
        Command::Getval { name } => {
            match client.getval(&name).await? {
                Some(value) => println!("{value}"),
                None => println!("{name} has no value"),
            }
            Ok(())
        }
        Command::Listen { topics } => {
            for topic in &topics {
                client
                    .subscribe(topic, |topic: &str, message: &str, from: &str| {
                        println!("{topic}: {message} (from {from})");
                    })
                    .await?;
            }
            listen(client, interval).await;
            Ok(())
        }
    }
}

/// Polls on a fixed interval. Pickup failures are logged by the client and
/// polling carries on.
async fn listen(client: &Client, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let _ = client.pickup().await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received. Exiting gracefully.");
                return;
            }
        }
    }
}
