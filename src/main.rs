mod config;
mod error;
mod ingest;
mod isapi;
mod lookup;
mod storage;
mod types;
mod webhook;

use config::Config;
use env_logger::Env;
use envconfig::Envconfig;
use ingest::Ingestor;
use log::{error, info};
use lookup::LookupTables;
use std::sync::Arc;
use storage::ImageStore;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting plate-ingest");

    let config = match Config::init_from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Unable to load configuration: {}", e);
            return;
        }
    };
    let addr = match config.socket_addr().await {
        Ok(addr) => addr,
        Err(e) => {
            error!("Unable to resolve bind address {}: {}", config.bind(), e);
            return;
        }
    };
    info!(
        "Storing pictures under {}, max request size {} bytes",
        config.upload_folder.display(),
        config.max_content_length
    );

    let ingestor = Arc::new(Ingestor::new(
        LookupTables::default(),
        ImageStore::new(config.upload_folder.clone()),
    ));
    tokio::select! {
        _ = webhook::run(addr, ingestor, config.max_content_length) => {
            error!("Webhook server stopped");
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Unable to listen for shutdown signal: {}", e);
            }
        }
    }
    info!("Exiting main");
}
