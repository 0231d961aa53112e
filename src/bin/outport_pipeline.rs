#![cfg(feature = "cli")]

use std::env;
use std::fs::File;
use std::io::BufReader;

use outport::config::OutportConfig;
use outport::{Destination, build_engine_from_config};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let config_path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("Usage: outport_pipeline <config.yaml> [data.json|-]");
            std::process::exit(1);
        }
    };
    let data_path = args.next().unwrap_or_else(|| "-".to_string());

    let file = File::open(&config_path)?;
    let config: OutportConfig = serde_yaml::from_reader(BufReader::new(file))?;
    let engine = build_engine_from_config(config)?;

    let raw = if data_path == "-" {
        let mut buf = Vec::new();
        tokio::io::stdin().read_to_end(&mut buf).await?;
        buf
    } else {
        tokio::fs::read(&data_path).await?
    };
    let data: serde_json::Value = serde_json::from_slice(&raw)?;

    engine.output_value(&data).await?;

    if *engine.destination() == Destination::Return {
        println!("{}", serde_json::to_string_pretty(&engine.returned())?);
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run_blocking() {
        eprintln!("outport_pipeline error: {e}");
        std::process::exit(1);
    }
}

fn run_blocking() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run())
}
