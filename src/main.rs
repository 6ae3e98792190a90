mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use flex_starter::handlers::RegistryBuilder;
use flex_starter::samples::{SampleOptions, register_samples};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "init start");

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Server(args) => flex_starter::api::run(args.address).await,
        Commands::Handlers => print_handlers(),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Service exited with error");
        std::process::exit(1);
    }
}

fn print_handlers() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut builder = RegistryBuilder::new();
    register_samples(&mut builder, &SampleOptions::default())?;
    let summary = builder.build().describe();

    for (collection, events) in &summary.data {
        let events: Vec<&str> = events.iter().map(|e| e.as_str()).collect();
        println!("data      {collection}: {}", events.join(", "));
    }
    for name in &summary.functions {
        println!("function  {name}");
    }
    for name in &summary.auth_providers {
        println!("auth      {name}");
    }

    Ok(())
}
