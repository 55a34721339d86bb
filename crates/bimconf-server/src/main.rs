mod cli;
mod commands;
mod server;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let options = server::config::synthesis_options(&args.filters);

    match args.command {
        Command::Synth(synth) => commands::synth(&synth, &options),
        Command::Labels(input) => commands::labels(&input, &options),
        Command::Inventory(input) => commands::inventory(&input, &options),
        Command::Serve(serve) => {
            log::info!("Starting bimconf server on port {}", serve.port);
            server::start_server(serve, options).await
        }
    }
}
