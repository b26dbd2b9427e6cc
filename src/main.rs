use clap::Parser;
use log::error;
use std::process::ExitCode;

use pokt_node_dashboard::cli::{self, Cli};
use pokt_node_dashboard::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match Config::from_env() {
        Ok(cfg) => cli::run(cli, cfg).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
