// Module declarations
mod cli;
mod config;
mod doctor;
mod downloader;
mod library;
mod request;
mod responder;
mod telegram;
mod util;

// Re-export module items at the crate root so cross-module references
// share a single namespace.
#[allow(unused_imports)]
pub(crate) use cli::*;
#[allow(unused_imports)]
pub(crate) use config::*;
#[allow(unused_imports)]
pub(crate) use doctor::*;
#[allow(unused_imports)]
pub(crate) use downloader::*;
#[allow(unused_imports)]
pub(crate) use library::*;
#[allow(unused_imports)]
pub(crate) use request::*;
#[allow(unused_imports)]
pub(crate) use responder::*;
#[allow(unused_imports)]
pub(crate) use telegram::*;
#[allow(unused_imports)]
pub(crate) use util::*;

use clap::Parser;
use log::{info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = BotConfig::load(&cli)?;
    if config.allow_list.is_empty() {
        warn!("ALLOWED_USER_IDS is empty; every request will be denied");
    }

    info!("bot starting");
    run_telegram_bridge(config)
}
