use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "vidvault")]
#[command(about = "Telegram bot that fetches music videos into an organized library", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// Media library root (overrides VIDVAULT_MEDIA_ROOT).
    #[arg(long)]
    pub(crate) media_root: Option<PathBuf>,

    /// Cookies file passed read-only to the downloader (overrides VIDVAULT_COOKIES_FILE).
    #[arg(long)]
    pub(crate) cookies: Option<PathBuf>,

    /// Long-poll timeout for Telegram getUpdates (seconds).
    #[arg(long, default_value_t = 50)]
    pub(crate) poll_timeout: u64,

    /// Max updates fetched per poll.
    #[arg(long, default_value_t = 100)]
    pub(crate) poll_limit: usize,
}
