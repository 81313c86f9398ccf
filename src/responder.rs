use crate::{DependencyReport, DownloadOutcome, DownloadRequest, LibraryPath};

pub(crate) const DENIED_TEXT: &str = "\u{274c} Access denied";

pub(crate) const PROMPT_TEXT: &str = "\u{1f4dd} Send a YouTube link";

pub(crate) const INVALID_URL_TEXT: &str = "\u{274c} Please send a valid YouTube link";

pub(crate) const WELCOME_TEXT: &str = "\u{1f3ac} YouTube Download Bot\n\n\
    Send a YouTube link to download\n\
    Format:\n\
    URL [artist] [title] [category]\n\n\
    Example:\n\
    https://youtube.com/watch?v=... \"Artist Name\" \"Song Title\" \"Music Video\"\n\n\
    Default category: Music Video\n\
    Quality: 1080p";

pub(crate) fn status_text(report: &DependencyReport) -> String {
    let yt_dlp = match &report.yt_dlp {
        Some(version) => format!("\u{2705} available ({version})"),
        None => "\u{274c} not available".to_string(),
    };
    let ffmpeg = match &report.ffmpeg {
        Some(_) => "\u{2705} installed",
        None => "\u{274c} not installed",
    };
    let deno = match &report.deno {
        Some(version) => format!("\u{2705} installed ({version})"),
        None => "\u{274c} not installed".to_string(),
    };
    let cookies = if report.cookies_present {
        "\u{2705} found"
    } else {
        "\u{274c} not found"
    };
    format!(
        "\u{1f916} Bot status\n\n\
         Dependencies:\n\
         \u{2022} yt-dlp {yt_dlp}\n\
         \u{2022} ffmpeg {ffmpeg}\n\
         \u{2022} deno {deno}\n\
         \u{2022} cookies {cookies}\n\n\
         Quality: 1080p\n\
         Default category: Music Video\n\n\
         Commands:\n\
         \u{2022} /start - show help\n\
         \u{2022} /status - system status\n\
         \u{2022} send a YouTube link to download"
    )
}

pub(crate) fn progress_text(request: &DownloadRequest, target: &LibraryPath) -> String {
    format!(
        "\u{23ec} Starting download...\n\
         Artist: {}\n\
         Title: {}\n\
         Category: {}\n\
         Quality: 1080p\n\
         Path: {}\n\n\
         This may take a few minutes...",
        request.artist, request.title, request.category, target.relative_dir
    )
}

pub(crate) fn auth_mode_text(cookies_present: bool) -> &'static str {
    if cookies_present {
        "\u{1f510} Using cookies for authentication..."
    } else {
        "\u{26a0} Cookies not found, trying without authentication..."
    }
}

pub(crate) fn fault_text(message: &str) -> String {
    format!("\u{274c} Bot error:\n{message}")
}

pub(crate) fn outcome_text(request: &DownloadRequest, outcome: &DownloadOutcome) -> String {
    match outcome {
        DownloadOutcome::Completed {
            file_name,
            relative_dir,
        } => format!(
            "\u{2705} Download finished!\n\
             Artist: {}\n\
             Title: {}\n\
             Category: {}\n\
             File: {}\n\
             Path: {}",
            request.artist, request.title, request.category, file_name, relative_dir
        ),
        DownloadOutcome::ToolFailure(diagnostic) => {
            format!("\u{274c} Download failed\n{diagnostic}")
        }
        DownloadOutcome::TimedOut => "\u{23f0} Download timed out".to_string(),
        DownloadOutcome::Fault(message) => fault_text(message),
    }
}
