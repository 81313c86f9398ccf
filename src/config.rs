use std::collections::HashSet;
use std::path::PathBuf;

use crate::{Cli, env_optional, env_required};

pub(crate) const DEFAULT_MEDIA_ROOT: &str = "/media/music-videos";
pub(crate) const DEFAULT_COOKIES_FILE: &str = "/app/cookies.txt";

/// Identities permitted to use the bot. Built once at startup and passed
/// by reference into every handler; an empty list denies everyone.
#[derive(Debug, Clone)]
pub(crate) struct AllowList {
    ids: HashSet<i64>,
}

impl AllowList {
    pub(crate) fn parse(raw: &str) -> Self {
        let ids = raw
            .split(',')
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect();
        Self { ids }
    }

    pub(crate) fn is_allowed(&self, user_id: i64) -> bool {
        self.ids.contains(&user_id)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug)]
pub(crate) struct BotConfig {
    pub(crate) token: String,
    pub(crate) allow_list: AllowList,
    pub(crate) media_root: PathBuf,
    pub(crate) cookies_file: PathBuf,
    pub(crate) poll_timeout: u64,
    pub(crate) poll_limit: usize,
}

impl BotConfig {
    /// CLI flags win over environment values; the token has no fallback
    /// and missing it refuses startup.
    pub(crate) fn load(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let token = env_required("TELEGRAM_BOT_TOKEN")?;
        let allow_list = AllowList::parse(&env_optional("ALLOWED_USER_IDS").unwrap_or_default());
        let media_root = cli
            .media_root
            .clone()
            .or_else(|| env_optional("VIDVAULT_MEDIA_ROOT").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT));
        let cookies_file = cli
            .cookies
            .clone()
            .or_else(|| env_optional("VIDVAULT_COOKIES_FILE").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_COOKIES_FILE));
        Ok(Self {
            token,
            allow_list,
            media_root,
            cookies_file,
            poll_timeout: cli.poll_timeout,
            poll_limit: cli.poll_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_denies_everyone() {
        let list = AllowList::parse("");
        assert!(list.is_empty());
        assert!(!list.is_allowed(0));
        assert!(!list.is_allowed(123456));
    }

    #[test]
    fn parses_comma_separated_ids() {
        let list = AllowList::parse("123, 456,789");
        assert!(list.is_allowed(123));
        assert!(list.is_allowed(456));
        assert!(list.is_allowed(789));
        assert!(!list.is_allowed(1000));
    }

    #[test]
    fn skips_junk_entries() {
        let list = AllowList::parse("abc,123,,9.5");
        assert!(list.is_allowed(123));
        assert!(!list.is_empty());
        assert!(!list.is_allowed(9));
    }

    #[test]
    fn negative_ids_are_accepted() {
        // Telegram group chats have negative ids
        let list = AllowList::parse("-100200300");
        assert!(list.is_allowed(-100200300));
    }
}
