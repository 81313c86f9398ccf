pub(crate) const DEFAULT_ARTIST: &str = "Various";
pub(crate) const DEFAULT_TITLE: &str = "Unknown";
pub(crate) const DEFAULT_CATEGORY: &str = "Music Video";

const HOST_MARKERS: [&str; 2] = ["youtube.com", "youtu.be"];

/// Parsed, defaulted form of a user's download command. All four fields
/// are non-empty by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DownloadRequest {
    pub(crate) source_url: String,
    pub(crate) artist: String,
    pub(crate) title: String,
    pub(crate) category: String,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ParseError {
    Empty,
    InvalidUrl,
}

/// Tokenize a raw message into a download request.
///
/// Shell-style quoting groups multi-word fields; unbalanced quotes fall
/// back to plain whitespace splitting. Extra tokens after the URL map
/// positionally to artist, title and category; the category absorbs any
/// trailing tokens so multi-word categories need no quotes.
pub(crate) fn parse_request(text: &str) -> Result<DownloadRequest, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    let parts = shlex::split(text)
        .unwrap_or_else(|| text.split_whitespace().map(str::to_string).collect());
    let Some((url, extras)) = parts.split_first() else {
        return Err(ParseError::Empty);
    };
    if !HOST_MARKERS.iter().any(|marker| url.contains(marker)) {
        return Err(ParseError::InvalidUrl);
    }

    // A lone extra token is always the artist; there is no way to tell it
    // apart from a bare title.
    let (artist, title, category) = match extras {
        [] => (
            DEFAULT_ARTIST.to_string(),
            DEFAULT_TITLE.to_string(),
            DEFAULT_CATEGORY.to_string(),
        ),
        [artist] => (
            artist.clone(),
            DEFAULT_TITLE.to_string(),
            DEFAULT_CATEGORY.to_string(),
        ),
        [artist, title] => (artist.clone(), title.clone(), DEFAULT_CATEGORY.to_string()),
        [artist, title, rest @ ..] => (artist.clone(), title.clone(), rest.join(" ")),
    };

    Ok(DownloadRequest {
        source_url: url.clone(),
        artist: field_or(&artist, DEFAULT_ARTIST),
        title: field_or(&title, DEFAULT_TITLE),
        category: field_or(&category, DEFAULT_CATEGORY),
    })
}

/// Strip one layer of surrounding matching quotes the tokenizer may have
/// left behind; a field that strips to nothing falls back to its default.
fn field_or(value: &str, default: &str) -> String {
    let stripped = strip_outer_quotes(value.trim()).trim();
    if stripped.is_empty() {
        default.to_string()
    } else {
        stripped.to_string()
    }
}

fn strip_outer_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
