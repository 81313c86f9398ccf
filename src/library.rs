use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::DownloadRequest;

const HOSTILE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replace filesystem-hostile characters with `_`, then trim surrounding
/// whitespace. Replacement is 1:1, never deletion, so sanitizing twice
/// equals sanitizing once.
pub(crate) fn sanitize_component(name: &str) -> String {
    name.replace(HOSTILE_CHARS, "_").trim().to_string()
}

/// Where a request lands on disk: `<root>/<artist>/<title>/` holding
/// `<artist> - <title> - <category>.<ext>` plus a sibling thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LibraryPath {
    pub(crate) directory: PathBuf,
    pub(crate) stem: String,
    pub(crate) relative_dir: String,
}

impl LibraryPath {
    pub(crate) fn for_request(media_root: &Path, request: &DownloadRequest) -> Self {
        let artist = sanitize_component(&request.artist);
        let title = sanitize_component(&request.title);
        let category = sanitize_component(&request.category);
        LibraryPath {
            directory: media_root.join(&artist).join(&title),
            stem: format!("{artist} - {title} - {category}"),
            relative_dir: format!("{artist}/{title}/"),
        }
    }

    /// Output target for the downloader; the tool picks the extension.
    pub(crate) fn output_template(&self) -> String {
        format!("{}/{}.%(ext)s", self.directory.display(), self.stem)
    }

    /// Idempotent; a second request for the same artist/title reuses the
    /// directory and overwrites the same stem.
    pub(crate) fn ensure_directory(&self) -> io::Result<()> {
        fs::create_dir_all(&self.directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(artist: &str, title: &str, category: &str) -> DownloadRequest {
        DownloadRequest {
            source_url: "https://youtu.be/abc".to_string(),
            artist: artist.to_string(),
            title: title.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn replaces_every_hostile_character() {
        let sanitized = sanitize_component(r#"a<b>c:d"e/f\g|h?i*j"#);
        for ch in ['<', '>', ':', '"', '/', '\\', '|', '?', '*'] {
            assert!(!sanitized.contains(ch));
        }
        // 1:1 replacement, nothing deleted
        assert_eq!(sanitized.chars().count(), r#"a<b>c:d"e/f\g|h?i*j"#.chars().count());
    }

    #[test]
    fn sanitizing_is_idempotent() {
        let once = sanitize_component("AC/DC: Live?");
        assert_eq!(sanitize_component(&once), once);
    }

    #[test]
    fn safe_input_is_untouched() {
        assert_eq!(sanitize_component("Daft Punk"), "Daft Punk");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(sanitize_component("  Queen  "), "Queen");
    }

    #[test]
    fn layout_is_artist_then_title() {
        let target = LibraryPath::for_request(
            Path::new("/media/music-videos"),
            &request("Daft Punk", "One More Time", "Official Audio"),
        );
        assert_eq!(
            target.directory,
            PathBuf::from("/media/music-videos/Daft Punk/One More Time")
        );
        assert_eq!(target.stem, "Daft Punk - One More Time - Official Audio");
        assert_eq!(target.relative_dir, "Daft Punk/One More Time/");
    }

    #[test]
    fn slashes_cannot_escape_the_layout() {
        let target = LibraryPath::for_request(
            Path::new("/media/music-videos"),
            &request("AC/DC", "T.N.T.", "Music Video"),
        );
        assert_eq!(
            target.directory,
            PathBuf::from("/media/music-videos/AC_DC/T.N.T.")
        );
        assert_eq!(target.relative_dir, "AC_DC/T.N.T./");
    }

    #[test]
    fn output_template_defers_the_extension() {
        let target = LibraryPath::for_request(Path::new("/tmp/m"), &request("a", "b", "c"));
        assert!(target.output_template().ends_with("/a - b - c.%(ext)s"));
    }

    #[test]
    fn ensure_directory_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let target = LibraryPath::for_request(root.path(), &request("Queen", "Innuendo", "Music Video"));
        target.ensure_directory().unwrap();
        target.ensure_directory().unwrap();
        assert!(target.directory.is_dir());
    }
}
