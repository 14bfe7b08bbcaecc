//! The streamer allow-list: one login per line.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::defaults::DEFAULT_STREAMER_LINES;

static RE_LOGIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{1,25}$").unwrap());

/// Read the logins listed in `path`, in file order.
///
/// Blank lines and `#` comments are skipped. A missing or unreadable
/// file yields an empty list; setup makes sure the file exists before
/// the loop starts.
pub fn read_streamers(path: &Path) -> Vec<String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to read streamer list: {e}");
            return Vec::new();
        }
    };
    parse_streamers(&contents)
}

pub fn parse_streamers(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .inspect(|login| {
            if !RE_LOGIN.is_match(login) {
                tracing::warn!(login, "Entry does not look like a Twitch login");
            }
        })
        .map(str::to_string)
        .collect()
}

/// Create a streamer list with a usage comment and a few examples.
pub fn write_default_streamers(path: &Path) -> std::io::Result<()> {
    std::fs::write(path, DEFAULT_STREAMER_LINES.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_blank_lines() {
        let contents = "# favourites\n\nMattEU\n  lirik  \n#shxtou\n\n";
        assert_eq!(parse_streamers(contents), vec!["MattEU", "lirik"]);
    }

    #[test]
    fn keeps_duplicates_and_order() {
        assert_eq!(parse_streamers("b\na\nb"), vec!["b", "a", "b"]);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_streamers(&dir.path().join("nope.txt")).is_empty());
    }

    #[test]
    fn default_list_parses_to_example_logins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streamers.txt");
        write_default_streamers(&path).unwrap();
        assert_eq!(read_streamers(&path), vec!["MattEU", "lirik", "shxtou"]);
    }
}
