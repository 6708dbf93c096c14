use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref CANONICAL_ID: Regex =
        Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("canonical id pattern should compile");

    /// URL shapes tried in order; the first pattern with a match wins.
    static ref URL_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([a-zA-Z0-9_-]{11})")
            .expect("watch/short/embed pattern should compile"),
        Regex::new(r"youtube\.com/v/([a-zA-Z0-9_-]{11})").expect("/v/ pattern should compile"),
    ];
}

/// A canonical 11-character YouTube video id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Resolve a raw id or any supported YouTube URL into a canonical id.
    ///
    /// Returns `None` for empty input or when nothing recognizable is found.
    pub fn resolve(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if CANONICAL_ID.is_match(input) {
            return Some(Self(input.to_string()));
        }

        URL_PATTERNS
            .iter()
            .find_map(|pattern| pattern.captures(input))
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL for this video
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(input: &str) -> Option<String> {
        VideoId::resolve(input).map(|id| id.as_str().to_string())
    }

    #[test]
    fn canonical_ids_are_returned_unchanged() {
        for id in ["dQw4w9WgXcQ", "a-b_c-d_e-f", "___________", "01234567890"] {
            assert_eq!(resolved(id).as_deref(), Some(id));
        }
    }

    #[test]
    fn extracts_id_from_each_url_shape() {
        let cases = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "https://youtu.be/dQw4w9WgXcQ",
            "youtu.be/dQw4w9WgXcQ?si=abc",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ?version=3",
        ];
        for url in cases {
            assert_eq!(resolved(url).as_deref(), Some("dQw4w9WgXcQ"), "{url}");
        }
    }

    #[test]
    fn unresolvable_inputs() {
        assert_eq!(resolved(""), None);
        assert_eq!(resolved("   "), None);
        assert_eq!(resolved("not-a-valid-ref"), None);
        assert_eq!(resolved("https://vimeo.com/123456789"), None);
        assert_eq!(resolved("https://youtu.be/short"), None);
    }

    #[test]
    fn first_match_in_input_wins() {
        let input = "https://youtu.be/AAAAAAAAAAA https://www.youtube.com/watch?v=BBBBBBBBBBB";
        assert_eq!(resolved(input).as_deref(), Some("AAAAAAAAAAA"));

        // The /v/ form is only consulted when the first pattern finds nothing.
        let input = "https://www.youtube.com/v/CCCCCCCCCCC https://youtu.be/DDDDDDDDDDD";
        assert_eq!(resolved(input).as_deref(), Some("DDDDDDDDDDD"));
    }

    #[test]
    fn watch_url_uses_canonical_id() {
        let id = VideoId::resolve("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(id.watch_url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(id.to_string(), "dQw4w9WgXcQ");
    }
}
