//! Doc-comment annotations
//!
//! ```go
//! // FixtureStruct is a test struct
//! // @url: https://stats.ncaa.org/game_upload/team_codes
//! // @ignore-elements: script, style, link, img, footer, header
//! type FixtureStruct struct { ... }
//! ```

const URL: &str = "@url:";
const IGNORE_ELEMENTS: &str = "@ignore-elements:";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    pub url: Option<String>,
    pub ignores: Vec<String>,
}

/// Extract annotations from raw comment lines (`// ...` or `/* ... */`).
/// Later lines override earlier `@url:` values; ignore lists accumulate.
pub fn extract<S: AsRef<str>>(comments: &[S]) -> Annotations {
    let mut annotations = Annotations::default();

    for line in comments.iter().flat_map(|c| comment_body(c.as_ref()).lines()) {
        let line = line.trim().trim_start_matches('*').trim();
        if let Some(url) = line.strip_prefix(URL) {
            let url = url.trim();
            if !url.is_empty() {
                annotations.url = Some(url.to_string());
            }
        } else if let Some(list) = line.strip_prefix(IGNORE_ELEMENTS) {
            annotations.ignores.extend(
                list.split(',')
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(String::from),
            );
        }
    }

    annotations
}

fn comment_body(comment: &str) -> &str {
    if let Some(line) = comment.strip_prefix("//") {
        return line;
    }
    comment
        .strip_prefix("/*")
        .map(|c| c.strip_suffix("*/").unwrap_or(c))
        .unwrap_or(comment)
}
