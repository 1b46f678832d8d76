//! Rewrites link destinations in Markdown so that links between source pages
//! keep working after `.md` files are rendered to `.html`.

use url::{ParseError, Url};

const MARKDOWN_SUFFIX: &str = ".md";
const HTML_SUFFIX: &str = ".html";

/// Converts a link destination. Relative destinations whose path ends in
/// `.md` get an `.html` path instead (query and fragment are preserved).
/// Absolute URLs are returned untouched, since they may point at markdown
/// hosted elsewhere, and so is anything that isn't a valid URL at all.
pub fn convert(dest: &str) -> String {
    match Url::parse(dest) {
        Err(ParseError::RelativeUrlWithoutBase) => convert_relative(dest),
        _ => dest.to_owned(),
    }
}

fn convert_relative(dest: &str) -> String {
    let split = dest.find(|c: char| c == '?' || c == '#').unwrap_or_else(|| dest.len());
    let (path, rest) = dest.split_at(split);
    match path.strip_suffix(MARKDOWN_SUFFIX) {
        Some(stem) if !stem.is_empty() && !stem.ends_with('/') => {
            format!("{}{}{}", stem, HTML_SUFFIX, rest)
        }
        _ => dest.to_owned(),
    }
}
