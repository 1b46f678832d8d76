//! Classifies source files by extension. Each [`Kind`] determines how a file
//! participates in the gather and transform passes.

use crate::config::PROJECT_FILE;
use crate::frontmatter::Format;
use std::path::{Path, PathBuf};

pub const MARKDOWN_EXTENSION: &str = "md";
pub const HTML_EXTENSION: &str = "html";

/// What a source file is, as far as the build is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// A directory-wide metadata document, scoped to its containing
    /// directory. Never emitted.
    Manifest(Format),

    /// A page with optional front matter that is rendered to HTML.
    Content(Content),

    /// A template fragment referenced by content files. Never emitted.
    Partial,

    /// A project file ([`PROJECT_FILE`]) that happens to live in the source
    /// tree. It configures the build, so it is neither gathered nor emitted.
    Project,

    /// Anything else. Copied verbatim.
    Asset,
}

/// The renderable kinds of content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Content {
    /// Markdown is converted to HTML and then poured into a template named by
    /// the file's metadata.
    Markdown,

    /// HTML content is itself a template, executed against the file's
    /// metadata.
    Html,
}

impl Kind {
    pub fn of(path: &Path) -> Kind {
        if path.file_name().map_or(false, |name| name == PROJECT_FILE) {
            return Kind::Project;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Kind::Manifest(Format::Json),
            Some("yaml") | Some("yml") => Kind::Manifest(Format::Yaml),
            Some(MARKDOWN_EXTENSION) => Kind::Content(Content::Markdown),
            Some(HTML_EXTENSION) => Kind::Content(Content::Html),
            Some("template") | Some("source") => Kind::Partial,
            _ => Kind::Asset,
        }
    }
}

impl Content {
    /// The extension of the rendered output file.
    pub fn target_extension(self) -> &'static str {
        HTML_EXTENSION
    }

    /// Whether the effective metadata must name a template to render into.
    pub fn requires_template(self) -> bool {
        match self {
            Content::Markdown => true,
            Content::Html => false,
        }
    }

    /// Maps a source-relative path to its target-relative path.
    pub fn target_path(self, source: &Path) -> PathBuf {
        source.with_extension(self.target_extension())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_kind_of() {
        assert_eq!(Kind::of(Path::new("site.json")), Kind::Manifest(Format::Json));
        assert_eq!(Kind::of(Path::new("a/meta.yml")), Kind::Manifest(Format::Yaml));
        assert_eq!(Kind::of(Path::new("post.md")), Kind::Content(Content::Markdown));
        assert_eq!(Kind::of(Path::new("index.html")), Kind::Content(Content::Html));
        assert_eq!(Kind::of(Path::new("base.template")), Kind::Partial);
        assert_eq!(Kind::of(Path::new("image.png")), Kind::Asset);
        assert_eq!(Kind::of(Path::new("Makefile")), Kind::Asset);
        assert_eq!(Kind::of(Path::new("sitestack.yaml")), Kind::Project);
        assert_eq!(Kind::of(Path::new("docs/sitestack.yaml")), Kind::Project);
    }

    #[test]
    fn test_requires_template() {
        assert!(Content::Markdown.requires_template());
        assert!(!Content::Html.requires_template());
    }

    #[test]
    fn test_target_path() {
        assert_eq!(
            Content::Markdown.target_path(Path::new("blog/a.md")),
            PathBuf::from("blog/a.html")
        );
        assert_eq!(
            Content::Html.target_path(Path::new("index.html")),
            PathBuf::from("index.html")
        );
    }
}
