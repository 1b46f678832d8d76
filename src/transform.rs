//! The second pass of a build: walks the source tree again and, using the
//! finished [`Stack`], renders content files into the target tree and copies
//! assets verbatim. Manifests and template partials are not emitted.

use crate::build::{create_parent, read, sources, Error, Result, Source};
use crate::config::Config;
use crate::frontmatter;
use crate::kind::{Content, Kind};
use crate::markdown;
use crate::stack::Stack;
use crate::template;
use crate::value::{Mapping, Value};
use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// The key under which rendered markdown is handed to its template.
pub const CONTENT_KEY: &str = "content";

/// Runs the transform pass.
pub fn transform(config: &Config, stack: &Stack) -> Result<()> {
    for source in sources(config) {
        let source = source?;
        match Kind::of(&source.relative) {
            Kind::Content(content) => transform_content(config, stack, &source, content)?,
            Kind::Asset => {
                let dst = config.target_directory.join(&source.relative);
                create_parent(&dst)?;
                std::fs::copy(&source.path, &dst).map_err(|err| Error::Write {
                    path: dst.clone(),
                    err,
                })?;
                info!(
                    "{} transformed to {} verbatim",
                    source.relative.display(),
                    dst.display()
                );
            }
            Kind::Manifest(_) | Kind::Partial | Kind::Project => {
                info!("{} ignored for transformation", source.relative.display());
            }
        }
    }
    Ok(())
}

fn transform_content(
    config: &Config,
    stack: &Stack,
    source: &Source,
    content: Content,
) -> Result<()> {
    let text = read(&source.path)?;
    let (_, body) = frontmatter::split(&text, &config.delimiter);
    let metadata = resolve(stack, source, content, body);

    // `import*` and template file names resolve next to the source file
    let directory = source.path.parent().unwrap_or_else(|| Path::new(""));
    let render_error = |err: template::Error| Error::Render {
        path: source.path.clone(),
        err,
    };
    let template_text = if content.requires_template() {
        let names = template_names(&metadata, &config.template_key, &source.path)?;
        Cow::Owned(template::compose(directory, names.iter()).map_err(render_error)?)
    } else {
        Cow::Borrowed(body)
    };
    let output = template::render(directory, &template_text, &metadata).map_err(render_error)?;

    let dst = config
        .target_directory
        .join(target_path(&metadata, content, source)?);
    create_parent(&dst)?;
    std::fs::write(&dst, output).map_err(|err| Error::Write {
        path: dst.clone(),
        err,
    })?;
    info!(
        "{} transformed to {}",
        source.relative.display(),
        dst.display()
    );
    Ok(())
}

/// Computes the metadata a content file is rendered with: its effective
/// metadata from the stack plus, for markdown, the rendered body under
/// [`CONTENT_KEY`].
pub(crate) fn resolve(stack: &Stack, source: &Source, content: Content, body: &str) -> Mapping {
    let mut metadata = stack.get(&source.relative);
    if let Content::Markdown = content {
        let mut html = String::new();
        markdown::to_html(&mut html, body);
        metadata.insert(CONTENT_KEY.to_owned(), Value::String(html));
    }
    metadata
}

/// Reads the template file name(s) from `key`: either one name or a list of
/// names composed in order.
fn template_names(metadata: &Mapping, key: &str, path: &Path) -> Result<Vec<String>> {
    let invalid = || Error::InvalidKey {
        path: path.to_owned(),
        key: key.to_owned(),
        expected: "a template file name or a non-empty list of them",
    };
    match metadata.get(key) {
        None | Some(Value::Null) => Err(Error::MissingKey {
            path: path.to_owned(),
            key: key.to_owned(),
        }),
        Some(Value::String(name)) => Ok(vec![name.clone()]),
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|item| item.as_str().map(str::to_owned).ok_or_else(invalid))
            .collect(),
        Some(_) => Err(invalid()),
    }
}

/// Where a content file is written, relative to the target directory. This
/// is the resolved `target` key, which front matter may override, as long as
/// it stays inside the target directory.
fn target_path(metadata: &Mapping, content: Content, source: &Source) -> Result<PathBuf> {
    let target = match metadata.get("target") {
        None => return Ok(content.target_path(&source.relative)),
        Some(Value::String(target)) => target,
        Some(_) => {
            return Err(Error::InvalidKey {
                path: source.path.clone(),
                key: "target".to_owned(),
                expected: "a string",
            })
        }
    };
    let path = PathBuf::from(target);
    let contained = path.file_name().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if contained {
        Ok(path)
    } else {
        Err(Error::InvalidTarget {
            path: source.path.clone(),
            target: target.clone(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stack::StackBuilder;

    fn source(relative: &str) -> Source {
        Source {
            path: Path::new("/site/src").join(relative),
            relative: PathBuf::from(relative),
        }
    }

    fn mapping(json: &str) -> Mapping {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_resolve_markdown_adds_content() {
        let mut builder = StackBuilder::new();
        builder.add("", mapping(r#"{"layout": "base"}"#));
        let m = resolve(&builder.finish(), &source("a.md"), Content::Markdown, "# Hi");
        assert_eq!(m["layout"], Value::from("base"));
        assert_eq!(m[CONTENT_KEY], Value::from("<h1>Hi</h1>\n"));
    }

    #[test]
    fn test_resolve_html_has_no_content() {
        let stack = StackBuilder::new().finish();
        let m = resolve(&stack, &source("a.html"), Content::Html, "<p>x</p>");
        assert!(m.is_empty());
    }

    #[test]
    fn test_template_names() -> Result<()> {
        let path = Path::new("a.md");
        assert_eq!(
            template_names(&mapping(r#"{"template": "base.template"}"#), "template", path)?,
            vec!["base.template"]
        );
        assert_eq!(
            template_names(&mapping(r#"{"t": ["a.template", "b.template"]}"#), "t", path)?,
            vec!["a.template", "b.template"]
        );
        assert!(matches!(
            template_names(&mapping("{}"), "template", path),
            Err(Error::MissingKey { .. })
        ));
        assert!(matches!(
            template_names(&mapping(r#"{"template": 3}"#), "template", path),
            Err(Error::InvalidKey { .. })
        ));
        assert!(matches!(
            template_names(&mapping(r#"{"template": []}"#), "template", path),
            Err(Error::InvalidKey { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_target_path() -> Result<()> {
        let src = source("blog/a.md");
        assert_eq!(
            target_path(&mapping("{}"), Content::Markdown, &src)?,
            PathBuf::from("blog/a.html")
        );
        assert_eq!(
            target_path(&mapping(r#"{"target": "a/index.html"}"#), Content::Markdown, &src)?,
            PathBuf::from("a/index.html")
        );
        for escaping in &["../a.html", "/etc/a.html", "", "a/.."] {
            let m: Mapping = std::iter::once(("target".to_owned(), Value::from(*escaping))).collect();
            assert!(matches!(
                target_path(&m, Content::Markdown, &src),
                Err(Error::InvalidTarget { .. })
            ));
        }
        Ok(())
    }
}
