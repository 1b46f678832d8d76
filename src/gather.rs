//! The first pass of a build: walks the source tree and records every piece
//! of metadata in a [`Stack`].
//!
//! * Manifests (`.json`, `.yaml`, `.yml`) are scoped to their directory.
//! * Content files (`.md`, `.html`) get a derived fragment (`source`,
//!   `target`, `url`) followed by their own front matter, both scoped to the
//!   file itself.
//! * Once the walk is done, an index of every content file's metadata
//!   (derived fields with front matter on top) is added at the root scope
//!   under [`Config::global_key`], so listings and navigation can be built
//!   from any template.

use crate::build::{read, slash_path, sources, Error, Result};
use crate::config::Config;
use crate::kind::{Content, Kind};
use crate::stack::{Stack, StackBuilder};
use crate::value::{merged, Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runs the gather pass and returns the finished, read-only [`Stack`].
pub fn gather(config: &Config) -> Result<Stack> {
    let mut builder = StackBuilder::new();
    let mut index = Mapping::new();

    for source in sources(config) {
        let source = source?;
        match Kind::of(&source.relative) {
            Kind::Manifest(format) => {
                let metadata =
                    format
                        .parse(&read(&source.path)?)
                        .map_err(|err| Error::Metadata {
                            path: source.path.clone(),
                            err,
                        })?;
                info!(
                    "{} gathered ({} element(s))",
                    source.relative.display(),
                    metadata.len()
                );
                builder.add(directory_scope(&source.relative), metadata);
            }
            Kind::Content(content) => {
                let text = read(&source.path)?;
                let (block, _) = crate::frontmatter::split(&text, &config.delimiter);
                let mut derived = derived_metadata(content, &source.relative);
                let full = if block.trim().is_empty() {
                    debug!("{} has no front matter", source.relative.display());
                    builder.add(&source.relative, derived.clone());
                    derived
                } else {
                    let own = config.front_matter.parse(block).map_err(|err| {
                        Error::Metadata {
                            path: source.path.clone(),
                            err,
                        }
                    })?;
                    // a relocated page is served from its new target
                    if let (Some(Value::String(target)), None) =
                        (own.get("target"), own.get("url"))
                    {
                        derived.insert("url".to_owned(), Value::from(url_of(target)));
                    }
                    let full = merged(&derived, &own);
                    builder.add(&source.relative, derived);
                    builder.add(&source.relative, own);
                    full
                };
                info!(
                    "{} gathered ({} element(s))",
                    source.relative.display(),
                    full.len()
                );
                index.insert(slash_path(&source.relative), Value::Map(full));
            }
            Kind::Partial | Kind::Project | Kind::Asset => {
                info!("{} ignored for gathering", source.relative.display());
            }
        }
    }

    let mut global = Mapping::new();
    global.insert(config.global_key.clone(), Value::Map(index));
    builder.add(PathBuf::new(), global);
    Ok(builder.finish())
}

/// The scope of a manifest: the directory containing it.
fn directory_scope(relative: &Path) -> PathBuf {
    relative
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// The metadata every content file gets regardless of front matter.
pub fn derived_metadata(content: Content, relative: &Path) -> Mapping {
    let target = slash_path(&content.target_path(relative));
    let mut m = Mapping::new();
    m.insert("source".to_owned(), Value::from(slash_path(relative)));
    m.insert("url".to_owned(), Value::from(url_of(&target)));
    m.insert("target".to_owned(), Value::from(target));
    m
}

/// The site-absolute URL a target path is served from.
fn url_of(target: &str) -> String {
    format!("/{}", target.trim_start_matches("./"))
}
