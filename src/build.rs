//! Exports the [`build_site`] function which stitches together the two passes
//! of a build: gathering metadata from the whole source tree
//! ([`crate::gather`]) and then rendering or copying every file into the
//! target tree ([`crate::transform`]). Also defines the source-tree walk both
//! passes share and the [`Error`] type they report.

use crate::config::Config;
use crate::gather::gather;
use crate::transform::transform;
use crate::{frontmatter, template};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Builds the site described by `config`. The gather pass runs to completion
/// before the transform pass starts; the first error aborts the build.
pub fn build_site(config: &Config) -> Result<()> {
    if config.source_directory == config.target_directory {
        return Err(Error::TargetIsSource(config.source_directory.clone()));
    }
    let stack = gather(config)?;
    transform(config, &stack)
}

/// A file in the source tree.
pub(crate) struct Source {
    /// The file's path on disk.
    pub path: PathBuf,

    /// The file's path relative to the source directory. This is also the
    /// file's metadata scope.
    pub relative: PathBuf,
}

/// Walks every file under the source directory in a stable (lexical) order.
/// Directories are always descended. If the target directory lives inside
/// the source directory it is skipped, so build output is never read back
/// as input.
pub(crate) fn sources(config: &Config) -> impl Iterator<Item = Result<Source>> + '_ {
    let root = &config.source_directory;
    let target = &config.target_directory;
    WalkDir::new(root)
        .follow_links(true)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_entry(move |entry| !entry.path().starts_with(target))
        .filter_map(move |result| match result {
            Err(err) => Some(Err(Error::Walk(err))),
            Ok(entry) if entry.file_type().is_dir() => None,
            Ok(entry) => {
                let path = entry.into_path();
                let relative = match path.strip_prefix(root) {
                    Ok(relative) => relative.to_owned(),
                    Err(_) => return Some(Err(Error::OutsideSource(path))),
                };
                Some(Ok(Source { path, relative }))
            }
        })
}

/// Renders a source-relative path with `/` separators regardless of
/// platform, for use in metadata.
pub(crate) fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Reads a whole file as UTF-8.
pub(crate) fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| Error::Read {
        path: path.to_owned(),
        err,
    })
}

/// Creates the parent directories of `path` if needed.
pub(crate) fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) => std::fs::create_dir_all(dir).map_err(|err| Error::Write {
            path: dir.to_owned(),
            err,
        }),
        None => Ok(()),
    }
}

/// The result of a fallible build step.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Every variant that concerns a
/// particular file carries that file's path.
#[derive(Debug)]
pub enum Error {
    /// Returned when the source and target directories are the same.
    TargetIsSource(PathBuf),

    /// Returned for I/O problems while walking the source tree.
    Walk(walkdir::Error),

    /// Returned when the walk yields a path outside of the source directory.
    OutsideSource(PathBuf),

    /// Returned when a source file can't be read.
    Read { path: PathBuf, err: io::Error },

    /// Returned when an output file or directory can't be written.
    Write { path: PathBuf, err: io::Error },

    /// Returned when a manifest or front matter block is malformed.
    Metadata {
        path: PathBuf,
        err: frontmatter::Error,
    },

    /// Returned when a content file's effective metadata lacks a required
    /// key.
    MissingKey { path: PathBuf, key: String },

    /// Returned when a metadata key holds a value of the wrong shape.
    InvalidKey {
        path: PathBuf,
        key: String,
        expected: &'static str,
    },

    /// Returned when a content file's target would land outside of the
    /// target directory.
    InvalidTarget { path: PathBuf, target: String },

    /// Returned for errors loading, parsing or executing templates.
    Render { path: PathBuf, err: template::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TargetIsSource(path) => write!(
                f,
                "target directory `{}` is the source directory",
                path.display()
            ),
            Error::Walk(err) => write!(f, "walking source directory: {}", err),
            Error::OutsideSource(path) => {
                write!(f, "`{}` is outside of the source directory", path.display())
            }
            Error::Read { path, err } => {
                write!(f, "reading `{}`: {}", path.display(), err)
            }
            Error::Write { path, err } => {
                write!(f, "writing `{}`: {}", path.display(), err)
            }
            Error::Metadata { path, err } => {
                write!(f, "`{}`: {}", path.display(), err)
            }
            Error::MissingKey { path, key } => write!(
                f,
                "`{}`: required metadata key `{}` not provided",
                path.display(),
                key
            ),
            Error::InvalidKey {
                path,
                key,
                expected,
            } => write!(
                f,
                "`{}`: metadata key `{}` must be {}",
                path.display(),
                key,
                expected
            ),
            Error::InvalidTarget { path, target } => write!(
                f,
                "`{}`: target `{}` must be a relative path inside the target directory",
                path.display(),
                target
            ),
            Error::Render { path, err } => {
                write!(f, "rendering `{}`: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Walk(err) => Some(err),
            Error::Read { path: _, err } => Some(err),
            Error::Write { path: _, err } => Some(err),
            Error::Metadata { path: _, err } => Some(err),
            Error::Render { path: _, err } => Some(err),
            Error::TargetIsSource(_)
            | Error::OutsideSource(_)
            | Error::MissingKey { .. }
            | Error::InvalidKey { .. }
            | Error::InvalidTarget { .. } => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_slash_path() {
        assert_eq!(slash_path(Path::new("blog/a.md")), "blog/a.md");
        assert_eq!(slash_path(Path::new("")), "");
    }

    #[test]
    fn test_sources_skips_nested_target() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().to_owned();
        std::fs::create_dir_all(source.join("out")).unwrap();
        std::fs::create_dir_all(source.join("b")).unwrap();
        std::fs::write(source.join("out/stale.html"), "").unwrap();
        std::fs::write(source.join("b/z.md"), "").unwrap();
        std::fs::write(source.join("a.png"), "").unwrap();

        let config = Config {
            source_directory: source.clone(),
            target_directory: source.join("out"),
            ..Config::default()
        };
        let relative = sources(&config)
            .map(|s| s.map(|s| slash_path(&s.relative)))
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(relative, vec!["a.png", "b/z.md"]);
        Ok(())
    }
}
