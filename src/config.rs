//! Build configuration. Settings come from an optional `sitestack.yaml`
//! project file and are then overridden by command-line flags.

use crate::frontmatter::{Format, DEFAULT_DELIMITER};
use serde::Deserialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "sitestack.yaml";

/// Everything the gather and transform passes need to know.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The root of the source tree.
    pub source_directory: PathBuf,

    /// The root of the output tree. Its structure mirrors the source tree.
    pub target_directory: PathBuf,

    /// The key under which the index of every content file's metadata is
    /// made visible to all templates.
    pub global_key: String,

    /// The metadata key naming the template(s) a markdown file renders into.
    pub template_key: String,

    /// The format of front matter blocks in content files.
    pub front_matter: Format,

    /// The literal that separates front matter from body.
    pub delimiter: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            source_directory: PathBuf::from("src"),
            target_directory: PathBuf::from("tgt"),
            global_key: String::from("files"),
            template_key: String::from("template"),
            front_matter: Format::Json,
            delimiter: String::from(DEFAULT_DELIMITER),
        }
    }
}

/// The on-disk shape of [`PROJECT_FILE`]. Every field is optional.
#[derive(Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct Project {
    source: Option<PathBuf>,
    target: Option<PathBuf>,
    global_key: Option<String>,
    template_key: Option<String>,
    front_matter: Option<Format>,
    delimiter: Option<String>,
}

impl Config {
    /// Looks for [`PROJECT_FILE`] in `dir` and then in each of its parents,
    /// loading the first one found. Falls back to [`Config::default`] if
    /// there is none.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        for ancestor in dir.ancestors() {
            let path = ancestor.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path);
            }
        }
        Ok(Config::default())
    }

    /// Loads a project file. Relative `source` and `target` paths are taken
    /// relative to the directory containing the project file.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = std::fs::File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project =
            serde_yaml::from_reader(file).map_err(|err| Error::Parse {
                path: path.to_owned(),
                err,
            })?;

        let root = path.parent().unwrap_or_else(|| Path::new(""));
        let defaults = Config::default();
        Ok(Config {
            source_directory: root
                .join(project.source.unwrap_or(defaults.source_directory)),
            target_directory: root
                .join(project.target.unwrap_or(defaults.target_directory)),
            global_key: project.global_key.unwrap_or(defaults.global_key),
            template_key: project.template_key.unwrap_or(defaults.template_key),
            front_matter: project.front_matter.unwrap_or(defaults.front_matter),
            delimiter: project.delimiter.unwrap_or(defaults.delimiter),
        })
    }

    /// Makes the source and target directories absolute with respect to the
    /// current working directory.
    pub fn absolutize(mut self) -> Result<Config> {
        let cwd = std::env::current_dir().map_err(Error::CurrentDirectory)?;
        self.source_directory = cwd.join(&self.source_directory);
        self.target_directory = cwd.join(&self.target_directory);
        Ok(self)
    }
}

/// The result of loading configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when the project file can't be opened.
    Open { path: PathBuf, err: io::Error },

    /// Returned when the project file isn't valid.
    Parse { path: PathBuf, err: serde_yaml::Error },

    /// Returned when the working directory can't be determined.
    CurrentDirectory(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "opening project file `{}`: {}", path.display(), err)
            }
            Error::Parse { path, err } => {
                write!(f, "loading project file `{}`: {}", path.display(), err)
            }
            Error::CurrentDirectory(err) => {
                write!(f, "determining working directory: {}", err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Parse { path: _, err } => Some(err),
            Error::CurrentDirectory(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_directory_without_project_file() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::from_directory(dir.path())?, Config::default());
        Ok(())
    }

    #[test]
    fn test_from_directory_finds_parent_project_file() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "source: content\ntarget: public\nglobal_key: pages\nfront_matter: yaml\n",
        )
        .unwrap();

        let config = Config::from_directory(&nested)?;
        assert_eq!(config.source_directory, dir.path().join("content"));
        assert_eq!(config.target_directory, dir.path().join("public"));
        assert_eq!(config.global_key, "pages");
        assert_eq!(config.template_key, "template");
        assert_eq!(config.front_matter, Format::Yaml);
        assert_eq!(config.delimiter, DEFAULT_DELIMITER);
        Ok(())
    }

    #[test]
    fn test_from_project_file_rejects_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_FILE);
        std::fs::write(&path, "sauce: content\n").unwrap();
        assert!(matches!(
            Config::from_project_file(&path),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_from_project_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::from_project_file(&dir.path().join(PROJECT_FILE)),
            Err(Error::Open { .. })
        ));
    }
}
