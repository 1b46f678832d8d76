//! Splits a leading metadata block off of a source file and parses metadata
//! documents (front matter blocks and directory manifests) into
//! [`Mapping`]s.

use crate::value::Mapping;
use std::fmt;
use std::str::FromStr;

/// The default front matter delimiter. Everything before its first
/// occurrence is metadata; everything after is body.
pub const DEFAULT_DELIMITER: &str = "---\n";

/// Splits `input` at the first occurrence of `delimiter`, returning the
/// metadata block and the body. If the delimiter doesn't occur, the metadata
/// block is empty and the body is the whole input.
pub fn split<'a>(input: &'a str, delimiter: &str) -> (&'a str, &'a str) {
    if delimiter.is_empty() {
        return ("", input);
    }
    match input.find(delimiter) {
        Some(i) => (&input[..i], &input[i + delimiter.len()..]),
        None => ("", input),
    }
}

/// The structured data format of a metadata document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Parses a metadata document. Blank documents parse to an empty
    /// mapping; anything else must be a mapping at the top level.
    pub fn parse(self, input: &str) -> Result<Mapping> {
        if input.trim().is_empty() {
            return Ok(Mapping::new());
        }
        Ok(match self {
            Format::Json => serde_json::from_str(input)?,
            Format::Yaml => serde_yaml::from_str(input)?,
        })
    }
}

impl FromStr for Format {
    type Err = UnknownFormatError;

    fn from_str(s: &str) -> std::result::Result<Format, UnknownFormatError> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            _ => Err(UnknownFormatError(s.to_owned())),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Format {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Format, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        String::deserialize(deserializer)?
            .parse::<Format>()
            .map_err(|e| D::Error::custom(format!("{}", e)))
    }
}

/// Returned when a metadata format name is neither `json` nor `yaml`.
#[derive(Debug)]
pub struct UnknownFormatError(String);

impl fmt::Display for UnknownFormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown metadata format `{}` (expected `json` or `yaml`)", self.0)
    }
}

impl std::error::Error for UnknownFormatError {}

/// The result of parsing a metadata document.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a metadata document.
#[derive(Debug)]
pub enum Error {
    /// Returned when the document is malformed JSON or isn't a JSON object.
    Json(serde_json::Error),

    /// Returned when the document is malformed YAML or isn't a YAML mapping.
    Yaml(serde_yaml::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Json(err) => write!(f, "invalid JSON metadata: {}", err),
            Error::Yaml(err) => write!(f, "invalid YAML metadata: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(err) => Some(err),
            Error::Yaml(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Error {
        Error::Yaml(err)
    }
}
