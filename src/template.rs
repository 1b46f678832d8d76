//! Executes Go-style templates (via [`gtmpl`]) against effective metadata.
//!
//! Templates can inline sibling files with the `importcss`, `importjs` and
//! `importhtml` functions, e.g. `<style>{{ importcss "site.css" }}</style>`.
//! Names are resolved against the source directory of the file being
//! rendered. Several template files can be composed into one template set
//! with [`compose`], in which case `{{ define }}` and `{{ template }}` let one
//! file include another.

use crate::value::{to_template_value, Mapping};
use gtmpl::{Context, Template};
use gtmpl_value::{Func, Value};
use std::cell::RefCell;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

thread_local! {
    // Template functions are plain `fn` pointers, so the directory that
    // `import*` resolves against is handed to them out of band.
    static IMPORT_DIRECTORY: RefCell<PathBuf> = RefCell::new(PathBuf::new());
}

/// Sets the import directory for as long as it is alive and restores the
/// previous one when dropped.
struct ImportScope {
    previous: PathBuf,
}

impl ImportScope {
    fn enter(directory: &Path) -> ImportScope {
        let previous =
            IMPORT_DIRECTORY.with(|d| d.replace(directory.to_owned()));
        ImportScope { previous }
    }
}

impl Drop for ImportScope {
    fn drop(&mut self) {
        let previous = std::mem::take(&mut self.previous);
        IMPORT_DIRECTORY.with(|d| d.replace(previous));
    }
}

fn import(args: &[Value]) -> std::result::Result<Value, String> {
    let file_name = match args {
        [Value::String(file_name)] => file_name,
        _ => return Err("import expects a single file name".to_owned()),
    };
    let path = IMPORT_DIRECTORY.with(|d| d.borrow().join(file_name));
    std::fs::read_to_string(&path)
        .map(Value::String)
        .map_err(|e| format!("importing `{}`: {}", path.display(), e))
}

/// Reads each of `template_files` (relative to `directory`) and joins them,
/// in order and separated by a space, into a single template text.
pub fn compose<P: AsRef<Path>>(
    directory: &Path,
    template_files: impl Iterator<Item = P>,
) -> Result<String> {
    let mut contents = String::new();
    for (i, template_file) in template_files.enumerate() {
        let path = directory.join(template_file);
        let text = std::fs::read_to_string(&path)
            .map_err(|err| Error::Read { path, err })?;
        if i > 0 {
            contents.push(' ');
        }
        contents.push_str(&text);
    }
    Ok(contents)
}

/// Parses `text` as a template and executes it against `metadata`. The
/// `import*` functions resolve file names against `directory`.
pub fn render(directory: &Path, text: &str, metadata: &Mapping) -> Result<Vec<u8>> {
    let mut template = Template::default();
    template.add_func("importcss", import as Func);
    template.add_func("importjs", import as Func);
    template.add_func("importhtml", import as Func);
    check_actions_closed(text)?;
    template.parse(text).map_err(Error::Parse)?;

    let context = Context::from(to_template_value(metadata)).map_err(Error::Execute)?;

    let _scope = ImportScope::enter(directory);
    let mut output = Vec::new();
    template
        .execute(&mut output, &context)
        .map_err(Error::Execute)?;
    Ok(output)
}

/// Fails if the last `{{` in `text` is never closed. The parser doesn't
/// terminate on such input when trailing whitespace follows the action.
fn check_actions_closed(text: &str) -> Result<()> {
    match text.rfind("{{") {
        Some(open) if !text[open..].contains("}}") => Err(Error::Parse(format!(
            "unclosed action at byte {}",
            open
        ))),
        _ => Ok(()),
    }
}

/// The result of a fallible templating operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading, parsing or executing a template.
#[derive(Debug)]
pub enum Error {
    /// Returned when a template file can't be read.
    Read { path: PathBuf, err: io::Error },

    /// Returned when the template text is malformed.
    Parse(String),

    /// Returned when executing the template fails, including failures
    /// inside template functions.
    Execute(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err } => {
                write!(f, "reading template file `{}`: {}", path.display(), err)
            }
            Error::Parse(err) => write!(f, "parsing template: {}", err),
            Error::Execute(err) => write!(f, "executing template: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
            Error::Parse(_) => None,
            Error::Execute(_) => None,
        }
    }
}
