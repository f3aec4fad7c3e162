//! Output path rendering and story persistence.
//!
//! The filename template may contain path separators (the default
//! `[{author}]/{title}.txt` does), so the writer creates every missing
//! directory above the destination, not just the output directory itself.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from directory creation or file output.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to create directory: {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Substitute literal `{author}` and `{title}` placeholders into the template.
pub fn render_template(template: &str, author: &str, title: &str) -> String {
    template
        .replace("{author}", author)
        .replace("{title}", title)
}

/// Destination path: output directory joined with the rendered template.
pub fn story_path(output_dir: &Path, template: &str, author: &str, title: &str) -> PathBuf {
    output_dir.join(render_template(template, author, title))
}

/// Write the pages to `path`, back-to-back with no inserted separators,
/// overwriting any existing file. Missing parent directories are created.
pub fn write_story(path: &Path, pages: &[String]) -> Result<(), WriteError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    let mut f = File::create(path).map_err(|e| WriteError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    for page in pages {
        f.write_all(page.as_bytes()).map_err(|e| WriteError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}
