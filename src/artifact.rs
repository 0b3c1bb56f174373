//! Markdown download artifacts for generated content.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};

use crate::Result;

/// MIME type of a generated artifact.
pub const MARKDOWN_MIME: &str = "text/markdown";

/// Timestamp layout used in artifact file names.
const FILENAME_TIMESTAMP: &str = "%Y%m%d-%H%M%S";

/// `{content_type}_{YYYYMMDD-HHMMSS}.md`
pub fn artifact_filename<Tz>(content_type: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{content_type}_{}.md", at.format(FILENAME_TIMESTAMP))
}

/// Write `text` into `dir` under its artifact file name; returns the path.
///
/// Creates `dir` if needed. Existing files are never overwritten: when the
/// name is taken (same content type within the same second) a `-2`, `-3`,
/// ... suffix is appended before the extension.
pub fn write_artifact<Tz>(
    dir: &Path,
    content_type: &str,
    text: &str,
    at: &DateTime<Tz>,
) -> Result<PathBuf>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    fs::create_dir_all(dir)?;
    let base = artifact_filename(content_type, at);
    let stem = base.trim_end_matches(".md");

    let mut attempt = 1u32;
    loop {
        let path = if attempt == 1 {
            dir.join(&base)
        } else {
            dir.join(format!("{stem}-{attempt}.md"))
        };
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(text.as_bytes())?;
                tracing::debug!(path = %path.display(), mime = MARKDOWN_MIME, "wrote artifact");
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}
