use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, info};

use crate::Result;

pub const START_MARKER: &str = "<!--START_SECTION:prlist-->";
pub const END_MARKER: &str = "<!--END_SECTION:prlist-->";

/// Replace the section between `start` and `end` in `document` with `text`.
///
/// The section runs from the first line that is exactly `start` (a trailing
/// `\r` is allowed) to the nearest `end` after it. It is rewritten as
/// `start`, a newline, `text` (newline-terminated unless empty) and `end`.
/// Everything outside the section, including whatever follows `end`, is kept
/// byte for byte. Without both markers the document is returned as is.
pub fn splice(document: &str, start: &str, end: &str, text: &str) -> String {
    let Some(start_at) = find_at_line_start(document, start) else {
        return document.to_string();
    };
    let body_at = start_at + start.len();
    let Some(end_offset) = document[body_at..].find(end) else {
        return document.to_string();
    };
    let end_at = body_at + end_offset;

    let mut spliced = String::with_capacity(document.len() + text.len());
    spliced.push_str(&document[..start_at]);
    spliced.push_str(start);
    spliced.push('\n');
    spliced.push_str(text);
    if !text.is_empty() && !text.ends_with('\n') {
        spliced.push('\n');
    }
    spliced.push_str(end);
    spliced.push_str(&document[end_at + end.len()..]);
    spliced
}

fn find_at_line_start(document: &str, marker: &str) -> Option<usize> {
    let bytes = document.as_bytes();
    document
        .match_indices(marker)
        .map(|(at, _)| at)
        .find(|&at| {
            let line_start = at == 0 || bytes[at - 1] == b'\n';
            let line_end = matches!(bytes.get(at + marker.len()), None | Some(b'\n' | b'\r'));
            line_start && line_end
        })
}

/// Splice `text` into the prlist section of the file at `path`.
///
/// The file is read completely and only rewritten when its content changes.
/// Returns whether it was rewritten.
pub async fn update_file(path: impl AsRef<Path>, text: &str) -> Result<bool> {
    let path = path.as_ref();
    let mut file = OpenOptions::new().read(true).write(true).open(path).await?;

    let mut original = String::new();
    file.read_to_string(&mut original).await?;

    let updated = splice(&original, START_MARKER, END_MARKER, text);
    if updated == original {
        debug!("No changes for '{}'", path.display());
        return Ok(false);
    }

    file.seek(SeekFrom::Start(0)).await?;
    file.set_len(0).await?;
    file.write_all(updated.as_bytes()).await?;
    file.flush().await?;

    info!("Updated '{}'", path.display());
    Ok(true)
}
