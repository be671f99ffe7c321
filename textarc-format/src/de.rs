use std::fs;
use std::io;
use std::path::Path;

use memmap2::Mmap;

use crate::Archive;

pub(crate) const MARKER_PREFIX: &[u8] = b"-- ";
pub(crate) const MARKER_SUFFIX: &[u8] = b" --";

/// Test whether `line` is a marker line and extract the entry name.
///
/// The line may carry its terminator: an optional trailing `\n` is stripped,
/// then an optional `\r`. What remains must be `-- <name> --` with the
/// prefix and suffix not overlapping and `<name>` non-empty after trimming.
/// Anything else, including `--  --` and `-- x ---`, is ordinary content.
pub(crate) fn marker_name(line: &[u8]) -> Option<&str> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.len() < MARKER_PREFIX.len() + MARKER_SUFFIX.len() {
        return None;
    }
    if !line.starts_with(MARKER_PREFIX) || !line.ends_with(MARKER_SUFFIX) {
        return None;
    }
    let inner = &line[MARKER_PREFIX.len()..line.len() - MARKER_SUFFIX.len()];
    let name = std::str::from_utf8(inner).ok()?.trim();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Parse a whole buffer into an [`Archive`]. Total: every input is a valid
/// archive, and no line is ever dropped.
///
/// Everything before the first marker line is the comment, stored as
/// written. Each marker opens an entry whose body runs to the next marker
/// or the end of the buffer; bodies are stored exactly as they appear, with
/// no trailing-newline normalization on read. A duplicated name keeps the
/// first occurrence's position and the last occurrence's body.
pub fn parse(data: &[u8]) -> Archive {
    let mut archive = Archive::new();
    let (comment, mut name, mut rest) = find_marker(data);
    archive.comment = comment.to_vec();
    while let Some(n) = name {
        let (body, next_name, next_rest) = find_marker(rest);
        archive.set(n, body);
        name = next_name;
        rest = next_rest;
    }
    archive
}

/// Split `data` at the first marker line: the bytes before it, the marker's
/// name, and the bytes after the marker line. With no marker present, all
/// of `data` is "before".
fn find_marker(data: &[u8]) -> (&[u8], Option<&str>, &[u8]) {
    let mut i = 0;
    loop {
        let line_end = match data[i..].iter().position(|&b| b == b'\n') {
            Some(j) => i + j + 1,
            None => data.len(),
        };
        if let Some(name) = marker_name(&data[i..line_end]) {
            return (&data[..i], Some(name), &data[line_end..]);
        }
        if line_end == data.len() {
            return (data, None, &data[data.len()..]);
        }
        i = line_end;
    }
}

/// Parse an archive file by memory-mapping it.
///
/// Byte-for-byte equivalent to [`parse`] of the file's contents.
pub fn parse_file<P: AsRef<Path>>(path: P) -> io::Result<Archive> {
    let file = fs::File::open(path.as_ref())?;
    // A zero-length mapping is invalid; an empty file is an empty archive.
    if file.metadata()?.len() == 0 {
        return Ok(Archive::new());
    }
    let map = unsafe { Mmap::map(&file)? };
    let archive = parse(&map);
    tracing::debug!(
        path = %path.as_ref().display(),
        bytes = map.len(),
        files = archive.len(),
        "parsed archive from mapped file"
    );
    Ok(archive)
}
