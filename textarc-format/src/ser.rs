use std::borrow::Cow;
use std::io::{self, Write};

use crate::Archive;

/// Append a single `\n` if `data` is non-empty and does not already end
/// with one. Applied to the comment and every entry body at serialization
/// time; stored bytes are never touched.
pub fn fix_nl(data: &[u8]) -> Cow<'_, [u8]> {
    if data.is_empty() || data.ends_with(b"\n") {
        Cow::Borrowed(data)
    } else {
        let mut fixed = Vec::with_capacity(data.len() + 1);
        fixed.extend_from_slice(data);
        fixed.push(b'\n');
        Cow::Owned(fixed)
    }
}

/// Serialize an archive to a buffer. Total and deterministic.
///
/// Entry names are emitted verbatim inside their marker lines; a name
/// containing a newline corrupts the framing. See [`Archive::set`].
pub fn format(archive: &Archive) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&fix_nl(&archive.comment));
    for file in &archive.files {
        out.extend_from_slice(b"-- ");
        out.extend_from_slice(file.name.as_bytes());
        out.extend_from_slice(b" --\n");
        out.extend_from_slice(&fix_nl(&file.data));
    }
    out
}

/// Serialize an archive to a sequential byte sink.
pub fn format_to<W: Write>(archive: &Archive, writer: &mut W) -> io::Result<()> {
    writer.write_all(&fix_nl(&archive.comment))?;
    for file in &archive.files {
        writeln!(writer, "-- {} --", file.name)?;
        writer.write_all(&fix_nl(&file.data))?;
    }
    Ok(())
}
