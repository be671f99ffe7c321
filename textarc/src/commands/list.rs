use serde::Serialize;

use textarc_format::{fix_nl, parse_file, Archive};

use crate::cli::ListArgs;
use crate::error::{Error, Result};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ListEntry {
    pub index: usize,
    pub offset: u64,
    pub size: u64,
    pub name: String,
}

/// Compute the listing for an archive. `offset` points at each entry's
/// marker line within the serialized form; `size` is the body length after
/// the append-if-missing rule, since that is what a reader of the
/// serialized archive will see.
pub fn entries(archive: &Archive) -> Vec<ListEntry> {
    let mut offset = fix_nl(&archive.comment).len() as u64;
    let mut out = Vec::with_capacity(archive.len());
    for (index, file) in archive.files.iter().enumerate() {
        let marker_len = ("-- ".len() + file.name.len() + " --\n".len()) as u64;
        let size = fix_nl(&file.data).len() as u64;
        out.push(ListEntry {
            index,
            offset,
            size,
            name: file.name.clone(),
        });
        offset += marker_len + size;
    }
    out
}

pub fn run(args: ListArgs) -> Result<()> {
    let archive = parse_file(&args.archive).map_err(|source| Error::ReadArchive {
        path: args.archive.clone(),
        source,
    })?;

    let listing = entries(&archive);
    if args.json {
        let json = serde_json::to_string_pretty(&listing)
            .map_err(|source| Error::SerializeListing { source })?;
        println!("{json}");
    } else {
        for entry in &listing {
            println!("{} {} {} {}", entry.index, entry.offset, entry.size, entry.name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use textarc_format::parse;

    fn rows(input: &[u8]) -> Vec<(usize, u64, u64, String)> {
        entries(&parse(input))
            .into_iter()
            .map(|e| (e.index, e.offset, e.size, e.name))
            .collect()
    }

    #[test]
    fn offsets_account_for_comment_and_markers() {
        assert_eq!(
            rows(b"comment\n-- file1 --\ncontent1\n-- file2 --\ncontent2\n"),
            [
                (0, 8, 9, "file1".to_string()),
                (1, 29, 9, "file2".to_string()),
            ]
        );
    }

    #[test]
    fn size_reports_the_serialized_body_length() {
        // "abc" has no trailing newline; serialization appends one.
        assert_eq!(
            rows(b"-- file1 --\nabc"),
            [(0, 0, 4, "file1".to_string())]
        );
    }

    #[test]
    fn empty_bodies_stay_empty() {
        assert_eq!(
            rows(b"-- file1 --\n-- file2 --\n"),
            [
                (0, 0, 0, "file1".to_string()),
                (1, 12, 0, "file2".to_string()),
            ]
        );
    }

    #[test]
    fn comment_length_is_measured_after_the_newline_fix() {
        let mut archive = Archive::new();
        archive.set_comment(&b"hdr"[..]);
        archive.set("f", &b"x\n"[..]);
        let listing = entries(&archive);
        // "hdr" serializes as "hdr\n", so the first marker sits at byte 4.
        assert_eq!(listing[0].offset, 4);
        assert_eq!(listing[0].size, 2);
    }
}
