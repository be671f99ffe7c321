use std::fs;
use std::io::{self, Write};

use textarc_format::{parse_file, Archive, ArchiveFs};

use crate::cli::CatArgs;
use crate::error::{Error, Result};

/// Resolve the requested names to a concatenated body. Exact paths go
/// through the filesystem view; anything it cannot resolve falls back to
/// matching the request as a glob over entry names. Requests that match
/// nothing are returned for reporting.
pub fn select(archive: &mut Archive, names: &[String]) -> (Vec<u8>, Vec<String>) {
    let view = ArchiveFs::new(archive);
    let mut out = Vec::new();
    let mut missing = Vec::new();

    for request in names {
        match view.read_file(request) {
            Ok(body) => out.extend_from_slice(&body),
            Err(_) => {
                let mut found = false;
                if let Ok(pattern) = glob::Pattern::new(request) {
                    for file in &view.archive().files {
                        if pattern.matches(&file.name) {
                            out.extend_from_slice(&file.data);
                            found = true;
                        }
                    }
                }
                if !found {
                    missing.push(request.clone());
                }
            }
        }
    }

    (out, missing)
}

pub fn run(args: CatArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !args.text {
        let raw = fs::read(&args.archive).map_err(|source| Error::ReadArchive {
            path: args.archive.clone(),
            source,
        })?;
        return out
            .write_all(&raw)
            .map_err(|source| Error::WriteStdout { source });
    }

    let mut archive = parse_file(&args.archive).map_err(|source| Error::ReadArchive {
        path: args.archive.clone(),
        source,
    })?;

    if args.names.is_empty() {
        for file in &archive.files {
            out.write_all(&file.data)
                .map_err(|source| Error::WriteStdout { source })?;
        }
        return Ok(());
    }

    let (body, missing) = select(&mut archive, &args.names);
    out.write_all(&body)
        .map_err(|source| Error::WriteStdout { source })?;
    for request in missing {
        eprintln!("Entry {request} not found in archive");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use textarc_format::parse;

    #[test]
    fn exact_names_resolve_through_the_filesystem_view() {
        let mut archive = parse(b"-- file1 --\ncontent1\n-- file2 --\ncontent2\n");
        let (body, missing) = select(&mut archive, &["file1".to_string()]);
        assert_eq!(body, b"content1\n");
        assert!(missing.is_empty());
    }

    #[test]
    fn globs_concatenate_matches_in_archive_order() {
        let mut archive = parse(b"-- foo.txt --\nfoo\n-- bar.txt --\nbar\n-- baz.go --\nbaz\n");
        let (body, missing) = select(&mut archive, &["*.txt".to_string()]);
        assert_eq!(body, b"foo\nbar\n");
        assert!(missing.is_empty());
    }

    #[test]
    fn unmatched_requests_are_reported() {
        let mut archive = parse(b"-- file1 --\ncontent1\n");
        let (body, missing) = select(&mut archive, &["missing".to_string()]);
        assert!(body.is_empty());
        assert_eq!(missing, ["missing"]);
    }
}
