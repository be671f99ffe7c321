use std::fs;

use textarc_format::{format, parse_file, Archive};

use crate::cli::DeleteArgs;
use crate::error::{Error, Result};
use crate::util;

/// Expand the requested names against the archive: glob patterns select
/// every matching entry name, plain names pass through as-is.
pub fn selection(archive: &Archive, names: &[String]) -> Result<Vec<String>> {
    let mut selected = Vec::new();
    for request in names {
        if util::is_glob(request) {
            let pattern = util::compile_pattern(request)?;
            selected.extend(
                archive
                    .files
                    .iter()
                    .map(|f| f.name.clone())
                    .filter(|name| pattern.matches(name)),
            );
        } else {
            selected.push(request.clone());
        }
    }
    Ok(selected)
}

pub fn run(args: DeleteArgs) -> Result<()> {
    let mut archive = parse_file(&args.archive).map_err(|source| Error::ReadArchive {
        path: args.archive.clone(),
        source,
    })?;

    for name in selection(&archive, &args.names)? {
        archive.delete(&name);
    }

    fs::write(&args.archive, format(&archive)).map_err(|source| Error::WriteArchive {
        path: args.archive.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use textarc_format::parse;

    #[test]
    fn plain_names_pass_through() {
        let archive = parse(b"-- a.txt --\n1\n-- b.txt --\n2\n");
        let selected = selection(&archive, &["a.txt".to_string(), "missing".to_string()]).unwrap();
        assert_eq!(selected, ["a.txt", "missing"]);
    }

    #[test]
    fn globs_select_matching_entries() {
        let archive = parse(b"-- a.txt --\n1\n-- b.txt --\n2\n-- c.go --\n3\n");
        let selected = selection(&archive, &["*.txt".to_string()]).unwrap();
        assert_eq!(selected, ["a.txt", "b.txt"]);
    }

    #[test]
    fn invalid_patterns_are_reported() {
        let archive = parse(b"-- a.txt --\n1\n");
        assert!(matches!(
            selection(&archive, &["[".to_string()]),
            Err(Error::InvalidPattern { .. })
        ));
    }
}
