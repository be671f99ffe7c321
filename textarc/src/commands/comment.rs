use std::fs;
use std::io::{self, Read, Write};

use textarc_format::{format, parse_file};

use crate::cli::CommentArgs;
use crate::error::{Error, Result};

pub fn run(args: CommentArgs) -> Result<()> {
    let mut archive = parse_file(&args.archive).map_err(|source| Error::ReadArchive {
        path: args.archive.clone(),
        source,
    })?;

    let replacement = match (&args.comment, &args.file) {
        (None, None) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            return out
                .write_all(&archive.comment)
                .map_err(|source| Error::WriteStdout { source });
        }
        (Some(_), Some(_)) => return Err(Error::CommentSourceConflict),
        (Some(text), None) => text.clone().into_bytes(),
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|source| Error::ReadStdin { source })?;
            buf
        }
        (None, Some(path)) => fs::read(path).map_err(|source| Error::ReadFile {
            path: path.clone(),
            source,
        })?,
    };

    archive.set_comment(replacement);
    fs::write(&args.archive, format(&archive)).map_err(|source| Error::WriteArchive {
        path: args.archive.clone(),
        source,
    })
}
