use std::fs;
use std::io::ErrorKind;

use textarc_format::{format, parse_file, Archive};

use crate::cli::AddArgs;
use crate::error::{Error, Result};
use crate::util::{self, CollectOptions};

pub fn run(args: AddArgs) -> Result<()> {
    let mut archive = match parse_file(&args.archive) {
        Ok(archive) => archive,
        Err(source) if source.kind() == ErrorKind::NotFound => Archive::new(),
        Err(source) => {
            return Err(Error::ReadArchive {
                path: args.archive.clone(),
                source,
            })
        }
    };

    let opts = CollectOptions {
        recursive: args.recursive,
        follow: args.follow,
        ..CollectOptions::default()
    };

    for path in &args.paths {
        if path.is_dir() && !args.recursive {
            eprintln!("Skipping directory {} (use -r)", path.display());
            continue;
        }
        for (name, data) in util::collect_files(path, &opts)? {
            archive.set(name, data);
        }
    }

    fs::write(&args.archive, format(&archive)).map_err(|source| Error::WriteArchive {
        path: args.archive.clone(),
        source,
    })
}
