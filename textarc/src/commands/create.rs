use std::io::{self, Write};

use textarc_format::{format_to, Archive};

use crate::cli::CreateArgs;
use crate::error::{Error, Result};
use crate::util::{self, CollectOptions};

pub fn run(args: CreateArgs) -> Result<()> {
    let opts = CollectOptions {
        recursive: args.recursive,
        follow: args.follow,
        trim: args.trim,
        name: args
            .name
            .as_deref()
            .map(util::compile_pattern)
            .transpose()?,
        depth: args.depth,
    };

    let mut archive = Archive::new();
    for root in &args.paths {
        for (name, data) in util::collect_files(root, &opts)? {
            archive.set(name, data);
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    format_to(&archive, &mut out)
        .and_then(|()| out.flush())
        .map_err(|source| Error::WriteStdout { source })
}
