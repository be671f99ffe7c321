use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "textarc",
    about = "Create, inspect and modify textarc text archives.",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(visible_alias = "c", about = "Create a new archive from files on disk")]
    Create(CreateArgs),

    #[command(visible_aliases = ["l", "ls"], about = "List entries with offsets and sizes")]
    List(ListArgs),

    #[command(visible_aliases = ["a", "append"], about = "Add files to an existing archive")]
    Add(AddArgs),

    #[command(visible_aliases = ["rm", "del"], about = "Delete entries from an archive")]
    Delete(DeleteArgs),

    #[command(about = "Print the raw archive, or entry bodies from inside it")]
    Cat(CatArgs),

    #[command(about = "Show or replace the archive comment")]
    Comment(CommentArgs),
}

#[derive(Debug, clap::Args)]
pub struct CreateArgs {
    /// Recurse into directories
    #[arg(short, long)]
    pub recursive: bool,

    /// Store paths relative to each scanned root
    #[arg(short, long)]
    pub trim: bool,

    /// Follow symbolic links (skipped otherwise)
    #[arg(short = 'L', long)]
    pub follow: bool,

    /// Only include files whose base name matches the glob pattern
    #[arg(long, value_name = "PATTERN")]
    pub name: Option<String>,

    /// Maximum directory depth below each root
    #[arg(long, value_name = "N")]
    pub depth: Option<usize>,

    /// Files and directories to archive
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct ListArgs {
    /// Archive to list
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Emit the listing as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct AddArgs {
    /// Recurse into directories
    #[arg(short, long)]
    pub recursive: bool,

    /// Follow symbolic links (skipped otherwise)
    #[arg(short = 'L', long)]
    pub follow: bool,

    /// Archive to modify; created if it does not exist
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Files to add
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct DeleteArgs {
    /// Archive to modify
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Entry names to delete; glob patterns select matching entries
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,
}

#[derive(Debug, clap::Args)]
pub struct CatArgs {
    /// Print entry bodies instead of the raw archive
    #[arg(short = 't', long)]
    pub text: bool,

    /// Archive to read
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Entries to print (all of them when omitted); globs allowed
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,
}

#[derive(Debug, clap::Args)]
pub struct CommentArgs {
    /// Replace the comment with this text
    #[arg(short, long, value_name = "TEXT")]
    pub comment: Option<String>,

    /// Replace the comment with the contents of this file (`-` for stdin)
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Archive to read or modify
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}
