use std::path::PathBuf;

use miette::Diagnostic;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum Error {
    #[error("Cannot read archive `{}`", path.display())]
    #[diagnostic(help("Does the file exist and is it readable?"))]
    ReadArchive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write archive `{}`", path.display())]
    WriteArchive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read file `{}`", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot walk directory `{}`", path.display())]
    WalkDirectory {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Invalid glob pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Unrepresentable file name `{}`", path.display())]
    #[diagnostic(help("Archive entry names must be valid UTF-8"))]
    UnrepresentableName { path: PathBuf },

    #[error("Cannot specify both --comment and --file")]
    #[diagnostic(help("Pass the new comment either inline or from a file, not both"))]
    CommentSourceConflict,

    #[error("Cannot read from stdin")]
    ReadStdin {
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write to stdout")]
    WriteStdout {
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot serialize listing")]
    SerializeListing {
        #[source]
        source: serde_json::Error,
    },
}
