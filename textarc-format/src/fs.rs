//! A writable virtual filesystem view over an [`Archive`].
//!
//! Directories are never stored: they are computed from the `/`-separated
//! entry names present at query time, so they appear and disappear with
//! the entries that imply them.

use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Write};

use crate::path::{self, InvalidPathError};
use crate::Archive;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid path `{path}`")]
    InvalidPath {
        path: String,
        #[source]
        source: InvalidPathError,
    },

    #[error("no entry named `{path}`")]
    NotFound { path: String },

    #[error("`{path}` conflicts with an existing directory")]
    DirectoryConflict { path: String },

    #[error("`{path}` is a directory")]
    IsADirectory { path: String },

    #[error("`{path}` is not a directory")]
    NotADirectory { path: String },
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        let kind = match &err {
            Error::InvalidPath { .. } => io::ErrorKind::InvalidInput,
            Error::NotFound { .. } => io::ErrorKind::NotFound,
            Error::DirectoryConflict { .. } => io::ErrorKind::AlreadyExists,
            Error::IsADirectory { .. } => io::ErrorKind::IsADirectory,
            Error::NotADirectory { .. } => io::ErrorKind::NotADirectory,
        };
        io::Error::new(kind, err)
    }
}

fn checked(p: &str) -> Result<()> {
    path::validate(p).map_err(|source| Error::InvalidPath {
        path: p.to_string(),
        source,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    name: String,
    kind: EntryKind,
    len: u64,
}

impl Metadata {
    /// The final path segment of the entry.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Stored body length in bytes; zero for directories.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// One name in a directory listing: the next path segment below the listed
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// An opened path: entry bytes, or a synthesized directory listing.
#[derive(Debug)]
pub enum Entry {
    File(EntryReader),
    Directory { name: String, entries: Vec<DirEntry> },
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        matches!(self, Entry::Directory { .. })
    }

    pub fn metadata(&self) -> Metadata {
        match self {
            Entry::File(reader) => Metadata {
                name: path::file_name(&reader.name).to_string(),
                kind: EntryKind::File,
                len: reader.data.get_ref().len() as u64,
            },
            Entry::Directory { name, .. } => Metadata {
                name: name.clone(),
                kind: EntryKind::Directory,
                len: 0,
            },
        }
    }
}

/// A readable handle over an entry's bytes.
#[derive(Debug)]
pub struct EntryReader {
    name: String,
    data: Cursor<Vec<u8>>,
}

impl EntryReader {
    /// The full entry name as stored in the archive.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Read for EntryReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.data.read(out)
    }
}

/// Directory-tree semantics over the flat name → bytes mapping of one
/// [`Archive`].
///
/// The view borrows the archive exclusively: every mutation made through it
/// lands directly in the archive, and the owner sees the result the moment
/// the view goes away. Anyone needing interleaved direct access constructs
/// a fresh view afterwards.
#[derive(Debug)]
pub struct ArchiveFs<'a> {
    archive: &'a mut Archive,
}

impl<'a> ArchiveFs<'a> {
    pub fn new(archive: &'a mut Archive) -> ArchiveFs<'a> {
        ArchiveFs { archive }
    }

    pub fn archive(&self) -> &Archive {
        self.archive
    }

    /// Open a path for reading. An exact name match opens the entry's
    /// bytes; a path implied as a directory by deeper names opens a
    /// synthesized, read-only listing. `"."` is the root directory.
    pub fn open(&self, p: &str) -> Result<Entry> {
        if p == "." {
            return Ok(Entry::Directory {
                name: ".".to_string(),
                entries: self.list_dir(None),
            });
        }
        checked(p)?;
        if let Some(file) = self.archive.get(p) {
            return Ok(Entry::File(EntryReader {
                name: file.name.clone(),
                data: Cursor::new(file.data.clone()),
            }));
        }
        if self.implies_dir(p) {
            return Ok(Entry::Directory {
                name: path::file_name(p).to_string(),
                entries: self.list_dir(Some(p)),
            });
        }
        Err(Error::NotFound {
            path: p.to_string(),
        })
    }

    pub fn stat(&self, p: &str) -> Result<Metadata> {
        Ok(self.open(p)?.metadata())
    }

    /// List a directory: the union, over all entry names below `p`, of the
    /// next path segment. Sorted by name.
    pub fn read_dir(&self, p: &str) -> Result<Vec<DirEntry>> {
        if p == "." {
            return Ok(self.list_dir(None));
        }
        checked(p)?;
        if self.implies_dir(p) {
            return Ok(self.list_dir(Some(p)));
        }
        if self.archive.get(p).is_some() {
            return Err(Error::NotADirectory {
                path: p.to_string(),
            });
        }
        Err(Error::NotFound {
            path: p.to_string(),
        })
    }

    /// Read an entry's bytes by exact name.
    pub fn read_file(&self, p: &str) -> Result<Vec<u8>> {
        checked(p)?;
        if let Some(file) = self.archive.get(p) {
            return Ok(file.data.clone());
        }
        if self.implies_dir(p) {
            return Err(Error::IsADirectory {
                path: p.to_string(),
            });
        }
        Err(Error::NotFound {
            path: p.to_string(),
        })
    }

    /// Begin writing the entry at `p`. The path shape is validated now;
    /// whether it collides with a directory implied by other entries is
    /// only checked when the handle commits. Nothing reaches the archive
    /// until [`EntryWriter::close`] succeeds.
    pub fn create(&mut self, p: &str) -> Result<EntryWriter<'_>> {
        checked(p)?;
        Ok(EntryWriter {
            archive: &mut *self.archive,
            path: p.to_string(),
            buf: Vec::new(),
        })
    }

    /// Delete the entry with exactly this name. Directories implied solely
    /// by it vanish from subsequent listings on their own.
    pub fn remove(&mut self, p: &str) -> Result<()> {
        checked(p)?;
        if !self.archive.delete(p) {
            return Err(Error::NotFound {
                path: p.to_string(),
            });
        }
        tracing::debug!(path = p, "removed entry");
        Ok(())
    }

    /// Move the entry at `from` to `to`, preserving its bytes exactly. All
    /// validation happens before any mutation; on error the archive is
    /// untouched.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        checked(from)?;
        checked(to)?;
        let data = match self.archive.get(from) {
            Some(file) => file.data.clone(),
            None => {
                return Err(Error::NotFound {
                    path: from.to_string(),
                })
            }
        };
        if from == to {
            return Ok(());
        }
        self.archive.set(to, data);
        self.archive.delete(from);
        tracing::debug!(from, to, "renamed entry");
        Ok(())
    }

    fn implies_dir(&self, p: &str) -> bool {
        self.archive
            .files
            .iter()
            .any(|f| path::is_within(p, &f.name))
    }

    fn list_dir(&self, dir: Option<&str>) -> Vec<DirEntry> {
        let mut entries: BTreeMap<&str, EntryKind> = BTreeMap::new();
        for file in &self.archive.files {
            let below = match dir {
                None => file.name.as_str(),
                Some(d) => match file
                    .name
                    .strip_prefix(d)
                    .and_then(|rest| rest.strip_prefix(path::SEPARATOR))
                {
                    Some(rest) => rest,
                    None => continue,
                },
            };
            if below.is_empty() {
                continue;
            }
            let (segment, kind) = match below.split_once(path::SEPARATOR) {
                Some((segment, _)) => (segment, EntryKind::Directory),
                None => (below, EntryKind::File),
            };
            if segment.is_empty() {
                continue;
            }
            // A segment that is both an entry and a directory prefix lists
            // as a directory.
            entries
                .entry(segment)
                .and_modify(|kind_slot| {
                    if kind == EntryKind::Directory {
                        *kind_slot = EntryKind::Directory;
                    }
                })
                .or_insert(kind);
        }
        entries
            .into_iter()
            .map(|(name, kind)| DirEntry {
                name: name.to_string(),
                kind,
            })
            .collect()
    }
}

/// A buffering write handle returned by [`ArchiveFs::create`].
///
/// Bytes accumulate privately; the entry is installed into the archive only
/// by a successful [`close`](EntryWriter::close). Dropping the handle
/// without closing abandons the write and leaves the archive unchanged.
#[derive(Debug)]
pub struct EntryWriter<'a> {
    archive: &'a mut Archive,
    path: String,
    buf: Vec<u8>,
}

impl EntryWriter<'_> {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Commit the buffered bytes. Fails, leaving the archive unmodified, if
    /// the path collides with a directory implied by another entry's name.
    pub fn close(self) -> Result<()> {
        if self
            .archive
            .files
            .iter()
            .any(|f| path::is_within(&self.path, &f.name))
        {
            return Err(Error::DirectoryConflict { path: self.path });
        }
        tracing::debug!(path = %self.path, bytes = self.buf.len(), "committed entry");
        self.archive.set(self.path, self.buf);
        Ok(())
    }
}

impl Write for EntryWriter<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
