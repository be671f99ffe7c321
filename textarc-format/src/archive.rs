/// A single named entry in an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
    /// The entry name. May contain `/` to imply a directory path; must be
    /// renderable as a single text line.
    pub name: String,

    /// The entry body, stored exactly as provided. Trailing-newline
    /// normalization happens at serialization time only.
    pub data: Vec<u8>,
}

/// An in-memory archive: a leading free-form comment plus an ordered,
/// name-unique sequence of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
    /// Comment bytes preceding the first marker line, stored as written.
    pub comment: Vec<u8>,

    /// Entries in archive order. Names are unique; [`Archive::set`] keeps
    /// an updated entry at its existing position.
    pub files: Vec<File>,
}

impl Archive {
    pub fn new() -> Archive {
        Archive::default()
    }

    /// Insert an entry, or overwrite an existing entry of the same name in
    /// place without changing its position.
    ///
    /// The name is not validated: a name containing a newline (or one that
    /// renders as a marker line on its own) will corrupt the serialized
    /// framing produced by [`format`](crate::format). Names arriving through
    /// [`ArchiveFs`](crate::ArchiveFs) are validated before they get here.
    pub fn set(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        let name = name.into();
        let data = data.into();
        match self.files.iter_mut().find(|f| f.name == name) {
            Some(file) => file.data = data,
            None => self.files.push(File { name, data }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&File> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Remove the entry with exactly this name, collapsing the sequence.
    /// Returns whether an entry was removed.
    pub fn delete(&mut self, name: &str) -> bool {
        let len = self.files.len();
        self.files.retain(|f| f.name != name);
        self.files.len() != len
    }

    /// Replace the comment. Stored as given; a missing trailing newline is
    /// appended only when the archive is serialized.
    pub fn set_comment(&mut self, comment: impl Into<Vec<u8>>) {
        self.comment = comment.into();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
