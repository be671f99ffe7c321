use unic_ucd::GeneralCategory;

mod error;

pub use self::error::InvalidPathError;

/// The separator used in entry names to imply directories.
pub const SEPARATOR: char = '/';

/// Validate a caller-supplied path for use with the filesystem view.
///
/// Valid paths are relative and already normalized: non-empty, no leading
/// `/`, no empty, `.` or `..` components. Components must not contain
/// control characters or separator characters other than plain space.
/// Violations are rejected, never rewritten; an entry name round-trips
/// through the filesystem exactly as given.
pub fn validate(path: &str) -> Result<(), InvalidPathError> {
    if path.is_empty() {
        return Err(InvalidPathError::EmptyPath);
    }
    if path.starts_with(SEPARATOR) {
        return Err(InvalidPathError::AbsolutePath);
    }

    for segment in path.split(SEPARATOR) {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(InvalidPathError::NonCanonical);
        }
        if segment.chars().any(|c| {
            let cat = GeneralCategory::of(c);
            cat == GeneralCategory::Control || (cat.is_separator() && c != ' ')
        }) {
            return Err(InvalidPathError::UnrepresentableComponent);
        }
    }

    Ok(())
}

/// Iterate over the `/`-separated components of a path.
pub fn segments(path: &str) -> std::str::Split<'_, char> {
    path.split(SEPARATOR)
}

/// The final component of a path.
pub fn file_name(path: &str) -> &str {
    path.rsplit(SEPARATOR).next().unwrap_or(path)
}

/// Whether `name` lies strictly inside the directory implied by `dir`,
/// i.e. `name` starts with `dir` followed by a separator.
pub(crate) fn is_within(dir: &str, name: &str) -> bool {
    name.len() > dir.len() && name.starts_with(dir) && name[dir.len()..].starts_with(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_normalized_relative_paths() {
        assert!(validate("foo.txt").is_ok());
        assert!(validate("dir/sub/file").is_ok());
        assert!(validate("two words/name with spaces.txt").is_ok());
        assert!(validate("this is now العَرَبِيَّة.txt").is_ok());
        assert!(validate("🧊/🧊").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(validate(""), Err(InvalidPathError::EmptyPath));
    }

    #[test]
    fn rejects_absolute() {
        assert_eq!(validate("/etc/passwd"), Err(InvalidPathError::AbsolutePath));
        assert_eq!(validate("/"), Err(InvalidPathError::AbsolutePath));
    }

    #[test]
    fn rejects_non_canonical() {
        assert_eq!(validate("."), Err(InvalidPathError::NonCanonical));
        assert_eq!(validate("a/./b"), Err(InvalidPathError::NonCanonical));
        assert_eq!(validate("invalid/../path"), Err(InvalidPathError::NonCanonical));
        assert_eq!(validate("a//b"), Err(InvalidPathError::NonCanonical));
        assert_eq!(validate("dir/"), Err(InvalidPathError::NonCanonical));
    }

    #[test]
    fn rejects_unrepresentable_characters() {
        assert_eq!(validate("a\nb"), Err(InvalidPathError::UnrepresentableComponent));
        assert_eq!(validate("nul\0"), Err(InvalidPathError::UnrepresentableComponent));
        assert_eq!(
            validate("line\u{2028}sep"),
            Err(InvalidPathError::UnrepresentableComponent)
        );
    }

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(file_name("a/b/c.txt"), "c.txt");
        assert_eq!(file_name("c.txt"), "c.txt");
    }

    #[test]
    fn segments_split_on_the_separator() {
        assert_eq!(segments("a/b/c").collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(segments("solo").collect::<Vec<_>>(), ["solo"]);
    }

    #[test]
    fn is_within_requires_separator_boundary() {
        assert!(is_within("dir", "dir/a.txt"));
        assert!(is_within("dir", "dir/sub/b"));
        assert!(!is_within("dir", "dir"));
        assert!(!is_within("dir", "directory/a"));
        assert!(!is_within("dir/a.txt", "dir/a.txt"));
    }
}
