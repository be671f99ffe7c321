#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPathError {
    #[error("no path provided")]
    EmptyPath,

    #[error("absolute paths cannot address archive entries")]
    AbsolutePath,

    #[error("non-canonical path (empty, `.` or `..` component)")]
    NonCanonical,

    #[error("unrepresentable character in path component")]
    UnrepresentableComponent,
}
