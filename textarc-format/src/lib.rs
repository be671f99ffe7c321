mod archive;
mod de;
pub mod fs;
pub mod path;
pub mod reader;
mod ser;

pub use archive::{Archive, File};
pub use de::{parse, parse_file};
pub use fs::ArchiveFs;
pub use reader::{FileHeader, StreamReader};
pub use ser::{fix_nl, format, format_to};
