//! Path classification: junk directories, hidden entries, image content.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// System/junk directory names that are never descended into, matched
/// case-sensitively against the entry name. Covers trash markers,
/// volume-mount metadata stores, and temporary-item folders.
const SKIP_DIRS: &[&str] = &[
    ".Trashes",
    "$RECYCLE.BIN",
    "System Volume Information",
    ".TemporaryItems",
    ".Spotlight-V100",
    ".fseventsd",
    ".DocumentRevisions-V100",
    "lost+found",
];

/// Hidden by platform convention: leading-dot name. Hidden entries are
/// excluded unconditionally, independent of the skip list.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// True for the fixed set of system/junk directory names (exact match).
pub fn is_skippable_dir(name: &str) -> bool {
    SKIP_DIRS.contains(&name)
}

/// True only for regular files whose *content* sniffs as an image.
///
/// The first bytes are checked against known image magic numbers rather than
/// trusting the extension, so a renamed text file named `cat.png` is rejected
/// while a real JPEG with an odd extension is accepted. Unreadable files
/// classify as false.
pub fn is_image_file(path: &Path) -> bool {
    let metadata = match path.metadata() {
        Ok(m) => m,
        Err(_) => return false,
    };
    if !metadata.is_file() {
        return false;
    }

    let mut header = [0u8; 32];
    let read = match File::open(path).and_then(|mut f| f.read(&mut header)) {
        Ok(n) => n,
        Err(_) => return false,
    };

    image::guess_format(&header[..read]).is_ok()
}
