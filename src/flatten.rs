/*!
 * Path flattening
 *
 * Maps a file path below the manifest root to a single flat file name by
 * joining its components with [`JOIN_MARKER`]. Names that already contain the
 * marker are not escaped, so `a@b.txt` and `a/b.txt` collide; the later copy
 * wins.
 */

use std::path::{Path, PathBuf};

/// Character that replaces path separators in flattened names
pub const JOIN_MARKER: char = '@';

/// Subdirectory of the fan-out target that receives visual files
pub const VISUAL_DIR: &str = "visual";

/// Extensions (lowercase, with dot) routed to [`VISUAL_DIR`]
pub const VISUAL_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".pdf"];

const SEPARATORS: [char; 2] = ['/', '\\'];

/// Flatten `file` relative to `root`
pub fn flatten(root: &Path, file: &Path) -> String {
    flatten_relative(&relative_path(root, file).to_string_lossy())
}

/// Flatten an already relative path string
///
/// A bare name is returned unchanged. Otherwise `.` segments are dropped and
/// both separator styles become [`JOIN_MARKER`].
pub fn flatten_relative(relative: &str) -> String {
    if !relative.contains(SEPARATORS) {
        return relative.to_string();
    }

    let marker = JOIN_MARKER.to_string();
    relative
        .split(SEPARATORS)
        .filter(|segment| *segment != ".")
        .collect::<Vec<_>>()
        .join(marker.as_str())
}

/// Path of `file` relative to `root`, falling back to `file` itself
pub fn relative_path(root: &Path, file: &Path) -> PathBuf {
    pathdiff::diff_paths(file, root).unwrap_or_else(|| file.to_path_buf())
}

/// Whether a (flattened) name is an image or document preview
pub fn is_visual_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    VISUAL_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
