/*!
 * Utility functions for dirflat
 */

use crate::manifest::Manifest;

/// Count listed files for progress tracking
pub fn count_files(manifest: &Manifest) -> u64 {
    manifest
        .iter()
        .map(|(_, entry)| entry.files.len() as u64)
        .sum()
}

/// Format a count with thousands separators, e.g. `12,345`
pub fn format_thousands(num: usize) -> String {
    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestEntry;
    use std::path::PathBuf;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(80_001), "80,001");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_count_files() {
        let mut manifest = Manifest::new();
        manifest.insert(
            PathBuf::from("/a"),
            ManifestEntry {
                dirs: vec!["b".into()],
                files: vec!["1".into(), "2".into()],
            },
        );
        manifest.insert(
            PathBuf::from("/a/b"),
            ManifestEntry {
                dirs: vec![],
                files: vec!["3".into()],
            },
        );
        assert_eq!(count_files(&manifest), 3);
    }
}
