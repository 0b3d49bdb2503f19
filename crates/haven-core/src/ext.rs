//! Canonical filename extension resolution.
//!
//! Every other component keys off the extension returned here, so the rules
//! are stricter than `Path::extension`: compound archive suffixes are kept
//! whole, split-archive volume numbers are preserved, and the result is
//! always lower case.

/// Extensions eligible for image thumbnailing.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".webp", ".jpg", ".jpeg", ".gif", ".png", ".tiff", ".tif", ".svg",
];

/// Extensions eligible for video thumbnailing.
pub const VIDEO_EXTENSIONS: &[&str] = &[".webm", ".mp4", ".wmv", ".avi", ".mov", ".mkv"];

/// Compound extensions that must be kept whole instead of truncated at the
/// last dot. Must stay lower case; first match in list order wins.
const PRESERVED_EXTENSIONS: &[&str] = &[
    ".tar.gz", ".tar.z", ".tar.bz2", ".tar.lzma", ".tar.lzo", ".tar.xz",
];

/// Resolve the canonical extension of `filename`, including the leading dot.
///
/// Returns `""` for names without an extension; dotfiles with no further
/// suffix (`.DS_Store`) count as extension-less. Total and pure: never fails,
/// performs no I/O.
pub fn extname(filename: &str) -> String {
    // A dot only separates an extension when something precedes it.
    if !filename.chars().skip(1).any(|c| c == '.') {
        return String::new();
    }

    let lower = filename.to_lowercase();

    // Split archives keep their numeric volume suffix (.001, .002, ...) on
    // top of whatever the rest of the name resolves to.
    let (stem, volume) = split_volume_suffix(&lower);

    for preserved in PRESERVED_EXTENSIONS {
        if stem.ends_with(preserved) {
            return format!("{preserved}{volume}");
        }
    }

    match stem.rfind('.') {
        Some(idx) if idx > 0 => format!("{}{}", &stem[idx..], volume),
        _ => volume.to_string(),
    }
}

/// Split a trailing `.NNN` volume suffix (exactly three digits) off `name`.
fn split_volume_suffix(name: &str) -> (&str, &str) {
    let bytes = name.as_bytes();
    if bytes.len() >= 4 {
        let split = bytes.len() - 4;
        if bytes[split] == b'.' && bytes[split + 1..].iter().all(u8::is_ascii_digit) {
            return (&name[..split], &name[split..]);
        }
    }
    (name, "")
}

/// The stable key linking a stored file to its thumbnail and cache entry:
/// the filename segment preceding the first `.`.
pub fn identifier(filename: &str) -> &str {
    filename.split('.').next().unwrap_or(filename)
}

/// Whether `ext` (as returned by [`extname`]) is an image extension.
pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}

/// Whether `ext` (as returned by [`extname`]) is a video extension.
pub fn is_video_extension(ext: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&ext)
}

/// Whether a file with extension `ext` can ever carry a thumbnail,
/// regardless of which thumbnail types are enabled.
pub fn is_media_extension(ext: &str) -> bool {
    is_image_extension(ext) || is_video_extension(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_extension() {
        assert_eq!(extname("photo.jpg"), ".jpg");
        assert_eq!(extname("a.b.c"), ".c");
    }

    #[test]
    fn lower_cases_result() {
        assert_eq!(extname("PHOTO.JPG"), ".jpg");
        assert_eq!(extname("Archive.TAR.GZ"), ".tar.gz");
    }

    #[test]
    fn no_extension() {
        assert_eq!(extname("noext"), "");
        assert_eq!(extname(""), "");
    }

    #[test]
    fn dotfiles_without_suffix_are_extensionless() {
        assert_eq!(extname(".DS_Store"), "");
        assert_eq!(extname(".vimrc"), "");
        // a dotfile with a real suffix still resolves
        assert_eq!(extname(".config.json"), ".json");
    }

    #[test]
    fn preserved_compound_extensions() {
        assert_eq!(extname("backup.tar.gz"), ".tar.gz");
        assert_eq!(extname("backup.tar.bz2"), ".tar.bz2");
        assert_eq!(extname("backup.tar.xz"), ".tar.xz");
        assert_eq!(extname("backup.tar.z"), ".tar.z");
        assert_eq!(extname("backup.tar.lzma"), ".tar.lzma");
        assert_eq!(extname("backup.tar.lzo"), ".tar.lzo");
    }

    #[test]
    fn volume_suffix_preserved() {
        assert_eq!(extname("archive.tar.gz.001"), ".tar.gz.001");
        assert_eq!(extname("x.tar.gz.007"), ".tar.gz.007");
        assert_eq!(extname("movie.mkv.042"), ".mkv.042");
    }

    #[test]
    fn volume_suffix_requires_exactly_three_digits() {
        assert_eq!(extname("a.b.0001"), ".0001");
        assert_eq!(extname("a.b.01"), ".01");
        assert_eq!(extname("a.b.01x"), ".01x");
    }

    #[test]
    fn volume_suffix_without_base_extension() {
        // the remainder "part" has no dot, so only the volume survives
        assert_eq!(extname("part.001"), ".001");
    }

    #[test]
    fn idempotent_on_compound_results() {
        for name in ["backup.tar.gz", "x.tar.gz.007", "a.tar.bz2.001"] {
            let ext = extname(name);
            assert_eq!(extname(&ext), ext, "extname not idempotent for {name}");
        }
    }

    #[test]
    fn identifier_is_leading_segment() {
        assert_eq!(identifier("abcdef.tar.gz.001"), "abcdef");
        assert_eq!(identifier("abcdef.png"), "abcdef");
        assert_eq!(identifier("noext"), "noext");
        assert_eq!(identifier(".DS_Store"), "");
    }

    #[test]
    fn extension_sets() {
        assert!(is_image_extension(".png"));
        assert!(is_video_extension(".mkv"));
        assert!(!is_image_extension(".mkv"));
        assert!(!is_video_extension(".tar.gz"));
        assert!(is_media_extension(".webm"));
        assert!(!is_media_extension(""));
    }
}
