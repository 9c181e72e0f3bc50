//! Cache-safe filename sanitization.
//!
//! Cache file names embed the source file's stem, and the cache
//! directory may be served directly (the original use case is an
//! `<img src>` pointing straight at a cache path). The stem is
//! therefore reduced to a conservative character set before it goes
//! anywhere near a path: ASCII alphanumerics, underscore, and hyphen.
//! Everything else — spaces, dots, path separators, non-ASCII — is
//! dropped, not escaped.
//!
//! The surrounding cache name (`<stem>-<w>-<h>-<hash>.<ext>`) stays
//! unambiguous even when the sanitized stem is empty or collides with
//! another file's, because the content hash disambiguates.

/// Strip a filename stem down to `[A-Za-z0-9_-]`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_unchanged() {
        assert_eq!(sanitize_file_name("beach"), "beach");
        assert_eq!(sanitize_file_name("photo_01-final"), "photo_01-final");
    }

    #[test]
    fn spaces_and_dots_dropped() {
        assert_eq!(sanitize_file_name("my photo.v2"), "myphotov2");
    }

    #[test]
    fn path_separators_dropped() {
        assert_eq!(sanitize_file_name("../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_file_name("a\\b/c"), "abc");
    }

    #[test]
    fn non_ascii_dropped() {
        assert_eq!(sanitize_file_name("plage-été"), "plage-t");
    }

    #[test]
    fn hostile_name_can_empty_out() {
        assert_eq!(sanitize_file_name("!@#$%^&*()"), "");
    }
}
