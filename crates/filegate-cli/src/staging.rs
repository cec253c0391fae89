//! Per-request temporary files for downloads

use std::io;
use std::path::Path;
use tempfile::NamedTempFile;

/// Longest sanitized key kept in a temp file name
const MAX_KEY_LEN: usize = 100;

/// A temp file owned by one handler invocation.
///
/// Removed by [`TempDownload::cleanup`] on success and by `Drop` on every
/// early return, so no file outlives the request.
#[derive(Debug)]
pub struct TempDownload {
    file: NamedTempFile,
}

impl TempDownload {
    /// Create an empty temp file named after the object key plus a random suffix
    pub fn create(dir: &Path, object_key: &str) -> io::Result<Self> {
        let prefix = format!("{}-", sanitize_object_key(object_key));
        let file = tempfile::Builder::new()
            .prefix(&prefix)
            .tempfile_in(dir)?;
        Ok(Self { file })
    }

    /// Location of the temp file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the temp file, reporting failures
    pub fn cleanup(self) -> io::Result<()> {
        self.file.close()
    }
}

/// Turn an object key into a single safe file name component.
///
/// Path separators become `-`; anything outside `[A-Za-z0-9._-]` is dropped
/// and a dot never follows another dot or a separator, so the result can
/// never leave its directory.
pub fn sanitize_object_key(key: &str) -> String {
    let mut output = String::with_capacity(key.len().min(MAX_KEY_LEN));

    for c in key.chars() {
        let c = match c {
            '/' | '\\' => '-',
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' => c,
            _ => continue,
        };
        if c == '.' && (output.is_empty() || output.ends_with(&['.', '-'][..])) {
            continue;
        }

        output.push(c);
        if output.len() >= MAX_KEY_LEN {
            break;
        }
    }

    if output.is_empty() {
        output.push_str("object");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("dirname/ninja.png", "dirname-ninja.png")]
    #[case("../../etc/passwd", "--etc-passwd")]
    #[case("a\\b\\c.txt", "a-b-c.txt")]
    #[case(".hidden", "hidden")]
    #[case("spaces and ünïcode.txt", "spacesandncode.txt")]
    #[case("...", "object")]
    #[case("", "object")]
    fn test_sanitize_object_key(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(sanitize_object_key(key), expected);
    }

    #[test]
    fn test_sanitize_bounds_length() {
        let key = "k".repeat(500);
        assert_eq!(sanitize_object_key(&key).len(), MAX_KEY_LEN);
    }

    #[test]
    fn test_temp_download_stays_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let temp = TempDownload::create(dir.path(), "../../dirname/ninja.png").unwrap();

        assert_eq!(temp.path().parent(), Some(dir.path()));
        let name = temp.path().file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("--dirname-ninja.png-"));
    }

    #[test]
    fn test_same_key_gets_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = TempDownload::create(dir.path(), "dirname/ninja.png").unwrap();
        let b = TempDownload::create(dir.path(), "dirname/ninja.png").unwrap();

        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_cleanup_and_drop_remove_file() {
        let dir = tempfile::tempdir().unwrap();

        let temp = TempDownload::create(dir.path(), "a.txt").unwrap();
        let path = temp.path().to_path_buf();
        temp.cleanup().unwrap();
        assert!(!path.exists());

        let temp = TempDownload::create(dir.path(), "b.txt").unwrap();
        let path = temp.path().to_path_buf();
        drop(temp);
        assert!(!path.exists());

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
