use std::ffi::{OsStr, OsString};
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf, is_separator};

fn is_separator_byte(byte: u8) -> bool {
    byte.is_ascii() && is_separator(char::from(byte))
}

/// Byte offset where the trailing file name component of `path` starts.
fn file_name_position(path: &[u8]) -> usize {
    match path.iter().rposition(|&byte| is_separator_byte(byte)) {
        Some(separator) => separator + 1,
        #[cfg(windows)]
        None if path.len() >= 2 && path[1] == b':' => 2,
        None => 0,
    }
}

fn ends_with_separator(path: &[u8]) -> bool {
    path.last().is_some_and(|&byte| is_separator_byte(byte))
}

/// Strips one trailing separator unless doing so changes what the path names
/// (`/`, `C:\`, `\\?\`).
fn without_redundant_separator(path: &[u8]) -> &[u8] {
    if !ends_with_separator(path) {
        return path;
    }
    let head = &path[..path.len() - 1];
    match head.last() {
        None | Some(b':') | Some(b'?') => path,
        Some(_) => head,
    }
}

fn sub_path<'a>(path: &OsStr, bytes: &'a [u8]) -> &'a OsStr {
    // SAFETY: `bytes` is a sub-slice of `path.as_encoded_bytes()` that starts at
    // its beginning or right after an ASCII separator and ends at its end or
    // right before an ASCII separator. Both are valid UTF-8 boundaries.
    debug_assert!(path.len() >= bytes.len());
    unsafe { OsStr::from_encoded_bytes_unchecked(bytes) }
}

/// Everything after the last separator. Empty when `path` ends with one.
pub fn file_name_part(path: &Path) -> &OsStr {
    let bytes = path.as_os_str().as_encoded_bytes();
    sub_path(path.as_os_str(), &bytes[file_name_position(bytes)..])
}

/// Everything before the file name, without a redundant trailing separator.
pub fn directory_part(path: &Path) -> &Path {
    let bytes = path.as_os_str().as_encoded_bytes();
    let directory = without_redundant_separator(&bytes[..file_name_position(bytes)]);
    Path::new(sub_path(path.as_os_str(), directory))
}

/// Joins a directory part and a file name with exactly one separator.
pub fn concat_path(directory: &Path, file_name: &OsStr) -> PathBuf {
    if directory.as_os_str().is_empty() {
        PathBuf::from(file_name)
    } else if file_name.is_empty() {
        directory.to_path_buf()
    } else {
        let mut path = directory.as_os_str().to_os_string();
        if !ends_with_separator(path.as_encoded_bytes()) {
            path.push(MAIN_SEPARATOR_STR);
        }
        path.push(file_name);
        PathBuf::from(path)
    }
}

/// Bytes persisted for `path` in a database.
pub fn path_to_bytes(path: &Path) -> Vec<u8> {
    path.as_os_str().as_encoded_bytes().to_vec()
}

/// Inverse of [`path_to_bytes`] for databases written on the same platform.
#[cfg(unix)]
pub fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;

    PathBuf::from(OsString::from_vec(bytes))
}

/// Inverse of [`path_to_bytes`]. Bytes that are not UTF-8 are replaced, and
/// such a path then never matches a scanned one.
#[cfg(not(unix))]
pub fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    match String::from_utf8(bytes) {
        Ok(path) => PathBuf::from(path),
        Err(err) => PathBuf::from(OsString::from(
            String::from_utf8_lossy(err.as_bytes()).into_owned(),
        )),
    }
}
