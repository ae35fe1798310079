use std::path::Path;

const BINARY_EXTENSIONS: [&str; 17] = [
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "pdf", "zip", "gz", "tar", "tgz", "xz", "rar",
    "7z", "exe", "dll", "so",
];

const MAX_CONTROL_BYTES: usize = 8;
const MAX_HIGH_BYTES: usize = 16;

/// Heuristic binary detection. Binary files are never scanned or rewritten.
pub fn is_binary(path: &Path, content: &[u8]) -> bool {
    has_binary_extension(path) || is_binary_content(content)
}

pub fn has_binary_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| BINARY_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

pub fn is_binary_content(content: &[u8]) -> bool {
    if content.is_empty() {
        return false;
    }
    if content.contains(&0) {
        return true;
    }
    if std::str::from_utf8(content).is_ok() {
        content.iter().filter(|&&b| is_control_byte(b)).count() > MAX_CONTROL_BYTES
    } else {
        content.iter().filter(|&&b| b >= 0x80).count() > MAX_HIGH_BYTES
    }
}

fn is_control_byte(b: u8) -> bool {
    !matches!(b, b'\n' | b'\r' | b'\t') && (b < 0x20 || b == 0x7f)
}
