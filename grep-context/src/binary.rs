//! Binary file sniffing: sample the head of a file and decide whether it is
//! worth scanning as text.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::trace;

/// How many leading bytes are inspected.
pub const SAMPLE_BYTES: usize = 8192;

/// Minimum share of printable bytes for a sample to count as text.
const TEXT_RATIO: f64 = 0.7;

/// `true` when the file looks binary or cannot be read.
pub fn is_binary_file(path: &Path) -> bool {
    match read_sample(path) {
        Ok(chunk) => looks_binary(&chunk),
        Err(e) => {
            trace!(path = %path.display(), error = %e, "unreadable file treated as binary");
            true
        }
    }
}

/// Classify a byte sample. Any NUL byte means binary; otherwise fewer than
/// 70% printable ASCII/whitespace bytes means binary. Empty is text.
pub fn looks_binary(chunk: &[u8]) -> bool {
    if chunk.is_empty() {
        return false;
    }
    if chunk.contains(&0) {
        return true;
    }
    let text = chunk
        .iter()
        .filter(|&&b| matches!(b, 32..=126 | b'\t' | b'\n' | b'\r'))
        .count();
    (text as f64) / (chunk.len() as f64) < TEXT_RATIO
}

fn read_sample(path: &Path) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(SAMPLE_BYTES);
    File::open(path)?
        .take(SAMPLE_BYTES as u64)
        .read_to_end(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nul_byte_is_binary() {
        assert!(looks_binary(b"hello\0world"));
    }

    #[test]
    fn empty_and_plain_text_are_text() {
        assert!(!looks_binary(b""));
        assert!(!looks_binary(b"fn main() {\n\tprintln!(\"hi\");\r\n}\n"));
    }

    #[test]
    fn ratio_threshold() {
        // 7 printable of 10 -> exactly 70%, still text
        let mut seven = b"abcdefg".to_vec();
        seven.extend([0x80, 0x81, 0x82]);
        assert!(!looks_binary(&seven));

        let mut six = b"abcdef".to_vec();
        six.extend([0x80, 0x81, 0x82, 0x83]);
        assert!(looks_binary(&six));
    }

    #[test]
    fn missing_file_counts_as_binary() {
        assert!(is_binary_file(Path::new("/definitely/not/here.bin")));
    }
}
