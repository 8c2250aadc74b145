//! Candidate frame extraction from a raw read buffer
//!
//! Serial reads arrive in arbitrary chunks: a buffer may hold several
//! complete frames, a partial frame still in flight, or line noise. The
//! scanner slices the buffer into sentinel-delimited candidates and leaves
//! all real validation to [`crate::frame::decode`] and
//! [`crate::frame::verify`].
//!
//! This two-sentinel scan is deliberately tolerant: a `0xBB` inside another
//! frame's DATA is accepted as a candidate here and rejected downstream by
//! length/checksum mismatch. Over-strict parsing at this layer would drop
//! otherwise-recoverable frames.

use tracing::trace;

use crate::constants::{FRAME_END, FRAME_START};

/// Extract the ordered candidate frames from an accumulated buffer.
///
/// Repeatedly finds the next `0xBB` at or after the cursor and the next
/// `0x7E` strictly after it, emits the inclusive slice, and resumes past
/// the end sentinel. When either sentinel is missing the scan stops; the
/// unmatched tail is not an error, just incomplete data for the next read
/// to extend.
///
/// # Examples
///
/// ```
/// use uhfrust_core::scanner::scan;
///
/// let buf = [0x00, 0xBB, 0x01, 0x7E, 0xBB, 0x02]; // noise, frame, partial
/// let candidates = scan(&buf);
/// assert_eq!(candidates, vec![&[0xBB, 0x01, 0x7E][..]]);
/// ```
pub fn scan(buffer: &[u8]) -> Vec<&[u8]> {
    let mut candidates = Vec::new();
    let mut pos = 0;

    while pos < buffer.len() {
        let Some(start) = find(buffer, pos, FRAME_START) else {
            break;
        };
        let Some(end) = find(buffer, start + 1, FRAME_END) else {
            break;
        };

        candidates.push(&buffer[start..=end]);
        pos = end + 1;
    }

    trace!(
        buffer_len = buffer.len(),
        candidates = candidates.len(),
        "Scanned read buffer"
    );

    candidates
}

fn find(buffer: &[u8], from: usize, needle: u8) -> Option<usize> {
    buffer[from..]
        .iter()
        .position(|&b| b == needle)
        .map(|i| from + i)
}
