use super::{FIELD_DELIMITER, FRAME_END};
use crate::ArmError;

/// Pulls every complete frame out of `buffer`, leaving any trailing
/// partial frame in place for the next read.
///
/// A frame ends at the first `III/b/f`; whitespace before the start
/// marker is dropped. A frame that is not valid UTF-8 comes back as
/// [`ArmError::MalformedFrame`]; nothing else is validated here.
pub fn extract_frames(buffer: &mut Vec<u8>) -> Vec<Result<String, ArmError>> {
    let terminator = frame_terminator();
    let mut frames = Vec::new();
    while let Some(pos) = find(buffer, &terminator) {
        let chunk: Vec<u8> = buffer.drain(..pos + terminator.len()).collect();
        let frame = String::from_utf8(chunk)
            .map(|frame| frame.trim_start().to_string())
            .map_err(|e| ArmError::MalformedFrame(format!("frame is not valid UTF-8: {}", e)));
        frames.push(frame);
    }
    frames
}

fn frame_terminator() -> Vec<u8> {
    let mut terminator = FIELD_DELIMITER.as_bytes().to_vec();
    terminator.extend_from_slice(FRAME_END.as_bytes());
    terminator
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
