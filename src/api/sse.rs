//! Incremental `text/event-stream` decoding.
//!
//! Network chunks split frames at arbitrary byte offsets, so the decoder keeps
//! the trailing partial line buffered until its newline arrives.

/// Terminal sentinel sent by OpenAI-compatible streams.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Line-buffering decoder yielding `data:` payloads.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk and return every complete payload it finished.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(payload) = data_payload(&line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flush a final unterminated line at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        data_payload(&rest)
    }
}

/// Payload of a `data:` line, skipping blanks, comments and `[DONE]`.
fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\r', '\n']);
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data).trim();
    if data.is_empty() || data == DONE_SENTINEL {
        return None;
    }
    Some(data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::{sse_done_block, sse_event_block};

    #[test]
    fn yields_payloads_from_whole_frames() {
        let mut decoder = SseDecoder::new();
        let stream = format!(
            "{}{}{}",
            sse_event_block(r#"{"a":1}"#),
            sse_event_block(r#"{"a":2}"#),
            sse_done_block()
        );
        let payloads = decoder.push(stream.as_bytes());
        assert_eq!(payloads, vec![r#"{"a":1}"#, r#"{"a":2}"#]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn buffers_partial_lines_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"te").is_empty());
        assert!(decoder.push(b"xt\":\"hi\"}").is_empty());
        assert_eq!(decoder.push(b"\n\n"), vec![r#"{"text":"hi"}"#]);
    }

    #[test]
    fn splits_multibyte_characters_safely() {
        let frame = "data: {\"t\":\"héllo\"}\n".as_bytes();
        // Split inside the two-byte 'é'.
        let split = frame.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&frame[..split]).is_empty());
        assert_eq!(decoder.push(&frame[split..]), vec!["{\"t\":\"héllo\"}"]);
    }

    #[test]
    fn ignores_non_data_lines_and_handles_crlf() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push(b": keepalive\r\nevent: message\r\ndata: {\"x\":true}\r\n\r\n");
        assert_eq!(payloads, vec![r#"{"x":true}"#]);
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"end\":1}").is_empty());
        assert_eq!(decoder.finish().as_deref(), Some(r#"{"end":1}"#));
    }

    #[cfg(feature = "fuzz-tests")]
    mod fuzz {
        use super::super::SseDecoder;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn chunking_never_changes_payloads(
                texts in proptest::collection::vec("[a-z ]{0,12}", 1..6),
                cut in 0usize..200,
            ) {
                let stream: String = texts
                    .iter()
                    .map(|t| format!("data: {{\"t\":\"{t}\"}}\n\n"))
                    .collect();
                let bytes = stream.as_bytes();
                let cut = cut.min(bytes.len());

                let mut whole = SseDecoder::new();
                let expected = whole.push(bytes);

                let mut split = SseDecoder::new();
                let mut got = split.push(&bytes[..cut]);
                got.extend(split.push(&bytes[cut..]));
                prop_assert_eq!(got, expected);
            }
        }
    }
}
