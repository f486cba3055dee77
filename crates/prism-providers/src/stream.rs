//! Server-Sent-Events decoding for streamed completions.
//!
//! Chunks from the transport are split into newline-delimited lines. Only
//! `data:` lines matter; blank lines, `event:`/`id:` fields and comments are
//! skipped. A `[DONE]` payload ends the stream and everything after it is
//! ignored. Partial lines are buffered across chunk boundaries, as raw bytes
//! so a multi-byte character split between chunks survives.

/// Literal payload marking the end of a stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One meaningful SSE line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SseFrame {
    /// Payload of a `data:` line (prefix stripped).
    Data(String),
    /// The `[DONE]` sentinel.
    Done,
}

/// Incremental line decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the `[DONE]` sentinel has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed one transport chunk, returning the frames completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        if self.done {
            return Vec::new();
        }
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if self.push_line(&line, &mut frames) {
                self.buffer.clear();
                break;
            }
        }
        frames
    }

    /// Flush a trailing line that arrived without a final newline.
    pub fn finish(&mut self) -> Vec<SseFrame> {
        let mut frames = Vec::new();
        if !self.done && !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.push_line(&line, &mut frames);
        }
        frames
    }

    /// Decode one raw line. Returns `true` once the sentinel is reached.
    fn push_line(&mut self, raw: &[u8], frames: &mut Vec<SseFrame>) -> bool {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim();
        if line.is_empty() {
            return false;
        }

        let Some(payload) = line.strip_prefix("data:") else {
            return false;
        };
        let payload = payload.trim_start();

        if payload == DONE_SENTINEL {
            self.done = true;
            frames.push(SseFrame::Done);
            return true;
        }

        frames.push(SseFrame::Data(payload.to_string()));
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(s: &str) -> SseFrame {
        SseFrame::Data(s.to_string())
    }

    #[test]
    fn test_single_chunk_multiple_events() {
        let mut dec = SseDecoder::new();
        let frames = dec.feed(b"data: {\"a\":1}\n\ndata: {\"a\":2}\n\n");
        assert_eq!(frames, vec![data("{\"a\":1}"), data("{\"a\":2}")]);
        assert!(!dec.is_done());
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut dec = SseDecoder::new();
        assert!(dec.feed(b"data: {\"te").is_empty());
        let frames = dec.feed(b"xt\":\"hi\"}\n");
        assert_eq!(frames, vec![data("{\"text\":\"hi\"}")]);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let mut dec = SseDecoder::new();
        let line = "data: ñ\n".as_bytes();
        // 'ñ' is two bytes; split in the middle of it
        let split = 7;
        assert!(dec.feed(&line[..split]).is_empty());
        assert_eq!(dec.feed(&line[split..]), vec![data("ñ")]);
    }

    #[test]
    fn test_done_stops_processing() {
        let mut dec = SseDecoder::new();
        let frames = dec.feed(b"data: one\ndata: [DONE]\ndata: ignored\n");
        assert_eq!(frames, vec![data("one"), SseFrame::Done]);
        assert!(dec.is_done());
        assert!(dec.feed(b"data: late\n").is_empty());
        assert!(dec.finish().is_empty());
    }

    #[test]
    fn test_non_data_lines_skipped() {
        let mut dec = SseDecoder::new();
        let frames = dec.feed(
            b"event: content_block_delta\r\nid: 7\r\n: keep-alive\r\n\r\ndata: x\r\n",
        );
        assert_eq!(frames, vec![data("x")]);
    }

    #[test]
    fn test_data_without_space() {
        let mut dec = SseDecoder::new();
        assert_eq!(dec.feed(b"data:{}\n"), vec![data("{}")]);
    }

    #[test]
    fn test_finish_flushes_trailing_line() {
        let mut dec = SseDecoder::new();
        assert!(dec.feed(b"data: tail").is_empty());
        assert_eq!(dec.finish(), vec![data("tail")]);
        assert!(dec.finish().is_empty());
    }
}
