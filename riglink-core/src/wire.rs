//! Framing: textual `header:::payload</>` frames over a byte stream.

use crate::protocol::{MessageKind, FRAME_TERMINATOR, HEADER_SEPARATOR};

/// Retained-buffer cap. A peer that never sends a terminator cannot grow
/// the buffer past this; the accumulated bytes are dropped instead.
pub const MAX_BUFFER_LEN: usize = 1024 * 1024; // 1 MiB

/// One complete, delimited unit of the wire protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub topic: String,
    pub payload: String,
}

/// Encode an outbound message into wire bytes: code, separator, payload,
/// terminator.
pub fn encode_frame(kind: MessageKind, text: &str) -> Vec<u8> {
    let mut out =
        Vec::with_capacity(kind.code().len() + HEADER_SEPARATOR.len() + text.len() + FRAME_TERMINATOR.len());
    out.extend_from_slice(kind.code().as_bytes());
    out.extend_from_slice(HEADER_SEPARATOR.as_bytes());
    out.extend_from_slice(text.as_bytes());
    out.extend_from_slice(FRAME_TERMINATOR.as_bytes());
    out
}

/// Why buffered content was dropped instead of yielding a frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeWarning {
    #[error("frame splits into {0} parts, expected 2")]
    BadShape(usize),
    #[error("frame content is not valid UTF-8")]
    NotUtf8,
    #[error("buffer exceeded {MAX_BUFFER_LEN} bytes without a terminator; {0} bytes dropped")]
    Overflow(usize),
}

/// Outcome of feeding inbound bytes to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    Frame(Frame),
    Dropped(DecodeWarning),
}

/// Accumulating decoder for inbound bytes. Bytes are appended as they
/// arrive; once the buffer ends with the terminator, the content is split
/// on the separator and either emitted as a [`Frame`] or dropped with a
/// warning. The buffer is reset on both outcomes.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes currently retained awaiting a terminator.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Append a chunk of inbound bytes and extract whatever it completes.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<DecodeEvent> {
        self.buf.extend_from_slice(bytes);

        if !self.buf.ends_with(FRAME_TERMINATOR.as_bytes()) {
            if self.buf.len() > MAX_BUFFER_LEN {
                let dropped = self.buf.len();
                self.buf.clear();
                return vec![DecodeEvent::Dropped(DecodeWarning::Overflow(dropped))];
            }
            return Vec::new();
        }

        let content_len = self.buf.len() - FRAME_TERMINATOR.len();
        let event = match std::str::from_utf8(&self.buf[..content_len]) {
            Err(_) => DecodeEvent::Dropped(DecodeWarning::NotUtf8),
            Ok(content) => {
                let parts: Vec<&str> = content.split(HEADER_SEPARATOR).collect();
                if parts.len() == 2 {
                    DecodeEvent::Frame(Frame {
                        topic: parts[0].to_string(),
                        payload: parts[1].to_string(),
                    })
                } else {
                    DecodeEvent::Dropped(DecodeWarning::BadShape(parts.len()))
                }
            }
        };
        self.buf.clear();
        vec![event]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(events: Vec<DecodeEvent>) -> Vec<Frame> {
        events
            .into_iter()
            .filter_map(|e| match e {
                DecodeEvent::Frame(f) => Some(f),
                DecodeEvent::Dropped(_) => None,
            })
            .collect()
    }

    #[test]
    fn roundtrip() {
        let mut dec = FrameDecoder::new();
        let wire = encode_frame(MessageKind::Data, "{\"x\":1}");
        let out = frames(dec.push(&wire));
        assert_eq!(
            out,
            vec![Frame {
                topic: "DAT".into(),
                payload: "{\"x\":1}".into()
            }]
        );
        assert_eq!(dec.pending(), 0);
    }

    #[test]
    fn encode_appends_terminator() {
        let wire = encode_frame(MessageKind::Message, "hello");
        assert_eq!(wire, b"MSG:::hello</>");
    }

    #[test]
    fn two_chunk_arrival() {
        let mut dec = FrameDecoder::new();
        assert!(dec.push(b"DATA:::{\"x\":1}").is_empty());
        assert_eq!(dec.pending(), 14);
        let out = dec.push(b"</>");
        assert_eq!(
            out,
            vec![DecodeEvent::Frame(Frame {
                topic: "DATA".into(),
                payload: "{\"x\":1}".into()
            })]
        );
        assert_eq!(dec.pending(), 0);
    }

    #[test]
    fn terminator_split_across_chunks() {
        let mut dec = FrameDecoder::new();
        assert!(dec.push(b"MESH:::verts<").is_empty());
        assert!(dec.push(b"/").is_empty());
        let out = frames(dec.push(b">"));
        assert_eq!(out[0].topic, "MESH");
        assert_eq!(out[0].payload, "verts");
    }

    #[test]
    fn three_parts_is_malformed() {
        let mut dec = FrameDecoder::new();
        let out = dec.push(b"BAD:::A:::B</>");
        assert_eq!(out, vec![DecodeEvent::Dropped(DecodeWarning::BadShape(3))]);
        assert_eq!(dec.pending(), 0);
    }

    #[test]
    fn missing_separator_is_malformed() {
        let mut dec = FrameDecoder::new();
        let out = dec.push(b"no separator here</>");
        assert_eq!(out, vec![DecodeEvent::Dropped(DecodeWarning::BadShape(1))]);
        assert_eq!(dec.pending(), 0);
    }

    #[test]
    fn empty_payload_is_a_frame() {
        let mut dec = FrameDecoder::new();
        let out = frames(dec.push(b"BEACON:::</>"));
        assert_eq!(out[0].topic, "BEACON");
        assert_eq!(out[0].payload, "");
    }

    #[test]
    fn malformed_does_not_poison_next_frame() {
        let mut dec = FrameDecoder::new();
        assert!(matches!(
            dec.push(b"BAD:::A:::B</>")[0],
            DecodeEvent::Dropped(_)
        ));
        let out = frames(dec.push(b"DATA:::ok</>"));
        assert_eq!(out[0].payload, "ok");
    }

    #[test]
    fn non_utf8_is_dropped() {
        let mut dec = FrameDecoder::new();
        let mut wire = b"DATA:::".to_vec();
        wire.extend_from_slice(&[0xff, 0xfe]);
        wire.extend_from_slice(b"</>");
        let out = dec.push(&wire);
        assert_eq!(out, vec![DecodeEvent::Dropped(DecodeWarning::NotUtf8)]);
        assert_eq!(dec.pending(), 0);
    }

    #[test]
    fn overflow_drops_buffer() {
        let mut dec = FrameDecoder::new();
        let chunk = vec![b'a'; MAX_BUFFER_LEN + 1];
        let out = dec.push(&chunk);
        assert_eq!(
            out,
            vec![DecodeEvent::Dropped(DecodeWarning::Overflow(
                MAX_BUFFER_LEN + 1
            ))]
        );
        assert_eq!(dec.pending(), 0);
        // Still usable afterwards.
        let out = frames(dec.push(b"DATA:::ok</>"));
        assert_eq!(out[0].payload, "ok");
    }

    #[test]
    fn partial_below_cap_is_retained() {
        let mut dec = FrameDecoder::new();
        assert!(dec.push(b"DATA:::partial").is_empty());
        assert_eq!(dec.pending(), 14);
    }
}
