use tracing::trace;

use crate::error::FrameError;
use crate::message::Message;
use crate::types::{decode_header, Channel};
use crate::varint;

/// A fully decoded frame: the channel it belongs to and its typed body.
#[derive(Clone, PartialEq, Debug)]
pub struct Frame {
    pub channel: Channel,
    pub message: Message,
}

pub const DEFAULT_MAX_FRAME_SIZE: u64 = 8 * 1024 * 1024;

enum State {
    /// Accumulating the outer varint that gives the body's total byte
    /// length (header varint + payload together).
    ReadLen { acc: Vec<u8> },
    /// Body length known; accumulating the header varint that opens it.
    ReadHeader { body_remaining: u64, acc: Vec<u8> },
    /// Header parsed; accumulating the remaining payload bytes.
    ReadBody {
        channel: Channel,
        tag: u8,
        payload: Vec<u8>,
        remaining: usize,
    },
}

/// Byte-at-a-time frame decoder. Feed it arbitrarily-sized chunks via
/// [`Decoder::push`]; it yields every frame that becomes complete,
/// carrying partial state between calls so a frame split across chunk
/// boundaries decodes identically to one delivered whole.
pub struct Decoder {
    max_frame_size: u64,
    state: State,
}

impl Decoder {
    pub fn new() -> Self {
        Decoder::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(max_frame_size: u64) -> Self {
        Decoder {
            max_frame_size,
            state: State::ReadLen { acc: Vec::new() },
        }
    }

    /// Feeds `input` through the state machine, returning every frame
    /// completed along the way in arrival order.
    pub fn push(&mut self, input: &[u8]) -> Result<Vec<Frame>, FrameError> {
        let mut frames = Vec::new();
        let mut cursor = input;

        while !cursor.is_empty() {
            let consumed = self.advance(cursor, &mut frames)?;
            if consumed == 0 {
                break;
            }
            cursor = &cursor[consumed..];
        }

        Ok(frames)
    }

    /// Runs one step of the state machine against `input` (which `push`
    /// guarantees is non-empty), pushing a frame onto `frames` if one
    /// completes. Returns how many bytes of `input` were consumed, always
    /// at least 1.
    fn advance(&mut self, input: &[u8], frames: &mut Vec<Frame>) -> Result<usize, FrameError> {
        match &mut self.state {
            State::ReadLen { acc } => {
                acc.push(input[0]);
                match varint::decode(acc) {
                    Ok(Some((body_len, _consumed))) => {
                        if body_len > self.max_frame_size {
                            return Err(FrameError::FrameTooLarge {
                                size: body_len,
                                max: self.max_frame_size,
                            });
                        }
                        if body_len == 0 {
                            return Err(FrameError::EmptyFrameBody);
                        }
                        trace!(body_len, "frame body length known");
                        self.state = State::ReadHeader {
                            body_remaining: body_len,
                            acc: Vec::new(),
                        };
                        Ok(1)
                    }
                    Ok(None) => Ok(1),
                    Err(err) => Err(err.into()),
                }
            }
            State::ReadHeader { body_remaining, acc } => {
                let take = 1.min(input.len()).min(*body_remaining as usize - acc.len());
                acc.extend_from_slice(&input[..take]);
                match varint::decode(acc) {
                    Ok(Some((header, consumed))) => {
                        debug_assert_eq!(consumed, acc.len());
                        let (channel, tag) = decode_header(header);
                        let payload_remaining = *body_remaining as usize - acc.len();
                        trace!(channel = channel.0, tag, payload_remaining, "frame header decoded");
                        if payload_remaining == 0 {
                            Self::finish_frame(channel, tag, Vec::new(), frames)?;
                            self.state = State::ReadLen { acc: Vec::new() };
                        } else {
                            self.state = State::ReadBody {
                                channel,
                                tag,
                                payload: Vec::with_capacity(payload_remaining),
                                remaining: payload_remaining,
                            };
                        }
                        Ok(take)
                    }
                    Ok(None) => {
                        if acc.len() >= *body_remaining as usize {
                            return Err(FrameError::HeaderDoesNotFitInBody);
                        }
                        Ok(take)
                    }
                    Err(err) => Err(err.into()),
                }
            }
            State::ReadBody {
                channel,
                tag,
                payload,
                remaining,
            } => {
                let take = (*remaining).min(input.len());
                payload.extend_from_slice(&input[..take]);
                *remaining -= take;
                if *remaining == 0 {
                    let (channel, tag, payload) = (*channel, *tag, std::mem::take(payload));
                    Self::finish_frame(channel, tag, payload, frames)?;
                    self.state = State::ReadLen { acc: Vec::new() };
                }
                Ok(take)
            }
        }
    }

    /// Resolves a complete header (channel + type tag) plus its payload
    /// into a [`Frame`] and pushes it. Shared by the two states that can
    /// complete a frame: `ReadHeader` (when the body carries no payload at
    /// all) and `ReadBody` (once the last payload byte lands).
    fn finish_frame(
        channel: Channel,
        tag: u8,
        payload: Vec<u8>,
        frames: &mut Vec<Frame>,
    ) -> Result<(), FrameError> {
        let message_type =
            crate::types::MessageType::from_tag(tag).ok_or(FrameError::UnknownMessageType(tag))?;
        let message = Message::decode_body(message_type, &payload)?;
        trace!(channel = channel.0, ?message_type, "frame decoded");
        frames.push(Frame { channel, message });
        Ok(())
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}

/// Encodes a single frame: `varint(len(header || payload)) || varint(header) || payload`.
pub fn encode(channel: Channel, message: &Message) -> Vec<u8> {
    let header = crate::types::encode_header(channel, message.message_type().tag());
    let header_bytes = varint::encode(header);
    let payload = message.encode_body();

    let body_len = (header_bytes.len() + payload.len()) as u64;
    let mut out = varint::encode(body_len);
    out.extend_from_slice(&header_bytes);
    out.extend_from_slice(&payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    #[test]
    fn round_trips_a_single_frame_delivered_whole() {
        let message = Message::Have(schema::Have {
            start: 10,
            length: Some(5),
            bitfield: None,
            ack: Some(true),
        });
        let bytes = encode(Channel(3), &message);

        let mut decoder = Decoder::new();
        let frames = decoder.push(&bytes).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].channel, Channel(3));
        assert_eq!(frames[0].message, message);
    }

    #[test]
    fn round_trips_when_delivered_one_byte_at_a_time() {
        let message = Message::Request(schema::Request {
            index: 99,
            bytes: None,
            hash: Some(false),
            nodes: None,
            priority: Some(1),
        });
        let bytes = encode(Channel(0), &message);

        let mut decoder = Decoder::new();
        let mut frames = Vec::new();
        for byte in &bytes {
            frames.extend(decoder.push(std::slice::from_ref(byte)).unwrap());
        }
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].message, message);
    }

    #[test]
    fn decodes_two_frames_delivered_in_one_chunk() {
        let a = Message::Want(schema::Want { start: 0, length: Some(10) });
        let b = Message::Cancel(schema::Cancel { index: 4, bytes: None, hash: None });
        let mut bytes = encode(Channel(1), &a);
        bytes.extend(encode(Channel(1), &b));

        let mut decoder = Decoder::new();
        let frames = decoder.push(&bytes).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].message, a);
        assert_eq!(frames[1].message, b);
    }

    #[test]
    fn oversize_frame_is_rejected() {
        let message = Message::Extension(vec![0u8; 64]);
        let bytes = encode(Channel(0), &message);

        let mut decoder = Decoder::with_max_frame_size(4);
        let err = decoder.push(&bytes).unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { .. }));
    }

    #[test]
    fn extension_frame_preserves_raw_bytes() {
        let message = Message::Extension(vec![7, 1, 2, 3]);
        let bytes = encode(Channel(2), &message);

        let mut decoder = Decoder::new();
        let frames = decoder.push(&bytes).unwrap();
        assert_eq!(frames[0].message, message);
    }

    /// A `Close` with no `discovery_key` encodes to a header and nothing
    /// else — the frame must finish the moment the header is parsed,
    /// without waiting on payload bytes that will never arrive.
    #[test]
    fn zero_payload_frame_completes_without_trailing_bytes() {
        let message = Message::Close(schema::Close { discovery_key: None });
        let bytes = encode(Channel(0), &message);

        let mut decoder = Decoder::new();
        let frames = decoder.push(&bytes).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].message, message);
    }

    #[test]
    fn header_that_cannot_fit_in_the_declared_body_is_rejected() {
        // body_len = 1, but the single available byte has its continuation
        // bit set, so no header varint can ever complete inside this frame.
        let bytes = vec![0x01u8, 0x80u8];

        let mut decoder = Decoder::new();
        let err = decoder.push(&bytes).unwrap_err();
        assert!(matches!(err, FrameError::HeaderDoesNotFitInBody));
    }
}
