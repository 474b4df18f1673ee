/// Every frame belongs to a channel, identified by a small non-negative
/// integer the two peers agree on locally (channel 0 is the first feed
/// opened on the connection, channel 1 the second, and so on).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Channel(pub u64);

/// The low 4 bits of a frame header select the message's schema. Values
/// 11..14 are reserved for future use; 15 always means an extension frame,
/// whose body starts with the extension id rather than a schema tag.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MessageType {
    Open = 0,
    Options = 1,
    Status = 2,
    Have = 3,
    Unhave = 4,
    Want = 5,
    Unwant = 6,
    Request = 7,
    Cancel = 8,
    Data = 9,
    Close = 10,
    Extension = 15,
}

impl MessageType {
    pub fn from_tag(tag: u8) -> Option<Self> {
        use MessageType::*;
        Some(match tag {
            0 => Open,
            1 => Options,
            2 => Status,
            3 => Have,
            4 => Unhave,
            5 => Want,
            6 => Unwant,
            7 => Request,
            8 => Cancel,
            9 => Data,
            10 => Close,
            15 => Extension,
            _ => return None,
        })
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// Packs a channel and message type tag into the single varint that opens
/// every frame body.
pub fn encode_header(channel: Channel, tag: u8) -> u64 {
    (channel.0 << 4) | (tag as u64 & 0x0f)
}

/// Splits a decoded header varint back into its channel and type tag.
pub fn decode_header(header: u64) -> (Channel, u8) {
    (Channel(header >> 4), (header & 0x0f) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let channel = Channel(42);
        let header = encode_header(channel, MessageType::Request.tag());
        let (decoded_channel, tag) = decode_header(header);
        assert_eq!(decoded_channel, channel);
        assert_eq!(MessageType::from_tag(tag), Some(MessageType::Request));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(MessageType::from_tag(12), None);
    }
}
