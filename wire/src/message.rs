use crate::error::FrameError;
use crate::schema;
use crate::types::MessageType;

/// A decoded frame body, tagged by which schema it carries. `Extension`
/// frames are passed through undecoded — their payload format is private
/// to whatever extension id prefixes them, and this crate doesn't know the
/// extension registry.
#[derive(Clone, PartialEq, Debug)]
pub enum Message {
    Open(schema::Open),
    Options(schema::Options),
    Status(schema::Status),
    Have(schema::Have),
    Unhave(schema::Unhave),
    Want(schema::Want),
    Unwant(schema::Unwant),
    Request(schema::Request),
    Cancel(schema::Cancel),
    Data(schema::Data),
    Close(schema::Close),
    Extension(Vec<u8>),
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Open(_) => MessageType::Open,
            Message::Options(_) => MessageType::Options,
            Message::Status(_) => MessageType::Status,
            Message::Have(_) => MessageType::Have,
            Message::Unhave(_) => MessageType::Unhave,
            Message::Want(_) => MessageType::Want,
            Message::Unwant(_) => MessageType::Unwant,
            Message::Request(_) => MessageType::Request,
            Message::Cancel(_) => MessageType::Cancel,
            Message::Data(_) => MessageType::Data,
            Message::Close(_) => MessageType::Close,
            Message::Extension(_) => MessageType::Extension,
        }
    }

    pub fn encode_body(&self) -> Vec<u8> {
        match self {
            Message::Extension(bytes) => bytes.clone(),
            _ => {
                let mut buf = Vec::new();
                match self {
                    Message::Open(m) => ::prost::Message::encode(m, &mut buf),
                    Message::Options(m) => ::prost::Message::encode(m, &mut buf),
                    Message::Status(m) => ::prost::Message::encode(m, &mut buf),
                    Message::Have(m) => ::prost::Message::encode(m, &mut buf),
                    Message::Unhave(m) => ::prost::Message::encode(m, &mut buf),
                    Message::Want(m) => ::prost::Message::encode(m, &mut buf),
                    Message::Unwant(m) => ::prost::Message::encode(m, &mut buf),
                    Message::Request(m) => ::prost::Message::encode(m, &mut buf),
                    Message::Cancel(m) => ::prost::Message::encode(m, &mut buf),
                    Message::Data(m) => ::prost::Message::encode(m, &mut buf),
                    Message::Close(m) => ::prost::Message::encode(m, &mut buf),
                    Message::Extension(_) => unreachable!(),
                }
                .expect("buffer has unbounded capacity");
                buf
            }
        }
    }

    pub fn decode_body(message_type: MessageType, body: &[u8]) -> Result<Self, FrameError> {
        Ok(match message_type {
            MessageType::Open => Message::Open(::prost::Message::decode(body)?),
            MessageType::Options => Message::Options(::prost::Message::decode(body)?),
            MessageType::Status => Message::Status(::prost::Message::decode(body)?),
            MessageType::Have => Message::Have(::prost::Message::decode(body)?),
            MessageType::Unhave => Message::Unhave(::prost::Message::decode(body)?),
            MessageType::Want => Message::Want(::prost::Message::decode(body)?),
            MessageType::Unwant => Message::Unwant(::prost::Message::decode(body)?),
            MessageType::Request => Message::Request(::prost::Message::decode(body)?),
            MessageType::Cancel => Message::Cancel(::prost::Message::decode(body)?),
            MessageType::Data => Message::Data(::prost::Message::decode(body)?),
            MessageType::Close => Message::Close(::prost::Message::decode(body)?),
            MessageType::Extension => Message::Extension(body.to_vec()),
        })
    }
}
