//! The eleven typed message bodies a channel can carry, plus the nested
//! `DataNode` record. Field numbers are the wire contract: they must never
//! be renumbered once a peer out there depends on them.

/// Opens a channel for a feed, identified by its discovery key. The first
/// `Open` a connection's initiator sends carries the feed's raw `key`
/// instead of a `capability` — the receiving session rewrites it into a
/// derived capability before handing it to application code, and a bare
/// `key` must never reach the wire once a capability exists.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Open {
    #[prost(bytes = "vec", tag = "1")]
    pub discovery_key: Vec<u8>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub capability: Option<Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub key: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Options {
    #[prost(string, repeated, tag = "1")]
    pub extensions: Vec<String>,
    #[prost(bool, optional, tag = "2")]
    pub ack: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Status {
    #[prost(bool, optional, tag = "1")]
    pub uploading: Option<bool>,
    #[prost(bool, optional, tag = "2")]
    pub downloading: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Have {
    #[prost(uint64, tag = "1")]
    pub start: u64,
    #[prost(uint64, optional, tag = "2")]
    pub length: Option<u64>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub bitfield: Option<Vec<u8>>,
    #[prost(bool, optional, tag = "4")]
    pub ack: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Unhave {
    #[prost(uint64, tag = "1")]
    pub start: u64,
    #[prost(uint64, optional, tag = "2")]
    pub length: Option<u64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Want {
    #[prost(uint64, tag = "1")]
    pub start: u64,
    #[prost(uint64, optional, tag = "2")]
    pub length: Option<u64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Unwant {
    #[prost(uint64, tag = "1")]
    pub start: u64,
    #[prost(uint64, optional, tag = "2")]
    pub length: Option<u64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Request {
    #[prost(uint64, tag = "1")]
    pub index: u64,
    #[prost(uint64, optional, tag = "2")]
    pub bytes: Option<u64>,
    #[prost(bool, optional, tag = "3")]
    pub hash: Option<bool>,
    #[prost(uint64, optional, tag = "4")]
    pub nodes: Option<u64>,
    #[prost(uint64, optional, tag = "5")]
    pub priority: Option<u64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Cancel {
    #[prost(uint64, tag = "1")]
    pub index: u64,
    #[prost(uint64, optional, tag = "2")]
    pub bytes: Option<u64>,
    #[prost(bool, optional, tag = "3")]
    pub hash: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DataNode {
    #[prost(uint64, tag = "1")]
    pub index: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub hash: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub size: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Data {
    #[prost(uint64, tag = "1")]
    pub index: u64,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub value: Option<Vec<u8>>,
    #[prost(message, repeated, tag = "3")]
    pub nodes: Vec<DataNode>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub signature: Option<Vec<u8>>,
}

/// `discovery_key` is absent when a peer closes its own side of a channel
/// it opened; a peer closing in response to the other side's `Close` omits
/// it too, since the channel is already unambiguous.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Close {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub discovery_key: Option<Vec<u8>>,
}
