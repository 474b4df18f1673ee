use wire::{Cancel, Channel, Close, Data, Have, Open, Options, Request, Status, Unhave, Unwant, Want};

use crate::error::SessionError;

/// The event table a caller hangs off a [`crate::Session`]. `send` is the
/// only required method — a session with nothing to say on an event is a
/// session that doesn't override it.
///
/// One method per event, default no-op bodies everywhere but `send`.
pub trait SessionHandlers {
    /// Called for every outbound byte chunk, handshake and post-handshake
    /// alike. The bytes must be relayed to the peer in order; this is the
    /// session's only path to the wire.
    fn send(&mut self, bytes: &[u8]);

    /// Fired once, on fatal error or explicit [`crate::Session::destroy`].
    /// `err` is absent for a clean, caller-initiated shutdown.
    fn destroy(&mut self, _err: Option<&SessionError>) {}

    fn onhandshake(&mut self) {}

    fn onopen(&mut self, _channel: Channel, _message: &Open) {}
    fn onoptions(&mut self, _channel: Channel, _message: &Options) {}
    fn onstatus(&mut self, _channel: Channel, _message: &Status) {}
    fn onhave(&mut self, _channel: Channel, _message: &Have) {}
    fn onunhave(&mut self, _channel: Channel, _message: &Unhave) {}
    fn onwant(&mut self, _channel: Channel, _message: &Want) {}
    fn onunwant(&mut self, _channel: Channel, _message: &Unwant) {}
    fn onrequest(&mut self, _channel: Channel, _message: &Request) {}
    fn oncancel(&mut self, _channel: Channel, _message: &Cancel) {}
    fn ondata(&mut self, _channel: Channel, _message: &Data) {}
    fn onclose(&mut self, _channel: Channel, _message: &Close) {}

    fn onextension(&mut self, _channel: Channel, _id: u64, _bytes: &[u8]) {}
}
