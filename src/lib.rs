#![forbid(unsafe_code)]

//! Component C5: the session orchestrator tying the handshake ([`noise`]),
//! the post-handshake keystream ([`keystream`]), and the channel codec
//! ([`wire`]) into one synchronous, single-threaded protocol core.
//!
//! A [`Session`] owns nothing but its own state machine and a handler
//! table (`H: SessionHandlers`); it never touches a socket. Callers feed
//! inbound bytes to [`Session::recv`] and react to the `send` callback for
//! outbound bytes, wiring the core into whatever event loop or transport
//! they already have.

mod capability;
mod error;
mod handlers;
mod pending;
mod session;

pub use capability::{derive_capability, derive_remote_capability, CAPABILITY_NAMESPACE};
pub use error::SessionError;
pub use handlers::SessionHandlers;
pub use pending::{PendingQueue, MAX_PENDING};
pub use session::{Session, SessionOptions};

pub use noise::Role;
pub use wire::{
    Cancel, Channel, Close, Data, DataNode, Have, MessageType, Open, Options, Request, Status,
    Unhave, Unwant, Want,
};
