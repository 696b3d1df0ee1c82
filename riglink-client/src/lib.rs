//! RigLink feed client: LAN discovery, transport, and topic dispatch for
//! the assembly feed service. Consumers register topic handlers and emit
//! messages; everything else (probing, reconnection, framing) is driven
//! behind the scenes.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod enumerate;
pub mod probe;

pub use client::{CandidateFn, LinkClient};
pub use config::Config;
pub use riglink_core::protocol::topics;
pub use riglink_core::{ClientState, Handler, MessageKind, RouterError};
