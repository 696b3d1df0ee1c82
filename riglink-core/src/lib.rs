//! RigLink feed transport reference implementation.
//! Host-driven: no I/O; host passes events and receives actions.

pub mod link;
pub mod protocol;
pub mod router;
pub mod wire;

pub use link::{ClientState, LinkCore, TickAction, DEFAULT_RECONNECT_ATTEMPTS};
pub use protocol::{MessageKind, FRAME_TERMINATOR, HEADER_SEPARATOR};
pub use router::{Handler, RouterError, TopicRouter};
pub use wire::{encode_frame, DecodeEvent, DecodeWarning, Frame, FrameDecoder, MAX_BUFFER_LEN};
