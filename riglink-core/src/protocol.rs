//! RigLink wire protocol: outbound message kinds and framing literals.

/// Separator between header and payload inside one frame.
pub const HEADER_SEPARATOR: &str = ":::";

/// Terminator closing one frame on the wire.
pub const FRAME_TERMINATOR: &str = "</>";

/// Outbound message kinds. Each maps to a fixed 3-letter header code;
/// anything unrecognized goes out as `INV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Control command for the feed service.
    Command,
    /// Structured data payload.
    Data,
    /// Free-form text message.
    Message,
    /// Catch-all for kinds the peer will not understand.
    Invalid,
}

impl MessageKind {
    /// Fixed header code sent on the wire.
    pub fn code(self) -> &'static str {
        match self {
            MessageKind::Command => "CMD",
            MessageKind::Data => "DAT",
            MessageKind::Message => "MSG",
            MessageKind::Invalid => "INV",
        }
    }

    /// Parse a header code; unknown codes map to `Invalid`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "CMD" => MessageKind::Command,
            "DAT" => MessageKind::Data,
            "MSG" => MessageKind::Message,
            _ => MessageKind::Invalid,
        }
    }
}

/// Topics the assembly feed is known to publish. Inbound headers are
/// free-form strings; these are the ones consumers subscribe to.
pub mod topics {
    pub const DATA: &str = "DATA";
    pub const ENTITY: &str = "ENTITY";
    pub const MESH: &str = "MESH";
    pub const SHAPE: &str = "SHAPE";
    pub const BEACON: &str = "BEACON";

    /// All well-known topics, for diagnostic subscribers.
    pub const ALL: [&str; 5] = [DATA, ENTITY, MESH, SHAPE, BEACON];
}
