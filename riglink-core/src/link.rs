//! Host-driven connection state machine: the host passes events (ticks,
//! probe outcomes, connection loss) and receives the action to perform.

use std::net::SocketAddr;

/// Targeted retries against the last known endpoint before the machine
/// forgets it and falls back to a full search.
pub const DEFAULT_RECONNECT_ATTEMPTS: u32 = 3;

/// Connection lifecycle. Exactly one value holds at any instant; the
/// machine starts `Disconnected` and only shutdown reaches `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Searching,
    Connected,
    Disconnected,
    Reconnecting,
    Closing,
    Closed,
}

/// What the host should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Nothing to start: a probe round is outstanding, or shutdown is in
    /// progress.
    Idle,
    /// Connected: drain buffered inbound bytes, non-blocking.
    Drain,
    /// Launch a probe round over the full candidate list.
    StartSearch,
    /// Launch a probe round against the previously known endpoint only.
    StartReconnect(SocketAddr),
    /// The machine is closed; stop driving it.
    Finished,
}

/// The connection state machine. Owns no I/O: the host launches probes,
/// adopts sockets, and closes connections on its behalf.
pub struct LinkCore {
    state: ClientState,
    known_endpoint: Option<SocketAddr>,
    probe_outstanding: bool,
    targeted_failures: u32,
    reconnect_attempts: u32,
}

impl LinkCore {
    pub fn new() -> Self {
        Self {
            state: ClientState::Disconnected,
            known_endpoint: None,
            probe_outstanding: false,
            targeted_failures: 0,
            reconnect_attempts: DEFAULT_RECONNECT_ATTEMPTS,
        }
    }

    /// Set how many targeted retries to attempt before a full search.
    pub fn set_reconnect_attempts(&mut self, n: u32) {
        self.reconnect_attempts = n;
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    /// The endpoint of the last adopted connection, if any.
    pub fn known_endpoint(&self) -> Option<SocketAddr> {
        self.known_endpoint
    }

    /// Periodic step. Returns the action the host should take; re-entrant
    /// ticks while a probe round is outstanding are no-ops.
    pub fn on_tick(&mut self) -> TickAction {
        match self.state {
            ClientState::Connected => TickAction::Drain,
            ClientState::Closing => TickAction::Idle,
            ClientState::Closed => TickAction::Finished,
            ClientState::Searching | ClientState::Reconnecting if self.probe_outstanding => {
                TickAction::Idle
            }
            ClientState::Searching => {
                self.probe_outstanding = true;
                TickAction::StartSearch
            }
            ClientState::Reconnecting | ClientState::Disconnected => {
                self.probe_outstanding = true;
                match self.known_endpoint {
                    Some(endpoint) => {
                        self.state = ClientState::Reconnecting;
                        TickAction::StartReconnect(endpoint)
                    }
                    None => {
                        self.state = ClientState::Searching;
                        TickAction::StartSearch
                    }
                }
            }
        }
    }

    /// A probe won its race. Returns whether the host may adopt the
    /// connection; adoption is refused once shutdown has been requested
    /// (or if no probe round is expected to report).
    pub fn on_probe_opened(&mut self, endpoint: SocketAddr) -> bool {
        match self.state {
            ClientState::Searching | ClientState::Reconnecting => {
                self.state = ClientState::Connected;
                self.known_endpoint = Some(endpoint);
                self.probe_outstanding = false;
                self.targeted_failures = 0;
                true
            }
            _ => false,
        }
    }

    /// Every attempt in the outstanding probe round failed. Re-arms the
    /// next tick; repeated targeted failures forget the known endpoint.
    pub fn on_probe_exhausted(&mut self) {
        if !self.probe_outstanding {
            return;
        }
        self.probe_outstanding = false;
        match self.state {
            ClientState::Reconnecting => {
                self.targeted_failures += 1;
                if self.targeted_failures >= self.reconnect_attempts {
                    self.known_endpoint = None;
                    self.targeted_failures = 0;
                }
                self.state = ClientState::Disconnected;
            }
            ClientState::Searching => {
                self.state = ClientState::Disconnected;
            }
            _ => {}
        }
    }

    /// The adopted connection closed or errored. The known endpoint is
    /// kept so the next tick retries it directly.
    pub fn on_connection_lost(&mut self) {
        if self.state == ClientState::Connected {
            self.state = ClientState::Reconnecting;
        }
    }

    /// Begin shutdown. The host must abort outstanding probes, close the
    /// active connection, then report completion via
    /// [`LinkCore::on_close_complete`].
    pub fn on_shutdown(&mut self) {
        if self.state != ClientState::Closed {
            self.state = ClientState::Closing;
        }
    }

    /// The active connection (if any) has been torn down.
    pub fn on_close_complete(&mut self) {
        if self.state == ClientState::Closing {
            self.state = ClientState::Closed;
        }
    }
}

impl Default for LinkCore {
    fn default() -> Self {
        Self::new()
    }
}
