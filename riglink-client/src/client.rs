//! Link client: owns the connection state machine, the active socket,
//! probe rounds, and inbound dispatch.

use std::net::SocketAddr;
use std::time::Duration;

use riglink_core::link::{ClientState, LinkCore, TickAction};
use riglink_core::router::{RouterError, TopicRouter};
use riglink_core::wire::{encode_frame, DecodeEvent, FrameDecoder};
use riglink_core::{Handler, MessageKind};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::{enumerate, probe};

const READ_BUF_SIZE: usize = 4096;

/// Source of probe candidates. Swapped out in tests and embeddings;
/// defaults to the local subnet sweep.
pub type CandidateFn = dyn Fn(u16) -> Vec<SocketAddr> + Send + Sync;

enum LinkEvent {
    ProbeOpened(SocketAddr, TcpStream),
    ProbeExhausted,
    Inbound(Vec<u8>),
    ConnectionLost,
}

struct ActiveConnection {
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

/// The transport client. Create inside a tokio runtime (dispatch workers
/// are spawned at construction), register subscriptions, then drive it
/// with [`LinkClient::run`] or explicit [`LinkClient::tick`] calls.
pub struct LinkClient {
    cfg: Config,
    core: Mutex<LinkCore>,
    decoder: Mutex<FrameDecoder>,
    router: TopicRouter,
    dispatcher: Dispatcher,
    events_tx: mpsc::UnboundedSender<LinkEvent>,
    events_rx: Mutex<mpsc::UnboundedReceiver<LinkEvent>>,
    conn: Mutex<Option<ActiveConnection>>,
    probe_round: Mutex<Option<JoinHandle<()>>>,
    candidates: Box<CandidateFn>,
}

impl LinkClient {
    pub fn new(cfg: Config) -> Self {
        Self::with_candidates(cfg, Box::new(enumerate::candidates))
    }

    /// Build a client over a custom candidate source.
    pub fn with_candidates(cfg: Config, candidates: Box<CandidateFn>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(cfg.dispatch_queue, cfg.dispatch_workers);
        Self {
            cfg,
            core: Mutex::new(LinkCore::new()),
            decoder: Mutex::new(FrameDecoder::new()),
            router: TopicRouter::new(),
            dispatcher,
            events_tx,
            events_rx: Mutex::new(events_rx),
            conn: Mutex::new(None),
            probe_round: Mutex::new(None),
            candidates,
        }
    }

    /// Register `handler` for a topic's payloads. Fails if the topic
    /// already has a subscriber.
    pub fn subscribe(&self, topic: impl Into<String>, handler: Handler) -> Result<(), RouterError> {
        self.router.subscribe(topic, handler)
    }

    /// Drop the subscription for `topic`, if any.
    pub fn unsubscribe(&self, topic: &str) {
        self.router.unsubscribe(topic)
    }

    pub async fn state(&self) -> ClientState {
        self.core.lock().await.state()
    }

    pub async fn known_endpoint(&self) -> Option<SocketAddr> {
        self.core.lock().await.known_endpoint()
    }

    /// Emit one message to the connected service.
    pub async fn send(&self, kind: MessageKind, text: &str) -> std::io::Result<()> {
        let conn = self.conn.lock().await;
        let active = conn.as_ref().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "no active connection")
        })?;
        active
            .outbound
            .send(encode_frame(kind, text))
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::NotConnected, "connection closing"))
    }

    /// One state-machine step: drain pending events, then start whatever
    /// the machine asks for. Non-blocking while connected.
    pub async fn tick(&self) {
        self.drain_events().await;
        let action = self.core.lock().await.on_tick();
        match action {
            TickAction::StartSearch => {
                self.launch_probe((self.candidates)(self.cfg.service_port)).await;
            }
            TickAction::StartReconnect(endpoint) => {
                self.launch_probe(vec![endpoint]).await;
            }
            TickAction::Drain | TickAction::Idle | TickAction::Finished => {}
        }
    }

    /// Timer-driven scheduler loop: ticks at the configured cadence until
    /// the machine reaches `Closed`.
    pub async fn run(&self) {
        let mut interval =
            tokio::time::interval(Duration::from_millis(self.cfg.tick_interval_ms.max(1)));
        loop {
            interval.tick().await;
            self.tick().await;
            if self.state().await == ClientState::Closed {
                break;
            }
        }
    }

    /// Shut down: abort the outstanding probe round (its result will not
    /// be adopted), close the active connection, and await its teardown.
    pub async fn shutdown(&self) {
        self.core.lock().await.on_shutdown();
        if let Some(round) = self.probe_round.lock().await.take() {
            round.abort();
        }
        self.close_connection().await;
        self.core.lock().await.on_close_complete();
        log::info!("link closed");
    }

    async fn drain_events(&self) {
        loop {
            let event = { self.events_rx.lock().await.try_recv() };
            let Ok(event) = event else { break };
            match event {
                LinkEvent::Inbound(bytes) => {
                    let decoded = self.decoder.lock().await.push(&bytes);
                    for ev in decoded {
                        match ev {
                            DecodeEvent::Frame(frame) => {
                                self.dispatcher.dispatch(&self.router, frame)
                            }
                            DecodeEvent::Dropped(warning) => {
                                log::warn!("inbound frame dropped: {warning}")
                            }
                        }
                    }
                }
                LinkEvent::ProbeOpened(endpoint, stream) => {
                    if self.core.lock().await.on_probe_opened(endpoint) {
                        log::info!("connected to feed service at {endpoint}");
                        self.adopt(stream).await;
                    } else {
                        log::debug!("discarding probe result for {endpoint}");
                    }
                }
                LinkEvent::ProbeExhausted => {
                    self.core.lock().await.on_probe_exhausted();
                    log::debug!("probe round exhausted");
                }
                LinkEvent::ConnectionLost => {
                    self.close_connection().await;
                    let mut core = self.core.lock().await;
                    if core.state() == ClientState::Connected {
                        log::warn!("connection lost; will retry {:?}", core.known_endpoint());
                    }
                    core.on_connection_lost();
                }
            }
        }
    }

    async fn launch_probe(&self, candidates: Vec<SocketAddr>) {
        log::debug!("probing {} candidate(s)", candidates.len());
        let events_tx = self.events_tx.clone();
        let attempt_timeout = Duration::from_millis(self.cfg.probe_timeout_ms);
        let round = tokio::spawn(async move {
            match probe::probe(candidates, attempt_timeout).await {
                Some((endpoint, stream)) => {
                    let _ = events_tx.send(LinkEvent::ProbeOpened(endpoint, stream));
                }
                None => {
                    let _ = events_tx.send(LinkEvent::ProbeExhausted);
                }
            }
        });
        *self.probe_round.lock().await = Some(round);
    }

    async fn adopt(&self, stream: TcpStream) {
        let (mut read_half, mut write_half) = stream.into_split();

        let inbound_tx = self.events_tx.clone();
        let reader = tokio::spawn(async move {
            let mut buf = vec![0u8; READ_BUF_SIZE];
            loop {
                match read_half.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        if inbound_tx.send(LinkEvent::Inbound(buf[..n].to_vec())).is_err() {
                            return;
                        }
                    }
                }
            }
            let _ = inbound_tx.send(LinkEvent::ConnectionLost);
        });

        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let writer = tokio::spawn(async move {
            while let Some(bytes) = outbound_rx.recv().await {
                if write_half.write_all(&bytes).await.is_err() {
                    break;
                }
                let _ = write_half.flush().await;
            }
            let _ = write_half.shutdown().await;
        });

        let mut conn = self.conn.lock().await;
        *conn = Some(ActiveConnection { outbound, reader, writer });
    }

    /// Tear the active connection down and await both halves.
    async fn close_connection(&self) {
        let taken = self.conn.lock().await.take();
        if let Some(active) = taken {
            drop(active.outbound);
            active.reader.abort();
            let _ = active.reader.await;
            let _ = active.writer.await;
        }
    }
}
