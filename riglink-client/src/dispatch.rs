//! Frame dispatch: a bounded work queue drained by a small worker pool.
//! Handlers run detached from the coordinator; their failures stay here.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use riglink_core::router::TopicRouter;
use riglink_core::wire::Frame;
use riglink_core::Handler;
use tokio::sync::{mpsc, Mutex};

struct Job {
    topic: String,
    handler: Handler,
    payload: String,
}

pub struct Dispatcher {
    tx: mpsc::Sender<Job>,
}

impl Dispatcher {
    /// Spawn `workers` consumers over a queue of depth `depth`. Must be
    /// called within a tokio runtime.
    pub fn new(depth: usize, workers: usize) -> Self {
        let (tx, rx) = mpsc::channel(depth.max(1));
        let rx = Arc::new(Mutex::new(rx));
        for _ in 0..workers.max(1) {
            let rx = rx.clone();
            tokio::spawn(async move {
                loop {
                    let job = { rx.lock().await.recv().await };
                    let Some(Job { topic, handler, payload }) = job else {
                        break;
                    };
                    if catch_unwind(AssertUnwindSafe(|| (*handler)(payload))).is_err() {
                        log::warn!("subscriber for topic {topic:?} panicked");
                    }
                }
            });
        }
        Self { tx }
    }

    /// Route one frame: resolve its topic, queue the handler invocation.
    /// Unknown topics and a full queue both drop the frame with a warning.
    pub fn dispatch(&self, router: &TopicRouter, frame: Frame) {
        let Some(handler) = router.resolve(&frame.topic) else {
            log::warn!("no subscriber for topic {:?}; frame dropped", frame.topic);
            return;
        };
        let job = Job {
            topic: frame.topic,
            handler,
            payload: frame.payload,
        };
        if let Err(err) = self.tx.try_send(job) {
            let job = match err {
                mpsc::error::TrySendError::Full(job) => job,
                mpsc::error::TrySendError::Closed(job) => job,
            };
            log::warn!("dispatch queue full; frame for topic {:?} dropped", job.topic);
        }
    }
}
