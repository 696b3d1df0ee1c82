//! Topic subscriptions: one handler per topic, looked up by the dispatch path.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Callback invoked with a frame's payload. Runs off the coordinating
/// task; must not assume any particular thread.
pub type Handler = Arc<dyn Fn(String) + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// A second handler was registered for a topic that already has one.
    /// Callers wanting replacement must unsubscribe first.
    #[error("topic {0:?} already has a subscriber")]
    DuplicateSubscription(String),
}

/// Registry mapping each topic to exactly one handler. Reads (dispatch)
/// dominate writes (setup/teardown), hence the read-mostly lock.
#[derive(Default)]
pub struct TopicRouter {
    inner: RwLock<HashMap<String, Handler>>,
}

impl TopicRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `topic`. Fails if the topic is already claimed.
    pub fn subscribe(&self, topic: impl Into<String>, handler: Handler) -> Result<(), RouterError> {
        let topic = topic.into();
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if map.contains_key(&topic) {
            return Err(RouterError::DuplicateSubscription(topic));
        }
        map.insert(topic, handler);
        Ok(())
    }

    /// Remove the handler for `topic`. Unknown topics are a no-op.
    pub fn unsubscribe(&self, topic: &str) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.remove(topic);
    }

    /// Look up the handler for `topic`.
    pub fn resolve(&self, topic: &str) -> Option<Handler> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.get(topic).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handler(hits: Arc<AtomicUsize>) -> Handler {
        Arc::new(move |_payload| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn subscribe_then_resolve() {
        let router = TopicRouter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        router.subscribe("DATA", counting_handler(hits.clone())).unwrap();

        let handler = router.resolve("DATA").expect("handler registered");
        (*handler)("payload".to_string());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn duplicate_subscription_rejected() {
        let router = TopicRouter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        router.subscribe("MESH", counting_handler(hits.clone())).unwrap();
        let err = router
            .subscribe("MESH", counting_handler(hits.clone()))
            .unwrap_err();
        assert!(matches!(err, RouterError::DuplicateSubscription(t) if t == "MESH"));
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let router = TopicRouter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        router.subscribe("SHAPE", counting_handler(hits.clone())).unwrap();
        router.unsubscribe("SHAPE");
        router.unsubscribe("SHAPE");
        router.unsubscribe("never-registered");
        assert!(router.resolve("SHAPE").is_none());
    }

    #[test]
    fn resubscribe_after_unsubscribe() {
        let router = TopicRouter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        router.subscribe("ENTITY", counting_handler(hits.clone())).unwrap();
        router.unsubscribe("ENTITY");
        router.subscribe("ENTITY", counting_handler(hits)).unwrap();
        assert!(router.resolve("ENTITY").is_some());
    }

    #[test]
    fn unknown_topic_resolves_to_none() {
        let router = TopicRouter::new();
        assert!(router.resolve("UNKNOWN").is_none());
    }
}
