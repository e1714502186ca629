//! Subscription registry.
//!
//! Maps topics to the ordered callbacks registered for them, plus a separate
//! table of system callbacks keyed by reserved topics. The registry is owned
//! by a single [`Client`](crate::client::Client) and is never shared.

pub mod handler;

pub use handler::{Handler, SystemHandler};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Reserved topic on which the server asks clients to resubscribe.
pub const RESUBSCRIBE_TOPIC: &str = "/server/action/resubscribe";

/// Fallback for a reserved topic that has no ordinary subscribers.
#[derive(Clone)]
pub enum SystemCallback {
    /// Re-issue `SUBSCRIBE` for every callback on file.
    Resubscribe,
    Custom(Arc<dyn SystemHandler>),
}

impl fmt::Debug for SystemCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemCallback::Resubscribe => f.write_str("Resubscribe"),
            SystemCallback::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// What the dispatcher should do with messages delivered on a topic.
#[derive(Clone)]
pub enum Route {
    Ordinary(Vec<Arc<dyn Handler>>),
    System(SystemCallback),
    Unrouted,
}

#[derive(Default)]
pub struct Registry {
    subscriptions: HashMap<String, Vec<Arc<dyn Handler>>>,
    system: HashMap<String, SystemCallback>,
}

impl Registry {
    /// Creates a registry with the resubscribe callback pre-registered.
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.set_system(RESUBSCRIBE_TOPIC, SystemCallback::Resubscribe);
        registry
    }

    /// Appends `handler` to the list for `topic`, creating the list if absent.
    pub fn add(&mut self, topic: &str, handler: Arc<dyn Handler>) {
        self.subscriptions
            .entry(topic.to_string())
            .or_default()
            .push(handler);
    }

    /// Registers or replaces the system callback for a reserved topic.
    pub fn set_system(&mut self, topic: &str, callback: SystemCallback) {
        self.system.insert(topic.to_string(), callback);
    }

    pub fn handlers(&self, topic: &str) -> &[Arc<dyn Handler>] {
        self.subscriptions
            .get(topic)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn system(&self, topic: &str) -> Option<&SystemCallback> {
        self.system.get(topic)
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.subscriptions.keys().map(String::as_str)
    }

    /// Number of callbacks across all topics.
    pub fn len(&self) -> usize {
        self.subscriptions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every (topic, callback) pair currently on file, in registration order
    /// within each topic.
    pub fn pairs(&self) -> Vec<(String, Arc<dyn Handler>)> {
        self.subscriptions
            .iter()
            .flat_map(|(topic, handlers)| {
                handlers
                    .iter()
                    .map(move |handler| (topic.clone(), Arc::clone(handler)))
            })
            .collect()
    }

    /// Ordinary callbacks win; the system callback is only used when the
    /// topic has none.
    pub fn route(&self, topic: &str) -> Route {
        let handlers = self.handlers(topic);
        if !handlers.is_empty() {
            return Route::Ordinary(handlers.to_vec());
        }
        match self.system(topic) {
            Some(callback) => Route::System(callback.clone()),
            None => Route::Unrouted,
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .subscriptions
            .iter()
            .map(|(topic, handlers)| (topic.as_str(), handlers.len()))
            .collect();
        f.debug_struct("Registry")
            .field("subscriptions", &counts)
            .field("system", &self.system)
            .finish()
    }
}
