//! Callback abstractions stored in the registry.
//!
//! Closures implement these traits directly, so callers usually just pass
//! `|topic, message, from| { ... }`.

/// Receives messages delivered on a subscribed topic.
pub trait Handler: Send + Sync {
    fn handle(&self, topic: &str, message: &str, from: &str);
}

impl<F> Handler for F
where
    F: Fn(&str, &str, &str) + Send + Sync,
{
    fn handle(&self, topic: &str, message: &str, from: &str) {
        self(topic, message, from)
    }
}

/// Receives messages on a reserved topic. The sender is not passed on.
pub trait SystemHandler: Send + Sync {
    fn handle(&self, topic: &str, message: &str);
}

impl<F> SystemHandler for F
where
    F: Fn(&str, &str) + Send + Sync,
{
    fn handle(&self, topic: &str, message: &str) {
        self(topic, message)
    }
}
