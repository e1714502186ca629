//! Dispatcher.
//!
//! Resolves each topic of a pickup batch to its route while the registry is
//! locked, then runs the callbacks after the lock is released so handlers
//! never execute under it.

use std::sync::Arc;

use tracing::debug;

use super::message::{Message, PickupBatch};
use crate::registry::{Handler, Registry, Route, SystemHandler};

/// Messages for one topic together with where they go.
pub(crate) struct Delivery {
    pub topic: String,
    pub route: Route,
    pub messages: Vec<Message>,
}

/// Counters describing what a pickup did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Messages received in the batch.
    pub messages: usize,
    /// Ordinary callback invocations.
    pub delivered: usize,
    /// System callback invocations.
    pub system: usize,
    /// Messages nobody was registered for.
    pub unrouted: usize,
}

pub(crate) fn plan(registry: &Registry, batch: PickupBatch) -> Vec<Delivery> {
    batch
        .into_iter()
        .map(|(topic, messages)| Delivery {
            route: registry.route(&topic),
            topic,
            messages,
        })
        .collect()
}

/// Every handler sees every message, messages outermost, in list order.
pub(crate) fn deliver(handlers: &[Arc<dyn Handler>], messages: &[Message], report: &mut DispatchReport) {
    for msg in messages {
        for handler in handlers {
            handler.handle(&msg.topic, &msg.message, &msg.from);
            report.delivered += 1;
        }
    }
}

pub(crate) fn deliver_system(
    handler: &dyn SystemHandler,
    messages: &[Message],
    report: &mut DispatchReport,
) {
    for msg in messages {
        handler.handle(&msg.topic, &msg.message);
        report.system += 1;
    }
}

pub(crate) fn drop_unrouted(topic: &str, messages: &[Message], report: &mut DispatchReport) {
    debug!("no callback for {} ({} messages)", topic, messages.len());
    report.unrouted += messages.len();
}
