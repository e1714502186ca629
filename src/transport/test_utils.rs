//! Recording transport used by the client and dispatcher tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use super::{FormRequest, HttpResponse, Transport, TransportError};
use crate::codec;

/// Scripted reply for the next request.
pub(crate) enum Reply {
    Respond(HttpResponse),
    Fail(String),
}

/// Answers requests from a script (falling back to `200 ""`) and records
/// every request it receives. Replies queued for a path take precedence over
/// the shared queue, so concurrent callers cannot steal each other's answers.
#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    by_path: Arc<Mutex<HashMap<&'static str, VecDeque<Reply>>>>,
    requests: Arc<Mutex<Vec<FormRequest>>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, status: u16, body: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Respond(HttpResponse::new(status, body)));
        self
    }

    /// Queues an already-encoded pickup body built from plain JSON.
    pub(crate) fn respond_json(&self, json: &str) -> &Self {
        self.respond(200, &codec::encode(json))
    }

    /// Queues a reply reserved for requests to `path`.
    pub(crate) fn respond_to(&self, path: &'static str, status: u16, body: &str) -> &Self {
        self.by_path
            .lock()
            .unwrap()
            .entry(path)
            .or_default()
            .push_back(Reply::Respond(HttpResponse::new(status, body)));
        self
    }

    pub(crate) fn fail(&self, reason: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Fail(reason.to_string()));
        self
    }

    pub(crate) fn requests(&self) -> Vec<FormRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn requests_to(&self, path: &str) -> Vec<FormRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

/// Decodes a recorded field back to plain text.
pub(crate) fn decoded(request: &FormRequest, name: &str) -> Option<String> {
    request
        .get(name)
        .map(|v| codec::decode(v).expect("field is valid wire form"))
}

impl Transport for MockTransport {
    fn send(&self, request: FormRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>> {
        let routed = self
            .by_path
            .lock()
            .unwrap()
            .get_mut(request.path)
            .and_then(VecDeque::pop_front);
        self.requests.lock().unwrap().push(request);
        let reply = routed.or_else(|| self.replies.lock().unwrap().pop_front());
        async move {
            match reply {
                Some(Reply::Respond(resp)) => Ok(resp),
                Some(Reply::Fail(reason)) => Err(TransportError::Unreachable(reason)),
                None => Ok(HttpResponse::new(200, "")),
            }
        }
        .boxed()
    }
}
