//! Protocol client
//!
//! `Client` implements the four protocol verbs (publish, putval, subscribe
//! and pickup) plus the value and server queries. Every field is passed
//! through the codec before it goes on the wire.
//!
//! Concurrency notes:
//! - All operations take `&self` and may run concurrently. The registry sits
//!   behind a mutex that is never held across an `.await` or while callbacks
//!   run, so a subscribe completing during a pickup may or may not be seen by
//!   that pickup's dispatch.
//! - A panicking callback aborts the rest of its pickup batch. The registry
//!   is left as it was.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{Local, Utc};
use tracing::{debug, info, warn};

use super::dispatch::{self, DispatchReport};
use super::message;
use crate::codec::encode;
use crate::config::Settings;
use crate::identity::resolve_name;
use crate::registry::{Handler, Registry, Route, SystemCallback, SystemHandler};
use crate::transport::{FormRequest, HttpResponse, ReqwestTransport, Transport};
use crate::utils::error::ClientError;

const POST: &str = "POST";
const PUTVAL: &str = "PUTVAL";
const SUBSCRIBE: &str = "SUBSCRIBE";
const PICKUP: &str = "PICKUP";
const GETVAL: &str = "GETVAL";
const GETVALSBYREGEX: &str = "GETVALSBYREGEX";

/// Status the server answers a successful `PUTVAL` with when the value
/// already lives elsewhere.
pub const PERMANENT_REDIRECT: u16 = 308;

/// Read-only server endpoints answered with an encoded JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerQuery {
    Stats,
    Clients,
    Posters,
    Topics,
}

impl ServerQuery {
    pub fn path(&self) -> &'static str {
        match self {
            ServerQuery::Stats => "STATS",
            ServerQuery::Clients => "CLIENTS",
            ServerQuery::Posters => "POSTERS",
            ServerQuery::Topics => "TOPICS",
        }
    }
}

/// Account on a multi-user server. Sent only when both parts are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub struct Client<T: Transport = ReqwestTransport> {
    identity: String,
    credentials: Option<Credentials>,
    transport: T,
    registry: Mutex<Registry>,
}

impl Client<ReqwestTransport> {
    /// Connects to `http://{ip}:{port}`. An empty or missing `name` gets a
    /// generated identity.
    pub fn new(ip: &str, port: u16, name: Option<&str>) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(ip, port)?;
        Ok(Self::with_transport(transport, name))
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::with_timeout(
            &settings.server.host,
            settings.server.port,
            Duration::from_secs(settings.client.timeout_secs),
        )?;
        let client = Self::with_transport(transport, Some(settings.client.name.as_str()));
        Ok(match (&settings.client.username, &settings.client.password) {
            (Some(username), Some(password)) => client.with_credentials(username, password),
            _ => client,
        })
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T, name: Option<&str>) -> Self {
        Self {
            identity: resolve_name(name.unwrap_or_default()),
            credentials: None,
            transport,
            registry: Mutex::new(Registry::new()),
        }
    }

    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }

    /// The name this client announces to the server.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Number of callbacks registered for `topic`.
    pub fn subscription_count(&self, topic: &str) -> usize {
        self.registry().handlers(topic).len()
    }

    /// Topics with at least one callback, sorted.
    pub fn subscribed_topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.registry().topics().map(str::to_string).collect();
        topics.sort();
        topics
    }

    /// Installs a fallback for a reserved topic, replacing any existing one.
    pub fn register_system_callback<H>(&self, topic: &str, handler: H)
    where
        H: SystemHandler + 'static,
    {
        self.registry()
            .set_system(topic, SystemCallback::Custom(Arc::new(handler)));
    }

    /// Publishes `message` on `topic`.
    pub async fn publish(&self, topic: &str, message: &str) -> Result<(), ClientError> {
        let request = self.stamped(
            FormRequest::post(POST)
                .field("topic", encode(topic))
                .field("message", encode(message)),
        );
        self.exchange("publish", request, is_success).await?;
        debug!("Published to {}", topic);
        Ok(())
    }

    /// Stores `value` under `name`. A 308 answer counts as success: the write
    /// took effect even though the value lives elsewhere.
    pub async fn putval(&self, name: &str, value: &str) -> Result<(), ClientError> {
        let request = self.stamped(
            FormRequest::put(PUTVAL)
                .field("valname", encode(name))
                .field("val", encode(value)),
        );
        self.exchange("putval", request, |status| {
            is_success(status) || status == PERMANENT_REDIRECT
        })
        .await?;
        info!("PutVal {} = {}", name, value);
        Ok(())
    }

    /// Subscribes to `topic`. `handler` is registered only once the server
    /// has acknowledged the subscription.
    pub async fn subscribe<H>(&self, topic: &str, handler: H) -> Result<(), ClientError>
    where
        H: Handler + 'static,
    {
        self.subscribe_shared(topic, Arc::new(handler)).await
    }

    /// Like [`subscribe`](Self::subscribe) for a handler shared between
    /// several topics.
    pub async fn subscribe_shared(
        &self,
        topic: &str,
        handler: Arc<dyn Handler>,
    ) -> Result<(), ClientError> {
        self.send_subscribe(topic).await?;
        self.registry().add(topic, handler);
        info!("{} subscribed to {}", self.identity, topic);
        Ok(())
    }

    /// Re-announces every (topic, callback) pair on file, one `SUBSCRIBE`
    /// per pair. Local callbacks are kept as they are. Every pair is tried;
    /// the first failure is returned after the rest have been attempted.
    pub async fn resubscribe(&self) -> Result<usize, ClientError> {
        let pairs = self.registry().pairs();
        info!("{} resubscribing {} subscriptions", self.identity, pairs.len());

        let mut renewed = 0;
        let mut first_error = None;
        for (topic, _handler) in pairs {
            match self.send_subscribe(&topic).await {
                Ok(()) => renewed += 1,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(renewed),
        }
    }

    /// Fetches buffered messages for this client and runs the matching
    /// callbacks. A body that fails to decode aborts the cycle before any
    /// callback runs.
    pub async fn pickup(&self) -> Result<DispatchReport, ClientError> {
        let request = FormRequest::post(PICKUP).field("client", encode(&self.identity));
        let resp = self.exchange("pickup", request, is_success).await?;

        let batch = message::parse_batch(&resp.body).map_err(|e| {
            warn!("pickup returned malformed data: {}", e);
            ClientError::from(e)
        })?;

        let mut report = DispatchReport {
            messages: batch.values().map(Vec::len).sum(),
            ..DispatchReport::default()
        };
        let deliveries = dispatch::plan(&self.registry(), batch);

        for delivery in deliveries {
            match delivery.route {
                Route::Ordinary(handlers) => {
                    dispatch::deliver(&handlers, &delivery.messages, &mut report)
                }
                Route::System(SystemCallback::Custom(handler)) => {
                    dispatch::deliver_system(handler.as_ref(), &delivery.messages, &mut report)
                }
                Route::System(SystemCallback::Resubscribe) => {
                    for _ in &delivery.messages {
                        if let Err(e) = self.resubscribe().await {
                            warn!("resubscribe requested by server failed: {}", e);
                        }
                        report.system += 1;
                    }
                }
                Route::Unrouted => {
                    dispatch::drop_unrouted(&delivery.topic, &delivery.messages, &mut report)
                }
            }
        }

        Ok(report)
    }

    /// Reads a stored value. `None` when the server has nothing to say.
    pub async fn getval(&self, name: &str) -> Result<Option<serde_json::Value>, ClientError> {
        self.lookup("getval", GETVAL, name).await
    }

    /// Reads every stored value whose name matches `pattern`.
    pub async fn getvals_by_regex(
        &self,
        pattern: &str,
    ) -> Result<Option<serde_json::Value>, ClientError> {
        self.lookup("getvals_by_regex", GETVALSBYREGEX, pattern).await
    }

    pub async fn query(&self, query: ServerQuery) -> Result<Option<serde_json::Value>, ClientError> {
        let request = FormRequest::post(query.path()).field("client", encode(&self.identity));
        let resp = self.exchange(query.path(), request, is_success).await?;
        Ok(message::parse_value(&resp.body)?)
    }

    async fn lookup(
        &self,
        operation: &'static str,
        path: &'static str,
        topic: &str,
    ) -> Result<Option<serde_json::Value>, ClientError> {
        let request = FormRequest::post(path)
            .field("client", encode(&self.identity))
            .field("topic", encode(topic));
        let resp = self.exchange(operation, request, is_success).await?;
        Ok(message::parse_value(&resp.body)?)
    }

    async fn send_subscribe(&self, topic: &str) -> Result<(), ClientError> {
        let request = FormRequest::post(SUBSCRIBE)
            .field("topic", encode(topic))
            .field("client", encode(&self.identity));
        self.exchange("subscribe", request, is_success).await?;
        Ok(())
    }

    /// Adds the timestamp and sender fields shared by publish and putval.
    fn stamped(&self, request: FormRequest) -> FormRequest {
        request
            .field("updated_time", encode(&Utc::now().timestamp().to_string()))
            .field(
                "updated_nicedatetime",
                encode(&Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
            )
            .field("from", encode(&self.identity))
    }

    fn authenticate(&self, request: FormRequest) -> FormRequest {
        match &self.credentials {
            Some(c) if !c.username.is_empty() && !c.password.is_empty() => request
                .field("username", encode(&c.username))
                .field("password", encode(&c.password)),
            _ => request,
        }
    }

    /// Sends `request` and checks the status. Failures are logged here and
    /// returned to the caller.
    async fn exchange(
        &self,
        operation: &'static str,
        request: FormRequest,
        accepts: fn(u16) -> bool,
    ) -> Result<HttpResponse, ClientError> {
        let request = self.authenticate(request);
        let resp = match self.transport.send(request).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("{} failed: {}", operation, e);
                return Err(e.into());
            }
        };

        if !accepts(resp.status) {
            warn!("{} failed: {} {}", operation, resp.status, resp.body);
            return Err(ClientError::Protocol {
                operation,
                status: resp.status,
                body: resp.body,
            });
        }
        Ok(resp)
    }

    pub(crate) fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
