//! Message channel handler.
//!
//! Processes panel commands one at a time. Network exchanges run on their own
//! task so the channel stays responsive; a single permit rejects a second
//! send while one is in flight.

use std::sync::Arc;

use courier_domain::environment::Environment;
use courier_domain::request::{RequestSnapshot, ResolvedRequest};
use courier_domain::response::HttpResponse;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::builder::RequestBuilder;
use crate::error::ApplicationError;
use crate::messages::{InboundMessage, OutboundMessage, RequestErrorKind};
use crate::ports::HttpClient;
use crate::stores::{EnvironmentError, EnvironmentStore, HistoryStore};

/// One panel session.
pub struct Session<C: HttpClient + 'static> {
    client: Arc<C>,
    builder: RequestBuilder,
    environments: EnvironmentStore,
    history: HistoryStore,
    active: watch::Receiver<Environment>,
    send_permit: Arc<Semaphore>,
    outbound: mpsc::Sender<OutboundMessage>,
    in_flight: Option<JoinHandle<()>>,
}

impl<C: HttpClient + 'static> Session<C> {
    /// Creates a session that emits messages on `outbound`.
    pub fn new(
        client: Arc<C>,
        builder: RequestBuilder,
        environments: EnvironmentStore,
        history: HistoryStore,
        outbound: mpsc::Sender<OutboundMessage>,
    ) -> Self {
        let active = environments.subscribe();
        Self {
            client,
            builder,
            environments,
            history,
            active,
            send_permit: Arc::new(Semaphore::new(1)),
            outbound,
            in_flight: None,
        }
    }

    /// Returns the environment store.
    #[must_use]
    pub const fn environments(&self) -> &EnvironmentStore {
        &self.environments
    }

    /// Returns the environment store for direct edits.
    pub const fn environments_mut(&mut self) -> &mut EnvironmentStore {
        &mut self.environments
    }

    /// Returns the history store.
    #[must_use]
    pub const fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Parses and handles one JSON message.
    ///
    /// Malformed messages are answered with a `requestError`.
    pub async fn handle_json(&mut self, text: &str) {
        match serde_json::from_str::<InboundMessage>(text) {
            Ok(message) => self.handle(message).await,
            Err(e) => {
                warn!(error = %e, "rejected inbound message");
                self.emit(OutboundMessage::request_error(
                    RequestErrorKind::InvalidMessage,
                    e.to_string(),
                ))
                .await;
            }
        }
    }

    /// Handles one panel command.
    pub async fn handle(&mut self, message: InboundMessage) {
        match message {
            InboundMessage::SendRequest(send) => match send.into_snapshot() {
                Ok(snapshot) => self.send(snapshot).await,
                Err(e) => {
                    warn!(error = %e, "rejected request body");
                    self.emit(OutboundMessage::request_error(
                        RequestErrorKind::InvalidMessage,
                        e.to_string(),
                    ))
                    .await;
                }
            },
            InboundMessage::SaveEnvironments {
                environments,
                active_environment,
            } => {
                if let Err(e) = self
                    .environments
                    .replace_all(environments, active_environment)
                    .await
                {
                    self.report(&ApplicationError::from(e)).await;
                }
            }
            InboundMessage::GetInitialData => self.emit(self.init_data()).await,
            InboundMessage::ClearHistory => {
                if let Err(e) = self.history.clear().await {
                    self.report(&ApplicationError::from(e)).await;
                }
                self.emit_history().await;
            }
            InboundMessage::ReplayHistory { id } => self.replay(&id).await,
        }
    }

    /// Waits for the in-flight request, if any, to finish.
    pub async fn wait_idle(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "request task failed");
            }
        }
    }

    /// Builds the `initData` message.
    #[must_use]
    pub fn init_data(&self) -> OutboundMessage {
        OutboundMessage::InitData {
            history: self.history.entries(),
            environments: self.environments.environments().to_vec(),
            active_environment: self.environments.active_name().to_string(),
        }
    }

    async fn send(&mut self, snapshot: RequestSnapshot) {
        let Some(permit) = self.try_acquire().await else {
            return;
        };

        let environment = self.active.borrow().clone();
        match self.builder.build(&snapshot, &environment).await {
            Ok(request) => {
                self.dispatch(permit, snapshot, request, &environment.name)
                    .await;
            }
            Err(e) => {
                warn!(error = %e, "request rejected before dispatch");
                self.report(&ApplicationError::from(e)).await;
            }
        }
    }

    async fn replay(&mut self, id: &str) {
        let Some(permit) = self.try_acquire().await else {
            return;
        };

        let environment = self.active.borrow().clone();
        match self.history.replay(id, &environment) {
            Ok((snapshot, request)) => {
                self.dispatch(permit, snapshot, request, &environment.name)
                    .await;
            }
            Err(e) => self.report(&e).await,
        }
    }

    async fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        if let Ok(permit) = Arc::clone(&self.send_permit).try_acquire_owned() {
            return Some(permit);
        }
        warn!("send rejected, a request is already in flight");
        self.emit(OutboundMessage::request_error(
            RequestErrorKind::Busy,
            "A request is already in flight",
        ))
        .await;
        None
    }

    /// Records the request, then runs the exchange on its own task.
    async fn dispatch(
        &mut self,
        permit: OwnedSemaphorePermit,
        snapshot: RequestSnapshot,
        request: ResolvedRequest,
        environment: &str,
    ) {
        if let Err(e) = self
            .history
            .record(snapshot, request.clone(), environment)
            .await
        {
            warn!(error = %e, "history entry not persisted");
        }
        self.emit_history().await;

        let client = Arc::clone(&self.client);
        let outbound = self.outbound.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let _permit = permit;
            info!(method = %request.method, url = %request.url, "dispatching request");

            let response = match client.send(&request).await {
                Ok(response) => {
                    info!(
                        status = %response.status,
                        duration_ms = response.duration_ms,
                        size = response.size_bytes,
                        "request completed"
                    );
                    response
                }
                Err(e) => {
                    warn!(kind = e.kind(), error = %e, "transport failure");
                    HttpResponse::transport_failure(e.to_string())
                }
            };

            if outbound.send(OutboundMessage::Response(response)).await.is_err() {
                warn!("response dropped, channel closed");
            }
        }));
    }

    async fn emit_history(&self) {
        self.emit(OutboundMessage::LoadHistory {
            history: self.history.entries(),
        })
        .await;
    }

    async fn report(&self, error: &ApplicationError) {
        let kind = match error {
            ApplicationError::Build(e) => RequestErrorKind::from(e),
            ApplicationError::HistoryNotFound(_) => RequestErrorKind::NotFound,
            ApplicationError::Environment(EnvironmentError::NotFound(_)) => {
                RequestErrorKind::NotFound
            }
            ApplicationError::Storage(_)
            | ApplicationError::Environment(EnvironmentError::Store(_)) => {
                RequestErrorKind::Storage
            }
            ApplicationError::Environment(_) => RequestErrorKind::InvalidEnvironment,
        };
        self.emit(OutboundMessage::request_error(kind, error.to_string()))
            .await;
    }

    async fn emit(&self, message: OutboundMessage) {
        if self.outbound.send(message).await.is_err() {
            warn!("outbound channel closed");
        }
    }
}

impl<C: HttpClient + 'static> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("environments", &self.environments)
            .field("history", &self.history)
            .field("busy", &(self.send_permit.available_permits() == 0))
            .finish_non_exhaustive()
    }
}
