//! Courier - stdio host for the request composer.
//!
//! Reads panel commands as JSON lines from an input stream and writes
//! replies as JSON lines to an output stream. Everything else is wiring:
//! settings, the state store, the reqwest transport and a [`Session`].

use std::sync::Arc;

use courier_application::ports::{HttpClientError, KeyValueStore, StoreError};
use courier_application::{
    EnvironmentStore, HistoryStore, InboundMessage, OutboundMessage, RequestBuilder, Session,
};
use courier_domain::settings::ClientSettings;
use courier_infrastructure::{ReqwestHttpClient, SystemClock, TokioAttachmentReader};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Capacity of the outbound message queue.
const OUTBOUND_CAPACITY: usize = 64;

/// Errors that stop the host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The input or output stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted state could not be loaded.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The HTTP client could not be created.
    #[error("HTTP client error: {0}")]
    Client(#[from] HttpClientError),

    /// The output task stopped unexpectedly.
    #[error("Writer task failed: {0}")]
    Writer(String),
}

/// Builds a session over the reqwest transport and the given store.
///
/// # Errors
///
/// Returns an error if the client cannot be built or state cannot be loaded.
pub async fn build_session(
    store: Arc<dyn KeyValueStore>,
    settings: ClientSettings,
    outbound: mpsc::Sender<OutboundMessage>,
) -> Result<Session<ReqwestHttpClient>, HostError> {
    let client = Arc::new(ReqwestHttpClient::new(settings)?);
    let builder = RequestBuilder::new(Arc::new(TokioAttachmentReader::new()));
    let environments = EnvironmentStore::load(Arc::clone(&store)).await?;
    let history = HistoryStore::load(store, Arc::new(SystemClock::new())).await?;

    Ok(Session::new(
        client,
        builder,
        environments,
        history,
        outbound,
    ))
}

/// Runs the host until `input` reaches end of stream.
///
/// Sends `initData` first, then handles one command per non-blank line.
/// Returns once the last in-flight request has been answered and every
/// reply has been written.
///
/// # Errors
///
/// Returns an error if setup fails or either stream fails.
pub async fn run<R, W>(
    store: Arc<dyn KeyValueStore>,
    settings: ClientSettings,
    input: R,
    output: W,
) -> Result<(), HostError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
    let writer = tokio::spawn(write_messages(rx, output));

    let mut session = build_session(store, settings, tx).await?;
    session.handle(InboundMessage::GetInitialData).await;

    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!(len = line.len(), "inbound message");
        session.handle_json(line).await;
    }

    info!("input closed, draining");
    session.wait_idle().await;
    drop(session);

    writer
        .await
        .map_err(|e| HostError::Writer(e.to_string()))??;
    Ok(())
}

/// Writes each outbound message as one JSON line until every sender is gone.
async fn write_messages<W>(
    mut rx: mpsc::Receiver<OutboundMessage>,
    mut output: W,
) -> Result<(), HostError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = rx.recv().await {
        let mut line = match serde_json::to_string(&message) {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, "dropping unserializable message");
                continue;
            }
        };
        line.push('\n');
        output.write_all(line.as_bytes()).await?;
        output.flush().await?;
    }
    output.shutdown().await?;
    Ok(())
}
