//! WebSocket connection and receive loop.
//!
//! This module handles the WebSocket connection to the NemesisDB server,
//! including the single-in-flight query/response pairing.
//!
//! # Receive Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Establishing the socket (with a connect timeout)
//! - Incoming frames from the server (query responses)
//! - Outgoing frames from the client API
//! - Resolving the pending query on close or disconnect
//!
//! The wire carries no request identifiers: the server answers each
//! request with exactly one response, in order. Correlation therefore
//! relies on at most one query being in flight at a time, which
//! [`Connection::query`] enforces by rejecting overlapping calls.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default window for the connect phase of [`Connection::start`].
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Frame
// ============================================================================

/// An opaque payload travelling over the connection.
///
/// The connection does not inspect frame contents; the command layer
/// produces and consumes them. Text frames carry the JSON command
/// protocol, binary frames pass through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A UTF-8 text frame.
    Text(String),
    /// A binary frame.
    Binary(Vec<u8>),
}

impl Frame {
    /// Creates a text frame.
    #[inline]
    pub fn text(payload: impl Into<String>) -> Self {
        Self::Text(payload.into())
    }

    /// Creates a binary frame.
    #[inline]
    pub fn binary(payload: impl Into<Vec<u8>>) -> Self {
        Self::Binary(payload.into())
    }

    /// Returns the payload length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(s) => s.len(),
            Self::Binary(b) => b.len(),
        }
    }

    /// Returns `true` if the payload is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the text payload, or `None` for a binary frame.
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Binary(_) => None,
        }
    }

    /// Converts into a wire message.
    fn into_message(self) -> Message {
        match self {
            Self::Text(s) => Message::Text(s.into()),
            Self::Binary(b) => Message::Binary(b.into()),
        }
    }

    /// Converts a wire message into a frame.
    ///
    /// Control messages (ping, pong, close) carry no payload for the
    /// client and map to `None`.
    fn from_message(message: Message) -> Option<Self> {
        match message {
            Message::Text(s) => Some(Self::Text(s.as_str().to_owned())),
            Message::Binary(b) => Some(Self::Binary(b.to_vec())),
            _ => None,
        }
    }
}

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of a [`Connection`].
///
/// Transitions are one-way; `Closed` is terminal for the instance and a
/// fresh [`Connection`] is required to reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created, `start` not yet called.
    Disconnected,
    /// `start` called, socket being established.
    Connecting,
    /// Socket established, queries accepted.
    Open,
    /// Teardown in progress.
    Closing,
    /// Torn down. Terminal.
    Closed,
}

// ============================================================================
// PendingQuery
// ============================================================================

/// Outcome delivered to the caller awaiting a query.
enum QueryOutcome {
    /// The response frame arrived.
    Delivered(Frame),
    /// The user closed the connection while the query was outstanding.
    Canceled,
    /// The peer or the transport failed while the query was outstanding.
    Disconnected,
}

/// The single outstanding query.
///
/// Owns the completion side of a oneshot, so it resolves exactly once;
/// whichever of the receive loop or the teardown path takes it out of
/// the slot is the resolver.
struct PendingQuery {
    tx: oneshot::Sender<QueryOutcome>,
}

impl PendingQuery {
    fn new(tx: oneshot::Sender<QueryOutcome>) -> Self {
        Self { tx }
    }

    fn resolve(self, frame: Frame) {
        let _ = self.tx.send(QueryOutcome::Delivered(frame));
    }

    fn cancel(self) {
        let _ = self.tx.send(QueryOutcome::Canceled);
    }

    fn disconnect(self) {
        let _ = self.tx.send(QueryOutcome::Disconnected);
    }
}

// ============================================================================
// LoopCommand
// ============================================================================

/// Commands from the client API to the receive loop.
///
/// The loop owns the write half of the socket, so sends travel through
/// this channel rather than touching the socket directly.
enum LoopCommand {
    /// Send a frame to the server.
    Send(Frame),
    /// Close the socket and terminate the loop.
    Close,
}

// ============================================================================
// Shared
// ============================================================================

/// State shared between the connection handle and the receive loop.
struct Shared {
    /// Lifecycle state.
    state: Mutex<ConnectionState>,
    /// The at-most-one outstanding query.
    pending: Mutex<Option<PendingQuery>>,
    /// Set by `close` so teardown resolves the pending query as
    /// canceled rather than disconnected.
    user_closed: AtomicBool,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: Mutex::new(ConnectionState::Disconnected),
            pending: Mutex::new(None),
            user_closed: AtomicBool::new(false),
        }
    }

    fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.lock() = state;
    }

    fn take_pending(&self) -> Option<PendingQuery> {
        self.pending.lock().take()
    }
}

// ============================================================================
// Connection
// ============================================================================

/// WebSocket connection to a NemesisDB server.
///
/// A connection is started once, carries at most one query at a time,
/// and is closed once; `Closed` is terminal. The receive loop runs as a
/// background task for the lifetime of the socket.
///
/// # Thread Safety
///
/// `Connection` is `Send + Sync`; `query` and `close` may be called from
/// different tasks. Overlapping queries are rejected with
/// [`Error::AlreadyInFlight`] rather than queued.
pub struct Connection {
    /// State shared with the receive loop.
    shared: Arc<Shared>,
    /// Channel to the receive loop; present between `start` and `close`.
    command_tx: Mutex<Option<mpsc::UnboundedSender<LoopCommand>>>,
    /// Handle to the receive loop task, reaped on close.
    recv_task: Mutex<Option<JoinHandle<()>>>,
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection {
    /// Creates a connection in the `Disconnected` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::new()),
            command_tx: Mutex::new(None),
            recv_task: Mutex::new(None),
        }
    }

    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Returns `true` if a query is currently awaiting its response.
    #[inline]
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.shared.pending.lock().is_some()
    }

    /// Connects to the server with the default connect timeout.
    ///
    /// See [`Connection::start_with_timeout`].
    pub async fn start(&self, uri: &str) -> Result<()> {
        self.start_with_timeout(uri, DEFAULT_CONNECT_TIMEOUT).await
    }

    /// Connects to the server, spawning the receive loop.
    ///
    /// Blocks until the socket is established or the attempt fails; on
    /// failure the connection is `Closed` with no background task left
    /// behind.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyStarted`] if this instance was started before
    /// - [`Error::InvalidArgument`] if `uri` is empty or not a `ws`/`wss` URL
    /// - [`Error::ConnectionTimeout`] if the connect window elapses
    /// - [`Error::Connection`] on refusal or handshake failure
    pub async fn start_with_timeout(&self, uri: &str, connect_timeout: Duration) -> Result<()> {
        {
            let mut state = self.shared.state.lock();
            if *state != ConnectionState::Disconnected {
                return Err(Error::AlreadyStarted);
            }
            *state = ConnectionState::Connecting;
        }

        if let Err(e) = validate_uri(uri) {
            self.shared.set_state(ConnectionState::Closed);
            return Err(e);
        }

        let (connected_tx, connected_rx) = oneshot::channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_loop(
            uri.to_owned(),
            connect_timeout,
            connected_tx,
            command_rx,
            Arc::clone(&self.shared),
        ));

        *self.command_tx.lock() = Some(command_tx);
        *self.recv_task.lock() = Some(task);

        match connected_rx.await {
            Ok(Ok(())) => {
                debug!(uri, "connection open");
                Ok(())
            }
            Ok(Err(e)) => {
                self.reap().await;
                self.shared.set_state(ConnectionState::Closed);
                Err(e)
            }
            Err(_) => {
                self.reap().await;
                self.shared.set_state(ConnectionState::Closed);
                Err(Error::connection("connection task exited before reporting"))
            }
        }
    }

    /// Sends a frame and waits for the single matching response frame.
    ///
    /// Valid only while the connection is `Open`.
    ///
    /// # Errors
    ///
    /// - [`Error::Disconnected`] if the connection is not open, or the
    ///   socket is lost while the query is outstanding
    /// - [`Error::AlreadyInFlight`] if another query is still awaiting
    ///   its response (nothing is sent)
    /// - [`Error::Canceled`] if [`Connection::close`] is called while
    ///   the query is outstanding
    pub async fn query(&self, frame: Frame) -> Result<Frame> {
        if self.state() != ConnectionState::Open {
            return Err(Error::Disconnected);
        }

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.shared.pending.lock();
            if pending.is_some() {
                return Err(Error::AlreadyInFlight);
            }
            *pending = Some(PendingQuery::new(tx));
        }

        let sent = {
            let command_tx = self.command_tx.lock();
            match command_tx.as_ref() {
                Some(command_tx) => command_tx.send(LoopCommand::Send(frame)).is_ok(),
                None => false,
            }
        };
        if !sent {
            // the loop is gone; reclaim the slot we just occupied
            let _ = self.shared.take_pending();
            return Err(Error::Disconnected);
        }

        match rx.await {
            Ok(QueryOutcome::Delivered(frame)) => Ok(frame),
            Ok(QueryOutcome::Canceled) => Err(Error::Canceled),
            Ok(QueryOutcome::Disconnected) => Err(Error::Disconnected),
            Err(_) => Err(Error::Disconnected),
        }
    }

    /// Closes the connection.
    ///
    /// A pending query is resolved as [`Error::Canceled`] before the
    /// socket is declared closed. Idempotent: closing an already-closed
    /// or never-started connection does nothing.
    pub async fn close(&self) {
        {
            let mut state = self.shared.state.lock();
            match *state {
                ConnectionState::Disconnected | ConnectionState::Closed => return,
                _ => *state = ConnectionState::Closing,
            }
        }

        // set before the loop is told to close, so teardown resolves the
        // pending query as canceled rather than disconnected
        self.shared.user_closed.store(true, Ordering::SeqCst);

        let command_tx = self.command_tx.lock().take();
        if let Some(command_tx) = command_tx {
            let _ = command_tx.send(LoopCommand::Close);
        }

        self.reap().await;
        self.shared.set_state(ConnectionState::Closed);
        debug!("connection closed");
    }

    /// Drops the command channel and awaits receive loop termination.
    async fn reap(&self) {
        drop(self.command_tx.lock().take());

        let task = self.recv_task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

// ============================================================================
// Receive Loop
// ============================================================================

/// Connects the socket and runs the receive loop until closure.
///
/// The connect outcome is reported once over `connected_tx`; afterwards
/// the loop owns both halves of the socket. On exit, any pending query
/// is resolved and the state is `Closed`.
async fn run_loop(
    uri: String,
    connect_timeout: Duration,
    connected_tx: oneshot::Sender<Result<()>>,
    mut command_rx: mpsc::UnboundedReceiver<LoopCommand>,
    shared: Arc<Shared>,
) {
    let ws = match timeout(connect_timeout, connect_async(&uri)).await {
        Ok(Ok((ws, _response))) => ws,
        Ok(Err(e)) => {
            debug!(uri = %uri, error = %e, "connect failed");
            shared.set_state(ConnectionState::Closed);
            let _ = connected_tx.send(Err(Error::connection(e.to_string())));
            return;
        }
        Err(_) => {
            let timeout_ms = connect_timeout.as_millis() as u64;
            debug!(uri = %uri, timeout_ms, "connect timed out");
            shared.set_state(ConnectionState::Closed);
            let _ = connected_tx.send(Err(Error::connection_timeout(timeout_ms)));
            return;
        }
    };

    {
        let mut state = shared.state.lock();
        // a concurrent close may already have moved past Connecting
        if *state == ConnectionState::Connecting {
            *state = ConnectionState::Open;
        }
    }
    let _ = connected_tx.send(Ok(()));

    let (mut ws_write, mut ws_read) = ws.split();

    loop {
        tokio::select! {
            message = ws_read.next() => {
                match message {
                    Some(Ok(Message::Close(_))) => {
                        debug!("socket closed by remote");
                        break;
                    }
                    Some(Ok(message)) => {
                        if let Some(frame) = Frame::from_message(message) {
                            deliver(&shared, frame);
                        }
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "socket error");
                        break;
                    }
                    None => {
                        debug!("socket stream ended");
                        break;
                    }
                }
            }

            command = command_rx.recv() => {
                match command {
                    Some(LoopCommand::Send(frame)) => {
                        trace!(len = frame.len(), "sending frame");
                        if let Err(e) = ws_write.send(frame.into_message()).await {
                            warn!(error = %e, "send failed");
                            break;
                        }
                    }
                    Some(LoopCommand::Close) | None => {
                        let _ = ws_write.close().await;
                        break;
                    }
                }
            }
        }
    }

    teardown(&shared);
}

/// Hands an inbound frame to the waiting query, if any.
fn deliver(shared: &Shared, frame: Frame) {
    let pending = shared.take_pending();
    match pending {
        Some(pending) => pending.resolve(frame),
        None => warn!(len = frame.len(), "frame received with no query in flight"),
    }
}

/// Resolves any pending query and marks the connection closed.
///
/// Reached by both the user-initiated and the unexpected-disconnect
/// paths; the single pending slot guarantees the query is signaled at
/// most once.
fn teardown(shared: &Shared) {
    {
        let mut state = shared.state.lock();
        if *state != ConnectionState::Closed {
            *state = ConnectionState::Closing;
        }
    }

    let pending = shared.take_pending();
    if let Some(pending) = pending {
        if shared.user_closed.load(Ordering::SeqCst) {
            pending.cancel();
        } else {
            pending.disconnect();
        }
    }

    shared.set_state(ConnectionState::Closed);
    debug!("receive loop terminated");
}

// ============================================================================
// URI Validation
// ============================================================================

/// Checks the server address before any connect attempt.
fn validate_uri(uri: &str) -> Result<()> {
    if uri.is_empty() {
        return Err(Error::invalid_argument("URI is empty"));
    }

    let parsed =
        Url::parse(uri).map_err(|e| Error::invalid_argument(format!("invalid URI: {e}")))?;

    match parsed.scheme() {
        "ws" | "wss" => Ok(()),
        other => Err(Error::invalid_argument(format!(
            "unsupported scheme: {other}"
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================
