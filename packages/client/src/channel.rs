//! Realtime messaging channel.
//!
//! A [`RealtimeChannel`] wraps one persistent connection to the message
//! server. It is constructed once and handed to whatever needs to send or
//! observe messages; cloning it yields another handle to the same channel.
//!
//! ## Frame ordering
//!
//! Frames sent while the connection is not open are held in a bounded FIFO
//! queue. When the connection opens, the handshake is enqueued for writing
//! first, then the queued backlog, and only then is the writer published for
//! fresh sends. All three steps happen under the state lock, so the first
//! frame on every connection is the handshake and queued frames keep their
//! `send` order.
//!
//! ## Events
//!
//! Inbound frames and connection changes are published on a broadcast
//! stream obtained with [`RealtimeChannel::subscribe`].

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use murmur_shared::time::{Clock, format_local_timestamp};
use tokio::{
    sync::{Mutex, broadcast, mpsc},
    task::JoinHandle,
};

use crate::{
    config::ChannelConfig,
    domain::{
        ChatMessage, ConnectionState, Connector, Enqueued, Frame, FrameSink, FrameStream, Inbound,
        OutboundQueue, ParticipantId, TransportError, TypingNotice,
    },
    error::ChannelError,
    infrastructure::{decode, encode},
};

/// Result of a `connect` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A new connection attempt was started
    Started,
    /// A connection is already open or in progress; nothing was done
    AlreadyActive,
}

/// What happened to a frame handed to the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the open connection's writer
    Dispatched,
    /// Held until the connection opens
    Queued,
    /// Dropped because it is ephemeral and the connection is not open
    Discarded,
}

/// Notifications published to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Connection established and handshake enqueued
    Opened { self_id: ParticipantId },
    Received(Inbound),
    /// An inbound payload could not be decoded; the connection stays open
    MalformedFrame { raw: String, reason: String },
    /// A frame will never be transmitted (evicted from the queue, or lost
    /// with a dying connection)
    DeliveryFailed(Frame),
    ConnectFailed { reason: String },
    Reconnecting { attempt: u32 },
    Closed,
}

/// Realtime messaging channel
#[derive(Clone)]
pub struct RealtimeChannel {
    shared: Arc<Shared>,
}

struct Shared {
    config: ChannelConfig,
    connector: Arc<dyn Connector>,
    clock: Arc<dyn Clock>,
    state: Mutex<ChannelState>,
    events: broadcast::Sender<ChannelEvent>,
}

struct ChannelState {
    connection: ConnectionState,
    self_id: Option<ParticipantId>,
    queue: OutboundQueue,
    /// Present only while the connection is open
    writer: Option<mpsc::UnboundedSender<Frame>>,
    /// Bumped by every `connect` and `disconnect`; stale supervisors compare
    /// against it and stand down
    generation: u64,
    /// Task driving the latest generation
    supervisor: Option<JoinHandle<()>>,
}

impl RealtimeChannel {
    /// Create a channel. No connection is made until [`Self::connect`].
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::InvalidConfig` if `config` fails validation.
    pub fn new(
        config: ChannelConfig,
        connector: Arc<dyn Connector>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ChannelError> {
        config.validate()?;

        let (events, _) = broadcast::channel(config.event_capacity);
        let queue = OutboundQueue::new(config.queue_capacity, config.overflow);

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                connector,
                clock,
                state: Mutex::new(ChannelState {
                    connection: ConnectionState::Idle,
                    self_id: None,
                    queue,
                    writer: None,
                    generation: 0,
                    supervisor: None,
                }),
                events,
            }),
        })
    }

    /// Subscribe to channel events from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.shared.events.subscribe()
    }

    /// Start connecting as `self_id`.
    ///
    /// A no-op while a connection is open or in progress. The readiness check
    /// and the move to `Connecting` happen under one lock, so concurrent
    /// callers cannot both start an attempt.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::InvalidParticipantId` if `self_id` is blank.
    pub async fn connect(&self, self_id: &str) -> Result<ConnectOutcome, ChannelError> {
        let self_id = ParticipantId::new(self_id)?;

        let mut state = self.shared.state.lock().await;
        if !state.connection.accepts_connect() {
            if state.self_id.as_ref() != Some(&self_id) {
                tracing::warn!(
                    "Ignoring connect as '{}': channel is {:?} as '{}'",
                    self_id,
                    state.connection,
                    state.self_id.as_ref().map_or("", ParticipantId::as_str)
                );
            } else {
                tracing::debug!("Ignoring connect: channel is {:?}", state.connection);
            }
            return Ok(ConnectOutcome::AlreadyActive);
        }

        state.connection = ConnectionState::Connecting;
        state.self_id = Some(self_id.clone());
        state.generation += 1;
        let generation = state.generation;

        tracing::info!(
            "Connecting to {} as '{}'",
            self.shared.config.endpoint,
            self_id
        );
        // a previous supervisor still flushing after disconnect is left to finish
        state.supervisor = Some(tokio::spawn(supervise(
            self.shared.clone(),
            self_id,
            generation,
        )));

        Ok(ConnectOutcome::Started)
    }

    /// Close the connection and cancel any attempt or pending retry.
    ///
    /// Frames already handed to the writer are flushed before the socket is
    /// closed. Queued frames stay queued for a later `connect`.
    pub async fn disconnect(&self) {
        let mut state = self.shared.state.lock().await;
        let previous = state.connection;
        state.generation += 1;
        state.writer = None;
        if previous == ConnectionState::Idle {
            return;
        }
        // an open connection winds down through its writer; anything else is
        // a pending attempt or retry wait
        if let Some(supervisor) = state.supervisor.take()
            && previous != ConnectionState::Open
        {
            supervisor.abort();
        }
        state.connection = ConnectionState::Closed;
        drop(state);

        tracing::info!("Disconnected (was {:?})", previous);
        if previous != ConnectionState::Closed {
            self.shared.emit(ChannelEvent::Closed);
        }
    }

    /// Send a chat message, or queue it until the connection opens.
    ///
    /// An empty timestamp is stamped from the channel clock.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::QueueFull` when the message has to be queued,
    /// the queue is full, and the overflow policy is `Reject`.
    pub async fn send(&self, mut message: ChatMessage) -> Result<Delivery, ChannelError> {
        if message.timestamp.is_empty() {
            message.timestamp =
                format_local_timestamp(self.shared.clock.now_millis()).unwrap_or_default();
        }
        self.dispatch(Frame::Chat(message)).await
    }

    /// Send a typing notice to `to`. Not queued: discarded unless open.
    pub async fn send_typing(
        &self,
        to: ParticipantId,
        is_typing: bool,
    ) -> Result<Delivery, ChannelError> {
        let from = self.shared.state.lock().await.self_id.clone();
        match from {
            Some(from) => {
                self.dispatch(Frame::Typing(TypingNotice {
                    from,
                    to,
                    is_typing,
                }))
                .await
            }
            None => Ok(Delivery::Discarded),
        }
    }

    /// Current readiness of the connection.
    pub async fn state(&self) -> ConnectionState {
        self.shared.state.lock().await.connection
    }

    /// Identity used by the latest `connect`.
    pub async fn self_id(&self) -> Option<ParticipantId> {
        self.shared.state.lock().await.self_id.clone()
    }

    /// Number of frames waiting for the connection to open.
    pub async fn queued(&self) -> usize {
        self.shared.state.lock().await.queue.len()
    }

    async fn dispatch(&self, frame: Frame) -> Result<Delivery, ChannelError> {
        let mut state = self.shared.state.lock().await;

        let open_writer = state
            .writer
            .as_ref()
            .filter(|_| state.connection.is_open());
        let frame = match open_writer {
            Some(writer) => match writer.send(frame) {
                Ok(()) => return Ok(Delivery::Dispatched),
                // writer already gone, the supervisor has not caught up yet
                Err(mpsc::error::SendError(frame)) => frame,
            },
            None => frame,
        };

        if frame.is_ephemeral() {
            tracing::debug!("Discarding {:?} while {:?}", frame, state.connection);
            return Ok(Delivery::Discarded);
        }

        let capacity = state.queue.capacity();
        let pushed = state.queue.push(frame);
        match pushed {
            Ok(Enqueued::Queued) => {
                tracing::debug!(
                    "Queued frame while {:?} ({} waiting)",
                    state.connection,
                    state.queue.len()
                );
                Ok(Delivery::Queued)
            }
            Ok(Enqueued::Evicted(evicted)) => {
                drop(state);
                tracing::warn!("Outbound queue full, dropping oldest frame");
                self.shared.emit(ChannelEvent::DeliveryFailed(evicted));
                Ok(Delivery::Queued)
            }
            Err(frame) => {
                tracing::warn!("Outbound queue full, rejecting frame");
                Err(ChannelError::QueueFull {
                    capacity,
                    frame: Box::new(frame),
                })
            }
        }
    }
}

/// Drive one generation of the channel: connect, run, and retry per policy.
async fn supervise(shared: Arc<Shared>, self_id: ParticipantId, generation: u64) {
    let mut attempt: u32 = 0;

    loop {
        match shared.open_transport().await {
            Ok((mut sink, mut stream)) => {
                let Some(mut rx) = shared.install_writer(&self_id, generation).await else {
                    tracing::debug!("Dropping connection of superseded attempt");
                    return;
                };
                attempt = 0;

                shared.run_connection(&mut sink, &mut stream, &mut rx).await;

                let current = shared.mark_closed(generation).await;
                shared.fail_pending(&mut rx);
                if !current {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to {}: {}",
                    shared.config.endpoint,
                    e
                );
                if !shared.mark_failed(generation, e).await {
                    return;
                }
            }
        }

        attempt += 1;
        let Some(delay) = shared.config.reconnect.next_delay(attempt) else {
            tracing::info!("Not reconnecting; call connect to try again");
            return;
        };

        tracing::info!("Reconnecting in {:?} (attempt {})", delay, attempt);
        tokio::time::sleep(delay).await;

        if !shared.begin_reconnect(generation, attempt).await {
            return;
        }
    }
}

impl Shared {
    fn emit(&self, event: ChannelEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    async fn open_transport(&self) -> Result<(FrameSink, FrameStream), TransportError> {
        let attempt = self.connector.connect(&self.config.endpoint);
        match self.config.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, attempt)
                .await
                .map_err(|_| TransportError::Timeout)?,
            None => attempt.await,
        }
    }

    /// Enqueue the handshake and the backlog, then publish the writer.
    ///
    /// Returns `None` if this generation was superseded while connecting.
    async fn install_writer(
        &self,
        self_id: &ParticipantId,
        generation: u64,
    ) -> Option<mpsc::UnboundedReceiver<Frame>> {
        let mut state = self.state.lock().await;
        if state.generation != generation {
            return None;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let backlog = state.queue.drain();
        let flushed = backlog.len();
        // rx is alive, these sends cannot fail
        let _ = tx.send(Frame::Handshake {
            from: self_id.clone(),
        });
        for frame in backlog {
            let _ = tx.send(frame);
        }

        state.writer = Some(tx);
        state.connection = ConnectionState::Open;
        drop(state);

        tracing::info!(
            "Connected to {} as '{}', flushing {} queued frame(s)",
            self.config.endpoint,
            self_id,
            flushed
        );
        self.emit(ChannelEvent::Opened {
            self_id: self_id.clone(),
        });

        Some(rx)
    }

    /// Run the writer and reader until either side finishes.
    async fn run_connection(
        &self,
        sink: &mut FrameSink,
        stream: &mut FrameStream,
        rx: &mut mpsc::UnboundedReceiver<Frame>,
    ) {
        // frame taken from rx whose write has not completed
        let mut in_flight = None;

        tokio::select! {
            result = self.write_loop(rx, sink, &mut in_flight) => match result {
                Ok(()) => tracing::debug!("Writer finished, socket closed"),
                Err(e) => tracing::warn!("Writer stopped: {}", e),
            },
            _ = self.read_loop(stream) => {
                tracing::info!("Connection closed by server");
            }
        }

        if let Some(frame) = in_flight {
            self.report_undelivered(frame);
        }
    }

    async fn write_loop(
        &self,
        rx: &mut mpsc::UnboundedReceiver<Frame>,
        sink: &mut FrameSink,
        in_flight: &mut Option<Frame>,
    ) -> Result<(), TransportError> {
        while let Some(frame) = rx.recv().await {
            let text = match encode(&frame) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("Failed to serialize frame: {}", e);
                    self.report_undelivered(frame);
                    continue;
                }
            };

            *in_flight = Some(frame);
            let result = sink.send(text).await;
            let frame = in_flight.take();
            match (result, frame) {
                (Ok(()), frame) => tracing::trace!("Sent {:?}", frame),
                (Err(e), Some(frame)) => {
                    self.report_undelivered(frame);
                    return Err(e);
                }
                (Err(e), None) => return Err(e),
            }
        }

        // all senders dropped: disconnect requested
        sink.close().await
    }

    async fn read_loop(&self, stream: &mut FrameStream) {
        while let Some(item) = stream.next().await {
            let text = match item {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
            };

            match decode(&text) {
                Ok(inbound) => {
                    tracing::debug!("Received {:?}", inbound);
                    self.emit(ChannelEvent::Received(inbound));
                }
                Err(e) => {
                    tracing::warn!("Discarding inbound frame: {}", e);
                    self.emit(ChannelEvent::MalformedFrame {
                        raw: text,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    /// Returns `false` if the generation was superseded (state untouched).
    async fn mark_closed(&self, generation: u64) -> bool {
        let mut state = self.state.lock().await;
        if state.generation != generation {
            return false;
        }
        state.writer = None;
        state.connection = ConnectionState::Closed;
        drop(state);

        self.emit(ChannelEvent::Closed);
        true
    }

    /// Returns `false` if the generation was superseded (state untouched).
    async fn mark_failed(&self, generation: u64, error: TransportError) -> bool {
        let mut state = self.state.lock().await;
        if state.generation != generation {
            return false;
        }
        state.connection = ConnectionState::Closed;
        drop(state);

        self.emit(ChannelEvent::ConnectFailed {
            reason: error.to_string(),
        });
        true
    }

    async fn begin_reconnect(&self, generation: u64, attempt: u32) -> bool {
        let mut state = self.state.lock().await;
        if state.generation != generation || state.connection != ConnectionState::Closed {
            return false;
        }
        state.connection = ConnectionState::Connecting;
        drop(state);

        self.emit(ChannelEvent::Reconnecting { attempt });
        true
    }

    /// Report frames that were handed to a writer that is no longer running.
    fn fail_pending(&self, rx: &mut mpsc::UnboundedReceiver<Frame>) {
        rx.close();
        while let Ok(frame) = rx.try_recv() {
            self.report_undelivered(frame);
        }
    }

    fn report_undelivered(&self, frame: Frame) {
        if matches!(frame, Frame::Handshake { .. }) {
            return;
        }
        tracing::warn!("Frame from '{}' was not delivered", frame.sender());
        self.emit(ChannelEvent::DeliveryFailed(frame));
    }
}
