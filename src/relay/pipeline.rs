//! Background worker owning the channel to the backend
//!
//! The UI thread talks to the worker through a command channel and reads
//! results from an event channel, so a frame never blocks on the network.
//! Once a connection drops the worker schedules exactly one retry timer and
//! keeps retrying on a fixed cadence until shutdown.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::relay::protocol::{self, ChatRequest};
use crate::relay::rest::RestClient;
use crate::relay::{RelayConfig, Transport};
use crate::{CureBotError, Result};

/// Pause between losing the channel and the next connection attempt
pub const RECONNECT_DELAY: Duration = Duration::from_secs(2);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Commands accepted by the relay worker
#[derive(Debug, Clone)]
pub enum RelayCommand {
    /// Open the channel if it is not already open
    Connect,
    /// Forward one chat payload to the backend
    Send {
        request: ChatRequest,
        request_id: Uuid,
    },
    /// Upload an image for analysis over HTTP
    AnalyzeImage {
        file_name: String,
        bytes: Vec<u8>,
        request_id: Uuid,
    },
    /// Stop the worker
    Shutdown,
}

/// Events reported back to the UI thread
#[derive(Debug, Clone)]
pub enum RelayEvent {
    /// The channel is open and payloads can flow
    Connected,
    /// The channel dropped; a retry is already scheduled
    Disconnected { reason: String },
    /// A bot reply, matched to the oldest in-flight request
    Reply {
        text: String,
        request_id: Option<Uuid>,
        elapsed_ms: Option<u64>,
    },
    /// A payload could not be handed to the backend
    SendFailed { request_id: Uuid },
    /// Image analysis finished
    ImageReply { text: String, request_id: Uuid },
    /// Image analysis failed
    ImageFailed { request_id: Uuid, reason: String },
    /// The worker exited
    Shutdown,
}

/// Connection state of the channel, readable from any thread
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Closed = 0,
    Connecting = 1,
    Open = 2,
}

impl ChannelState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Connecting,
            2 => Self::Open,
            _ => Self::Closed,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SharedChannelState(Arc<AtomicU8>);

impl SharedChannelState {
    fn set(&self, state: ChannelState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    fn get(&self) -> ChannelState {
        ChannelState::from_u8(self.0.load(Ordering::SeqCst))
    }
}

/// Keeps at most one retry timer pending regardless of how many code paths
/// notice the dropped channel.
#[derive(Debug, Default)]
struct ReconnectGate {
    pending: bool,
}

impl ReconnectGate {
    fn new() -> Self {
        Self::default()
    }

    /// True when the caller just armed the timer and owns the wait
    fn arm(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    fn disarm(&mut self) {
        self.pending = false;
    }
}

/// Cheap clone handed to the UI for queueing work
#[derive(Debug, Clone)]
pub struct RelayHandle {
    command_tx: mpsc::UnboundedSender<RelayCommand>,
    state: SharedChannelState,
}

impl RelayHandle {
    pub fn state(&self) -> ChannelState {
        self.state.get()
    }

    pub fn connect(&self) {
        let _ = self.command_tx.send(RelayCommand::Connect);
    }

    /// Queue a chat payload. Returns false when the channel is not open; in
    /// that case a connection attempt is kicked off so a retry can succeed.
    pub fn send(&self, request: ChatRequest, request_id: Uuid) -> bool {
        if self.state.get() != ChannelState::Open {
            self.connect();
            return false;
        }
        self.command_tx
            .send(RelayCommand::Send {
                request,
                request_id,
            })
            .is_ok()
    }

    /// Queue an image upload. Runs over HTTP, so it works even while the
    /// socket is down.
    pub fn analyze_image(&self, file_name: String, bytes: Vec<u8>, request_id: Uuid) -> bool {
        self.command_tx
            .send(RelayCommand::AnalyzeImage {
                file_name,
                bytes,
                request_id,
            })
            .is_ok()
    }

    pub fn shutdown(&self) {
        let _ = self.command_tx.send(RelayCommand::Shutdown);
    }
}

/// Owns the channel pair between the UI and the network worker
pub struct RelayPipeline {
    config: RelayConfig,
    command_tx: mpsc::UnboundedSender<RelayCommand>,
    command_rx: Option<mpsc::UnboundedReceiver<RelayCommand>>,
    event_tx: Sender<RelayEvent>,
    event_rx: Receiver<RelayEvent>,
    state: SharedChannelState,
}

impl RelayPipeline {
    pub fn new(config: RelayConfig) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();

        Self {
            config,
            command_tx,
            command_rx: Some(command_rx),
            event_tx,
            event_rx,
            state: SharedChannelState::default(),
        }
    }

    pub fn handle(&self) -> RelayHandle {
        RelayHandle {
            command_tx: self.command_tx.clone(),
            state: self.state.clone(),
        }
    }

    pub fn event_receiver(&self) -> Receiver<RelayEvent> {
        self.event_rx.clone()
    }

    /// Move the worker onto its own thread with a dedicated runtime
    pub fn start_worker(&mut self) -> Result<()> {
        let command_rx = self
            .command_rx
            .take()
            .ok_or_else(|| CureBotError::ChannelError("relay worker already started".to_string()))?;
        let config = self.config.clone();
        let event_tx = self.event_tx.clone();
        let state = self.state.clone();

        std::thread::Builder::new()
            .name("relay-worker".to_string())
            .spawn(move || {
                let rt = match tokio::runtime::Runtime::new() {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!(error = %e, "Could not start relay runtime");
                        let _ = event_tx.send(RelayEvent::Shutdown);
                        return;
                    }
                };
                rt.block_on(async move {
                    match config.transport {
                        Transport::WebSocket => {
                            run_socket_worker(config, command_rx, event_tx, state).await;
                        }
                        Transport::Http => {
                            run_http_worker(config, command_rx, event_tx, state).await;
                        }
                    }
                });
                debug!("Relay worker stopped");
            })
            .map_err(|e| CureBotError::ChannelError(e.to_string()))?;

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RelayPipelineBuilder {
    config: RelayConfig,
}

impl RelayPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: RelayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> RelayPipeline {
        RelayPipeline::new(self.config)
    }
}

/// How an open channel session ended
enum SessionEnd {
    /// Shutdown was requested and the worker should exit
    Shutdown,
    /// The channel dropped and a retry should be scheduled
    Dropped(String),
}

async fn run_socket_worker(
    config: RelayConfig,
    mut command_rx: mpsc::UnboundedReceiver<RelayCommand>,
    event_tx: Sender<RelayEvent>,
    state: SharedChannelState,
) {
    let rest = RestClient::new(config.endpoint.clone());
    let mut reconnect = ReconnectGate::new();

    // Idle until the UI asks for the first connection.
    loop {
        match command_rx.recv().await {
            None | Some(RelayCommand::Shutdown) => {
                state.set(ChannelState::Closed);
                let _ = event_tx.send(RelayEvent::Shutdown);
                return;
            }
            Some(RelayCommand::Connect) => break,
            Some(RelayCommand::Send { request_id, .. }) => {
                let _ = event_tx.send(RelayEvent::SendFailed { request_id });
            }
            Some(RelayCommand::AnalyzeImage {
                file_name,
                bytes,
                request_id,
            }) => {
                spawn_image_task(&rest, &event_tx, file_name, bytes, request_id);
            }
        }
    }

    loop {
        state.set(ChannelState::Connecting);
        debug!(url = %config.endpoint.ws_url, "Opening relay channel");

        let connected = tokio::time::timeout(
            CONNECT_TIMEOUT,
            connect_async(config.endpoint.ws_url.as_str()),
        )
        .await;

        let end = match connected {
            Ok(Ok((socket, _response))) => {
                state.set(ChannelState::Open);
                info!("Relay channel open");
                let _ = event_tx.send(RelayEvent::Connected);
                drive_open_channel(socket, &mut command_rx, &event_tx, &rest).await
            }
            Ok(Err(e)) => SessionEnd::Dropped(e.to_string()),
            Err(_) => SessionEnd::Dropped(format!(
                "connect timed out after {}s",
                CONNECT_TIMEOUT.as_secs()
            )),
        };

        state.set(ChannelState::Closed);
        match end {
            SessionEnd::Shutdown => {
                let _ = event_tx.send(RelayEvent::Shutdown);
                return;
            }
            SessionEnd::Dropped(reason) => {
                warn!(reason = %reason, "Relay channel lost");
                let _ = event_tx.send(RelayEvent::Disconnected { reason });
            }
        }

        if reconnect.arm() {
            let stop = reconnect_pause(&mut command_rx, &event_tx, &rest).await;
            reconnect.disarm();
            if stop {
                state.set(ChannelState::Closed);
                let _ = event_tx.send(RelayEvent::Shutdown);
                return;
            }
        }
    }
}

/// Pump commands and socket frames until the session ends
async fn drive_open_channel(
    mut socket: Socket,
    command_rx: &mut mpsc::UnboundedReceiver<RelayCommand>,
    event_tx: &Sender<RelayEvent>,
    rest: &RestClient,
) -> SessionEnd {
    // The backend answers strictly in order, so the oldest in-flight
    // request owns the next reply.
    let mut pending: VecDeque<(Uuid, Instant)> = VecDeque::new();

    loop {
        tokio::select! {
            command = command_rx.recv() => match command {
                None | Some(RelayCommand::Shutdown) => {
                    let _ = socket.close(None).await;
                    return SessionEnd::Shutdown;
                }
                Some(RelayCommand::Connect) => {
                    debug!("Connect requested while channel already open");
                }
                Some(RelayCommand::Send { request, request_id }) => {
                    let json = match serde_json::to_string(&request) {
                        Ok(json) => json,
                        Err(e) => {
                            warn!(error = %e, "Could not encode chat payload");
                            let _ = event_tx.send(RelayEvent::SendFailed { request_id });
                            continue;
                        }
                    };
                    if let Err(e) = socket.send(WsMessage::Text(json.into())).await {
                        let _ = event_tx.send(RelayEvent::SendFailed { request_id });
                        return SessionEnd::Dropped(e.to_string());
                    }
                    pending.push_back((request_id, Instant::now()));
                }
                Some(RelayCommand::AnalyzeImage { file_name, bytes, request_id }) => {
                    spawn_image_task(rest, event_tx, file_name, bytes, request_id);
                }
            },
            frame = socket.next() => match frame {
                None => return SessionEnd::Dropped("channel closed by backend".to_string()),
                Some(Err(e)) => return SessionEnd::Dropped(e.to_string()),
                Some(Ok(WsMessage::Text(raw))) => match protocol::parse_reply(raw.as_str()) {
                    Ok(Some(text)) => {
                        let (request_id, elapsed_ms) = match pending.pop_front() {
                            Some((id, sent_at)) => {
                                (Some(id), Some(sent_at.elapsed().as_millis() as u64))
                            }
                            None => (None, None),
                        };
                        let _ = event_tx.send(RelayEvent::Reply {
                            text,
                            request_id,
                            elapsed_ms,
                        });
                    }
                    Ok(None) => debug!("Ignoring frame from non-bot sender"),
                    Err(e) => warn!(error = %e, "Dropping malformed frame"),
                },
                Some(Ok(WsMessage::Close(_))) => {
                    return SessionEnd::Dropped("close frame received".to_string());
                }
                Some(Ok(_)) => {}
            },
        }
    }
}

/// Wait out the retry delay while still answering commands. Returns true
/// when shutdown was requested during the pause.
async fn reconnect_pause(
    command_rx: &mut mpsc::UnboundedReceiver<RelayCommand>,
    event_tx: &Sender<RelayEvent>,
    rest: &RestClient,
) -> bool {
    let sleep = tokio::time::sleep(RECONNECT_DELAY);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            command = command_rx.recv() => match command {
                None | Some(RelayCommand::Shutdown) => return true,
                Some(RelayCommand::Connect) => {
                    debug!("Retry already scheduled");
                }
                Some(RelayCommand::Send { request_id, .. }) => {
                    let _ = event_tx.send(RelayEvent::SendFailed { request_id });
                }
                Some(RelayCommand::AnalyzeImage { file_name, bytes, request_id }) => {
                    spawn_image_task(rest, event_tx, file_name, bytes, request_id);
                }
            },
        }
    }
}

/// Chat over plain HTTP POSTs, for backends without a socket endpoint
async fn run_http_worker(
    config: RelayConfig,
    mut command_rx: mpsc::UnboundedReceiver<RelayCommand>,
    event_tx: Sender<RelayEvent>,
    state: SharedChannelState,
) {
    let rest = RestClient::new(config.endpoint.clone());

    while let Some(command) = command_rx.recv().await {
        match command {
            RelayCommand::Shutdown => break,
            RelayCommand::Connect => {
                // No standing connection to hold, so report ready at once.
                if state.get() != ChannelState::Open {
                    state.set(ChannelState::Open);
                    let _ = event_tx.send(RelayEvent::Connected);
                }
            }
            RelayCommand::Send {
                request,
                request_id,
            } => {
                let start = Instant::now();
                match rest.chat(&request).await {
                    Ok(text) => {
                        let _ = event_tx.send(RelayEvent::Reply {
                            text,
                            request_id: Some(request_id),
                            elapsed_ms: Some(start.elapsed().as_millis() as u64),
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "Chat request failed");
                        let _ = event_tx.send(RelayEvent::SendFailed { request_id });
                    }
                }
            }
            RelayCommand::AnalyzeImage {
                file_name,
                bytes,
                request_id,
            } => {
                spawn_image_task(&rest, &event_tx, file_name, bytes, request_id);
            }
        }
    }

    state.set(ChannelState::Closed);
    let _ = event_tx.send(RelayEvent::Shutdown);
}

fn spawn_image_task(
    rest: &RestClient,
    event_tx: &Sender<RelayEvent>,
    file_name: String,
    bytes: Vec<u8>,
    request_id: Uuid,
) {
    let rest = rest.clone();
    let event_tx = event_tx.clone();
    tokio::spawn(async move {
        match rest.analyze_image(&file_name, bytes).await {
            Ok(text) => {
                let _ = event_tx.send(RelayEvent::ImageReply { text, request_id });
            }
            Err(e) => {
                warn!(error = %e, "Image analysis failed");
                let _ = event_tx.send(RelayEvent::ImageFailed {
                    request_id,
                    reason: e.to_string(),
                });
            }
        }
    });
}
