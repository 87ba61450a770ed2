//! Websocket client for the real game server.
//!
//! The socket runs on a single-threaded tokio runtime owned by a background
//! thread. Held keys travel from the game loop to the socket task over an
//! unbounded channel; inbound text frames are parsed as snapshots and
//! broadcast to listeners from the socket thread.
//!
//! A lost or refused connection is logged and retried with exponential
//! backoff. Keys pressed while disconnected are discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use df_core::snapshot::parse_snapshot;
use df_core::{ClientError, Snapshot};

use crate::source::{Listeners, UpdateListener, UpdateSource};

/// Placeholder server message that is only logged.
pub const TITLE_MESSAGE: &str = "some message title";
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(8);

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, PartialEq)]
pub enum Inbound {
    Title,
    Snapshot(Snapshot),
}

/// Interprets one inbound text frame.
pub fn classify_inbound(text: &str) -> Result<Inbound, ClientError> {
    if text == TITLE_MESSAGE {
        return Ok(Inbound::Title);
    }
    parse_snapshot(text).map(Inbound::Snapshot)
}

pub fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

pub struct LiveServer {
    url: String,
    listeners: Listeners,
    keys_tx: Option<mpsc::UnboundedSender<String>>,
    shutdown: Arc<AtomicBool>,
}

impl LiveServer {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            listeners: Listeners::new(),
            keys_tx: None,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl UpdateSource for LiveServer {
    fn add_update_listener(&mut self, listener: UpdateListener) {
        self.listeners.push(listener);
    }

    fn start_providing_updates(&mut self) -> Result<(), ClientError> {
        if self.keys_tx.is_some() {
            log::warn!("Live server already started");
            return Ok(());
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to build runtime: {e}")))?;

        let (keys_tx, keys_rx) = mpsc::unbounded_channel();
        let url = self.url.clone();
        let listeners = self.listeners.clone();
        let shutdown = Arc::clone(&self.shutdown);

        log::info!("Connecting to {}", url);
        std::thread::Builder::new()
            .name("live-server".to_string())
            .spawn(move || runtime.block_on(connection_loop(url, listeners, keys_rx, shutdown)))
            .map_err(|e| ClientError::Transport(format!("failed to spawn socket thread: {e}")))?;

        self.keys_tx = Some(keys_tx);
        Ok(())
    }

    fn forward_keys(&self, keys: &str) {
        if let Some(tx) = &self.keys_tx {
            let _ = tx.send(keys.to_string());
        }
    }
}

impl Drop for LiveServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // Closing the key channel ends the socket task; the thread is left to
        // wind down on its own rather than blocking on a backoff sleep.
        self.keys_tx = None;
    }
}

async fn connection_loop(
    url: String,
    listeners: Listeners,
    mut keys_rx: mpsc::UnboundedReceiver<String>,
    shutdown: Arc<AtomicBool>,
) {
    let mut backoff = INITIAL_BACKOFF;
    while !shutdown.load(Ordering::Relaxed) {
        match connect_async(url.as_str()).await {
            Ok((socket, _response)) => {
                log::info!("Server connected successfully");
                backoff = INITIAL_BACKOFF;
                while keys_rx.try_recv().is_ok() {}
                match pump(socket, &listeners, &mut keys_rx).await {
                    Ok(()) => log::info!("socket closed"),
                    Err(e) => log::error!("{e}"),
                }
            }
            Err(e) => log::error!("{}", ClientError::Transport(e.to_string())),
        }

        if shutdown.load(Ordering::Relaxed) || keys_rx.is_closed() {
            break;
        }
        log::info!("Reconnecting in {}ms", backoff.as_millis());
        tokio::time::sleep(backoff).await;
        backoff = next_backoff(backoff);
    }
    log::debug!("Live server connection loop exited");
}

/// Moves frames in both directions until the socket closes or the owner goes
/// away.
async fn pump(
    socket: Socket,
    listeners: &Listeners,
    keys_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (mut write, mut read) = socket.split();
    loop {
        tokio::select! {
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => match classify_inbound(text.as_str()) {
                    Ok(Inbound::Title) => log::info!("{}", TITLE_MESSAGE),
                    Ok(Inbound::Snapshot(snapshot)) => {
                        log::trace!(
                            "Snapshot: {} players, {} bullets",
                            snapshot.players.len(),
                            snapshot.bullets.len()
                        );
                        listeners.broadcast(&snapshot);
                    }
                    Err(e) => log::warn!("Ignoring server message: {e}"),
                },
                Some(Ok(Message::Close(_))) | None => return Ok(()),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(ClientError::Transport(e.to_string())),
            },
            keys = keys_rx.recv() => match keys {
                Some(keys) => write
                    .send(Message::text(keys))
                    .await
                    .map_err(|e| ClientError::Transport(e.to_string()))?,
                None => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }
            },
        }
    }
}
