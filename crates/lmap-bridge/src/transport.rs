//! Bridge transport between the host and the map runtime
//!
//! The wire is a pair of bounded string channels. Nothing on it is
//! acknowledged and the two directions are not ordered relative to each other.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::commands::CommandSender;
use super::protocol::{parse_bridge_message, summarize};
use lmap_core::prelude::*;
use lmap_core::BridgeEvent;

/// Default capacity of each wire direction
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Host side of the wire
#[derive(Debug)]
pub struct HostEnd {
    /// Scripts to inject into the map runtime
    pub scripts_tx: mpsc::Sender<String>,
    /// Raw JSON payloads posted by the map runtime
    pub payloads_rx: mpsc::Receiver<String>,
}

/// Map runtime side of the wire
#[derive(Debug)]
pub struct SandboxEnd {
    /// Scripts injected by the host
    pub scripts_rx: mpsc::Receiver<String>,
    /// Raw JSON payloads for the host
    pub payloads_tx: mpsc::Sender<String>,
}

/// Create a connected host/runtime wire pair
pub fn channel(capacity: usize) -> (HostEnd, SandboxEnd) {
    let (scripts_tx, scripts_rx) = mpsc::channel(capacity);
    let (payloads_tx, payloads_rx) = mpsc::channel(capacity);
    (
        HostEnd {
            scripts_tx,
            payloads_rx,
        },
        SandboxEnd {
            scripts_rx,
            payloads_tx,
        },
    )
}

/// Host-side bridge: decodes inbound payloads and forwards outbound scripts.
///
/// The reader task turns each payload into a [`BridgeEvent::Message`], logging
/// and dropping anything malformed. When the runtime side closes it emits a
/// single [`BridgeEvent::Disconnected`].
pub struct BridgeTransport {
    /// Sender feeding the writer task
    command_tx: mpsc::Sender<String>,
    /// Set once the runtime side has gone away
    disconnected: Arc<AtomicBool>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl BridgeTransport {
    /// Attach to the host end of a wire, delivering events to `event_tx`
    pub fn attach(host: HostEnd, event_tx: mpsc::Sender<BridgeEvent>) -> Self {
        let disconnected = Arc::new(AtomicBool::new(false));

        let (command_tx, command_rx) = mpsc::channel::<String>(DEFAULT_CHANNEL_CAPACITY);
        let writer = tokio::spawn(Self::script_writer(host.scripts_tx, command_rx));
        let reader = tokio::spawn(Self::payload_reader(
            host.payloads_rx,
            event_tx,
            Arc::clone(&disconnected),
        ));

        info!("Map bridge attached");

        Self {
            command_tx,
            disconnected,
            reader,
            writer,
        }
    }

    /// Read payloads and forward decoded messages
    async fn payload_reader(
        mut payloads_rx: mpsc::Receiver<String>,
        event_tx: mpsc::Sender<BridgeEvent>,
        disconnected: Arc<AtomicBool>,
    ) {
        while let Some(payload) = payloads_rx.recv().await {
            trace!("inbound: {}", payload);

            let message = match parse_bridge_message(&payload) {
                Ok(message) => message,
                Err(e) => {
                    warn!("Dropping bridge payload ({}): {}", e, summarize(&payload));
                    continue;
                }
            };

            debug!("Bridge message: {}", message.kind());
            if event_tx.send(BridgeEvent::Message(message)).await.is_err() {
                debug!("bridge event channel closed");
                return;
            }
        }

        disconnected.store(true, Ordering::Release);
        info!("Map runtime disconnected from bridge");
        let _ = event_tx.send(BridgeEvent::Disconnected).await;
    }

    /// Write scripts to the runtime
    async fn script_writer(scripts_tx: mpsc::Sender<String>, mut rx: mpsc::Receiver<String>) {
        while let Some(script) = rx.recv().await {
            trace!("outbound: {}", script);

            if scripts_tx.send(script).await.is_err() {
                warn!("Map runtime no longer accepts scripts");
                break;
            }
        }

        debug!("bridge writer finished");
    }

    /// Create a command sender for this bridge
    pub fn command_sender(&self) -> CommandSender {
        CommandSender::new(self.command_tx.clone())
    }

    pub fn is_connected(&self) -> bool {
        !self.disconnected.load(Ordering::Acquire)
    }

    /// Stop both tasks
    pub fn shutdown(self) {
        self.reader.abort();
        self.writer.abort();
        debug!("Map bridge shut down");
    }
}
