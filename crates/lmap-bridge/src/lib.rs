//! # lmap-bridge - Host to Map Runtime Bridge
//!
//! Message transport between the host application and the embedded map
//! runtime. Inbound traffic is JSON objects discriminated by `type`; outbound
//! traffic is script invocations. Neither direction is acknowledged.
//!
//! Depends on [`lmap_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Protocol Parsing
//! - [`parse_bridge_message()`] - Decode one inbound payload
//!
//! ### Commands
//! - [`MapCommand`] - Outbound command, encoded with [`MapCommand::build`]
//! - [`CommandSender`] - Fire-and-forget command injection
//!
//! ### Transport
//! - [`channel()`] - Create a connected [`HostEnd`] / [`SandboxEnd`] wire
//! - [`BridgeTransport`] - Host-side reader/writer tasks

pub mod commands;
pub mod protocol;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod transport;

// Public API re-exports
pub use commands::{CommandSender, MapCommand};
/// Re-exported from `lmap_core` for convenience. Canonical import: `lmap_core::BridgeMessage`.
pub use lmap_core::{BridgeEvent, BridgeMessage};
pub use protocol::parse_bridge_message;
pub use transport::{channel, BridgeTransport, HostEnd, SandboxEnd, DEFAULT_CHANNEL_CAPACITY};
