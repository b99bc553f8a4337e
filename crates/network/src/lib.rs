// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Remote messaging for Courier: the JSON wire format, the process-wide
//! message registry, and the TCP transports.
//!
//! # Wire Protocol
//!
//! One JSON document per frame, UTF-8 encoded, newline-delimited on TCP:
//!
//! ```json
//! {
//! 	"message_type": "Ping",
//! 	"receiver": "pong",
//! 	"sender_actor": "ping",
//! 	"sender_endpoint": "tcp://192.168.1.5:5002",
//! 	"message": {"count": 1}
//! }
//! ```
//!
//! Unknown top-level fields are ignored. Endpoints are opaque
//! `tcp://host:port` strings; `*` binds all interfaces and port `0` binds
//! an ephemeral port.
//!
//! # Wiring a process
//!
//! ```ignore
//! let outbound = Arc::new(TcpOutbound::new());
//! let inbound = Inbound::new("tcp://*:5001", manager.directory(), outbound.clone())?;
//! outbound.set_local_endpoint(inbound.local_endpoint());
//! let name = inbound.name().to_string();
//! manager.register(&name, inbound)?;
//! manager.register_transport(outbound.clone());
//! ```
//!
//! Delivery failures on the receiving side are answered with an in-band
//! [`Reject`](courier_runtime::Reject) routed back to the frame's
//! `sender_endpoint`.

mod endpoint;

pub mod config;
pub mod error;
pub mod inbound;
pub mod outbound;
pub mod registry;
pub mod wire;

pub use config::InboundConfig;
pub use error::BindError;
pub use inbound::{Inbound, INBOUND_ACTOR_NAME};
pub use outbound::TcpOutbound;
pub use registry::{is_registered, register_message};
pub use wire::{Decoded, Frame, FrameError, FRAME_DELIMITER};
