// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Courier: a lightweight actor runtime with remote messaging.
//!
//! Actors are named units of state that process messages strictly one at
//! a time, each on its own OS thread. An [`ActorRef`] addresses an actor
//! uniformly whether it lives in this process or behind a
//! `tcp://host:port` endpoint; remote delivery uses a documented
//! JSON-per-frame wire protocol with in-band [`Reject`] notifications for
//! delivery failures.
//!
//! This crate is a facade over the workspace members:
//! - [`courier_runtime`]: mailboxes, references, the manager, timers.
//! - [`courier_network`]: the wire format, message registry, and TCP
//!   transports.
//!
//! # Quick start
//!
//! ```ignore
//! use courier::{Actor, Context, Envelope, Manager, Outcome, Start};
//!
//! struct Ping {
//! 	count: u32,
//! }
//! courier::define_message!(Ping);
//!
//! struct Counter;
//!
//! impl Actor for Counter {
//! 	fn handle(&mut self, envelope: &Envelope, ctx: &Context) -> Outcome {
//! 		if let Some(ping) = envelope.get::<Ping>() {
//! 			if ping.count >= 5 {
//! 				ctx.manager().terminate();
//! 			}
//! 			return Outcome::Handled;
//! 		}
//! 		if envelope.is::<Start>() {
//! 			return Outcome::Handled;
//! 		}
//! 		Outcome::Unhandled
//! 	}
//! }
//! ```

pub use courier_network::{
	is_registered, register_message, BindError, Inbound, InboundConfig, TcpOutbound, INBOUND_ACTOR_NAME,
};
pub use courier_runtime::{
	define_message, define_wire_message, next_timer_id, Actor, ActorRef, AskError, Context, Directory,
	Envelope, Fields, LocalRef, Manager, ManagerHandle, Message, Origin, Outbound, Outcome, Reject,
	RegisterError, RemoteRef, SendError, Shutdown, Start, Timeout, Timer, TransportResource,
};
