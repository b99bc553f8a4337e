// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! The actor trait and the per-dispatch context.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::envelope::Envelope;
use crate::manager::ManagerHandle;
use crate::message::Message;
use crate::reference::ActorRef;

/// Whether a handler invocation consumed the envelope.
///
/// Returning [`Outcome::Unhandled`] triggers the no-handler policy:
/// local-origin envelopes are dropped with a diagnostic, remote-origin
/// envelopes produce a `Reject` back to the originator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	Handled,
	Unhandled,
}

/// The core actor abstraction.
///
/// Actors own their state exclusively and process one envelope at a time
/// on a dedicated thread. Dispatch is a tagged switch over the payload
/// type:
///
/// ```ignore
/// fn handle(&mut self, envelope: &Envelope, ctx: &Context) -> Outcome {
/// 	if let Some(ping) = envelope.get::<Ping>() {
/// 		ctx.reply(envelope, Box::new(Pong { count: ping.count }));
/// 		return Outcome::Handled;
/// 	}
/// 	if envelope.is::<Start>() {
/// 		return Outcome::Handled;
/// 	}
/// 	Outcome::Unhandled
/// }
/// ```
pub trait Actor: Send + 'static {
	/// Handle a single envelope. Return [`Outcome::Unhandled`] from the
	/// fall-through arm so the runtime can apply the no-handler policy.
	fn handle(&mut self, envelope: &Envelope, ctx: &Context) -> Outcome;
}

/// Runtime context handed to every handler invocation: the actor's own
/// reference, its registered name, and the manager back-handle.
#[derive(Clone)]
pub struct Context {
	self_ref: ActorRef,
	name: Arc<str>,
	manager: ManagerHandle,
}

impl Context {
	pub(crate) fn new(self_ref: ActorRef, name: Arc<str>, manager: ManagerHandle) -> Self {
		Self { self_ref, name, manager }
	}

	/// Reference to this actor, for handing to other actors.
	pub fn self_ref(&self) -> &ActorRef {
		&self.self_ref
	}

	/// This actor's registered name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Back-handle to the manager, for signaling termination.
	pub fn manager(&self) -> &ManagerHandle {
		&self.manager
	}

	/// Reply to an envelope.
	///
	/// Deposits into the reply sink when the envelope came from a
	/// synchronous ask, otherwise sends to the envelope's sender. Works
	/// for local and remote senders alike; an envelope with neither sink
	/// nor sender drops the reply with a diagnostic.
	pub fn reply(&self, envelope: &Envelope, reply: Box<dyn Message>) {
		if let Some(sink) = envelope.reply_sink() {
			if !sink.deposit(reply) {
				error!(actor = %self.name, "reply sink already filled; duplicate reply dropped");
			}
			return;
		}
		if let Some(sender) = envelope.sender() {
			if let Err(err) = sender.send(reply, Some(&self.self_ref)) {
				warn!(actor = %self.name, error = %err, "failed to deliver reply");
			}
			return;
		}
		debug!(actor = %self.name, envelope = ?envelope, "reply requested but envelope has no sender");
	}
}
