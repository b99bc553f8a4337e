// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Actor references: the uniform destination handle.
//!
//! A reference addresses an actor without owning it. The local variant
//! borrows the target mailbox; the remote variant carries an endpoint, an
//! actor name, and a handle to the outbound transport. Both satisfy the
//! same send operation; the synchronous [`ask`](ActorRef::ask) is local
//! only.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};

use crate::envelope::{Envelope, ReplySink};
use crate::error::{AskError, SendError};
use crate::message::Message;

/// Outbound transport seam.
///
/// Implemented by `courier-network`'s TCP sender; the runtime only needs
/// to hand a payload plus addressing to it.
pub trait Outbound: Send + Sync {
	/// Encode and transmit one frame to `endpoint`, addressed to the actor
	/// named `receiver`. Non-blocking from the caller's perspective beyond
	/// the transmission itself; errors detectable synchronously are
	/// returned.
	fn send_to(
		&self,
		endpoint: &str,
		receiver: &str,
		payload: Box<dyn Message>,
		sender: Option<&ActorRef>,
	) -> Result<(), SendError>;

	/// The endpoint this process receives on, used to stamp
	/// `sender_endpoint` for reply routing.
	fn local_endpoint(&self) -> Option<String>;

	/// Release all connections.
	fn close(&self);
}

/// Reference to an actor in this process.
#[derive(Clone)]
pub struct LocalRef {
	name: Arc<str>,
	tx: Sender<Envelope>,
}

impl LocalRef {
	pub(crate) fn new(name: Arc<str>, tx: Sender<Envelope>) -> Self {
		Self { name, tx }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Append a pre-built envelope to the target mailbox. Used by the
	/// transports, which tag origin themselves; everyone else goes through
	/// [`ActorRef::send`].
	pub fn enqueue(&self, envelope: Envelope) -> Result<(), SendError> {
		self.tx.send(envelope).map_err(|_| SendError::RuntimeStopped)
	}
}

/// Reference to an actor in another process.
#[derive(Clone)]
pub struct RemoteRef {
	name: Arc<str>,
	endpoint: Arc<str>,
	outbound: Arc<dyn Outbound>,
}

impl RemoteRef {
	pub fn new(name: &str, endpoint: &str, outbound: Arc<dyn Outbound>) -> Self {
		Self { name: name.into(), endpoint: endpoint.into(), outbound }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}
}

/// Opaque destination handle; local or remote.
#[derive(Clone)]
pub enum ActorRef {
	Local(LocalRef),
	Remote(RemoteRef),
}

impl ActorRef {
	/// Build a reference to an actor hosted at a remote endpoint.
	pub fn remote(name: &str, endpoint: &str, outbound: Arc<dyn Outbound>) -> Self {
		ActorRef::Remote(RemoteRef::new(name, endpoint, outbound))
	}

	pub fn name(&self) -> &str {
		match self {
			ActorRef::Local(local) => local.name(),
			ActorRef::Remote(remote) => remote.name(),
		}
	}

	pub fn is_local(&self) -> bool {
		matches!(self, ActorRef::Local(_))
	}

	/// Asynchronous send. Returns as soon as the envelope is enqueued
	/// (local) or handed to the transport (remote).
	pub fn send(&self, payload: Box<dyn Message>, sender: Option<&ActorRef>) -> Result<(), SendError> {
		match self {
			ActorRef::Local(local) => local.enqueue(Envelope::new(payload, sender.cloned())),
			ActorRef::Remote(remote) => {
				remote.outbound.send_to(&remote.endpoint, &remote.name, payload, sender)
			}
		}
	}

	/// Synchronous RPC-style send: block until the target deposits a reply.
	///
	/// Local references only. Blocking inside a handler whose target might
	/// transitively call back is a deadlock hazard; prefer asynchronous
	/// sends with a reply message where possible.
	pub fn ask(
		&self,
		payload: Box<dyn Message>,
		sender: Option<&ActorRef>,
	) -> Result<Box<dyn Message>, AskError> {
		let rx = self.ask_inner(payload, sender)?;
		rx.recv().map_err(|_| AskError::NoReply)
	}

	/// Like [`ask`](Self::ask), but gives up after `timeout`.
	pub fn ask_timeout(
		&self,
		payload: Box<dyn Message>,
		sender: Option<&ActorRef>,
		timeout: Duration,
	) -> Result<Box<dyn Message>, AskError> {
		let rx = self.ask_inner(payload, sender)?;
		rx.recv_timeout(timeout).map_err(|err| match err {
			RecvTimeoutError::Timeout => AskError::Timeout { timeout },
			RecvTimeoutError::Disconnected => AskError::NoReply,
		})
	}

	fn ask_inner(
		&self,
		payload: Box<dyn Message>,
		sender: Option<&ActorRef>,
	) -> Result<crossbeam_channel::Receiver<Box<dyn Message>>, AskError> {
		let local = match self {
			ActorRef::Local(local) => local,
			ActorRef::Remote(_) => return Err(AskError::UnsupportedRemoteSynchronous),
		};
		let (tx, rx) = bounded(1);
		let envelope = Envelope::with_sink(payload, sender.cloned(), ReplySink::new(tx));
		local.enqueue(envelope).map_err(|_| AskError::RuntimeStopped)?;
		Ok(rx)
	}
}

impl std::fmt::Debug for ActorRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ActorRef::Local(local) => f.debug_struct("ActorRef::Local").field("name", &local.name()).finish(),
			ActorRef::Remote(remote) => f
				.debug_struct("ActorRef::Remote")
				.field("name", &remote.name())
				.field("endpoint", &remote.endpoint())
				.finish(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::define_message;

	#[derive(Debug)]
	struct Probe;
	define_message!(Probe);

	struct NullOutbound;

	impl Outbound for NullOutbound {
		fn send_to(
			&self,
			_endpoint: &str,
			_receiver: &str,
			_payload: Box<dyn Message>,
			_sender: Option<&ActorRef>,
		) -> Result<(), SendError> {
			Ok(())
		}

		fn local_endpoint(&self) -> Option<String> {
			None
		}

		fn close(&self) {}
	}

	#[test]
	fn ask_on_remote_reference_fails() {
		let remote = ActorRef::remote("pong", "tcp://localhost:5001", Arc::new(NullOutbound));
		let err = match remote.ask(Box::new(Probe), None) {
			Err(err) => err,
			Ok(_) => panic!("expected an error"),
		};
		assert!(matches!(err, AskError::UnsupportedRemoteSynchronous));
	}

	#[test]
	fn send_after_mailbox_dropped_is_runtime_stopped() {
		let (tx, rx) = crossbeam_channel::unbounded();
		let local = ActorRef::Local(LocalRef::new("gone".into(), tx));
		drop(rx);
		let err = local.send(Box::new(Probe), None).unwrap_err();
		assert!(matches!(err, SendError::RuntimeStopped));
	}
}
