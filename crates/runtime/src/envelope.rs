// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Envelopes: a payload plus the metadata needed to reply to it.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::Sender;
use tracing::debug;

use crate::message::Message;
use crate::reference::ActorRef;

/// Where an envelope was enqueued from. Recorded by the transport at
/// enqueue time and drives the no-handler policy: local-origin envelopes
/// are dropped, remote-origin envelopes produce a `Reject`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
	Local,
	Remote,
}

/// One-shot reply channel used by the synchronous send path.
///
/// Filled at most once; a second deposit is a programming error on the
/// replying side and is reported to the caller of [`deposit`](Self::deposit).
pub struct ReplySink {
	tx: Sender<Box<dyn Message>>,
	filled: AtomicBool,
}

impl ReplySink {
	pub(crate) fn new(tx: Sender<Box<dyn Message>>) -> Self {
		Self { tx, filled: AtomicBool::new(false) }
	}

	/// Deposit the reply. Returns `false` if the sink was already filled,
	/// in which case the reply is dropped.
	pub(crate) fn deposit(&self, reply: Box<dyn Message>) -> bool {
		if self.filled.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
			return false;
		}
		if self.tx.send(reply).is_err() {
			// The asking side gave up (timeout) and dropped the receiver.
			debug!("reply sink receiver is gone; reply dropped");
		}
		true
	}
}

/// A message paired with sender metadata and an optional synchronous reply
/// channel. Immutable after creation; consumed by exactly one handler
/// invocation.
pub struct Envelope {
	payload: Box<dyn Message>,
	sender: Option<ActorRef>,
	reply_sink: Option<ReplySink>,
	origin: Origin,
}

impl Envelope {
	/// Envelope for a locally originated asynchronous send.
	pub fn new(payload: Box<dyn Message>, sender: Option<ActorRef>) -> Self {
		Self { payload, sender, reply_sink: None, origin: Origin::Local }
	}

	/// Envelope for a locally originated synchronous send.
	pub(crate) fn with_sink(payload: Box<dyn Message>, sender: Option<ActorRef>, sink: ReplySink) -> Self {
		Self { payload, sender, reply_sink: Some(sink), origin: Origin::Local }
	}

	/// Envelope for a message decoded from the wire. Used by the inbound
	/// transport.
	pub fn remote(payload: Box<dyn Message>, sender: Option<ActorRef>) -> Self {
		Self { payload, sender, reply_sink: None, origin: Origin::Remote }
	}

	pub fn payload(&self) -> &dyn Message {
		self.payload.as_ref()
	}

	/// Type-name of the payload; the dispatch key.
	pub fn type_name(&self) -> &'static str {
		self.payload.type_name()
	}

	/// Downcast the payload to a concrete message type.
	pub fn get<T: Message>(&self) -> Option<&T> {
		self.payload.as_any().downcast_ref::<T>()
	}

	/// Whether the payload is of the given message type.
	pub fn is<T: Message>(&self) -> bool {
		self.payload.as_any().is::<T>()
	}

	pub fn sender(&self) -> Option<&ActorRef> {
		self.sender.as_ref()
	}

	pub fn origin(&self) -> Origin {
		self.origin
	}

	pub(crate) fn reply_sink(&self) -> Option<&ReplySink> {
		self.reply_sink.as_ref()
	}
}

impl std::fmt::Debug for Envelope {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Envelope")
			.field("type_name", &self.type_name())
			.field("sender", &self.sender.as_ref().map(|s| s.name().to_string()))
			.field("has_reply_sink", &self.reply_sink.is_some())
			.field("origin", &self.origin)
			.finish()
	}
}
