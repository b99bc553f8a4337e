// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Built-in message types for actor lifecycle and delivery failures.

use serde::{Deserialize, Serialize};

use crate::{define_message, define_wire_message};

/// Delivered to every actor when the manager starts it, before any other
/// traffic. Actors handle this to perform setup that requires messaging
/// other actors.
#[derive(Debug, Clone, Default)]
pub struct Start;
define_message!(Start);

/// Delivered to every actor when the manager shuts down. Always the last
/// envelope an actor processes.
#[derive(Debug, Clone, Default)]
pub struct Shutdown;
define_message!(Shutdown);

/// Sent by a [`Timer`](crate::Timer) when it fires. The `id` lets an actor
/// distinguish between several timers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeout {
	pub id: u64,
}
define_wire_message!(Timeout);

impl Timeout {
	pub fn new(id: u64) -> Self {
		Timeout { id }
	}
}

/// In-band notification that a remote message could not be delivered.
///
/// Sent back to the originator when the peer does not know the message
/// type, cannot resolve the receiver, fails to deserialize the payload, or
/// when the target actor has no handler for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reject {
	/// Type-name of the message that could not be delivered.
	pub message_type: String,
	/// Free-text diagnostic.
	pub reason: String,
	/// Name of the rejecting actor.
	pub rejected_by: String,
}
define_wire_message!(Reject);

impl Reject {
	pub fn new(message_type: &str, reason: &str, rejected_by: &str) -> Self {
		Reject {
			message_type: message_type.to_string(),
			reason: reason.to_string(),
			rejected_by: rejected_by.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Message;

	#[test]
	fn reject_round_trips_through_fields() {
		let reject = Reject::new("Ping", "Unknown message type: Ping", "inbound");
		let fields = reject.to_fields().unwrap();
		let back: Reject = serde_json::from_value(serde_json::Value::Object(fields)).unwrap();
		assert_eq!(back, reject);
	}

	#[test]
	fn lifecycle_messages_are_local_only() {
		assert!(Start.to_fields().is_none());
		assert!(Shutdown.to_fields().is_none());
	}
}
