// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! The outbound transport: serializes envelopes and publishes them to
//! remote endpoints over TCP.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Write;
use std::net::TcpStream;

use parking_lot::Mutex;
use tracing::{debug, trace};

use courier_runtime::{ActorRef, Message, Outbound, SendError, TransportResource};

use crate::endpoint;
use crate::wire::{self, FRAME_DELIMITER};

/// Publishes frames to remote endpoints.
///
/// One logical connection per endpoint, created lazily on first send and
/// reused until a write fails or [`close`](Outbound::close) is called.
/// Writes to any single connection are serialized by the connection map
/// lock.
pub struct TcpOutbound {
	local_endpoint: Mutex<Option<String>>,
	connections: Mutex<HashMap<String, TcpStream>>,
}

impl TcpOutbound {
	pub fn new() -> Self {
		Self { local_endpoint: Mutex::new(None), connections: Mutex::new(HashMap::new()) }
	}

	/// An outbound transport for a process that receives on
	/// `local_endpoint`.
	pub fn with_local_endpoint(local_endpoint: impl Into<String>) -> Self {
		let outbound = Self::new();
		*outbound.local_endpoint.lock() = Some(local_endpoint.into());
		outbound
	}

	/// Set the endpoint stamped as `sender_endpoint` on outgoing frames.
	/// Call this after binding the inbound transport, whose actual bound
	/// endpoint may differ from the requested one (wildcard host,
	/// ephemeral port).
	pub fn set_local_endpoint(&self, local_endpoint: impl Into<String>) {
		*self.local_endpoint.lock() = Some(local_endpoint.into());
	}

	fn connect(endpoint: &str) -> Result<TcpStream, SendError> {
		let addr = endpoint::connect_addr(endpoint).map_err(|reason| SendError::Transport {
			endpoint: endpoint.to_string(),
			reason,
		})?;
		let stream = TcpStream::connect(addr).map_err(|err| SendError::Transport {
			endpoint: endpoint.to_string(),
			reason: err.to_string(),
		})?;
		if let Err(err) = stream.set_nodelay(true) {
			debug!(endpoint = %endpoint, error = %err, "failed to set TCP_NODELAY");
		}
		Ok(stream)
	}
}

impl Default for TcpOutbound {
	fn default() -> Self {
		Self::new()
	}
}

impl Outbound for TcpOutbound {
	fn send_to(
		&self,
		endpoint: &str,
		receiver: &str,
		payload: Box<dyn Message>,
		sender: Option<&ActorRef>,
	) -> Result<(), SendError> {
		let sender_actor = sender.map(|s| s.name().to_string()).unwrap_or_default();
		// A remote sender already carries its own reply endpoint; local
		// senders reply through this process's inbound endpoint.
		let sender_endpoint = match sender {
			Some(ActorRef::Remote(remote)) => remote.endpoint().to_string(),
			_ => self.local_endpoint().unwrap_or_default(),
		};

		let mut frame = wire::encode(receiver, payload.as_ref(), &sender_actor, &sender_endpoint)?;
		frame.push(FRAME_DELIMITER);

		let mut connections = self.connections.lock();
		let stream = match connections.entry(endpoint.to_string()) {
			Entry::Occupied(entry) => entry.into_mut(),
			Entry::Vacant(entry) => {
				trace!(endpoint = %endpoint, "opening outbound connection");
				entry.insert(Self::connect(endpoint)?)
			}
		};
		if let Err(err) = stream.write_all(&frame) {
			// The connection is stale; drop it so the next send redials.
			connections.remove(endpoint);
			return Err(SendError::Transport {
				endpoint: endpoint.to_string(),
				reason: err.to_string(),
			});
		}
		trace!(endpoint = %endpoint, receiver = %receiver, bytes = frame.len(), "frame sent");
		Ok(())
	}

	fn local_endpoint(&self) -> Option<String> {
		self.local_endpoint.lock().clone()
	}

	fn close(&self) {
		self.connections.lock().clear();
	}
}

impl TransportResource for TcpOutbound {
	fn close(&self) {
		Outbound::close(self);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug, serde::Serialize, serde::Deserialize)]
	struct Beat {
		n: u32,
	}
	courier_runtime::define_wire_message!(Beat);

	#[test]
	fn invalid_endpoint_surfaces_transport_error() {
		crate::registry::register_message::<Beat>("Beat");
		let outbound = TcpOutbound::new();
		let err = outbound
			.send_to("ipc://nope", "sink", Box::new(Beat { n: 1 }), None)
			.unwrap_err();
		assert!(matches!(err, SendError::Transport { .. }));
	}

	#[test]
	fn unregistered_type_surfaces_before_connecting() {
		#[derive(Debug, serde::Serialize)]
		struct Never;
		courier_runtime::define_wire_message!(Never);

		let outbound = TcpOutbound::new();
		let err = outbound
			.send_to("tcp://127.0.0.1:1", "sink", Box::new(Never), None)
			.unwrap_err();
		assert!(matches!(err, SendError::UnregisteredType { .. }));
	}
}
