// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Frame encoding and staged decoding.
//!
//! Decoding is staged over `serde_json::Value` rather than a derived
//! struct so that reply routing (`sender_endpoint`/`sender_actor`) can be
//! recovered from frames whose required fields are missing: those frames
//! are rejected in-band when they carry a reply address and silently
//! dropped otherwise.

use serde_json::Value;

use courier_runtime::{Message, SendError};

use crate::registry;

/// Frames are newline-delimited on the TCP stream.
pub const FRAME_DELIMITER: u8 = b'\n';

/// A structurally valid wire frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
	pub message_type: String,
	pub receiver: String,
	pub sender_actor: String,
	pub sender_endpoint: String,
	pub message: Value,
}

/// A frame that parsed as JSON but is missing required fields. Carries
/// whatever reply routing could be recovered.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameError {
	pub reason: String,
	pub message_type: String,
	pub sender_actor: String,
	pub sender_endpoint: String,
}

/// Result of parsing one frame off the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
	Frame(Frame),
	/// JSON, but not a valid frame; reject-able if it names a reply
	/// address.
	Malformed(FrameError),
	/// Not JSON at all; there is nobody to tell.
	Unparseable,
}

/// Encode one frame. Fails when the payload's type is unregistered or
/// does not expose wire fields.
pub fn encode(
	receiver: &str,
	payload: &dyn Message,
	sender_actor: &str,
	sender_endpoint: &str,
) -> Result<Vec<u8>, SendError> {
	let type_name = payload.type_name();
	if !registry::is_registered(type_name) {
		return Err(SendError::UnregisteredType { type_name: type_name.to_string() });
	}
	let fields = payload.to_fields().ok_or_else(|| SendError::Encode {
		type_name: type_name.to_string(),
		reason: "payload does not expose wire fields".to_string(),
	})?;
	let document = serde_json::json!({
		"message_type": type_name,
		"receiver": receiver,
		"sender_actor": sender_actor,
		"sender_endpoint": sender_endpoint,
		"message": Value::Object(fields),
	});
	serde_json::to_vec(&document).map_err(|err| SendError::Encode {
		type_name: type_name.to_string(),
		reason: err.to_string(),
	})
}

/// Parse one frame. Unknown top-level fields are ignored.
pub fn parse_frame(bytes: &[u8]) -> Decoded {
	let value: Value = match serde_json::from_slice(bytes) {
		Ok(value) => value,
		Err(_) => return Decoded::Unparseable,
	};
	let Value::Object(map) = value else {
		return Decoded::Unparseable;
	};

	let string_field = |name: &str| -> String {
		map.get(name).and_then(Value::as_str).unwrap_or_default().to_string()
	};
	let sender_actor = string_field("sender_actor");
	let sender_endpoint = string_field("sender_endpoint");
	let message_type = string_field("message_type");

	let malformed = |reason: String| {
		Decoded::Malformed(FrameError {
			reason,
			message_type: message_type.clone(),
			sender_actor: sender_actor.clone(),
			sender_endpoint: sender_endpoint.clone(),
		})
	};

	if message_type.is_empty() {
		return malformed("missing field `message_type`".to_string());
	}
	let receiver = string_field("receiver");
	if receiver.is_empty() {
		return malformed("missing field `receiver`".to_string());
	}
	let message = match map.get("message") {
		Some(message @ Value::Object(_)) => message.clone(),
		Some(_) => return malformed("field `message` is not an object".to_string()),
		None => return malformed("missing field `message`".to_string()),
	};

	Decoded::Frame(Frame { message_type, receiver, sender_actor, sender_endpoint, message })
}

#[cfg(test)]
mod tests {
	use serde::{Deserialize, Serialize};

	use courier_runtime::{define_message, define_wire_message, Reject};

	use super::*;
	use crate::registry::register_message;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Telemetry {
		reading: f64,
		tags: Vec<String>,
	}
	define_wire_message!(Telemetry);

	#[derive(Debug)]
	struct LocalOnly;
	define_message!(LocalOnly);

	#[test]
	fn encode_then_parse_round_trips() {
		register_message::<Telemetry>("Telemetry");
		let payload = Telemetry { reading: 1.25, tags: vec!["a".into(), "b".into()] };
		let bytes = encode("sink", &payload, "probe", "tcp://127.0.0.1:9000").unwrap();

		let Decoded::Frame(frame) = parse_frame(&bytes) else {
			panic!("expected a frame");
		};
		assert_eq!(frame.message_type, "Telemetry");
		assert_eq!(frame.receiver, "sink");
		assert_eq!(frame.sender_actor, "probe");
		assert_eq!(frame.sender_endpoint, "tcp://127.0.0.1:9000");

		let back: Telemetry = serde_json::from_value(frame.message).unwrap();
		assert_eq!(back, payload);
	}

	#[test]
	fn unregistered_payload_is_refused() {
		#[derive(Debug, Serialize)]
		struct Unseen {
			n: u32,
		}
		define_wire_message!(Unseen);

		let err = encode("sink", &Unseen { n: 1 }, "", "").unwrap_err();
		assert!(matches!(err, courier_runtime::SendError::UnregisteredType { .. }));
	}

	#[test]
	fn local_only_payload_fails_encoding() {
		assert!(encode("sink", &LocalOnly, "", "").is_err());
	}

	#[test]
	fn reject_is_wire_capable() {
		let reject = Reject::new("Ping", "Unknown message type: Ping", "inbound");
		let bytes = encode("ping", &reject, "", "tcp://127.0.0.1:9001").unwrap();
		let Decoded::Frame(frame) = parse_frame(&bytes) else {
			panic!("expected a frame");
		};
		assert_eq!(frame.message_type, "Reject");
	}

	#[test]
	fn unknown_top_level_fields_are_ignored() {
		let bytes = br#"{"message_type":"Reject","receiver":"r","message":{},"x-trace":"abc"}"#;
		assert!(matches!(parse_frame(bytes), Decoded::Frame(_)));
	}

	#[test]
	fn missing_required_fields_keep_reply_routing() {
		let bytes = br#"{"sender_endpoint":"tcp://127.0.0.1:9000","sender_actor":"probe"}"#;
		let Decoded::Malformed(err) = parse_frame(bytes) else {
			panic!("expected malformed");
		};
		assert_eq!(err.sender_endpoint, "tcp://127.0.0.1:9000");
		assert_eq!(err.sender_actor, "probe");
		assert!(err.reason.contains("message_type"));
	}

	#[test]
	fn garbage_is_unparseable() {
		assert_eq!(parse_frame(b"not json"), Decoded::Unparseable);
		assert_eq!(parse_frame(b"[1,2,3]"), Decoded::Unparseable);
	}
}
