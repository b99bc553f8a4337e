// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Process-wide registry mapping wire type-names to decoders.
//!
//! Registration is a precondition for any remote use of a message type in
//! either direction: the encoder refuses unregistered payloads and the
//! decoder answers unknown type-names with a `Reject`.
//!
//! The registry is populated at program load and read-only in steady
//! state. Registering after frames have already been decoded is allowed
//! but logged, since peers may have been rejected in the meantime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use tracing::warn;

use courier_runtime::{Message, Reject, Timeout};

type DecodeFn = fn(&serde_json::Value) -> Result<Box<dyn Message>, String>;

/// A registry entry. Internal lifecycle types (`Start`, `Shutdown`) carry
/// no decoder: they are registered so the encoder knows them, but frames
/// naming them are discarded rather than delivered.
#[derive(Clone, Copy)]
pub(crate) struct Entry {
	pub(crate) decode: Option<DecodeFn>,
}

static REGISTRY: Lazy<RwLock<HashMap<String, Entry>>> = Lazy::new(|| {
	let mut map = HashMap::new();
	map.insert("Start".to_string(), Entry { decode: None });
	map.insert("Shutdown".to_string(), Entry { decode: None });
	map.insert("Timeout".to_string(), Entry { decode: Some(decode_into::<Timeout>) });
	map.insert("Reject".to_string(), Entry { decode: Some(decode_into::<Reject>) });
	RwLock::new(map)
});

static LOOKUPS_STARTED: AtomicBool = AtomicBool::new(false);

fn decode_into<T: Message + DeserializeOwned>(value: &serde_json::Value) -> Result<Box<dyn Message>, String> {
	serde_json::from_value::<T>(value.clone())
		.map(|message| Box::new(message) as Box<dyn Message>)
		.map_err(|err| err.to_string())
}

/// Register `T` under `type_name` for remote use.
///
/// `type_name` must equal the value `T::type_name` reports (the
/// `define_wire_message!` identifier), and must match exactly on every
/// peer.
pub fn register_message<T: Message + DeserializeOwned>(type_name: &str) {
	if LOOKUPS_STARTED.load(Ordering::Relaxed) {
		warn!(
			message_type = type_name,
			"message registered after frames were already decoded; earlier frames of this type were rejected"
		);
	}
	let previous = REGISTRY
		.write()
		.insert(type_name.to_string(), Entry { decode: Some(decode_into::<T>) });
	if previous.is_some() {
		warn!(message_type = type_name, "message type registered twice; decoder replaced");
	}
}

/// Whether `type_name` may be sent remotely.
pub fn is_registered(type_name: &str) -> bool {
	REGISTRY.read().contains_key(type_name)
}

/// Decode-side lookup.
pub(crate) fn lookup(type_name: &str) -> Option<Entry> {
	LOOKUPS_STARTED.store(true, Ordering::Relaxed);
	REGISTRY.read().get(type_name).copied()
}

#[cfg(test)]
mod tests {
	use serde::{Deserialize, Serialize};

	use courier_runtime::define_wire_message;

	use super::*;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Sample {
		count: u32,
	}
	define_wire_message!(Sample);

	#[test]
	fn builtins_are_registered() {
		assert!(is_registered("Start"));
		assert!(is_registered("Shutdown"));
		assert!(is_registered("Timeout"));
		assert!(is_registered("Reject"));
	}

	#[test]
	fn lifecycle_types_have_no_decoder() {
		assert!(lookup("Start").unwrap().decode.is_none());
		assert!(lookup("Shutdown").unwrap().decode.is_none());
	}

	#[test]
	fn registered_type_decodes() {
		register_message::<Sample>("Sample");
		let entry = lookup("Sample").unwrap();
		let value = serde_json::json!({"count": 3});
		let message = entry.decode.unwrap()(&value).unwrap();
		assert_eq!(message.as_any().downcast_ref::<Sample>(), Some(&Sample { count: 3 }));
	}

	#[test]
	fn decode_failure_reports_the_field() {
		register_message::<Sample>("Sample");
		let entry = lookup("Sample").unwrap();
		let value = serde_json::json!({"count": "three"});
		let err = match entry.decode.unwrap()(&value) {
			Err(err) => err,
			Ok(_) => panic!("expected a decode error"),
		};
		assert!(err.contains("count") || err.contains("string"), "unhelpful diagnostic: {}", err);
	}

	#[test]
	fn unknown_type_is_absent() {
		assert!(lookup("NoSuchThing").is_none());
	}
}
