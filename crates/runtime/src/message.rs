// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! The message abstraction and the macros that implement it.
//!
//! A message is an opaque user-defined payload. The runtime needs three
//! things about it: its type-name (the dispatch key, and the wire
//! type-name for remote delivery), a way to downcast it back to the
//! concrete type inside a handler, and, for wire-capable messages, its
//! public fields as a flat JSON map.
//!
//! Plain local messages use [`define_message!`]; messages that cross
//! process boundaries derive `Serialize`/`Deserialize` and use
//! [`define_wire_message!`], then get registered with the transport's
//! message registry.

use std::any::Any;

/// Flat map of field name to JSON value, as carried in a wire frame.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A payload the runtime can route.
pub trait Message: Any + Send {
	/// The type-name used for dispatch and on the wire. Case-sensitive;
	/// must match exactly on both peers for remote delivery.
	fn type_name(&self) -> &'static str;

	/// Downcast support for handlers.
	fn as_any(&self) -> &dyn Any;

	/// The payload's public fields for wire encoding.
	///
	/// Returns `None` for local-only messages, which makes any attempt to
	/// send them remotely fail with an encode error.
	fn to_fields(&self) -> Option<Fields> {
		None
	}
}

/// Implement [`Message`] for a local-only payload type.
///
/// ```ignore
/// struct Tick { n: u32 }
/// define_message!(Tick);
/// ```
#[macro_export]
macro_rules! define_message {
	($ty:ty) => {
		impl $crate::Message for $ty {
			fn type_name(&self) -> &'static str {
				stringify!($ty)
			}

			fn as_any(&self) -> &dyn ::std::any::Any {
				self
			}
		}
	};
}

/// Implement [`Message`] for a wire-capable payload type.
///
/// The type must derive `serde::Serialize` (for encoding) and, to be
/// decodable on the receiving side, `serde::Deserialize` plus a
/// `register_message` call at program load.
#[macro_export]
macro_rules! define_wire_message {
	($ty:ty) => {
		impl $crate::Message for $ty {
			fn type_name(&self) -> &'static str {
				stringify!($ty)
			}

			fn as_any(&self) -> &dyn ::std::any::Any {
				self
			}

			fn to_fields(&self) -> Option<$crate::Fields> {
				match $crate::json::to_value(self) {
					Ok($crate::json::Value::Object(fields)) => Some(fields),
					_ => None,
				}
			}
		}
	};
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug)]
	struct Local {
		#[allow(dead_code)]
		n: u32,
	}
	define_message!(Local);

	#[derive(Debug, serde::Serialize, serde::Deserialize)]
	struct Wired {
		count: u32,
		label: String,
	}
	define_wire_message!(Wired);

	#[test]
	fn type_name_matches_ident() {
		let msg = Local { n: 1 };
		assert_eq!(msg.type_name(), "Local");
	}

	#[test]
	fn local_message_has_no_fields() {
		let msg = Local { n: 1 };
		assert!(msg.to_fields().is_none());
	}

	#[test]
	fn wire_message_exposes_fields() {
		let msg = Wired { count: 3, label: "x".into() };
		let fields = msg.to_fields().unwrap();
		assert_eq!(fields["count"], 3);
		assert_eq!(fields["label"], "x");
	}

	#[test]
	fn downcast_via_as_any() {
		let msg: Box<dyn Message> = Box::new(Local { n: 7 });
		assert!(msg.as_any().downcast_ref::<Local>().is_some());
		assert!(msg.as_any().downcast_ref::<Wired>().is_none());
	}
}
