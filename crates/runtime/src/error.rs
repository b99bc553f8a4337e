// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Error types for registration, sending, and synchronous asks.

use std::time::Duration;

/// Errors from [`Manager::register`](crate::Manager::register).
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
	#[error("actor `{name}` is already registered")]
	DuplicateName { name: String },

	#[error("registry is frozen once the manager has been initialized")]
	RegistryFrozen,
}

/// Errors from [`ActorRef::send`](crate::ActorRef::send). Everything here
/// is detectable before or during transmission; post-send network failures
/// are not reported in-band.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
	#[error("actor runtime has stopped")]
	RuntimeStopped,

	#[error("message type `{type_name}` is not registered for remote use")]
	UnregisteredType { type_name: String },

	#[error("failed to encode `{type_name}`: {reason}")]
	Encode { type_name: String, reason: String },

	#[error("transport failure for endpoint `{endpoint}`: {reason}")]
	Transport { endpoint: String, reason: String },
}

/// Errors from [`ActorRef::ask`](crate::ActorRef::ask) and
/// [`ActorRef::ask_timeout`](crate::ActorRef::ask_timeout).
#[derive(Debug, thiserror::Error)]
pub enum AskError {
	#[error("synchronous send is not supported on remote references")]
	UnsupportedRemoteSynchronous,

	#[error("actor runtime has stopped")]
	RuntimeStopped,

	#[error("no reply arrived within {timeout:?}")]
	Timeout { timeout: Duration },

	#[error("the envelope was dropped without a reply")]
	NoReply,
}
