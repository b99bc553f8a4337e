// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Errors raised while setting up transports.

/// Errors from binding the inbound transport.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
	#[error("invalid endpoint `{endpoint}`: {reason}")]
	InvalidEndpoint { endpoint: String, reason: String },

	#[error("failed to bind `{endpoint}`")]
	Bind {
		endpoint: String,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to initialize poller: {0}")]
	Poll(#[source] std::io::Error),
}
