// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Shared setup for the courier demos.

use tracing_subscriber::EnvFilter;

/// Console logging for the demos: `RUST_LOG` syntax, defaulting to
/// `info`.
pub fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}
