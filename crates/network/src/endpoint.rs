// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Endpoint string handling.
//!
//! The runtime treats endpoints as opaque strings; only the transports
//! interpret them, and only as `tcp://host:port`.

use std::net::{SocketAddr, ToSocketAddrs};

const SCHEME: &str = "tcp://";

/// Split a `tcp://host:port` endpoint into host and port.
pub(crate) fn split(endpoint: &str) -> Result<(&str, u16), String> {
	let rest = endpoint
		.strip_prefix(SCHEME)
		.ok_or_else(|| format!("expected `{}` scheme", SCHEME))?;
	let (host, port) = rest.rsplit_once(':').ok_or_else(|| "missing port".to_string())?;
	if host.is_empty() {
		return Err("missing host".to_string());
	}
	let port = port.parse::<u16>().map_err(|err| format!("invalid port: {}", err))?;
	Ok((host, port))
}

/// Resolve an endpoint for binding. `*` binds all interfaces; port `0`
/// picks an ephemeral port.
pub(crate) fn bind_addr(endpoint: &str) -> Result<SocketAddr, String> {
	let (host, port) = split(endpoint)?;
	let host = if host == "*" { "0.0.0.0" } else { host };
	resolve(host, port)
}

/// Resolve an endpoint for connecting.
pub(crate) fn connect_addr(endpoint: &str) -> Result<SocketAddr, String> {
	let (host, port) = split(endpoint)?;
	if host == "*" {
		return Err("cannot connect to wildcard host".to_string());
	}
	resolve(host, port)
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, String> {
	(host, port)
		.to_socket_addrs()
		.map_err(|err| format!("failed to resolve `{}`: {}", host, err))?
		.next()
		.ok_or_else(|| format!("`{}` resolved to no addresses", host))
}

/// The endpoint string for a bound socket address.
pub(crate) fn format_endpoint(addr: &SocketAddr) -> String {
	format!("{}{}:{}", SCHEME, addr.ip(), addr.port())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_host_and_port() {
		assert_eq!(split("tcp://localhost:5001").unwrap(), ("localhost", 5001));
		assert_eq!(split("tcp://*:5001").unwrap(), ("*", 5001));
	}

	#[test]
	fn rejects_foreign_schemes() {
		assert!(split("ipc:///tmp/sock").is_err());
		assert!(split("localhost:5001").is_err());
	}

	#[test]
	fn rejects_missing_parts() {
		assert!(split("tcp://localhost").is_err());
		assert!(split("tcp://:5001").is_err());
		assert!(split("tcp://localhost:http").is_err());
	}

	#[test]
	fn wildcard_binds_any() {
		let addr = bind_addr("tcp://*:0").unwrap();
		assert!(addr.ip().is_unspecified());
	}

	#[test]
	fn wildcard_never_connects() {
		assert!(connect_addr("tcp://*:5001").is_err());
	}

	#[test]
	fn formats_round_trip() {
		let addr = bind_addr("tcp://127.0.0.1:4242").unwrap();
		assert_eq!(format_endpoint(&addr), "tcp://127.0.0.1:4242");
	}
}
