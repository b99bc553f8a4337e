// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Remote ping-pong, pong side. Run this first, then `remote_ping`:
//!
//! ```sh
//! cargo run --example remote_pong
//! cargo run --example remote_ping
//! ```
//!
//! Hosts the `pong` actor behind `tcp://*:5001` and answers every `Ping`
//! with a `Pong` over the wire.

use std::sync::Arc;

use courier::{
	define_wire_message, register_message, Actor, Context, Envelope, Inbound, Manager, Outcome,
	Shutdown, Start, TcpOutbound,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
struct Ping {
	count: u32,
}
define_wire_message!(Ping);

#[derive(Debug, Serialize, Deserialize)]
struct Pong {
	count: u32,
}
define_wire_message!(Pong);

struct PongActor;

impl Actor for PongActor {
	fn handle(&mut self, envelope: &Envelope, ctx: &Context) -> Outcome {
		if let Some(ping) = envelope.get::<Ping>() {
			info!(count = ping.count, "received remote ping, replying");
			ctx.reply(envelope, Box::new(Pong { count: ping.count }));
			if ping.count >= 5 {
				info!("final ping answered, shutting down");
				ctx.manager().terminate();
			}
			return Outcome::Handled;
		}
		if envelope.is::<Start>() || envelope.is::<Shutdown>() {
			return Outcome::Handled;
		}
		Outcome::Unhandled
	}
}

fn main() {
	courier_examples::init_tracing();

	register_message::<Ping>("Ping");
	register_message::<Pong>("Pong");

	let mut manager = Manager::with_endpoint("tcp://*:5001");
	let outbound = Arc::new(TcpOutbound::new());
	let inbound = Inbound::new("tcp://*:5001", manager.directory(), outbound.clone())
		.expect("failed to bind tcp://*:5001");
	// Bound on all interfaces; advertise a concrete host for replies.
	outbound.set_local_endpoint("tcp://localhost:5001");
	info!(endpoint = inbound.local_endpoint(), "pong process listening");

	let inbound_name = inbound.name().to_string();
	manager.register(&inbound_name, inbound).unwrap();
	manager.register_transport(outbound);
	manager.register("pong", PongActor).unwrap();

	manager.init();
	manager.run();
	manager.end();
}
