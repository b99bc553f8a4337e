// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Reject demo, receiver side. Run this first, then `reject_sender`.
//!
//! Hosts `receiver` behind `tcp://*:5001` and knows only `Ping`/`Pong`.
//! The sender's `UnknownMessage` is answered with an in-band `Reject`.

use std::sync::Arc;

use courier::{
	define_wire_message, register_message, Actor, Context, Envelope, Inbound, Manager, Outcome, Start,
	TcpOutbound,
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

struct ReceiverActor;

impl Actor for ReceiverActor {
	fn handle(&mut self, envelope: &Envelope, ctx: &Context) -> Outcome {
		if let Some(ping) = envelope.get::<Ping>() {
			info!(count = ping.count, "received ping, replying");
			ctx.reply(envelope, Box::new(Pong { count: ping.count }));
			return Outcome::Handled;
		}
		if envelope.is::<Start>() {
			return Outcome::Handled;
		}
		Outcome::Unhandled
	}
}

fn main() {
	courier_examples::init_tracing();

	// Deliberately no `UnknownMessage` registration here.
	register_message::<Ping>("Ping");
	register_message::<Pong>("Pong");

	let mut manager = Manager::with_endpoint("tcp://*:5001");
	let outbound = Arc::new(TcpOutbound::new());
	let inbound = Inbound::new("tcp://*:5001", manager.directory(), outbound.clone())
		.expect("failed to bind tcp://*:5001");
	outbound.set_local_endpoint("tcp://localhost:5001");
	info!(endpoint = inbound.local_endpoint(), "receiver listening; stop with Ctrl+C");

	let inbound_name = inbound.name().to_string();
	manager.register(&inbound_name, inbound).unwrap();
	manager.register_transport(outbound);
	manager.register("receiver", ReceiverActor).unwrap();

	manager.init();
	manager.run();
	manager.end();
}
