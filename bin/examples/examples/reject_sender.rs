// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Reject demo, sender side. Start `reject_receiver` first.
//!
//! Sends an `UnknownMessage` the receiver has never registered, then a
//! normal `Ping`. The first comes back as a `Reject`, the second as a
//! `Pong`.

use std::sync::Arc;

use courier::{
	define_wire_message, register_message, Actor, ActorRef, Context, Envelope, Inbound, Manager,
	Outcome, Reject, Start, TcpOutbound,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Registered here but not at the receiver.
#[derive(Debug, Serialize, Deserialize)]
struct UnknownMessage {
	data: i64,
}
define_wire_message!(UnknownMessage);

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

struct SenderActor {
	receiver: ActorRef,
}

impl Actor for SenderActor {
	fn handle(&mut self, envelope: &Envelope, ctx: &Context) -> Outcome {
		if envelope.is::<Start>() {
			info!("sending UnknownMessage (should be rejected)");
			self.receiver
				.send(Box::new(UnknownMessage { data: 42 }), Some(ctx.self_ref()))
				.unwrap();
			info!("sending Ping (should succeed)");
			self.receiver.send(Box::new(Ping { count: 1 }), Some(ctx.self_ref())).unwrap();
			return Outcome::Handled;
		}
		if let Some(reject) = envelope.get::<Reject>() {
			info!(
				message_type = %reject.message_type,
				reason = %reject.reason,
				rejected_by = %reject.rejected_by,
				"received reject"
			);
			return Outcome::Handled;
		}
		if let Some(pong) = envelope.get::<Pong>() {
			info!(count = pong.count, "received pong, normal traffic still works");
			ctx.manager().terminate();
			return Outcome::Handled;
		}
		Outcome::Unhandled
	}
}

fn main() {
	courier_examples::init_tracing();

	register_message::<UnknownMessage>("UnknownMessage");
	register_message::<Ping>("Ping");
	register_message::<Pong>("Pong");

	let mut manager = Manager::with_endpoint("tcp://*:5002");
	let outbound = Arc::new(TcpOutbound::new());
	let inbound = Inbound::new("tcp://*:5002", manager.directory(), outbound.clone())
		.expect("failed to bind tcp://*:5002");
	outbound.set_local_endpoint("tcp://localhost:5002");

	let receiver = ActorRef::remote("receiver", "tcp://localhost:5001", outbound.clone());

	let inbound_name = inbound.name().to_string();
	manager.register(&inbound_name, inbound).unwrap();
	manager.register_transport(outbound);
	manager.register("sender", SenderActor { receiver }).unwrap();

	manager.init();
	manager.run();
	manager.end();
}
