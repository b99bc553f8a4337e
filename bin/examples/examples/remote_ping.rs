// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Remote ping-pong, ping side. Start `remote_pong` first.
//!
//! Binds `tcp://*:5002` for replies and drives `pong@tcp://localhost:5001`
//! through five round trips.

use std::sync::Arc;

use courier::{
	define_wire_message, register_message, Actor, ActorRef, Context, Envelope, Inbound, Manager,
	Outcome, Start, TcpOutbound,
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

struct PingActor {
	pong: ActorRef,
}

impl Actor for PingActor {
	fn handle(&mut self, envelope: &Envelope, ctx: &Context) -> Outcome {
		if envelope.is::<Start>() {
			info!("starting remote ping-pong");
			self.pong.send(Box::new(Ping { count: 1 }), Some(ctx.self_ref())).unwrap();
			return Outcome::Handled;
		}
		if let Some(pong) = envelope.get::<Pong>() {
			info!(count = pong.count, "received remote pong");
			if pong.count >= 5 {
				info!("done");
				ctx.manager().terminate();
			} else {
				self.pong
					.send(Box::new(Ping { count: pong.count + 1 }), Some(ctx.self_ref()))
					.unwrap();
			}
			return Outcome::Handled;
		}
		Outcome::Unhandled
	}
}

fn main() {
	courier_examples::init_tracing();

	register_message::<Ping>("Ping");
	register_message::<Pong>("Pong");

	let mut manager = Manager::with_endpoint("tcp://*:5002");
	let outbound = Arc::new(TcpOutbound::new());
	let inbound = Inbound::new("tcp://*:5002", manager.directory(), outbound.clone())
		.expect("failed to bind tcp://*:5002");
	// Bound on all interfaces; advertise a concrete host for replies.
	outbound.set_local_endpoint("tcp://localhost:5002");

	let pong = ActorRef::remote("pong", "tcp://localhost:5001", outbound.clone());

	let inbound_name = inbound.name().to_string();
	manager.register(&inbound_name, inbound).unwrap();
	manager.register_transport(outbound);
	manager.register("ping", PingActor { pong }).unwrap();

	manager.init();
	manager.run();
	manager.end();
}
