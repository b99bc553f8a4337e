// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Local ping-pong: two actors in one process exchanging counted
//! messages until five round trips are done.

use courier::{define_message, Actor, ActorRef, Context, Envelope, Manager, Outcome, Start};
use tracing::info;

#[derive(Debug)]
struct Ping {
	count: u32,
}
define_message!(Ping);

#[derive(Debug)]
struct Pong {
	count: u32,
}
define_message!(Pong);

/// Sends `Ping`, receives `Pong`.
struct PingActor {
	pong: ActorRef,
}

impl Actor for PingActor {
	fn handle(&mut self, envelope: &Envelope, ctx: &Context) -> Outcome {
		if envelope.is::<Start>() {
			info!("starting ping-pong");
			self.pong.send(Box::new(Ping { count: 1 }), Some(ctx.self_ref())).unwrap();
			return Outcome::Handled;
		}
		if let Some(pong) = envelope.get::<Pong>() {
			info!(count = pong.count, "received pong");
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

/// Receives `Ping`, answers `Pong`.
struct PongActor;

impl Actor for PongActor {
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

	let mut manager = Manager::new();
	let pong = manager.register("pong", PongActor).unwrap();
	manager.register("ping", PingActor { pong }).unwrap();

	manager.init();
	manager.run();
	manager.end();
}
