// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Timer demo: a periodic timer ticking every 500ms, a one-shot timer
//! firing once after 2.5s, and cancellation after ten ticks.

use std::time::Duration;

use courier::{next_timer_id, Actor, Context, Envelope, Manager, Outcome, Start, Timeout, Timer};
use tracing::info;

struct TimerActor {
	tick_count: u32,
	max_ticks: u32,
	periodic_id: u64,
	countdown_id: u64,
	periodic: Option<Timer>,
	countdown: Option<Timer>,
}

impl TimerActor {
	fn new() -> Self {
		Self {
			tick_count: 0,
			max_ticks: 10,
			periodic_id: next_timer_id(),
			countdown_id: next_timer_id(),
			periodic: None,
			countdown: None,
		}
	}
}

impl Actor for TimerActor {
	fn handle(&mut self, envelope: &Envelope, ctx: &Context) -> Outcome {
		if envelope.is::<Start>() {
			info!(periodic_id = self.periodic_id, countdown_id = self.countdown_id, "starting timers");
			self.periodic = Some(Timer::periodic(
				ctx.self_ref().clone(),
				Duration::from_millis(500),
				self.periodic_id,
			));
			self.countdown = Some(Timer::once(
				ctx.self_ref().clone(),
				Duration::from_millis(2500),
				self.countdown_id,
			));
			return Outcome::Handled;
		}
		if let Some(timeout) = envelope.get::<Timeout>() {
			if timeout.id == self.periodic_id {
				self.tick_count += 1;
				info!(tick = self.tick_count, "periodic tick");
				if self.tick_count >= self.max_ticks {
					info!("max ticks reached, cancelling periodic timer");
					if let Some(timer) = self.periodic.take() {
						timer.cancel();
					}
					ctx.manager().terminate();
				}
			} else if timeout.id == self.countdown_id {
				info!("countdown complete, one-shot timer fired");
				self.countdown = None;
			} else {
				info!(timer_id = timeout.id, "unknown timer");
			}
			return Outcome::Handled;
		}
		Outcome::Unhandled
	}
}

fn main() {
	courier_examples::init_tracing();

	let mut manager = Manager::new();
	manager.register("timer_actor", TimerActor::new()).unwrap();

	manager.init();
	manager.run();
	manager.end();
}
