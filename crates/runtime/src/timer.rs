// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Timers that deliver [`Timeout`] messages to actors.
//!
//! A timer owns a background thread that sleeps and sends. Delivery goes
//! through the normal mailbox, so a `Timeout` is serialized with every
//! other message the actor processes.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::messages::Timeout;
use crate::reference::ActorRef;

static TIMER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique timer id for [`Timeout::id`].
pub fn next_timer_id() -> u64 {
	TIMER_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A scheduled delivery of [`Timeout`] messages to one actor.
///
/// ```ignore
/// let id = next_timer_id();
/// let timer = Timer::periodic(actor_ref, Duration::from_millis(500), id);
/// // ... later
/// timer.cancel();
/// ```
pub struct Timer {
	cancelled: Arc<AtomicBool>,
}

impl Timer {
	/// Fire once after `delay`.
	pub fn once(actor: ActorRef, delay: Duration, id: u64) -> Timer {
		let cancelled = Arc::new(AtomicBool::new(false));
		let flag = cancelled.clone();
		thread::spawn(move || {
			thread::sleep(delay);
			if !flag.load(Ordering::SeqCst) {
				if actor.send(Box::new(Timeout::new(id)), None).is_err() {
					debug!(timer_id = id, "timer target is gone");
				}
			}
		});
		Timer { cancelled }
	}

	/// Fire every `interval` until cancelled or the target actor is gone.
	pub fn periodic(actor: ActorRef, interval: Duration, id: u64) -> Timer {
		let cancelled = Arc::new(AtomicBool::new(false));
		let flag = cancelled.clone();
		thread::spawn(move || loop {
			thread::sleep(interval);
			if flag.load(Ordering::SeqCst) {
				break;
			}
			if actor.send(Box::new(Timeout::new(id)), None).is_err() {
				debug!(timer_id = id, "timer target is gone, stopping");
				break;
			}
		});
		Timer { cancelled }
	}

	/// Stop the timer. No `Timeout` is sent after this returns true.
	/// Returns `false` if the timer was already cancelled.
	pub fn cancel(&self) -> bool {
		self.cancelled
			.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
			.is_ok()
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::SeqCst)
	}
}
