// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! The per-actor worker: a dedicated OS thread draining one mailbox.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use tracing::{debug, error};

use crate::actor::{Actor, Context, Outcome};
use crate::envelope::{Envelope, Origin};
use crate::messages::{Reject, Shutdown, Start};

/// Spawn the worker thread for one actor.
pub(crate) fn spawn_worker(
	name: Arc<str>,
	actor: Box<dyn Actor>,
	rx: Receiver<Envelope>,
	ctx: Context,
) -> JoinHandle<()> {
	let thread_name = format!("actor-{}", name);
	thread::Builder::new()
		.name(thread_name)
		.spawn(move || {
			debug!(actor = %name, "worker starting");
			run_worker(actor, rx, &ctx);
			debug!(actor = %name, "worker stopped");
		})
		.expect("failed to spawn actor thread")
}

/// The worker loop. The synthetic `Start` is dispatched before anything
/// queued so it is always the first envelope the actor sees; the loop
/// terminates after dispatching `Shutdown`, which the manager guarantees
/// to be the last envelope.
fn run_worker(mut actor: Box<dyn Actor>, rx: Receiver<Envelope>, ctx: &Context) {
	dispatch(actor.as_mut(), &Envelope::new(Box::new(Start), None), ctx);

	loop {
		match rx.recv() {
			Ok(envelope) => {
				let is_shutdown = envelope.is::<Shutdown>();
				dispatch(actor.as_mut(), &envelope, ctx);
				if is_shutdown {
					break;
				}
			}
			Err(_) => {
				// All senders dropped without a Shutdown; nothing more can
				// arrive.
				debug!(actor = %ctx.name(), "mailbox closed, stopping");
				break;
			}
		}
	}
}

/// Invoke the actor's handler, containing panics and applying the
/// no-handler policy.
fn dispatch(actor: &mut dyn Actor, envelope: &Envelope, ctx: &Context) {
	let outcome = panic::catch_unwind(AssertUnwindSafe(|| actor.handle(envelope, ctx)));
	match outcome {
		Ok(Outcome::Handled) => {}
		Ok(Outcome::Unhandled) => unhandled(envelope, ctx),
		Err(payload) => {
			error!(
				actor = %ctx.name(),
				message_type = envelope.type_name(),
				panic = panic_message(payload.as_ref()),
				"handler panicked; actor continues"
			);
		}
	}
}

/// No-handler policy: local-origin envelopes are dropped with a
/// diagnostic; remote-origin envelopes are answered with a `Reject` routed
/// through the envelope's sender. An unhandled `Reject` is never itself
/// rejected.
fn unhandled(envelope: &Envelope, ctx: &Context) {
	let type_name = envelope.type_name();
	match envelope.origin() {
		Origin::Local => {
			debug!(actor = %ctx.name(), message_type = type_name, "no handler; message dropped");
		}
		Origin::Remote => {
			if envelope.is::<Reject>() {
				debug!(actor = %ctx.name(), "no handler for inbound reject; dropped");
				return;
			}
			let Some(sender) = envelope.sender() else {
				debug!(
					actor = %ctx.name(),
					message_type = type_name,
					"no handler and no reply address; message dropped"
				);
				return;
			};
			let reject =
				Reject::new(type_name, &format!("No handler for {}", type_name), ctx.name());
			if let Err(err) = sender.send(Box::new(reject), None) {
				debug!(actor = %ctx.name(), error = %err, "failed to route reject");
			}
		}
	}
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
	if let Some(msg) = payload.downcast_ref::<&str>() {
		msg
	} else if let Some(msg) = payload.downcast_ref::<String>() {
		msg.as_str()
	} else {
		"<non-string panic payload>"
	}
}
