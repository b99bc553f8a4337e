// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! Thread-based actor runtime for Courier.
//!
//! This crate provides the in-process actor kernel: named actors with
//! private state, one mailbox and one dedicated OS thread per actor, and
//! strictly sequential message dispatch within each actor.
//!
//! # Execution Model
//!
//! - Each actor runs on its own OS thread spawned by the [`Manager`].
//!   Messages are sent via `crossbeam-channel` and received with blocking
//!   `recv()`.
//! - An [`ActorRef`] addresses an actor regardless of where it lives. The
//!   local variant enqueues into a mailbox; the remote variant hands the
//!   payload to an [`Outbound`] transport (implemented by
//!   `courier-network`).
//! - [`ActorRef::ask`] is a synchronous request/reply and is valid on local
//!   references only. Calling it from inside a handler whose target might
//!   transitively call back can deadlock.
//!
//! # Lifecycle
//!
//! 1. `Manager::register(name, actor)` binds a name and a mailbox.
//! 2. `Manager::init()` starts one worker thread per actor; every actor
//!    sees a synthetic [`Start`] before any other traffic.
//! 3. `Manager::run()` blocks until some actor calls
//!    [`ManagerHandle::terminate`].
//! 4. `Manager::end()` delivers exactly one [`Shutdown`] to every actor as
//!    its final envelope and joins all workers.
//!
//! # Example
//!
//! ```ignore
//! use courier_runtime::{Actor, Context, Envelope, Manager, Outcome, Start};
//!
//! struct Greeter;
//!
//! impl Actor for Greeter {
//! 	fn handle(&mut self, envelope: &Envelope, ctx: &Context) -> Outcome {
//! 		if envelope.is::<Start>() {
//! 			tracing::info!(actor = %ctx.name(), "hello");
//! 			return Outcome::Handled;
//! 		}
//! 		Outcome::Unhandled
//! 	}
//! }
//!
//! let mut manager = Manager::new();
//! manager.register("greeter", Greeter).unwrap();
//! manager.init();
//! manager.end();
//! ```

pub mod actor;
pub mod envelope;
pub mod error;
pub mod manager;
pub mod message;
pub mod messages;
pub mod reference;
pub mod timer;

pub(crate) mod worker;

pub use actor::{Actor, Context, Outcome};
pub use envelope::{Envelope, Origin, ReplySink};
pub use error::{AskError, RegisterError, SendError};
pub use manager::{Directory, Manager, ManagerHandle, TransportResource};
pub use message::{Fields, Message};
pub use messages::{Reject, Shutdown, Start, Timeout};
pub use reference::{ActorRef, LocalRef, Outbound, RemoteRef};
pub use timer::{next_timer_id, Timer};

// Used by the `define_wire_message!` macro; not part of the public API.
#[doc(hidden)]
pub use serde_json as json;
