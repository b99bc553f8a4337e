// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! The manager: actor registry, worker lifecycle, and termination latch.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver};
use parking_lot::{Condvar, Mutex, RwLock};
use tracing::{debug, error, warn};

use crate::actor::{Actor, Context};
use crate::envelope::Envelope;
use crate::error::RegisterError;
use crate::messages::Shutdown;
use crate::reference::{ActorRef, LocalRef};
use crate::worker::spawn_worker;

/// A transport whose lifetime is bound to the manager: closed during
/// [`Manager::end`]. Implemented by the outbound TCP sender.
pub trait TransportResource: Send + Sync {
	fn close(&self);
}

struct Latch {
	terminated: Mutex<bool>,
	signal: Condvar,
}

/// Back-handle for actors to signal process termination. Cheap to clone;
/// tripping the latch is idempotent.
#[derive(Clone)]
pub struct ManagerHandle {
	latch: Arc<Latch>,
}

impl ManagerHandle {
	fn new() -> Self {
		Self { latch: Arc::new(Latch { terminated: Mutex::new(false), signal: Condvar::new() }) }
	}

	/// Trip the termination latch, releasing [`Manager::run`].
	pub fn terminate(&self) {
		let mut terminated = self.latch.terminated.lock();
		if !*terminated {
			*terminated = true;
			self.latch.signal.notify_all();
		}
	}

	pub fn is_terminated(&self) -> bool {
		*self.latch.terminated.lock()
	}

	pub(crate) fn wait(&self) {
		let mut terminated = self.latch.terminated.lock();
		while !*terminated {
			self.latch.signal.wait(&mut terminated);
		}
	}
}

/// Read-only, cloneable view of the manager's name registry. Handed to the
/// inbound transport so it can resolve receivers without holding the
/// manager itself.
#[derive(Clone, Default)]
pub struct Directory {
	inner: Arc<RwLock<HashMap<String, LocalRef>>>,
}

impl Directory {
	/// Look up a registered actor by name.
	pub fn resolve(&self, name: &str) -> Option<ActorRef> {
		self.inner.read().get(name).cloned().map(ActorRef::Local)
	}

	fn contains(&self, name: &str) -> bool {
		self.inner.read().contains_key(name)
	}

	fn insert(&self, name: String, local: LocalRef) {
		self.inner.write().insert(name, local);
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManagerState {
	Registering,
	Running,
	Stopped,
}

struct Registration {
	name: Arc<str>,
	actor: Box<dyn Actor>,
	rx: Receiver<Envelope>,
}

/// Owns the actor name space, the worker threads, and the termination
/// latch for one process.
pub struct Manager {
	registrations: Vec<Registration>,
	directory: Directory,
	workers: Vec<(Arc<str>, JoinHandle<()>)>,
	handle: ManagerHandle,
	endpoint: Option<String>,
	transports: Vec<Arc<dyn TransportResource>>,
	state: ManagerState,
}

impl Manager {
	pub fn new() -> Self {
		Self {
			registrations: Vec::new(),
			directory: Directory::default(),
			workers: Vec::new(),
			handle: ManagerHandle::new(),
			endpoint: None,
			transports: Vec::new(),
			state: ManagerState::Registering,
		}
	}

	/// A manager for a process that receives remote traffic on `endpoint`.
	pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
		let mut manager = Self::new();
		manager.endpoint = Some(endpoint.into());
		manager
	}

	/// This process's inbound endpoint, if any.
	pub fn endpoint(&self) -> Option<&str> {
		self.endpoint.as_deref()
	}

	/// Handle for signaling termination from actors or other threads.
	pub fn get_handle(&self) -> ManagerHandle {
		self.handle.clone()
	}

	/// Read-only registry view for the inbound transport.
	pub fn directory(&self) -> Directory {
		self.directory.clone()
	}

	/// Look up a registered actor by name.
	pub fn resolve(&self, name: &str) -> Option<ActorRef> {
		self.directory.resolve(name)
	}

	/// Bind `name` to `actor` and allocate its mailbox. Must be called
	/// before [`init`](Self::init).
	pub fn register<A: Actor>(&mut self, name: &str, actor: A) -> Result<ActorRef, RegisterError> {
		if self.state != ManagerState::Registering {
			return Err(RegisterError::RegistryFrozen);
		}
		if self.directory.contains(name) {
			return Err(RegisterError::DuplicateName { name: name.to_string() });
		}
		let name: Arc<str> = name.into();
		let (tx, rx) = unbounded();
		let local = LocalRef::new(name.clone(), tx);
		self.directory.insert(name.to_string(), local.clone());
		self.registrations.push(Registration { name, actor: Box::new(actor), rx });
		Ok(ActorRef::Local(local))
	}

	/// Bind a transport's lifetime to this manager; it is closed during
	/// [`end`](Self::end).
	pub fn register_transport(&mut self, transport: Arc<dyn TransportResource>) {
		self.transports.push(transport);
	}

	/// Start one worker thread per registered actor. Every actor sees a
	/// synthetic `Start` before any traffic that was enqueued earlier.
	/// Freezes the registry.
	pub fn init(&mut self) {
		if self.state != ManagerState::Registering {
			warn!("manager already initialized");
			return;
		}
		self.state = ManagerState::Running;
		for registration in self.registrations.drain(..) {
			let Registration { name, actor, rx } = registration;
			let self_ref = self
				.directory
				.resolve(&name)
				.expect("registered actor must be resolvable");
			let ctx = Context::new(self_ref, name.clone(), self.handle.clone());
			let handle = spawn_worker(name.clone(), actor, rx, ctx);
			self.workers.push((name, handle));
		}
	}

	/// Block until the termination latch is tripped.
	pub fn run(&self) {
		self.handle.wait();
	}

	/// Deliver exactly one `Shutdown` to every actor, join every worker in
	/// registration order, then release transports bound to this manager.
	/// Sends through references after `end` returns fail with
	/// `SendError::RuntimeStopped`.
	pub fn end(&mut self) {
		if self.state == ManagerState::Stopped {
			return;
		}
		self.state = ManagerState::Stopped;

		for (name, _) in &self.workers {
			if let Some(ActorRef::Local(local)) = self.directory.resolve(name) {
				if local.enqueue(Envelope::new(Box::new(Shutdown), None)).is_err() {
					debug!(actor = %name, "worker already gone at shutdown");
				}
			}
		}
		for (name, handle) in self.workers.drain(..) {
			if handle.join().is_err() {
				error!(actor = %name, "worker thread panicked outside dispatch");
			}
		}
		for transport in self.transports.drain(..) {
			transport.close();
		}
	}
}

impl Default for Manager {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::actor::Outcome;

	struct Inert;

	impl Actor for Inert {
		fn handle(&mut self, _envelope: &Envelope, _ctx: &Context) -> Outcome {
			Outcome::Handled
		}
	}

	#[test]
	fn duplicate_name_is_rejected() {
		let mut manager = Manager::new();
		manager.register("a", Inert).unwrap();
		let err = manager.register("a", Inert).unwrap_err();
		assert!(matches!(err, RegisterError::DuplicateName { .. }));
		manager.init();
		manager.end();
	}

	#[test]
	fn registry_freezes_after_init() {
		let mut manager = Manager::new();
		manager.register("a", Inert).unwrap();
		manager.init();
		let err = manager.register("b", Inert).unwrap_err();
		assert!(matches!(err, RegisterError::RegistryFrozen));
		manager.end();
	}

	#[test]
	fn terminate_is_idempotent_and_releases_run() {
		let manager = Manager::new();
		let handle = manager.get_handle();
		assert!(!handle.is_terminated());
		handle.terminate();
		handle.terminate();
		assert!(handle.is_terminated());
		manager.run();
	}

	#[test]
	fn end_is_idempotent() {
		let mut manager = Manager::new();
		manager.register("a", Inert).unwrap();
		manager.init();
		manager.end();
		manager.end();
	}
}
