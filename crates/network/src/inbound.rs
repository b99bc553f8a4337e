// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! The inbound transport: an actor that reads wire frames from a bound
//! TCP endpoint and delivers them to local mailboxes.
//!
//! The socket work runs on a dedicated reader thread driven by a `mio`
//! poll loop; the actor side only starts that thread on `Start` and joins
//! it on `Shutdown`, so the receiver participates in the manager
//! lifecycle like any other actor. Frames stop being accepted before the
//! `Shutdown` handler returns.

use std::io::{ErrorKind, Read};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use mio::net::{TcpListener, TcpStream};
use mio::{Events, Interest, Poll, Token, Waker};
use slab::Slab;
use tracing::{debug, error, trace, warn};

use courier_runtime::{
	Actor, ActorRef, Context, Directory, Envelope, Outbound, Outcome, Reject, Shutdown, Start,
};

use crate::config::InboundConfig;
use crate::endpoint;
use crate::error::BindError;
use crate::registry;
use crate::wire::{self, Decoded, Frame, FrameError, FRAME_DELIMITER};

/// Conventional registration name for the inbound transport actor.
pub const INBOUND_ACTOR_NAME: &str = "courier.inbound";

const LISTENER: Token = Token(0);
const WAKER: Token = Token(1);
const TOKEN_BASE: usize = 2;

/// The inbound transport actor. Bind with [`new`](Self::new), register it
/// with the manager under [`name`](Self::name), and it starts reading on
/// `Start`.
pub struct Inbound {
	name: String,
	bound_endpoint: String,
	directory: Directory,
	outbound: Arc<dyn Outbound>,
	config: InboundConfig,
	shutdown: Arc<AtomicBool>,
	waker: Arc<Waker>,
	parts: Option<LoopParts>,
	reader: Option<JoinHandle<()>>,
}

struct LoopParts {
	poll: Poll,
	listener: TcpListener,
}

impl Inbound {
	/// Bind `endpoint` and prepare the reader. The listener is bound
	/// immediately so that [`local_endpoint`](Self::local_endpoint) is
	/// known before `init()`; no frames are read until the actor receives
	/// `Start`.
	pub fn new(
		endpoint: &str,
		directory: Directory,
		outbound: Arc<dyn Outbound>,
	) -> Result<Self, BindError> {
		Self::with_config(endpoint, directory, outbound, InboundConfig::default())
	}

	/// [`new`](Self::new) with explicit tuning knobs.
	pub fn with_config(
		endpoint: &str,
		directory: Directory,
		outbound: Arc<dyn Outbound>,
		config: InboundConfig,
	) -> Result<Self, BindError> {
		let addr = endpoint::bind_addr(endpoint).map_err(|reason| BindError::InvalidEndpoint {
			endpoint: endpoint.to_string(),
			reason,
		})?;
		let std_listener = std::net::TcpListener::bind(addr).map_err(|source| BindError::Bind {
			endpoint: endpoint.to_string(),
			source,
		})?;
		std_listener.set_nonblocking(true).map_err(|source| BindError::Bind {
			endpoint: endpoint.to_string(),
			source,
		})?;
		let local_addr = std_listener.local_addr().map_err(|source| BindError::Bind {
			endpoint: endpoint.to_string(),
			source,
		})?;
		let mut listener = TcpListener::from_std(std_listener);

		let poll = Poll::new().map_err(BindError::Poll)?;
		poll.registry()
			.register(&mut listener, LISTENER, Interest::READABLE)
			.map_err(BindError::Poll)?;
		let waker = Waker::new(poll.registry(), WAKER).map_err(BindError::Poll)?;

		Ok(Self {
			name: INBOUND_ACTOR_NAME.to_string(),
			bound_endpoint: endpoint::format_endpoint(&local_addr),
			directory,
			outbound,
			config,
			shutdown: Arc::new(AtomicBool::new(false)),
			waker: Arc::new(waker),
			parts: Some(LoopParts { poll, listener }),
			reader: None,
		})
	}

	/// Register the actor under a different name. The name is also used
	/// as `rejected_by` in rejects this transport emits.
	pub fn with_name(mut self, name: &str) -> Self {
		self.name = name.to_string();
		self
	}

	/// The name this actor expects to be registered under.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The endpoint actually bound, with wildcard host and ephemeral port
	/// resolved. Stamp this into the outbound transport for reply routing.
	pub fn local_endpoint(&self) -> &str {
		&self.bound_endpoint
	}

	fn start_reader(&mut self) {
		let Some(parts) = self.parts.take() else {
			warn!(actor = %self.name, "inbound reader already started");
			return;
		};
		let reader = ReadLoop {
			poll: parts.poll,
			listener: parts.listener,
			connections: Slab::new(),
			router: Router {
				directory: self.directory.clone(),
				outbound: self.outbound.clone(),
				name: self.name.clone(),
			},
			config: self.config.clone(),
			shutdown: self.shutdown.clone(),
		};
		let endpoint = self.bound_endpoint.clone();
		let handle = thread::Builder::new()
			.name("courier-inbound".to_string())
			.spawn(move || {
				debug!(endpoint = %endpoint, "inbound reader starting");
				reader.run();
				debug!(endpoint = %endpoint, "inbound reader stopped");
			})
			.expect("failed to spawn inbound reader thread");
		self.reader = Some(handle);
	}

	fn stop_reader(&mut self) {
		self.shutdown.store(true, Ordering::SeqCst);
		if let Err(err) = self.waker.wake() {
			debug!(error = %err, "failed to wake inbound poller");
		}
		if let Some(handle) = self.reader.take() {
			if handle.join().is_err() {
				error!(actor = %self.name, "inbound reader thread panicked");
			}
		}
	}
}

impl Actor for Inbound {
	fn handle(&mut self, envelope: &Envelope, _ctx: &Context) -> Outcome {
		if envelope.is::<Start>() {
			self.start_reader();
			return Outcome::Handled;
		}
		if envelope.is::<Shutdown>() {
			self.stop_reader();
			return Outcome::Handled;
		}
		Outcome::Unhandled
	}
}

/// Frame routing shared by every connection: decode, resolve, deliver,
/// and answer failures with rejects.
struct Router {
	directory: Directory,
	outbound: Arc<dyn Outbound>,
	name: String,
}

impl Router {
	fn process(&self, bytes: &[u8]) {
		match wire::parse_frame(bytes) {
			Decoded::Frame(frame) => self.route(frame),
			Decoded::Malformed(err) => self.reject_malformed(err),
			Decoded::Unparseable => {
				debug!(bytes = bytes.len(), "unparseable frame dropped");
			}
		}
	}

	fn route(&self, frame: Frame) {
		let Some(entry) = registry::lookup(&frame.message_type) else {
			self.reject(&frame, format!("Unknown message type: {}", frame.message_type));
			return;
		};
		// Lifecycle messages are manager-internal; a peer must not be able
		// to start or stop our actors.
		let Some(decode) = entry.decode else {
			debug!(message_type = %frame.message_type, "peer-originated lifecycle message discarded");
			return;
		};
		let Some(target) = self.directory.resolve(&frame.receiver) else {
			self.reject(&frame, format!("Unknown receiver: {}", frame.receiver));
			return;
		};
		let payload = match decode(&frame.message) {
			Ok(payload) => payload,
			Err(err) => {
				self.reject(
					&frame,
					format!("Failed to deserialize {}: {}", frame.message_type, err),
				);
				return;
			}
		};

		let sender = (!frame.sender_actor.is_empty() && !frame.sender_endpoint.is_empty()).then(|| {
			ActorRef::remote(&frame.sender_actor, &frame.sender_endpoint, self.outbound.clone())
		});
		let ActorRef::Local(local) = target else {
			return;
		};
		trace!(
			message_type = %frame.message_type,
			receiver = %frame.receiver,
			sender = %frame.sender_actor,
			"frame delivered"
		);
		if let Err(err) = local.enqueue(Envelope::remote(payload, sender)) {
			debug!(receiver = %frame.receiver, error = %err, "target mailbox is gone");
		}
	}

	fn reject(&self, frame: &Frame, reason: String) {
		self.send_reject(&frame.sender_endpoint, &frame.sender_actor, &frame.message_type, reason);
	}

	fn reject_malformed(&self, err: FrameError) {
		self.send_reject(&err.sender_endpoint, &err.sender_actor, &err.message_type, err.reason);
	}

	fn send_reject(&self, sender_endpoint: &str, sender_actor: &str, message_type: &str, reason: String) {
		if sender_endpoint.is_empty() || sender_actor.is_empty() {
			debug!(
				message_type = %message_type,
				reason = %reason,
				"undeliverable frame has no reply address; dropped"
			);
			return;
		}
		debug!(
			message_type = %message_type,
			reason = %reason,
			sender = %sender_actor,
			"rejecting frame"
		);
		let reject = Reject::new(message_type, &reason, &self.name);
		// A reject that cannot be delivered is not reported further.
		if let Err(err) = self.outbound.send_to(sender_endpoint, sender_actor, Box::new(reject), None) {
			debug!(endpoint = %sender_endpoint, error = %err, "failed to deliver reject");
		}
	}
}

struct Connection {
	stream: TcpStream,
	peer: SocketAddr,
	buffer: Vec<u8>,
}

struct ReadLoop {
	poll: Poll,
	listener: TcpListener,
	connections: Slab<Connection>,
	router: Router,
	config: InboundConfig,
	shutdown: Arc<AtomicBool>,
}

impl ReadLoop {
	fn run(mut self) {
		let mut events = Events::with_capacity(1024);

		loop {
			if self.shutdown.load(Ordering::SeqCst) {
				break;
			}

			if let Err(err) = self.poll.poll(&mut events, Some(self.config.poll_timeout)) {
				if err.kind() == ErrorKind::Interrupted {
					continue;
				}
				error!(error = %err, "inbound poll failed");
				break;
			}

			for event in events.iter() {
				match event.token() {
					LISTENER => self.accept_ready(),
					WAKER => {
						// Woken for shutdown; checked at the top of the
						// loop.
					}
					token => self.connection_ready(token),
				}
			}
		}

		// Dropping the slab closes every connection; the listener unbinds
		// when dropped.
	}

	fn accept_ready(&mut self) {
		loop {
			match self.listener.accept() {
				Ok((mut stream, peer)) => {
					if let Err(err) = stream.set_nodelay(true) {
						debug!(peer = %peer, error = %err, "failed to set TCP_NODELAY");
					}
					let entry = self.connections.vacant_entry();
					let token = Token(TOKEN_BASE + entry.key());
					match self.poll.registry().register(&mut stream, token, Interest::READABLE) {
						Ok(()) => {
							trace!(peer = %peer, "connection accepted");
							entry.insert(Connection { stream, peer, buffer: Vec::new() });
						}
						Err(err) => {
							warn!(peer = %peer, error = %err, "failed to register connection");
						}
					}
				}
				Err(err) if err.kind() == ErrorKind::WouldBlock => break,
				Err(err) => {
					warn!(error = %err, "accept failed");
					break;
				}
			}
		}
	}

	fn connection_ready(&mut self, token: Token) {
		let Some(key) = token.0.checked_sub(TOKEN_BASE) else {
			return;
		};
		if !self.connections.contains(key) {
			return;
		}

		let (frames, closed) = self.read_frames(key);
		for frame in &frames {
			self.router.process(frame);
		}
		if closed {
			let connection = self.connections.remove(key);
			trace!(peer = %connection.peer, "connection closed");
			// The stream is deregistered automatically when dropped.
		}
	}

	/// Drain the socket, splitting complete newline-delimited frames out
	/// of the connection buffer. Returns the frames and whether the
	/// connection should be closed.
	fn read_frames(&mut self, key: usize) -> (Vec<Vec<u8>>, bool) {
		let max_frame_size = self.config.max_frame_size;
		let connection = &mut self.connections[key];
		let mut frames = Vec::new();
		let mut chunk = [0u8; 4096];

		let closed = loop {
			match connection.stream.read(&mut chunk) {
				Ok(0) => break true,
				Ok(n) => {
					connection.buffer.extend_from_slice(&chunk[..n]);
					while let Some(pos) =
						connection.buffer.iter().position(|&b| b == FRAME_DELIMITER)
					{
						let mut frame: Vec<u8> = connection.buffer.drain(..=pos).collect();
						frame.pop();
						if !frame.is_empty() {
							frames.push(frame);
						}
					}
					if connection.buffer.len() > max_frame_size {
						warn!(
							peer = %connection.peer,
							buffered = connection.buffer.len(),
							"frame exceeds maximum size; closing connection"
						);
						break true;
					}
				}
				Err(err) if err.kind() == ErrorKind::WouldBlock => break false,
				Err(err) if err.kind() == ErrorKind::Interrupted => continue,
				Err(err) => {
					debug!(peer = %connection.peer, error = %err, "read failed; closing connection");
					break true;
				}
			}
		};

		(frames, closed)
	}
}
