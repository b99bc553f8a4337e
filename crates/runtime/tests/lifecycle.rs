// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Courier

//! End-to-end lifecycle tests: local ping-pong, synchronous asks,
//! shutdown ordering, and dispatch policies.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use courier_runtime::{
	define_message, Actor, ActorRef, AskError, Context, Envelope, Manager, Outcome, SendError,
	Shutdown, Start,
};
use courier_testing::wait_for;

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

struct PingActor {
	pong: ActorRef,
	seen: Arc<Mutex<Vec<u32>>>,
}

impl Actor for PingActor {
	fn handle(&mut self, envelope: &Envelope, ctx: &Context) -> Outcome {
		if envelope.is::<Start>() {
			self.pong.send(Box::new(Ping { count: 1 }), Some(ctx.self_ref())).unwrap();
			return Outcome::Handled;
		}
		if let Some(pong) = envelope.get::<Pong>() {
			self.seen.lock().unwrap().push(pong.count);
			if pong.count >= 5 {
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

struct PongActor {
	seen: Arc<Mutex<Vec<u32>>>,
}

impl Actor for PongActor {
	fn handle(&mut self, envelope: &Envelope, ctx: &Context) -> Outcome {
		if let Some(ping) = envelope.get::<Ping>() {
			self.seen.lock().unwrap().push(ping.count);
			ctx.reply(envelope, Box::new(Pong { count: ping.count }));
			return Outcome::Handled;
		}
		if envelope.is::<Start>() {
			return Outcome::Handled;
		}
		Outcome::Unhandled
	}
}

#[test]
fn local_ping_pong_to_five() {
	let ping_seen = Arc::new(Mutex::new(Vec::new()));
	let pong_seen = Arc::new(Mutex::new(Vec::new()));

	let mut manager = Manager::new();
	let pong = manager.register("pong", PongActor { seen: pong_seen.clone() }).unwrap();
	manager.register("ping", PingActor { pong, seen: ping_seen.clone() }).unwrap();

	manager.init();
	manager.run();
	manager.end();

	assert_eq!(*pong_seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
	assert_eq!(*ping_seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
}

#[derive(Debug)]
struct Request;
define_message!(Request);

#[derive(Debug)]
struct Response {
	result: i64,
}
define_message!(Response);

struct Responder {
	log: Arc<Mutex<Vec<String>>>,
}

impl Actor for Responder {
	fn handle(&mut self, envelope: &Envelope, ctx: &Context) -> Outcome {
		if envelope.is::<Request>() {
			self.log.lock().unwrap().push("request".into());
			ctx.reply(envelope, Box::new(Response { result: 42 }));
			return Outcome::Handled;
		}
		if let Some(ping) = envelope.get::<Ping>() {
			self.log.lock().unwrap().push(format!("ping-{}", ping.count));
			return Outcome::Handled;
		}
		if envelope.is::<Start>() {
			return Outcome::Handled;
		}
		Outcome::Unhandled
	}
}

struct Asker {
	target: ActorRef,
	result: Arc<Mutex<Option<i64>>>,
}

impl Actor for Asker {
	fn handle(&mut self, envelope: &Envelope, ctx: &Context) -> Outcome {
		if envelope.is::<Start>() {
			let reply = self.target.ask(Box::new(Request), Some(ctx.self_ref())).unwrap();
			let response = reply.as_any().downcast_ref::<Response>().unwrap();
			*self.result.lock().unwrap() = Some(response.result);
			ctx.manager().terminate();
			return Outcome::Handled;
		}
		Outcome::Unhandled
	}
}

#[test]
fn synchronous_ask_returns_reply() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let result = Arc::new(Mutex::new(None));

	let mut manager = Manager::new();
	let responder = manager.register("responder", Responder { log: log.clone() }).unwrap();
	manager
		.register("asker", Asker { target: responder.clone(), result: result.clone() })
		.unwrap();

	manager.init();
	manager.run();

	// The responder keeps draining its mailbox in order after the ask.
	responder.send(Box::new(Ping { count: 9 }), None).unwrap();
	manager.end();

	assert_eq!(*result.lock().unwrap(), Some(42));
	assert_eq!(*log.lock().unwrap(), vec!["request".to_string(), "ping-9".to_string()]);
}

#[test]
fn ask_from_outside_the_runtime() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let mut manager = Manager::new();
	let responder = manager.register("responder", Responder { log }).unwrap();
	manager.init();

	let reply = responder.ask(Box::new(Request), None).unwrap();
	assert_eq!(reply.as_any().downcast_ref::<Response>().unwrap().result, 42);

	manager.end();
}

#[test]
fn ask_timeout_elapses_when_reply_is_slow() {
	struct Sleeper;

	impl Actor for Sleeper {
		fn handle(&mut self, envelope: &Envelope, ctx: &Context) -> Outcome {
			if envelope.is::<Request>() {
				std::thread::sleep(Duration::from_millis(200));
				ctx.reply(envelope, Box::new(Response { result: 1 }));
				return Outcome::Handled;
			}
			if envelope.is::<Start>() {
				return Outcome::Handled;
			}
			Outcome::Unhandled
		}
	}

	let mut manager = Manager::new();
	let sleeper = manager.register("sleeper", Sleeper).unwrap();
	manager.init();

	let err = match sleeper.ask_timeout(Box::new(Request), None, Duration::from_millis(20)) {
		Err(err) => err,
		Ok(_) => panic!("expected a timeout error"),
	};
	assert!(matches!(err, AskError::Timeout { .. }));

	manager.end();
}

#[test]
fn ask_without_reply_reports_no_reply() {
	// The responder has no Request arm, so the envelope is dropped without
	// a deposit and the asking side is released.
	struct Mute;

	impl Actor for Mute {
		fn handle(&mut self, envelope: &Envelope, _ctx: &Context) -> Outcome {
			if envelope.is::<Start>() {
				return Outcome::Handled;
			}
			Outcome::Unhandled
		}
	}

	let mut manager = Manager::new();
	let mute = manager.register("mute", Mute).unwrap();
	manager.init();

	let err = match mute.ask(Box::new(Request), None) {
		Err(err) => err,
		Ok(_) => panic!("expected a no-reply error"),
	};
	assert!(matches!(err, AskError::NoReply));

	manager.end();
}

struct Recorder {
	log: Arc<Mutex<Vec<String>>>,
	panic_on_boom: bool,
}

#[derive(Debug)]
struct Boom;
define_message!(Boom);

#[derive(Debug)]
struct Seq {
	sender: usize,
	n: u32,
}
define_message!(Seq);

impl Actor for Recorder {
	fn handle(&mut self, envelope: &Envelope, _ctx: &Context) -> Outcome {
		if envelope.is::<Start>() {
			self.log.lock().unwrap().push("Start".into());
			return Outcome::Handled;
		}
		if envelope.is::<Shutdown>() {
			self.log.lock().unwrap().push("Shutdown".into());
			return Outcome::Handled;
		}
		if envelope.is::<Boom>() {
			if self.panic_on_boom {
				panic!("boom");
			}
			return Outcome::Handled;
		}
		if let Some(seq) = envelope.get::<Seq>() {
			self.log.lock().unwrap().push(format!("{}:{}", seq.sender, seq.n));
			return Outcome::Handled;
		}
		if let Some(ping) = envelope.get::<Ping>() {
			self.log.lock().unwrap().push(format!("msg-{}", ping.count));
			return Outcome::Handled;
		}
		Outcome::Unhandled
	}
}

#[test]
fn shutdown_is_always_last() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let mut manager = Manager::new();
	let recorder = manager
		.register("recorder", Recorder { log: log.clone(), panic_on_boom: false })
		.unwrap();

	manager.init();
	for count in 1..=3 {
		recorder.send(Box::new(Ping { count }), None).unwrap();
	}
	manager.end();

	assert_eq!(
		*log.lock().unwrap(),
		vec!["Start", "msg-1", "msg-2", "msg-3", "Shutdown"]
			.into_iter()
			.map(String::from)
			.collect::<Vec<_>>()
	);
}

#[test]
fn exactly_one_start_and_one_shutdown() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let mut manager = Manager::new();
	manager
		.register("recorder", Recorder { log: log.clone(), panic_on_boom: false })
		.unwrap();
	manager.init();
	manager.end();

	let log = log.lock().unwrap();
	assert_eq!(log.iter().filter(|e| *e == "Start").count(), 1);
	assert_eq!(log.iter().filter(|e| *e == "Shutdown").count(), 1);
	assert_eq!(log.first().map(String::as_str), Some("Start"));
	assert_eq!(log.last().map(String::as_str), Some("Shutdown"));
}

#[test]
fn panicking_handler_does_not_kill_the_actor() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let mut manager = Manager::new();
	let recorder = manager
		.register("recorder", Recorder { log: log.clone(), panic_on_boom: true })
		.unwrap();

	manager.init();
	recorder.send(Box::new(Boom), None).unwrap();
	recorder.send(Box::new(Ping { count: 2 }), None).unwrap();

	wait_for(
		|| log.lock().unwrap().iter().any(|e| e == "msg-2"),
		"actor should survive the panic and process the next message",
	);
	manager.end();
}

#[test]
fn per_sender_fifo_is_preserved() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let mut manager = Manager::new();
	let recorder = manager
		.register("recorder", Recorder { log: log.clone(), panic_on_boom: false })
		.unwrap();
	manager.init();

	let mut senders = Vec::new();
	for sender in 0..2 {
		let recorder = recorder.clone();
		senders.push(std::thread::spawn(move || {
			for n in 0..100 {
				recorder.send(Box::new(Seq { sender, n }), None).unwrap();
			}
		}));
	}
	for handle in senders {
		handle.join().unwrap();
	}

	wait_for(
		|| log.lock().unwrap().iter().filter(|e| e.contains(':')).count() == 200,
		"all sequenced messages should arrive",
	);
	manager.end();

	let log = log.lock().unwrap();
	for sender in 0..2 {
		let observed: Vec<u32> = log
			.iter()
			.filter_map(|e| {
				let (s, n) = e.split_once(':')?;
				(s == sender.to_string()).then(|| n.parse().unwrap())
			})
			.collect();
		assert_eq!(observed, (0..100).collect::<Vec<_>>(), "sender {} out of order", sender);
	}
}

#[test]
fn sends_after_end_fail_deterministically() {
	let log = Arc::new(Mutex::new(Vec::new()));
	let mut manager = Manager::new();
	let recorder = manager.register("recorder", Recorder { log, panic_on_boom: false }).unwrap();
	manager.init();
	manager.end();

	let err = recorder.send(Box::new(Ping { count: 1 }), None).unwrap_err();
	assert!(matches!(err, SendError::RuntimeStopped));
}

#[test]
fn end_joins_workers_mid_handler() {
	struct Slow {
		log: Arc<Mutex<Vec<String>>>,
	}

	impl Actor for Slow {
		fn handle(&mut self, envelope: &Envelope, _ctx: &Context) -> Outcome {
			if envelope.is::<Ping>() {
				std::thread::sleep(Duration::from_millis(100));
				self.log.lock().unwrap().push("slow-done".into());
				return Outcome::Handled;
			}
			if envelope.is::<Shutdown>() {
				self.log.lock().unwrap().push("Shutdown".into());
				return Outcome::Handled;
			}
			if envelope.is::<Start>() {
				return Outcome::Handled;
			}
			Outcome::Unhandled
		}
	}

	let log = Arc::new(Mutex::new(Vec::new()));
	let mut manager = Manager::new();
	let slow = manager.register("slow", Slow { log: log.clone() }).unwrap();
	manager.init();

	slow.send(Box::new(Ping { count: 1 }), None).unwrap();
	manager.end();

	assert_eq!(*log.lock().unwrap(), vec!["slow-done".to_string(), "Shutdown".to_string()]);
}
