//! Domain wrappers against a scripted browser on the other end of a pipe.

use std::time::Duration;

use cdp::dom_debugger::{CspViolationType, DomBreakpointType};
use cdp::media::{PlayerEventsAdded, PlayersCreated};
use cdp::{CancellationToken, ConnectionConfig, Error, Session};
use cdp_runtime::transport::{FrameReader, FrameWriter, PipeReader, PipeWriter};
use serde_json::{Value, json};
use tokio::io::{DuplexStream, duplex};
use tokio::sync::mpsc;

struct FakeBrowser {
	reader: PipeReader<DuplexStream>,
	writer: PipeWriter<DuplexStream>,
}

impl FakeBrowser {
	async fn next_request(&mut self) -> Value {
		let frame = self.reader.read_frame().await.unwrap().expect("pipe closed");
		serde_json::from_slice(&frame).unwrap()
	}

	async fn send(&mut self, value: Value) {
		self.writer
			.write_frame(&serde_json::to_vec(&value).unwrap())
			.await
			.unwrap();
	}
}

fn session() -> (Session, FakeBrowser) {
	let (browser_in, our_out) = duplex(64 * 1024);
	let (our_in, browser_out) = duplex(64 * 1024);
	let config = ConnectionConfig::default().with_call_timeout(Duration::from_secs(5));
	let session = Session::connect_pipe(our_in, our_out, config).unwrap();
	let browser = FakeBrowser {
		reader: PipeReader::new(browser_in),
		writer: PipeWriter::new(browser_out),
	};
	(session, browser)
}

/// Answers each request with `result` and forwards the request to the test.
fn spawn_browser(mut browser: FakeBrowser, result: Value) -> mpsc::UnboundedReceiver<Value> {
	let (tx, rx) = mpsc::unbounded_channel();
	tokio::spawn(async move {
		loop {
			let frame = match browser.reader.read_frame().await {
				Ok(Some(frame)) => frame,
				_ => break,
			};
			let request: Value = serde_json::from_slice(&frame).unwrap();
			browser.send(json!({"id": request["id"], "result": result})).await;
			let _ = tx.send(request);
		}
	});
	rx
}

#[tokio::test]
async fn media_enable_and_disable() {
	let (session, browser) = session();
	let mut requests = spawn_browser(browser, json!({}));
	let cancel = CancellationToken::new();

	session.media().enable(&cancel).await.unwrap();
	session.media().disable(&cancel).await.unwrap();

	assert_eq!(requests.recv().await.unwrap(), json!({"id": 1, "method": "Media.enable"}));
	assert_eq!(requests.recv().await.unwrap(), json!({"id": 2, "method": "Media.disable"}));
}

#[tokio::test]
async fn dom_debugger_breakpoint_wire_format() {
	let (session, browser) = session();
	let mut requests = spawn_browser(browser, json!({}));
	let cancel = CancellationToken::new();
	let dom = session.dom_debugger();

	dom.set_dom_breakpoint(&cancel, 12, DomBreakpointType::SubtreeModified)
		.await
		.unwrap();
	dom.set_xhr_breakpoint(&cancel, "/api/").await.unwrap();
	dom.set_event_listener_breakpoint(&cancel, "click", None)
		.await
		.unwrap();
	dom.set_break_on_csp_violation(&cancel, vec![CspViolationType::TrustedtypeSinkViolation])
		.await
		.unwrap();
	dom.remove_instrumentation_breakpoint(&cancel, "scriptFirstStatement")
		.await
		.unwrap();

	let expected = [
		json!({"id": 1, "method": "DOMDebugger.setDOMBreakpoint", "params": {"nodeId": 12, "type": "subtree-modified"}}),
		json!({"id": 2, "method": "DOMDebugger.setXHRBreakpoint", "params": {"url": "/api/"}}),
		json!({"id": 3, "method": "DOMDebugger.setEventListenerBreakpoint", "params": {"eventName": "click"}}),
		json!({"id": 4, "method": "DOMDebugger.setBreakOnCSPViolation", "params": {"violationTypes": ["trustedtype-sink-violation"]}}),
		json!({"id": 5, "method": "DOMDebugger.removeInstrumentationBreakpoint", "params": {"eventName": "scriptFirstStatement"}}),
	];
	for want in expected {
		assert_eq!(requests.recv().await.unwrap(), want);
	}
}

#[tokio::test]
async fn get_event_listeners_is_typed() {
	let (session, browser) = session();
	let mut requests = spawn_browser(
		browser,
		json!({"listeners": [{
			"type": "click",
			"useCapture": true,
			"passive": false,
			"once": true,
			"scriptId": "5",
			"lineNumber": 0,
			"columnNumber": 10,
			"handler": {"type": "function", "objectId": "h.1"}
		}]}),
	);

	let cancel = CancellationToken::new();
	let listeners = session
		.dom_debugger()
		.get_event_listeners(&cancel, "node.7", Some(-1), Some(true))
		.await
		.unwrap();

	assert_eq!(listeners.len(), 1);
	assert_eq!(listeners[0].kind, "click");
	assert!(listeners[0].use_capture);
	assert_eq!(listeners[0].handler.as_ref().unwrap().object_id.as_deref(), Some("h.1"));

	let request = requests.recv().await.unwrap();
	assert_eq!(request["params"], json!({"objectId": "node.7", "depth": -1, "pierce": true}));
}

#[tokio::test]
async fn get_event_listeners_tolerates_sparse_result() {
	let (session, browser) = session();
	let _requests = spawn_browser(browser, json!({}));
	let cancel = CancellationToken::new();

	let listeners = session
		.dom_debugger()
		.get_event_listeners(&cancel, "node.1", None, None)
		.await
		.unwrap();
	assert!(listeners.is_empty());
}

#[tokio::test]
async fn get_event_listeners_fills_missing_listener_fields() {
	let (session, browser) = session();
	let _requests = spawn_browser(browser, json!({"listeners": [{"type": "keydown", "scriptId": "3"}]}));
	let cancel = CancellationToken::new();

	let listeners = session
		.dom_debugger()
		.get_event_listeners(&cancel, "node.2", None, None)
		.await
		.unwrap();
	assert_eq!(listeners.len(), 1);
	assert_eq!(listeners[0].kind, "keydown");
	assert!(!listeners[0].use_capture);
	assert_eq!(listeners[0].line_number, 0);
}

#[tokio::test]
async fn remote_error_surfaces_code_and_message() {
	let (session, mut browser) = session();
	tokio::spawn(async move {
		let request = browser.next_request().await;
		browser
			.send(json!({"id": request["id"], "error": {"code": -32000, "message": "No node with given id found"}}))
			.await;
		// Keep the pipe open until the test finishes.
		let _ = browser.reader.read_frame().await;
	});

	let cancel = CancellationToken::new();
	let err = session
		.dom_debugger()
		.remove_dom_breakpoint(&cancel, 99, DomBreakpointType::NodeRemoved)
		.await
		.unwrap_err();

	match err {
		Error::Remote { id, code, message } => {
			assert_eq!(id, 1);
			assert_eq!(code, -32000);
			assert_eq!(message, "No node with given id found");
		}
		other => panic!("Expected Remote, got {other:?}"),
	}
}

#[tokio::test]
async fn get_event_listeners_checks_error_envelope_first() {
	let (session, mut browser) = session();
	tokio::spawn(async move {
		let request = browser.next_request().await;
		browser
			.send(json!({"id": request["id"], "error": {"code": -32602, "message": "Invalid parameters"}}))
			.await;
		let _ = browser.reader.read_frame().await;
	});

	let cancel = CancellationToken::new();
	let err = session
		.dom_debugger()
		.get_event_listeners(&cancel, "missing", None, None)
		.await
		.unwrap_err();
	assert_eq!(err.remote_code(), Some(-32602));
}

#[tokio::test]
async fn typed_events_are_delivered_in_order() {
	let (session, mut browser) = session();
	let mut events = session.events::<PlayerEventsAdded>();

	let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
	let _players = session.on::<PlayersCreated, _>(move |event| {
		let _ = seen_tx.send(event.params.players);
	});

	browser
		.send(json!({"method": "Media.playersCreated", "params": {"players": ["p1", "p2"]}}))
		.await;
	for t in 0..3 {
		browser
			.send(json!({
				"method": "Media.playerEventsAdded",
				"params": {"playerId": "p1", "events": [{"timestamp": t as f64, "value": format!("e{t}")}]},
				"sessionId": "S1"
			}))
			.await;
	}

	assert_eq!(seen_rx.recv().await.unwrap(), vec!["p1", "p2"]);
	for t in 0..3 {
		let envelope = events.recv().await.unwrap().unwrap();
		assert_eq!(envelope.method, "Media.playerEventsAdded");
		assert_eq!(envelope.session_id.as_deref(), Some("S1"));
		assert_eq!(envelope.params.events[0].value, format!("e{t}"));
	}
}

#[tokio::test]
async fn closing_the_session_ends_calls_and_streams() {
	let (session, mut browser) = session();
	let mut events = session.events::<PlayersCreated>();

	let media = session.media();
	let call = tokio::spawn(async move {
		let cancel = CancellationToken::new();
		media.enable(&cancel).await
	});

	browser.next_request().await;
	session.close();

	let err = call.await.unwrap().unwrap_err();
	assert!(err.is_target_shutdown(), "Expected shutdown, got {err:?}");
	assert!(session.is_closed());
	assert!(events.recv().await.is_none());
}

#[tokio::test]
async fn caller_cancellation_does_not_poison_the_session() {
	let (session, mut browser) = session();
	let cancel = CancellationToken::new();

	let media = session.media();
	let call_cancel = cancel.clone();
	let call = tokio::spawn(async move { media.enable(&call_cancel).await });

	let first = browser.next_request().await;
	cancel.cancel();
	assert!(matches!(call.await.unwrap(), Err(Error::ContextCancelled { .. })));

	// Late answer to the cancelled call, then a normal exchange.
	browser.send(json!({"id": first["id"], "result": {}})).await;
	let mut requests = spawn_browser(browser, json!({}));

	let fresh = CancellationToken::new();
	session.media().disable(&fresh).await.unwrap();
	assert_eq!(requests.recv().await.unwrap()["method"], "Media.disable");
}
