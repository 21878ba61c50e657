use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::protocol::{Message as WsMessage, Role};

use super::*;
use crate::error::Error;

#[tokio::test]
async fn test_pipe_writes_nul_terminated_frames() {
	let (mut browser_in, our_out) = duplex(1024);
	let (_browser_out, our_in) = duplex(1024);
	let TransportParts { mut writer, .. } = pipe_transport(our_in, our_out);

	writer.write_frame(br#"{"id":1,"method":"Media.enable"}"#).await.unwrap();
	writer.write_frame(br#"{"id":2,"method":"Media.disable"}"#).await.unwrap();
	writer.close().await.unwrap();

	let mut written = Vec::new();
	browser_in.read_to_end(&mut written).await.unwrap();
	assert_eq!(
		written,
		b"{\"id\":1,\"method\":\"Media.enable\"}\0{\"id\":2,\"method\":\"Media.disable\"}\0".to_vec()
	);
}

#[tokio::test]
async fn test_pipe_reads_frames_in_order() {
	let (_browser_in, our_out) = duplex(1024);
	let (our_in, mut browser_out) = duplex(1024);
	let TransportParts { mut reader, .. } = pipe_transport(our_in, our_out);

	// Split across writes and with a stray empty frame in between.
	browser_out.write_all(b"{\"id\":1,\"res").await.unwrap();
	browser_out.write_all(b"ult\":{}}\0\0{\"method\":\"Media.playersCreated\"}\0").await.unwrap();
	drop(browser_out);

	assert_eq!(reader.read_frame().await.unwrap().unwrap(), br#"{"id":1,"result":{}}"#.to_vec());
	assert_eq!(
		reader.read_frame().await.unwrap().unwrap(),
		br#"{"method":"Media.playersCreated"}"#.to_vec()
	);
	assert!(reader.read_frame().await.unwrap().is_none());
}

#[tokio::test]
async fn test_pipe_large_frame() {
	let (_browser_in, our_out) = duplex(1024);
	let (our_in, mut browser_out) = duplex(64 * 1024);
	let TransportParts { mut reader, .. } = pipe_transport(our_in, our_out);

	let payload = serde_json::to_vec(&serde_json::json!({"id": 1, "result": {"data": "x".repeat(200_000)}})).unwrap();
	let expected = payload.clone();
	let write_task = tokio::spawn(async move {
		browser_out.write_all(&payload).await.unwrap();
		browser_out.write_all(&[0]).await.unwrap();
	});

	assert_eq!(reader.read_frame().await.unwrap().unwrap(), expected);
	write_task.await.unwrap();
}

#[tokio::test]
async fn test_pipe_truncated_frame_is_an_error() {
	let (_browser_in, our_out) = duplex(1024);
	let (our_in, mut browser_out) = duplex(1024);
	let TransportParts { mut reader, .. } = pipe_transport(our_in, our_out);

	browser_out.write_all(b"{\"id\":1,").await.unwrap();
	drop(browser_out);

	let err = reader.read_frame().await.unwrap_err();
	assert!(matches!(err, Error::Transport(_)), "got {err:?}");
	assert!(err.to_string().contains("mid-frame"));
}

#[tokio::test]
async fn test_pipe_broken_pipe_on_write() {
	let (browser_in, our_out) = duplex(16);
	let (_browser_out, our_in) = duplex(16);
	let TransportParts { mut writer, .. } = pipe_transport(our_in, our_out);
	drop(browser_in);

	assert!(writer.write_frame(b"{}").await.is_err());
}

async fn websocket_pair() -> (TransportParts, WebSocketStream<tokio::io::DuplexStream>) {
	let (client_io, server_io) = duplex(64 * 1024);
	let client = WebSocketStream::from_raw_socket(client_io, Role::Client, None).await;
	let server = WebSocketStream::from_raw_socket(server_io, Role::Server, None).await;
	(websocket_transport(client), server)
}

#[tokio::test]
async fn test_websocket_round_trip() {
	let (TransportParts { mut writer, mut reader }, mut server) = websocket_pair().await;

	writer.write_frame(br#"{"id":1,"method":"Media.enable"}"#).await.unwrap();
	match server.next().await.unwrap().unwrap() {
		WsMessage::Text(text) => assert_eq!(text, r#"{"id":1,"method":"Media.enable"}"#),
		other => panic!("Expected text message, got {other:?}"),
	}

	server
		.send(WsMessage::Text(r#"{"id":1,"result":{}}"#.to_string()))
		.await
		.unwrap();
	assert_eq!(reader.read_frame().await.unwrap().unwrap(), br#"{"id":1,"result":{}}"#.to_vec());
}

#[tokio::test]
async fn test_websocket_skips_control_frames_and_ends_on_close() {
	let (TransportParts { mut reader, .. }, mut server) = websocket_pair().await;

	server.send(WsMessage::Ping(vec![1, 2, 3])).await.unwrap();
	server
		.send(WsMessage::Binary(br#"{"method":"Media.playersCreated"}"#.to_vec()))
		.await
		.unwrap();
	server.close(None).await.unwrap();

	assert_eq!(
		reader.read_frame().await.unwrap().unwrap(),
		br#"{"method":"Media.playersCreated"}"#.to_vec()
	);
	assert!(reader.read_frame().await.unwrap().is_none());
}

#[tokio::test]
async fn test_websocket_connect_failure() {
	// Port 9 (discard) is essentially never a WebSocket server.
	let err = websocket::connect("ws://127.0.0.1:9/devtools/browser/none")
		.await
		.unwrap_err();
	assert!(matches!(err, Error::ConnectionFailed(_)), "got {err:?}");
}
