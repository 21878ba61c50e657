//! Wire types for the Chrome DevTools Protocol.
//!
//! Every frame on a DevTools connection is one JSON envelope:
//!
//! - [`Request`]: `{"id", "method", "params"}`, sent by the client
//! - [`Response`]: `{"id", "result"}` or `{"id", "error": {"code", "message"}}`
//! - [`Event`]: `{"method", "params"}` with no id, pushed by the target
//!
//! Types in this crate are pure data. Correlating responses with requests,
//! timeouts and shutdown live in `cdp-runtime`.

pub mod envelope;

pub use envelope::{
	ErrorPayload, Event, FrameHeader, Message, Request, Response, decode_message, decode_response,
	encode_request, peek_header,
};
