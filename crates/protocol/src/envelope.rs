//! Request, response and event envelopes plus their JSON codec.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Command sent to the target.
///
/// `params` is omitted from the wire form when it is `null`, which is what
/// `()` and `None` serialize to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
	/// Call identifier, unique among in-flight calls on one connection.
	pub id: i64,
	/// `Domain.command` name.
	pub method: String,
	#[serde(default, skip_serializing_if = "Value::is_null")]
	pub params: Value,
	/// Flattened target session the command is addressed to.
	#[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

impl Request {
	/// Builds a request from any serializable parameter value.
	pub fn new<P>(id: i64, method: impl Into<String>, params: &P) -> serde_json::Result<Self>
	where
		P: Serialize + ?Sized,
	{
		Ok(Self {
			id,
			method: method.into(),
			params: serde_json::to_value(params)?,
			session_id: None,
		})
	}

	pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
		serde_json::to_vec(self)
	}
}

/// Reply to a [`Request`], correlated by `id`.
///
/// `result` and `error` are mutually exclusive per the protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
	pub id: i64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorPayload>,
	#[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

impl Response {
	/// Success envelope.
	pub fn success(id: i64, result: Value) -> Self {
		Self {
			id,
			result: Some(result),
			error: None,
			session_id: None,
		}
	}

	/// Failure envelope.
	pub fn failure(id: i64, code: i64, message: impl Into<String>) -> Self {
		Self {
			id,
			result: None,
			error: Some(ErrorPayload {
				code,
				message: message.into(),
				data: None,
			}),
			session_id: None,
		}
	}

	pub fn is_error(&self) -> bool {
		self.error.is_some()
	}

	/// Result value, `null` when the target sent none.
	pub fn result_or_null(&self) -> &Value {
		self.result.as_ref().unwrap_or(&Value::Null)
	}

	/// Splits the envelope into its success value or its error payload.
	pub fn into_result(self) -> Result<Value, ErrorPayload> {
		match self.error {
			Some(error) => Err(error),
			None => Ok(self.result.unwrap_or(Value::Null)),
		}
	}

	/// Decodes the `result` member into a caller-declared shape.
	pub fn decode_result<R: DeserializeOwned>(&self) -> serde_json::Result<R> {
		R::deserialize(self.result_or_null())
	}

	pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
		serde_json::to_vec(self)
	}
}

/// Error object attached 1:1 to a failed [`Response`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
	pub code: i64,
	pub message: String,
	/// Extra detail some commands attach, usually a string.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
}

/// Unsolicited notification pushed by the target. Events carry no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
	/// `Domain.eventName`.
	pub method: String,
	#[serde(default)]
	pub params: Value,
	#[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

impl Event {
	pub fn new(method: impl Into<String>, params: Value) -> Self {
		Self {
			method: method.into(),
			params,
			session_id: None,
		}
	}

	/// Decodes `params` into a typed event payload.
	pub fn decode_params<P: DeserializeOwned>(&self) -> serde_json::Result<P> {
		P::deserialize(&self.params)
	}
}

/// Any inbound frame, classified by the presence of `id` and `method`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Message {
	/// Has a non-zero `id`.
	Response(Response),
	/// No id (or id `0`), has `method`.
	Event(Event),
	/// Neither; kept so that newer protocol frames do not fail decoding.
	Unknown(Value),
}

impl Message {
	pub fn from_value(value: Value) -> serde_json::Result<Self> {
		let has_id = value.get("id").and_then(Value::as_i64).is_some_and(|id| id != 0);
		let has_method = value.get("method").is_some_and(Value::is_string);

		if has_id {
			serde_json::from_value(value).map(Message::Response)
		} else if has_method {
			serde_json::from_value(value).map(Message::Event)
		} else {
			Ok(Message::Unknown(value))
		}
	}
}

/// The routing-relevant members of an inbound frame.
///
/// Decoding only the header lets a dispatcher route a frame without
/// materializing its payload; the raw bytes travel on to whoever decodes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FrameHeader {
	#[serde(default)]
	pub id: Option<i64>,
	#[serde(default)]
	pub method: Option<String>,
	#[serde(rename = "sessionId", default)]
	pub session_id: Option<String>,
}

impl FrameHeader {
	/// Call id this frame answers, if any. An id of `0` marks an event.
	pub fn call_id(&self) -> Option<i64> {
		self.id.filter(|id| *id != 0)
	}

	pub fn is_event(&self) -> bool {
		self.call_id().is_none() && self.method.is_some()
	}
}

/// Serializes `{id, method, params}` into one frame.
pub fn encode_request<P>(id: i64, method: &str, params: &P) -> serde_json::Result<Vec<u8>>
where
	P: Serialize + ?Sized,
{
	Request::new(id, method, params)?.encode()
}

/// Decodes a frame into a [`Response`].
pub fn decode_response(data: &[u8]) -> serde_json::Result<Response> {
	serde_json::from_slice(data)
}

/// Decodes and classifies any inbound frame.
pub fn decode_message(data: &[u8]) -> serde_json::Result<Message> {
	let value: Value = serde_json::from_slice(data)?;
	Message::from_value(value)
}

/// Decodes only the routing header of a frame.
pub fn peek_header(data: &[u8]) -> serde_json::Result<FrameHeader> {
	serde_json::from_slice(data)
}
