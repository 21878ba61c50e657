//! `Media` domain: inspection of media players in the page.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Channel;
use crate::events::ProtocolEvent;

/// Players are identified by an opaque string.
pub type PlayerId = String;

/// Log message emitted by a player (`kMessage`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMessage {
	/// `error`, `warning`, `info` or `debug`.
	pub level: String,
	pub message: String,
}

/// Property change on a player (`kMediaPropertyChange`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProperty {
	pub name: String,
	pub value: String,
}

/// Event triggered on a player (`kMediaEventTriggered`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEvent {
	pub timestamp: f64,
	pub value: String,
}

/// Source line reported in a [`PlayerError`]. Points at browser C++ code,
/// not page script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerErrorSourceLocation {
	pub file: String,
	pub line: i64,
}

/// Error raised by a player (`kMediaError`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerError {
	pub error_type: String,
	/// Numeric entry of a browser-specific error enum, such as `PipelineStatusCodes`.
	pub code: i64,
	/// Where the error was raised and passed through.
	#[serde(default)]
	pub stack: Vec<PlayerErrorSourceLocation>,
	/// Root causes, outermost first.
	#[serde(default)]
	pub cause: Vec<PlayerError>,
	/// Extra data such as an HRESULT or codec name.
	#[serde(default)]
	pub data: Map<String, Value>,
}

/// `Media.playerPropertiesChanged`. May set, override or remove properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPropertiesChanged {
	pub player_id: PlayerId,
	pub properties: Vec<PlayerProperty>,
}

impl ProtocolEvent for PlayerPropertiesChanged {
	const METHOD: &'static str = "Media.playerPropertiesChanged";
}

/// `Media.playerEventsAdded`. Batched events are always in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEventsAdded {
	pub player_id: PlayerId,
	pub events: Vec<PlayerEvent>,
}

impl ProtocolEvent for PlayerEventsAdded {
	const METHOD: &'static str = "Media.playerEventsAdded";
}

/// `Media.playerMessagesLogged`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMessagesLogged {
	pub player_id: PlayerId,
	pub messages: Vec<PlayerMessage>,
}

impl ProtocolEvent for PlayerMessagesLogged {
	const METHOD: &'static str = "Media.playerMessagesLogged";
}

/// `Media.playerErrorsRaised`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerErrorsRaised {
	pub player_id: PlayerId,
	pub errors: Vec<PlayerError>,
}

impl ProtocolEvent for PlayerErrorsRaised {
	const METHOD: &'static str = "Media.playerErrorsRaised";
}

/// `Media.playersCreated`. Sent when players appear, and with the full list
/// when a client attaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayersCreated {
	pub players: Vec<PlayerId>,
}

impl ProtocolEvent for PlayersCreated {
	const METHOD: &'static str = "Media.playersCreated";
}

/// `Media` domain handle.
#[derive(Debug, Clone)]
pub struct Media {
	channel: Channel,
}

impl Media {
	pub fn new(channel: Channel) -> Self {
		Self { channel }
	}
}

commands! {
	impl Media {
		/// Enables the Media domain.
		fn enable() => "Media.enable";
		/// Disables the Media domain.
		fn disable() => "Media.disable";
	}
}
