//! Error types for the DevTools runtime.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the DevTools runtime.
///
/// The first six variants are the per-call outcomes of the correlator; every
/// one of them is terminal for the call that produced it. The remaining
/// variants come from the connection host and its transports.
#[derive(Debug, Error)]
pub enum Error {
	/// Neither the send nor the receive phase completed within the deadline.
	#[error("call {id} ({method}) timed out after {}ms", .timeout.as_millis())]
	CallTimeout {
		id: i64,
		method: String,
		timeout: Duration,
	},

	/// The caller's cancellation token fired before the call completed.
	#[error("call {id} ({method}) cancelled by caller")]
	ContextCancelled { id: i64, method: String },

	/// The connection shut down while the call was in flight.
	#[error("call {id} ({method}) aborted: target is shutting down")]
	TargetShutdown { id: i64, method: String },

	/// A reply was delivered without a payload, usually because the target crashed.
	#[error("call {id} ({method}) received an empty response")]
	EmptyResponse { id: i64, method: String },

	/// The target answered with an error envelope.
	#[error("request {id} failed, code: {code} msg: {message}")]
	Remote { id: i64, code: i64, message: String },

	/// Serialization of parameters or deserialization of a reply failed.
	#[error("codec error: {0}")]
	Codec(#[from] serde_json::Error),

	/// Failed to establish a connection with the target.
	#[error("failed to connect to target: {0}")]
	ConnectionFailed(String),

	/// Transport-level error (pipe or WebSocket).
	#[error("transport error: {0}")]
	Transport(String),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// Invalid connection configuration.
	#[error("invalid configuration: {0}")]
	Config(String),
}

impl Error {
	/// Returns true if this is a per-call timeout.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::CallTimeout { .. })
	}

	/// Returns true if the connection was torn down under the call.
	pub fn is_target_shutdown(&self) -> bool {
		matches!(self, Error::TargetShutdown { .. })
	}

	/// Returns true if the error says something about the connection rather
	/// than the individual command. Callers usually stop issuing calls on these.
	pub fn is_connection_health(&self) -> bool {
		matches!(
			self,
			Error::CallTimeout { .. }
				| Error::TargetShutdown { .. }
				| Error::EmptyResponse { .. }
				| Error::ConnectionFailed(_)
				| Error::Transport(_)
		)
	}

	/// Returns the protocol error code if the target rejected the command.
	pub fn remote_code(&self) -> Option<i64> {
		match self {
			Error::Remote { code, .. } => Some(*code),
			_ => None,
		}
	}

	/// Returns the call id the error belongs to, when there is one.
	pub fn call_id(&self) -> Option<i64> {
		match self {
			Error::CallTimeout { id, .. }
			| Error::ContextCancelled { id, .. }
			| Error::TargetShutdown { id, .. }
			| Error::EmptyResponse { id, .. }
			| Error::Remote { id, .. } => Some(*id),
			_ => None,
		}
	}
}
