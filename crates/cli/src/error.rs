use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("no target endpoint: pass --ws or set CDP_WS_URL")]
	MissingEndpoint,

	#[error("invalid --params: {0}")]
	InvalidParams(String),

	#[error(transparent)]
	Cdp(#[from] cdp::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl CliError {
	/// Process exit code: 2 for usage mistakes, 3 when the target reported
	/// an error, 4 when the connection gave out, 1 otherwise.
	///
	/// Runtime errors wrapped in context keep the code of the inner error.
	pub fn exit_code(&self) -> i32 {
		match self {
			CliError::MissingEndpoint | CliError::InvalidParams(_) => 2,
			CliError::Cdp(err) => runtime_exit_code(err),
			CliError::Anyhow(err) => err.downcast_ref::<cdp::Error>().map_or(1, runtime_exit_code),
			_ => 1,
		}
	}
}

fn runtime_exit_code(err: &cdp::Error) -> i32 {
	match err {
		cdp::Error::Config(_) => 2,
		err if err.remote_code().is_some() => 3,
		err if err.is_connection_health() => 4,
		_ => 1,
	}
}
