use std::io::Write;

use cdp::{CancellationToken, Session};
use serde_json::Value;
use tracing::info;

use crate::cli::CallArgs;
use crate::error::{CliError, Result};
use crate::output::{self, OutputFormat};

pub async fn execute<W: Write>(
	session: &Session,
	cancel: &CancellationToken,
	args: &CallArgs,
	format: OutputFormat,
	out: &mut W,
) -> Result<()> {
	let params = parse_params(args.params.as_deref())?;
	info!(method = %args.method, "sending command");

	let response = session.call(cancel, &args.method, &params).await?;
	output::write_value(out, response.result_or_null(), format)
}

/// Parses `--params`. Absent or `null` sends no params at all.
pub fn parse_params(raw: Option<&str>) -> Result<Value> {
	let Some(raw) = raw else {
		return Ok(Value::Null);
	};
	let value: Value = serde_json::from_str(raw).map_err(|err| CliError::InvalidParams(err.to_string()))?;
	match value {
		Value::Object(_) | Value::Null => Ok(value),
		other => Err(CliError::InvalidParams(format!("expected a JSON object, got {other}"))),
	}
}
