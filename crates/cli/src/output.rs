//! Stdout rendering.
//!
//! Command results are written as JSON, events as one JSON object per line
//! regardless of the format so the stream stays line-parseable.

use std::io::Write;

use serde::Serialize;

use crate::error::Result;

/// Output format for command results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Pretty-printed JSON
	#[default]
	Json,
	/// Single-line JSON
	Ndjson,
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OutputFormat::Json => write!(f, "json"),
			OutputFormat::Ndjson => write!(f, "ndjson"),
		}
	}
}

/// Writes `value` followed by a newline.
pub fn write_value<W, T>(out: &mut W, value: &T, format: OutputFormat) -> Result<()>
where
	W: Write + ?Sized,
	T: Serialize + ?Sized,
{
	match format {
		OutputFormat::Json => serde_json::to_writer_pretty(&mut *out, value)?,
		OutputFormat::Ndjson => serde_json::to_writer(&mut *out, value)?,
	}
	out.write_all(b"\n")?;
	Ok(())
}

/// Writes `value` as one line and flushes, for streamed output.
pub fn write_line<W, T>(out: &mut W, value: &T) -> Result<()>
where
	W: Write + ?Sized,
	T: Serialize + ?Sized,
{
	write_value(out, value, OutputFormat::Ndjson)?;
	out.flush()?;
	Ok(())
}
