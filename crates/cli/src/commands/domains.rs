//! Subcommands backed by the typed domain wrappers.

use std::io::Write;

use cdp::{CancellationToken, Session};

use crate::cli::{ListenersArgs, MediaAction, XhrBreakAction};
use crate::error::Result;
use crate::output::{self, OutputFormat};

pub async fn media<W: Write>(
	session: &Session,
	cancel: &CancellationToken,
	action: MediaAction,
	format: OutputFormat,
	out: &mut W,
) -> Result<()> {
	let media = session.media();
	let response = match action {
		MediaAction::Enable => media.enable(cancel).await?,
		MediaAction::Disable => media.disable(cancel).await?,
	};
	output::write_value(out, response.result_or_null(), format)
}

pub async fn listeners<W: Write>(
	session: &Session,
	cancel: &CancellationToken,
	args: &ListenersArgs,
	format: OutputFormat,
	out: &mut W,
) -> Result<()> {
	let pierce = args.pierce.then_some(true);
	let listeners = session
		.dom_debugger()
		.get_event_listeners(cancel, args.object_id.as_str(), args.depth, pierce)
		.await?;
	output::write_value(out, &listeners, format)
}

pub async fn xhr_break<W: Write>(
	session: &Session,
	cancel: &CancellationToken,
	action: XhrBreakAction,
	format: OutputFormat,
	out: &mut W,
) -> Result<()> {
	let dom = session.dom_debugger();
	let response = match action {
		XhrBreakAction::Set { url } => dom.set_xhr_breakpoint(cancel, url.unwrap_or_default()).await?,
		XhrBreakAction::Remove { url } => dom.remove_xhr_breakpoint(cancel, url.unwrap_or_default()).await?,
	};
	output::write_value(out, response.result_or_null(), format)
}
