use std::io::Write;

use cdp::{CancellationToken, Session};
use tracing::{debug, info};

use crate::cli::ListenArgs;
use crate::error::Result;
use crate::output;

/// Streams events to `out` and returns how many were printed.
///
/// The subscription is taken before any domain is enabled so events the
/// target sends in reply to `enable` (such as `Media.playersCreated`) are
/// not lost.
pub async fn execute<W: Write>(
	session: &Session,
	cancel: &CancellationToken,
	args: &ListenArgs,
	out: &mut W,
) -> Result<usize> {
	let (_subscription, mut events) = session.connection().events().subscribe_channel(None);

	for domain in &args.enable {
		let method = format!("{domain}.enable");
		session.call(cancel, &method, &()).await?;
		info!(%method, "domain enabled");
	}

	let mut printed = 0;
	while args.count.is_none_or(|limit| printed < limit) {
		let event = tokio::select! {
			biased;
			_ = cancel.cancelled() => break,
			event = events.recv() => match event {
				Some(event) => event,
				None => {
					debug!("event stream ended");
					break;
				}
			},
		};
		if !args.methods.is_empty() && !args.methods.iter().any(|method| *method == event.method) {
			continue;
		}
		output::write_line(out, &event)?;
		printed += 1;
	}
	Ok(printed)
}
