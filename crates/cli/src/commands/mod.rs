mod call;
mod domains;
mod listen;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use cdp::{CancellationToken, ConnectionConfig, MessageObserver, Session, TracingObserver};
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use crate::output::OutputFormat;

pub use call::parse_params;

/// Connects to the target named on the command line and runs one command.
///
/// Ctrl-C cancels the command in flight; the connection is closed on the
/// way out either way.
pub async fn dispatch(cli: Cli) -> Result<()> {
	let url = cli.ws.as_deref().ok_or(CliError::MissingEndpoint)?;
	let config = connection_config(cli.timeout_ms)?;
	let observer = cli
		.trace_protocol
		.then(|| Arc::new(TracingObserver) as Arc<dyn MessageObserver>);

	let session = Session::connect_with_observer(url, config, observer)
		.await
		.with_context(|| format!("connecting to {url}"))?;

	let cancel = CancellationToken::new();
	let interrupt = cancel.clone();
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			debug!("interrupted");
			interrupt.cancel();
		}
	});

	let mut stdout = std::io::stdout();
	let result = run(&session, &cancel, cli.command, cli.format, &mut stdout).await;
	session.close();
	result
}

/// Runs `command` against an already connected session.
pub async fn run<W: Write>(
	session: &Session,
	cancel: &CancellationToken,
	command: Commands,
	format: OutputFormat,
	out: &mut W,
) -> Result<()> {
	match command {
		Commands::Call(args) => call::execute(session, cancel, &args, format, out).await,
		Commands::Listen(args) => listen::execute(session, cancel, &args, out).await.map(|_| ()),
		Commands::Media { action } => domains::media(session, cancel, action, format, out).await,
		Commands::Listeners(args) => domains::listeners(session, cancel, &args, format, out).await,
		Commands::XhrBreak { action } => domains::xhr_break(session, cancel, action, format, out).await,
	}
}

/// `CDP_*` environment settings with the command line flags applied on top.
pub fn connection_config(timeout_ms: Option<u64>) -> Result<ConnectionConfig> {
	let mut config = ConnectionConfig::from_env()?;
	if let Some(ms) = timeout_ms {
		config = config.with_call_timeout(Duration::from_millis(ms));
	}
	config.validate()?;
	Ok(config)
}
