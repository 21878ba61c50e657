
use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;
use crate::styles::cli_styles;

/// Root CLI for cdp.
#[derive(Parser, Debug)]
#[command(name = "cdp")]
#[command(about = "Chrome DevTools Protocol client - send commands, watch events")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// DevTools WebSocket URL, e.g. ws://127.0.0.1:9222/devtools/page/<id>
	#[arg(long, global = true, env = "CDP_WS_URL", value_name = "URL")]
	pub ws: Option<String>,

	/// Per-phase call deadline in milliseconds (overrides CDP_CALL_TIMEOUT_MS)
	#[arg(long, global = true, value_name = "MS")]
	pub timeout_ms: Option<u64>,

	/// Log every request, response and event body on stderr
	#[arg(long, global = true)]
	pub trace_protocol: bool,

	/// Result format: json (default) or ndjson
	#[arg(short = 'f', long, global = true, value_enum, default_value = "json")]
	pub format: OutputFormat,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Send any command and print its result.
	Call(CallArgs),
	/// Print events as NDJSON until the count is reached or the target goes away.
	Listen(ListenArgs),
	/// Media domain commands.
	Media {
		#[command(subcommand)]
		action: MediaAction,
	},
	/// List event listeners registered on a remote object.
	Listeners(ListenersArgs),
	/// Break on XMLHttpRequest URLs.
	#[command(name = "xhr-break")]
	XhrBreak {
		#[command(subcommand)]
		action: XhrBreakAction,
	},
}

#[derive(Args, Debug, Clone)]
pub struct CallArgs {
	/// `Domain.command` name, e.g. Browser.getVersion
	#[arg(value_name = "METHOD")]
	pub method: String,

	/// JSON object of command parameters
	#[arg(short, long, value_name = "JSON")]
	pub params: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ListenArgs {
	/// Only print events with this name (repeatable)
	#[arg(short, long = "method", value_name = "EVENT")]
	pub methods: Vec<String>,

	/// Domains to enable before listening, e.g. Media (repeatable)
	#[arg(short, long = "enable", value_name = "DOMAIN")]
	pub enable: Vec<String>,

	/// Stop after this many events
	#[arg(short = 'n', long, value_name = "N")]
	pub count: Option<usize>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum MediaAction {
	/// Start reporting player events.
	Enable,
	/// Stop reporting player events.
	Disable,
}

#[derive(Args, Debug, Clone)]
pub struct ListenersArgs {
	/// Remote object id of the node or window
	#[arg(value_name = "OBJECT_ID")]
	pub object_id: String,

	/// Child depth to collect listeners from; -1 for the whole subtree
	#[arg(long, allow_negative_numbers = true, value_name = "N")]
	pub depth: Option<i64>,

	/// Descend into iframes and shadow roots
	#[arg(long)]
	pub pierce: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum XhrBreakAction {
	/// Pause when a request URL contains the substring (empty matches all)
	Set {
		#[arg(value_name = "URL")]
		url: Option<String>,
	},
	/// Remove a breakpoint set earlier with the same substring
	Remove {
		#[arg(value_name = "URL")]
		url: Option<String>,
	},
}
