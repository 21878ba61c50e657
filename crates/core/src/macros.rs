/// Declares table-driven command wrappers on a domain type.
///
/// The domain type must have a `channel: Channel` field. Each row expands to
/// an async method that sends the command through
/// [`Channel::send_default`](cdp_runtime::Channel::send_default):
///
/// ```ignore
/// commands! {
///     impl Media {
///         /// Enables the Media domain.
///         fn enable() => "Media.enable";
///     }
/// }
/// commands! {
///     impl DomDebugger {
///         fn set_xhr_breakpoint_with_params(SetXhrBreakpointParams) => "DOMDebugger.setXHRBreakpoint";
///     }
/// }
/// ```
macro_rules! commands {
	(impl $domain:ident { $($rows:tt)* }) => {
		impl $domain {
			commands!(@rows $($rows)*);
		}
	};

	(@rows) => {};

	(@rows $(#[$meta:meta])* fn $name:ident() => $method:literal; $($rest:tt)*) => {
		$(#[$meta])*
		pub async fn $name(&self, cancel: &$crate::CancellationToken) -> $crate::Result<$crate::Response> {
			self.channel.send_default(cancel, $method, &()).await
		}

		commands!(@rows $($rest)*);
	};

	(@rows $(#[$meta:meta])* fn $name:ident($params:ty) => $method:literal; $($rest:tt)*) => {
		$(#[$meta])*
		pub async fn $name(
			&self,
			cancel: &$crate::CancellationToken,
			params: &$params,
		) -> $crate::Result<$crate::Response> {
			self.channel.send_default(cancel, $method, params).await
		}

		commands!(@rows $($rest)*);
	};
}
