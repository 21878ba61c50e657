//! `DOMDebugger` domain: DOM, event listener, XHR and CSP breakpoints.

use cdp_protocol::Response;
use serde::{Deserialize, Serialize};

use crate::runtime::{RemoteObject, RemoteObjectId, ScriptId};
use crate::{CancellationToken, Channel, Result};

/// DOM mutation a DOM breakpoint stops on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomBreakpointType {
	SubtreeModified,
	AttributeModified,
	NodeRemoved,
}

/// CSP violation kinds `setBreakOnCSPViolation` can stop on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CspViolationType {
	TrustedtypeSinkViolation,
	TrustedtypePolicyViolation,
}

/// An `EventListener` registered on a DOM object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListener {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub use_capture: bool,
	#[serde(default)]
	pub passive: bool,
	#[serde(default)]
	pub once: bool,
	#[serde(default)]
	pub script_id: ScriptId,
	/// 0-based.
	#[serde(default)]
	pub line_number: i64,
	/// 0-based.
	#[serde(default)]
	pub column_number: i64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub handler: Option<RemoteObject>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub original_handler: Option<RemoteObject>,
	/// Node the listener is attached to, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub backend_node_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEventListenersParams {
	pub object_id: RemoteObjectId,
	/// Maximum depth at which node children are retrieved; `-1` for the
	/// entire subtree. The browser defaults to 1.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub depth: Option<i64>,
	/// Traverse iframes and shadow roots. Reports listeners for all contexts when set.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pierce: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct GetEventListenersResult {
	#[serde(default)]
	listeners: Vec<EventListener>,
}

/// Params of `setDOMBreakpoint` and `removeDOMBreakpoint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomBreakpointParams {
	pub node_id: i64,
	#[serde(rename = "type")]
	pub kind: DomBreakpointType,
}

/// Params of `setEventListenerBreakpoint` and `removeEventListenerBreakpoint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListenerBreakpointParams {
	/// DOM event name, e.g. `click`.
	pub event_name: String,
	/// `EventTarget` interface name; `*` or absent matches any target.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target_name: Option<String>,
}

/// Params of `setInstrumentationBreakpoint` and `removeInstrumentationBreakpoint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentationBreakpointParams {
	pub event_name: String,
}

/// Params of `setXHRBreakpoint` and `removeXHRBreakpoint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XhrBreakpointParams {
	/// Substring of the request URL; empty matches every request.
	pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBreakOnCspViolationParams {
	pub violation_types: Vec<CspViolationType>,
}

/// `DOMDebugger` domain handle.
#[derive(Debug, Clone)]
pub struct DomDebugger {
	channel: Channel,
}

impl DomDebugger {
	pub fn new(channel: Channel) -> Self {
		Self { channel }
	}

	/// Returns event listeners of the given object.
	pub async fn get_event_listeners_with_params(
		&self,
		cancel: &CancellationToken,
		params: &GetEventListenersParams,
	) -> Result<Vec<EventListener>> {
		let result: GetEventListenersResult = self
			.channel
			.send(cancel, "DOMDebugger.getEventListeners", params)
			.await?;
		Ok(result.listeners)
	}

	pub async fn get_event_listeners(
		&self,
		cancel: &CancellationToken,
		object_id: impl Into<RemoteObjectId>,
		depth: Option<i64>,
		pierce: Option<bool>,
	) -> Result<Vec<EventListener>> {
		let params = GetEventListenersParams {
			object_id: object_id.into(),
			depth,
			pierce,
		};
		self.get_event_listeners_with_params(cancel, &params).await
	}

	pub async fn remove_dom_breakpoint(
		&self,
		cancel: &CancellationToken,
		node_id: i64,
		kind: DomBreakpointType,
	) -> Result<Response> {
		self.remove_dom_breakpoint_with_params(cancel, &DomBreakpointParams { node_id, kind })
			.await
	}

	pub async fn remove_event_listener_breakpoint(
		&self,
		cancel: &CancellationToken,
		event_name: impl Into<String>,
		target_name: Option<String>,
	) -> Result<Response> {
		let params = EventListenerBreakpointParams {
			event_name: event_name.into(),
			target_name,
		};
		self.remove_event_listener_breakpoint_with_params(cancel, &params)
			.await
	}

	pub async fn remove_instrumentation_breakpoint(
		&self,
		cancel: &CancellationToken,
		event_name: impl Into<String>,
	) -> Result<Response> {
		let params = InstrumentationBreakpointParams {
			event_name: event_name.into(),
		};
		self.remove_instrumentation_breakpoint_with_params(cancel, &params)
			.await
	}

	pub async fn remove_xhr_breakpoint(&self, cancel: &CancellationToken, url: impl Into<String>) -> Result<Response> {
		self.remove_xhr_breakpoint_with_params(cancel, &XhrBreakpointParams { url: url.into() })
			.await
	}

	pub async fn set_break_on_csp_violation(
		&self,
		cancel: &CancellationToken,
		violation_types: Vec<CspViolationType>,
	) -> Result<Response> {
		self.set_break_on_csp_violation_with_params(cancel, &SetBreakOnCspViolationParams { violation_types })
			.await
	}

	pub async fn set_dom_breakpoint(
		&self,
		cancel: &CancellationToken,
		node_id: i64,
		kind: DomBreakpointType,
	) -> Result<Response> {
		self.set_dom_breakpoint_with_params(cancel, &DomBreakpointParams { node_id, kind })
			.await
	}

	pub async fn set_event_listener_breakpoint(
		&self,
		cancel: &CancellationToken,
		event_name: impl Into<String>,
		target_name: Option<String>,
	) -> Result<Response> {
		let params = EventListenerBreakpointParams {
			event_name: event_name.into(),
			target_name,
		};
		self.set_event_listener_breakpoint_with_params(cancel, &params)
			.await
	}

	pub async fn set_instrumentation_breakpoint(
		&self,
		cancel: &CancellationToken,
		event_name: impl Into<String>,
	) -> Result<Response> {
		let params = InstrumentationBreakpointParams {
			event_name: event_name.into(),
		};
		self.set_instrumentation_breakpoint_with_params(cancel, &params)
			.await
	}

	pub async fn set_xhr_breakpoint(&self, cancel: &CancellationToken, url: impl Into<String>) -> Result<Response> {
		self.set_xhr_breakpoint_with_params(cancel, &XhrBreakpointParams { url: url.into() })
			.await
	}
}

commands! {
	impl DomDebugger {
		/// Removes a DOM breakpoint set with `setDOMBreakpoint`.
		fn remove_dom_breakpoint_with_params(DomBreakpointParams) => "DOMDebugger.removeDOMBreakpoint";
		/// Removes a breakpoint on a particular DOM event.
		fn remove_event_listener_breakpoint_with_params(EventListenerBreakpointParams) => "DOMDebugger.removeEventListenerBreakpoint";
		/// Removes a breakpoint on a native event.
		fn remove_instrumentation_breakpoint_with_params(InstrumentationBreakpointParams) => "DOMDebugger.removeInstrumentationBreakpoint";
		/// Removes a breakpoint from XMLHttpRequest.
		fn remove_xhr_breakpoint_with_params(XhrBreakpointParams) => "DOMDebugger.removeXHRBreakpoint";
		/// Sets a breakpoint on particular CSP violations.
		fn set_break_on_csp_violation_with_params(SetBreakOnCspViolationParams) => "DOMDebugger.setBreakOnCSPViolation";
		/// Sets a breakpoint on a particular operation with a DOM node.
		fn set_dom_breakpoint_with_params(DomBreakpointParams) => "DOMDebugger.setDOMBreakpoint";
		/// Sets a breakpoint on a particular DOM event.
		fn set_event_listener_breakpoint_with_params(EventListenerBreakpointParams) => "DOMDebugger.setEventListenerBreakpoint";
		/// Sets a breakpoint on a particular native event.
		fn set_instrumentation_breakpoint_with_params(InstrumentationBreakpointParams) => "DOMDebugger.setInstrumentationBreakpoint";
		/// Sets a breakpoint on XMLHttpRequest.
		fn set_xhr_breakpoint_with_params(XhrBreakpointParams) => "DOMDebugger.setXHRBreakpoint";
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_enum_wire_names() {
		assert_eq!(
			serde_json::to_value(DomBreakpointType::SubtreeModified).unwrap(),
			json!("subtree-modified")
		);
		assert_eq!(
			serde_json::to_value(DomBreakpointType::AttributeModified).unwrap(),
			json!("attribute-modified")
		);
		assert_eq!(serde_json::to_value(DomBreakpointType::NodeRemoved).unwrap(), json!("node-removed"));
		assert_eq!(
			serde_json::to_value(CspViolationType::TrustedtypePolicyViolation).unwrap(),
			json!("trustedtype-policy-violation")
		);
	}

	#[test]
	fn test_optional_params_are_omitted() {
		let params = GetEventListenersParams {
			object_id: "42.1".into(),
			depth: None,
			pierce: None,
		};
		assert_eq!(serde_json::to_value(&params).unwrap(), json!({"objectId": "42.1"}));

		let params = EventListenerBreakpointParams {
			event_name: "click".into(),
			target_name: None,
		};
		assert_eq!(serde_json::to_value(&params).unwrap(), json!({"eventName": "click"}));
	}

	#[test]
	fn test_dom_breakpoint_params() {
		let params = DomBreakpointParams {
			node_id: 7,
			kind: DomBreakpointType::NodeRemoved,
		};
		assert_eq!(
			serde_json::to_value(&params).unwrap(),
			json!({"nodeId": 7, "type": "node-removed"})
		);
	}

	#[test]
	fn test_event_listener_decodes() {
		let listener: EventListener = serde_json::from_value(json!({
			"type": "click",
			"useCapture": false,
			"passive": true,
			"once": false,
			"scriptId": "17",
			"lineNumber": 3,
			"columnNumber": 14,
			"handler": {"type": "function", "className": "Function", "objectId": "1.2.3"},
			"backendNodeId": 9
		}))
		.unwrap();

		assert_eq!(listener.kind, "click");
		assert!(listener.passive);
		assert!(listener.handler.as_ref().is_some_and(RemoteObject::is_function));
		assert!(listener.original_handler.is_none());
		assert_eq!(listener.backend_node_id, Some(9));
	}

	#[test]
	fn test_event_listener_missing_fields_default() {
		let listener: EventListener = serde_json::from_value(json!({"type": "scroll"})).unwrap();

		assert_eq!(listener.kind, "scroll");
		assert!(!listener.use_capture);
		assert!(!listener.passive);
		assert!(!listener.once);
		assert_eq!(listener.script_id, "");
		assert_eq!(listener.line_number, 0);
		assert_eq!(listener.column_number, 0);
		assert!(listener.handler.is_none());
	}

	#[test]
	fn test_missing_listeners_is_empty() {
		let result: GetEventListenersResult = serde_json::from_value(json!({})).unwrap();
		assert!(result.listeners.is_empty());
	}
}
