//! `Runtime` domain value types referenced by other domains.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unique object identifier, valid for the lifetime of its execution context.
pub type RemoteObjectId = String;

/// Unique script identifier.
pub type ScriptId = String;

/// Mirror object referencing the original JavaScript object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
	/// Object type: `object`, `function`, `undefined`, `string`, `number`, ...
	#[serde(rename = "type")]
	pub kind: String,
	/// Object subtype hint, specified for `object` type values only.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subtype: Option<String>,
	/// Object class (constructor) name, specified for `object` type values only.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub class_name: Option<String>,
	/// Remote object value in case of primitive values or JSON values.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
	/// Primitive value which can not be JSON-stringified, such as `NaN` or `-0`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub unserializable_value: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Present for non-primitive values.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub object_id: Option<RemoteObjectId>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub preview: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub custom_preview: Option<Value>,
}

impl RemoteObject {
	pub fn is_function(&self) -> bool {
		self.kind == "function"
	}
}
