use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::namespace::GlobalNamespace;

/// Variables visible to one page's template: its own front matter as `page`
/// and the shared global namespace as `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderContext {
	pub page: Map<String, Value>,
	pub data: GlobalNamespace,
}

impl RenderContext {
	/// Pair a page's front matter with the shared namespace. The namespace is
	/// shared by reference, never copied.
	pub fn compose(front_matter: Map<String, Value>, namespace: &GlobalNamespace) -> Self {
		Self {
			page: front_matter,
			data: namespace.clone(),
		}
	}

	/// Convert into the value passed to the template engine.
	pub fn to_template_value(&self) -> minijinja::Value {
		minijinja::context! {
			page => minijinja::Value::from_serialize(&self.page),
			data => self.data.template_value(),
		}
	}
}
