use std::path::Component;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// One resolved data file, keyed by its path segments.
///
/// `data/nav/main.json` becomes the key `["nav", "main"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataEntry {
	pub key: Vec<String>,
	pub value: Value,
}

impl DataEntry {
	pub fn new<I, S>(key: I, value: Value) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			key: key.into_iter().map(Into::into).collect(),
			value,
		}
	}

	/// Derive the key from a path relative to the data directory. Only the
	/// final extension is stripped, so `a/b.c.json` becomes `["a", "b.c"]`.
	pub fn from_relative_path(path: &Path, value: Value) -> Self {
		let stem = path.with_extension("");
		let key = stem
			.components()
			.filter_map(|component| {
				match component {
					Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
					_ => None,
				}
			})
			.collect();

		Self { key, value }
	}
}

/// Mutable accumulator for the global namespace. Call
/// [`NamespaceBuilder::finish`] to freeze it.
#[derive(Debug, Default)]
pub struct NamespaceBuilder {
	root: Map<String, Value>,
}

impl NamespaceBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Assign `value` at the nested path given by `key`.
	///
	/// Missing intermediate segments are created as empty mappings. A
	/// non-mapping value standing where a mapping is needed is replaced by an
	/// empty mapping. Whatever sits at the exact path is overwritten. An empty
	/// key is ignored.
	pub fn insert<S: AsRef<str>>(&mut self, key: &[S], value: Value) {
		let Some((last, parents)) = key.split_last() else {
			return;
		};

		let mut node = &mut self.root;
		for segment in parents {
			let slot = node
				.entry(segment.as_ref().to_string())
				.or_insert_with(|| Value::Object(Map::new()));
			if !slot.is_object() {
				*slot = Value::Object(Map::new());
			}
			let Some(child) = slot.as_object_mut() else {
				return;
			};
			node = child;
		}

		node.insert(last.as_ref().to_string(), value);
	}

	pub fn push(&mut self, entry: DataEntry) {
		self.insert(&entry.key, entry.value);
	}

	pub fn finish(self) -> GlobalNamespace {
		GlobalNamespace::from_map(self.root)
	}
}

impl Extend<DataEntry> for NamespaceBuilder {
	fn extend<T: IntoIterator<Item = DataEntry>>(&mut self, iter: T) {
		for entry in iter {
			self.push(entry);
		}
	}
}

/// Build a namespace from entries in the order given. Later entries win when
/// two entries share a path.
pub fn build_namespace<I>(entries: I) -> GlobalNamespace
where
	I: IntoIterator<Item = DataEntry>,
{
	let mut builder = NamespaceBuilder::new();
	builder.extend(entries);
	builder.finish()
}

/// The frozen global data namespace.
///
/// Cloning is cheap: the tree and its template view are shared behind
/// reference counts, so every render reads the same instance.
#[derive(Debug, Clone)]
pub struct GlobalNamespace {
	tree: Arc<Value>,
	template_value: minijinja::Value,
}

impl GlobalNamespace {
	fn from_map(root: Map<String, Value>) -> Self {
		let tree = Value::Object(root);
		let template_value = minijinja::Value::from_serialize(&tree);

		Self {
			tree: Arc::new(tree),
			template_value,
		}
	}

	pub fn empty() -> Self {
		Self::from_map(Map::new())
	}

	/// Walk `path` through nested mappings.
	pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
		path.iter()
			.try_fold(self.tree.as_ref(), |node, segment| node.get(segment.as_ref()))
	}

	/// The whole tree as a JSON object.
	pub fn as_json(&self) -> &Value {
		&self.tree
	}

	/// Top-level keys in sorted order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.tree
			.as_object()
			.into_iter()
			.flat_map(|map| map.keys().map(String::as_str))
	}

	pub fn len(&self) -> usize {
		self.tree.as_object().map_or(0, Map::len)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// The namespace converted once for the template engine.
	pub fn template_value(&self) -> minijinja::Value {
		self.template_value.clone()
	}
}

impl Default for GlobalNamespace {
	fn default() -> Self {
		Self::empty()
	}
}

impl PartialEq for GlobalNamespace {
	fn eq(&self, other: &Self) -> bool {
		self.tree == other.tree
	}
}

impl Serialize for GlobalNamespace {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.tree.serialize(serializer)
	}
}
