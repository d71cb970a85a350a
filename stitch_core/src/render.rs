use std::cmp::Ordering;
use std::fmt::Write;
use std::path::PathBuf;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::format::Item;
use chrono::format::StrftimeItems;
use minijinja::AutoEscape;
use minijinja::Environment;
use minijinja::Error;
use minijinja::ErrorKind;
use minijinja::UndefinedBehavior;
use minijinja::Value;
use minijinja::value::Kwargs;

use crate::StitchConfig;
use crate::StitchError;
use crate::StitchResult;
use crate::context::RenderContext;

/// Engine behaviour shared by every page of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
	/// HTML-escape expression output.
	pub autoescape: bool,
	/// Fail on undefined variables instead of rendering them as empty.
	pub strict_undefined: bool,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self {
			autoescape: true,
			strict_undefined: false,
		}
	}
}

impl From<&StitchConfig> for RenderOptions {
	fn from(config: &StitchConfig) -> Self {
		Self {
			autoescape: config.autoescape,
			strict_undefined: config.strict_undefined,
		}
	}
}

/// A configured template environment. Page bodies are compiled as inline
/// templates; `include`, `extends`, and `import` resolve against the
/// templates directory.
#[derive(Debug)]
pub struct Renderer {
	env: Environment<'static>,
}

impl Renderer {
	/// Renderer resolving named templates from `templates_dir`.
	pub fn new(templates_dir: PathBuf, options: RenderOptions) -> Self {
		let mut env = Self::base_environment(options);
		env.set_loader(minijinja::path_loader(templates_dir));
		Self { env }
	}

	/// Renderer without a template root. Only self-contained bodies render.
	pub fn inline(options: RenderOptions) -> Self {
		Self {
			env: Self::base_environment(options),
		}
	}

	fn base_environment(options: RenderOptions) -> Environment<'static> {
		let mut env = Environment::new();
		env.set_keep_trailing_newline(true);
		env.set_undefined_behavior(if options.strict_undefined {
			UndefinedBehavior::Strict
		} else {
			UndefinedBehavior::Chainable
		});

		let escape = if options.autoescape {
			AutoEscape::Html
		} else {
			AutoEscape::None
		};
		env.set_auto_escape_callback(move |_name| escape.clone());
		env.add_filter("sort_by", sort_by);
		env.add_filter("format_date", format_date);
		env
	}

	/// Render `body` as a template named `name` with `context` bound.
	pub fn render(&self, name: &str, body: &str, context: &RenderContext) -> StitchResult<String> {
		self.env
			.render_named_str(name, body, context.to_template_value())
			.map_err(|e| StitchError::TemplateRender(e.to_string()))
	}
}

/// `items|sort_by("attr.path", reverse=true)` sorts a sequence by a (dotted)
/// attribute of each item.
fn sort_by(value: Value, attribute: &str, kwargs: Kwargs) -> Result<Value, Error> {
	let reverse = kwargs.get::<Option<bool>>("reverse")?.unwrap_or(false);
	kwargs.assert_all_used()?;

	let mut items: Vec<(Value, Value)> = value
		.try_iter()?
		.map(|item| {
			let key = lookup_path(&item, attribute)?;
			Ok((key, item))
		})
		.collect::<Result<_, Error>>()?;

	items.sort_by(|(a, _), (b, _)| {
		let ordering = a.partial_cmp(b).unwrap_or(Ordering::Equal);
		if reverse { ordering.reverse() } else { ordering }
	});

	Ok(Value::from(
		items.into_iter().map(|(_, item)| item).collect::<Vec<_>>(),
	))
}

fn lookup_path(item: &Value, path: &str) -> Result<Value, Error> {
	if path.is_empty() {
		return Err(Error::new(
			ErrorKind::InvalidOperation,
			"sort_by requires a non-empty attribute",
		));
	}

	path.split('.')
		.try_fold(item.clone(), |node, segment| node.get_attr(segment))
}

/// `value|format_date("%B %-d, %Y")` formats an RFC 3339 timestamp or a
/// `YYYY-MM-DD` date with a strftime pattern. Timestamps keep their own offset.
fn format_date(value: &Value, format: &str) -> Result<String, Error> {
	let Some(text) = value.as_str() else {
		return Err(Error::new(
			ErrorKind::InvalidOperation,
			format!("format_date expects a date string, got {}", value.kind()),
		));
	};

	let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
	if items.iter().any(|item| matches!(item, Item::Error)) {
		return Err(Error::new(
			ErrorKind::InvalidOperation,
			format!("invalid date format `{format}`"),
		));
	}

	let mut output = String::new();
	let written = if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
		write!(output, "{}", datetime.format_with_items(items.iter()))
	} else if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
		write!(output, "{}", date.format_with_items(items.iter()))
	} else {
		return Err(Error::new(
			ErrorKind::InvalidOperation,
			format!("`{text}` is not an RFC 3339 timestamp or a YYYY-MM-DD date"),
		));
	};

	// A plain date has no time fields to fill `%H` and friends.
	written.map_err(|_| {
		Error::new(
			ErrorKind::InvalidOperation,
			format!("date format `{format}` cannot be applied to `{text}`"),
		)
	})?;

	Ok(output)
}
