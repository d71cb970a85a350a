use serde_json::Map;
use serde_json::Value;

use crate::StitchError;
use crate::StitchResult;

/// Minimum number of `-` characters in a delimiter line.
pub const MIN_DELIMITER_LEN: usize = 3;

/// The metadata block and the body of a content file.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter<'a> {
	/// Parsed metadata. Empty when the file has no front matter.
	pub data: Map<String, Value>,
	/// Everything after the closing delimiter line, or the whole input when
	/// there is no front matter.
	pub body: &'a str,
	present: bool,
}

impl<'a> FrontMatter<'a> {
	fn absent(text: &'a str) -> Self {
		Self {
			data: Map::new(),
			body: text,
			present: false,
		}
	}

	/// Whether a delimited block was found (it may still be empty).
	pub fn is_present(&self) -> bool {
		self.present
	}
}

/// The raw pieces of a file with a valid delimiter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatterParts<'a> {
	/// Text between the two delimiter lines, unparsed.
	pub raw: &'a str,
	/// Text after the closing delimiter line.
	pub body: &'a str,
}

/// A line is a delimiter when it holds nothing but three or more `-`. The
/// line terminator, including a trailing `\r`, is not part of the line.
pub fn is_delimiter_line(line: &str) -> bool {
	let line = line.strip_suffix('\n').unwrap_or(line);
	let line = line.strip_suffix('\r').unwrap_or(line);
	line.len() >= MIN_DELIMITER_LEN && line.bytes().all(|b| b == b'-')
}

/// Locate the front matter block without parsing it.
///
/// The first delimiter line must be preceded only by blank text, and a second
/// delimiter line must follow it. When either condition fails there is no
/// front matter and `None` is returned.
pub fn split_front_matter(text: &str) -> Option<FrontMatterParts<'_>> {
	let mut offset = 0;
	let mut lines = text.split_inclusive('\n');

	// Opening delimiter, with only blank text before it.
	let raw_start = loop {
		let line = lines.next()?;
		offset += line.len();
		if is_delimiter_line(line) {
			break offset;
		}
		if !line.trim().is_empty() {
			return None;
		}
	};

	// Closing delimiter.
	loop {
		let line = lines.next()?;
		let line_start = offset;
		offset += line.len();
		if is_delimiter_line(line) {
			return Some(FrontMatterParts {
				raw: &text[raw_start..line_start],
				body: &text[offset..],
			});
		}
	}
}

/// Separate and parse the front matter of `text`.
///
/// Files without a valid delimiter pair come back unchanged as the body with
/// empty metadata. A block that is present but is not a YAML mapping is a
/// [`StitchError::FrontMatterParse`].
pub fn extract(text: &str) -> StitchResult<FrontMatter<'_>> {
	let Some(parts) = split_front_matter(text) else {
		return Ok(FrontMatter::absent(text));
	};

	Ok(FrontMatter {
		data: parse_mapping(parts.raw)?,
		body: parts.body,
		present: true,
	})
}

fn parse_mapping(raw: &str) -> StitchResult<Map<String, Value>> {
	if raw.trim().is_empty() {
		return Ok(Map::new());
	}

	let value: Value =
		serde_yaml_ng::from_str(raw).map_err(|e| StitchError::FrontMatterParse(e.to_string()))?;

	match value {
		Value::Object(map) => Ok(map),
		Value::Null => Ok(Map::new()),
		other => {
			Err(StitchError::FrontMatterParse(format!(
				"expected a mapping, found {}",
				value_kind(&other)
			)))
		}
	}
}

fn value_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "a sequence",
		Value::Object(_) => "a mapping",
	}
}
