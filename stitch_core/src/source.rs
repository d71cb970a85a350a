use std::fmt;
use std::io;
use std::path::Path;
use std::process::Command;

use serde_json::Value;

use crate::StitchError;
use crate::StitchResult;

/// A zero-argument producer for a value that is only known once it runs.
pub type Producer = Box<dyn FnOnce() -> StitchResult<Value> + Send + 'static>;

/// Where a data value comes from.
///
/// Data files and config files either hold their value directly or hand over
/// a producer which is invoked once, at load time, to obtain it. Nothing is
/// cached between runs.
pub enum DataSource {
	/// A value that was parsed straight from the file.
	Static(Value),
	/// A value produced by invoking the producer with no arguments.
	Deferred(Producer),
}

impl DataSource {
	/// Wrap a closure as a deferred source.
	pub fn deferred<F>(producer: F) -> Self
	where
		F: FnOnce() -> StitchResult<Value> + Send + 'static,
	{
		Self::Deferred(Box::new(producer))
	}

	/// Returns true when the value still needs to be produced.
	pub fn is_deferred(&self) -> bool {
		matches!(self, Self::Deferred(_))
	}

	/// Turn the source into its value, invoking the producer if necessary.
	pub fn resolve(self) -> StitchResult<Value> {
		match self {
			Self::Static(value) => Ok(value),
			Self::Deferred(producer) => producer(),
		}
	}
}

impl fmt::Debug for DataSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
			Self::Deferred(_) => f.write_str("Deferred(..)"),
		}
	}
}

impl From<Value> for DataSource {
	fn from(value: Value) -> Self {
		Self::Static(value)
	}
}

/// File formats understood for data and config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
	Json,
	Yaml,
	Toml,
	/// A shell script whose standard output is a JSON document.
	Script,
}

impl DataFormat {
	/// Pick the format from a lowercase or mixed-case file extension.
	pub fn from_extension(extension: &str) -> Option<Self> {
		match extension.to_ascii_lowercase().as_str() {
			"json" => Some(Self::Json),
			"yaml" | "yml" => Some(Self::Yaml),
			"toml" => Some(Self::Toml),
			"sh" => Some(Self::Script),
			_ => None,
		}
	}

	/// Pick the format from a path's extension.
	pub fn from_path(path: &Path) -> Option<Self> {
		path.extension()
			.and_then(|extension| extension.to_str())
			.and_then(Self::from_extension)
	}

	/// Build the [`DataSource`] for a file of this format.
	///
	/// `dir` is the directory the file lives in and the working directory
	/// used for scripts. `relative` is the file path relative to `dir`.
	/// Structured formats are read and parsed immediately, scripts become a
	/// deferred source.
	pub fn load(self, dir: &Path, relative: &Path) -> StitchResult<DataSource> {
		let display = relative.display().to_string();

		if self == Self::Script {
			let dir = dir.to_path_buf();
			let relative = relative.to_path_buf();
			return Ok(DataSource::deferred(move || run_script(&dir, &relative)));
		}

		let content =
			std::fs::read_to_string(dir.join(relative)).map_err(|e| StitchError::DataFile {
				path: display.clone(),
				reason: e.to_string(),
			})?;

		self.parse(&content, &display).map(DataSource::Static)
	}

	/// Parse already-read file content.
	pub fn parse(self, content: &str, path_display: &str) -> StitchResult<Value> {
		match self {
			Self::Json | Self::Script => {
				serde_json::from_str(content).map_err(|e| {
					StitchError::DataFile {
						path: path_display.to_string(),
						reason: e.to_string(),
					}
				})
			}
			Self::Yaml => {
				serde_yaml_ng::from_str(content).map_err(|e| {
					StitchError::DataFile {
						path: path_display.to_string(),
						reason: e.to_string(),
					}
				})
			}
			Self::Toml => {
				let toml_value: toml::Value = toml::from_str(content).map_err(|e| {
					StitchError::DataFile {
						path: path_display.to_string(),
						reason: e.to_string(),
					}
				})?;
				toml_to_json(toml_value, path_display)
			}
		}
	}
}

/// Interpreter for `.sh` data and config scripts. Scripts are POSIX shell on
/// every platform, so Windows needs an `sh` on `PATH` (Git Bash, MSYS2).
pub(crate) const SCRIPT_SHELL: &str = "sh";

/// Run a data script with `sh` from inside `dir` and parse its standard output
/// as JSON.
fn run_script(dir: &Path, relative: &Path) -> StitchResult<Value> {
	let display = relative.display().to_string();
	let stdout = execute_script(SCRIPT_SHELL, dir, relative)?;

	serde_json::from_str(&stdout).map_err(|e| {
		StitchError::DataScript {
			path: display,
			reason: format!("stdout is not valid JSON: {e}"),
		}
	})
}

pub(crate) fn execute_script(shell: &str, dir: &Path, relative: &Path) -> StitchResult<String> {
	let output = Command::new(shell)
		.arg(relative)
		.current_dir(dir)
		.output()
		.map_err(|e| {
			let reason = if e.kind() == io::ErrorKind::NotFound {
				format!("`{shell}` was not found on PATH; `.sh` scripts need a POSIX shell")
			} else {
				e.to_string()
			};
			StitchError::DataScript {
				path: relative.display().to_string(),
				reason,
			}
		})?;

	if !output.status.success() {
		let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
		let reason = if stderr.is_empty() {
			format!(
				"script exited with status {}",
				output
					.status
					.code()
					.map_or_else(|| "unknown".to_string(), |code| code.to_string())
			)
		} else {
			stderr
		};

		return Err(StitchError::DataScript {
			path: relative.display().to_string(),
			reason,
		});
	}

	Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Convert a `toml::Value` to a `serde_json::Value`.
fn toml_to_json(value: toml::Value, path_display: &str) -> StitchResult<Value> {
	let json = match value {
		toml::Value::String(s) => Value::String(s),
		toml::Value::Integer(i) => Value::Number(i.into()),
		toml::Value::Float(f) => {
			Value::Number(serde_json::Number::from_f64(f).ok_or_else(|| {
				StitchError::UnconvertibleFloat {
					path: path_display.to_string(),
					value: f.to_string(),
				}
			})?)
		}
		toml::Value::Boolean(b) => Value::Bool(b),
		toml::Value::Datetime(dt) => Value::String(dt.to_string()),
		toml::Value::Array(arr) => {
			let items: StitchResult<Vec<Value>> = arr
				.into_iter()
				.map(|v| toml_to_json(v, path_display))
				.collect();
			Value::Array(items?)
		}
		toml::Value::Table(table) => {
			let mut map = serde_json::Map::new();
			for (k, v) in table {
				map.insert(k, toml_to_json(v, path_display)?);
			}
			Value::Object(map)
		}
	};

	Ok(json)
}
