use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::StitchError;
use crate::StitchResult;
use crate::source::DataFormat;

/// Supported config file locations in discovery order (highest precedence
/// first). Only consulted when no config path is given explicitly.
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["stitch.toml", ".stitch.toml", ".config/stitch.toml"];

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";
pub const DEFAULT_CONTENT_DIR: &str = "content";
pub const DEFAULT_OUT_DIR: &str = "dist";

/// Fully resolved build configuration.
///
/// ```toml
/// datadir = "data"
/// templatesdir = "templates"
/// contentdir = "content"
/// outdir = "dist"
/// autoescape = true
/// strict_undefined = false
/// exclude = ["drafts/", "*.bak.md"]
///
/// [data]
/// site = { title = "Inline title" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchConfig {
	/// Directory holding data files for the global namespace.
	pub datadir: PathBuf,
	/// Root used to resolve `include`, `extends`, and `import` names.
	pub templatesdir: PathBuf,
	/// Directory holding the content files to render.
	pub contentdir: PathBuf,
	/// Reserved for rendered output. Nothing is written there yet.
	pub outdir: PathBuf,
	/// HTML-escape every expression output.
	pub autoescape: bool,
	/// Treat undefined variables as render errors instead of empty values.
	pub strict_undefined: bool,
	/// Gitignore-style patterns excluded from data and content discovery.
	pub exclude: Vec<String>,
	/// Inline global data. Data files at the same path take precedence.
	pub data: Map<String, Value>,
}

impl Default for StitchConfig {
	fn default() -> Self {
		Self {
			datadir: PathBuf::from(DEFAULT_DATA_DIR),
			templatesdir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
			contentdir: PathBuf::from(DEFAULT_CONTENT_DIR),
			outdir: PathBuf::from(DEFAULT_OUT_DIR),
			autoescape: true,
			strict_undefined: false,
			exclude: Vec::new(),
			data: Map::new(),
		}
	}
}

/// A partial configuration. Every field left as `None` keeps the value it
/// is applied over. Used both for command line flags and for user config
/// files.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigOverrides {
	#[serde(default)]
	pub datadir: Option<PathBuf>,
	#[serde(default)]
	pub templatesdir: Option<PathBuf>,
	#[serde(default)]
	pub contentdir: Option<PathBuf>,
	#[serde(default)]
	pub outdir: Option<PathBuf>,
	#[serde(default)]
	pub autoescape: Option<bool>,
	#[serde(default)]
	pub strict_undefined: Option<bool>,
	#[serde(default)]
	pub exclude: Option<Vec<String>>,
	#[serde(default)]
	pub data: Option<Map<String, Value>>,
}

impl ConfigOverrides {
	/// Load overrides from a user config file.
	///
	/// The format follows the extension: `.toml`, `.json`, `.yaml`/`.yml`, or
	/// `.sh`. A `.sh` config is deferred: it runs with `sh` from the file's
	/// directory and its standard output is parsed as JSON.
	pub fn load(path: &Path) -> StitchResult<Self> {
		let display = path.display().to_string();
		let config_error = |reason: String| {
			StitchError::ConfigLoad {
				path: display.clone(),
				reason,
			}
		};

		let format = DataFormat::from_path(path)
			.ok_or_else(|| config_error("unrecognized config file extension".to_string()))?;
		let dir = match path.parent() {
			Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
			_ => PathBuf::from("."),
		};
		let file_name = path
			.file_name()
			.map(PathBuf::from)
			.ok_or_else(|| config_error("config path has no file name".to_string()))?;

		let value = format
			.load(&dir, &file_name)
			.and_then(crate::DataSource::resolve)
			.map_err(|e| config_error(e.to_string()))?;

		if value.is_null() {
			return Ok(Self::default());
		}

		serde_json::from_value(value).map_err(|e| config_error(e.to_string()))
	}

	/// Load the first discovered config candidate under `root`. Returns
	/// `None` when there is none.
	pub fn discover(root: &Path) -> StitchResult<Option<Self>> {
		let Some(path) = StitchConfig::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %path.display(), "discovered config file");
		Self::load(&path).map(Some)
	}
}

impl StitchConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Layer `overrides` on top of this config. Set fields replace the
	/// current value wholesale, the `data` table included.
	pub fn apply(&mut self, overrides: ConfigOverrides) {
		let ConfigOverrides {
			datadir,
			templatesdir,
			contentdir,
			outdir,
			autoescape,
			strict_undefined,
			exclude,
			data,
		} = overrides;

		if let Some(datadir) = datadir {
			self.datadir = datadir;
		}
		if let Some(templatesdir) = templatesdir {
			self.templatesdir = templatesdir;
		}
		if let Some(contentdir) = contentdir {
			self.contentdir = contentdir;
		}
		if let Some(outdir) = outdir {
			self.outdir = outdir;
		}
		if let Some(autoescape) = autoescape {
			self.autoescape = autoescape;
		}
		if let Some(strict_undefined) = strict_undefined {
			self.strict_undefined = strict_undefined;
		}
		if let Some(exclude) = exclude {
			self.exclude = exclude;
		}
		if let Some(data) = data {
			self.data = data;
		}
	}

	/// Resolve the final config: defaults, then command line flags, then the
	/// user config file (explicit `config_path`, or a discovered candidate
	/// under `root`). The user file is applied last and wins over flags.
	pub fn resolve(
		root: &Path,
		flags: ConfigOverrides,
		config_path: Option<&Path>,
	) -> StitchResult<Self> {
		let mut config = Self::default();
		config.apply(flags);

		let user = match config_path {
			Some(path) => Some(ConfigOverrides::load(&root.join(path))?),
			None => ConfigOverrides::discover(root)?,
		};

		if let Some(user) = user {
			config.apply(user);
		}

		Ok(config)
	}

	pub fn data_dir(&self, root: &Path) -> PathBuf {
		root.join(&self.datadir)
	}

	pub fn templates_dir(&self, root: &Path) -> PathBuf {
		root.join(&self.templatesdir)
	}

	pub fn content_dir(&self, root: &Path) -> PathBuf {
		root.join(&self.contentdir)
	}

	pub fn out_dir(&self, root: &Path) -> PathBuf {
		root.join(&self.outdir)
	}
}
