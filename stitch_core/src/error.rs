use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum StitchError {
	#[error(transparent)]
	#[diagnostic(code(stitch::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to load config file `{path}`: {reason}")]
	#[diagnostic(
		code(stitch::config_load),
		help("config files may be .toml, .json, .yaml, .yml, or an executable .sh printing JSON")
	)]
	ConfigLoad { path: String, reason: String },

	#[error("failed to load data file `{path}`: {reason}")]
	#[diagnostic(code(stitch::data_file))]
	DataFile { path: String, reason: String },

	#[error("failed to execute data script `{path}`: {reason}")]
	#[diagnostic(
		code(stitch::data_script),
		help("data scripts run with `sh` inside the data directory and must print JSON to stdout")
	)]
	DataScript { path: String, reason: String },

	#[error("unsupported data file format: `{0}`")]
	#[diagnostic(
		code(stitch::unsupported_format),
		help("supported formats: json, yaml, yml, toml, sh")
	)]
	UnsupportedDataFormat(String),

	#[error("unconvertible float value in data file `{path}`: {value}")]
	#[diagnostic(
		code(stitch::unconvertible_float),
		help("NaN and Infinity are not valid JSON numbers")
	)]
	UnconvertibleFloat { path: String, value: String },

	#[error("invalid front matter: {0}")]
	#[diagnostic(
		code(stitch::front_matter),
		help("front matter between the `---` lines must be a YAML mapping")
	)]
	FrontMatterParse(String),

	#[error("template rendering failed: {0}")]
	#[diagnostic(code(stitch::template_render))]
	TemplateRender(String),

	#[error("invalid exclude pattern `{pattern}`: {reason}")]
	#[diagnostic(
		code(stitch::invalid_pattern),
		help("exclude patterns follow .gitignore syntax")
	)]
	InvalidPattern { pattern: String, reason: String },

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(stitch::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },

	#[error("render task failed: {0}")]
	#[diagnostic(code(stitch::task_failed))]
	TaskFailed(String),
}

pub type StitchResult<T> = Result<T, StitchError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
