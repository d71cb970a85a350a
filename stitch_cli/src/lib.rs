use std::path::PathBuf;

use clap::ArgAction;
use clap::Parser;
use clap::ValueEnum;
use stitch_core::ConfigOverrides;

#[derive(Debug, Parser)]
#[command(
	name = "stitch",
	author,
	version,
	about = "Render front-matter content files against a shared data namespace.",
	long_about = "stitch merges every data file under the data directory into one global \
	              namespace, then renders each content file as a template with its own front \
	              matter bound as `page` and the namespace bound as `data`.\n\nConfiguration \
	              comes from built-in defaults, then command line flags, then a user config file \
	              (`stitch.toml`, `.stitch.toml`, `.config/stitch.toml`, or `--config`). Values \
	              from the config file win."
)]
pub struct StitchCli {
	/// Path to a config file (`.toml`, `.json`, `.yaml`, `.yml`, or an `.sh`
	/// script printing JSON). Relative to the working directory.
	#[arg(long, short)]
	pub config: Option<PathBuf>,

	/// Directory holding data files for the global namespace.
	#[arg(long, value_name = "DIR")]
	pub datadir: Option<PathBuf>,

	/// Directory used to resolve `include`, `extends`, and `import`.
	#[arg(long, value_name = "DIR")]
	pub templatesdir: Option<PathBuf>,

	/// Directory holding the content files to render.
	#[arg(long, value_name = "DIR")]
	pub contentdir: Option<PathBuf>,

	/// Output directory. Reserved, nothing is written yet.
	#[arg(long, value_name = "DIR")]
	pub outdir: Option<PathBuf>,

	/// Increase log verbosity. Repeat for more detail (`-vv`, `-vvv`).
	#[arg(long, short, action = ArgAction::Count)]
	pub verbose: u8,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,

	/// Output format for the build report. Use `text` for a human-readable
	/// summary or `json` for programmatic consumption.
	#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,
}

impl StitchCli {
	/// The directory flags as config overrides. Flags that were not passed
	/// stay unset.
	pub fn overrides(&self) -> ConfigOverrides {
		ConfigOverrides {
			datadir: self.datadir.clone(),
			templatesdir: self.templatesdir.clone(),
			contentdir: self.contentdir.clone(),
			outdir: self.outdir.clone(),
			..ConfigOverrides::default()
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// A single JSON object with the rendered pages, failures, and cancelled
	/// items.
	Json,
}

/// Initialize tracing on stderr with the specified verbosity level.
///
/// `verbose` maps 0 to WARN, 1 to INFO, 2 to DEBUG, and anything higher to
/// TRACE. Directives from `RUST_LOG` are still honoured.
pub fn init_tracing(verbose: u8, use_color: bool) {
	use tracing_subscriber::layer::SubscriberExt;
	use tracing_subscriber::util::SubscriberInitExt;

	let level = match verbose {
		0 => tracing::Level::WARN,
		1 => tracing::Level::INFO,
		2 => tracing::Level::DEBUG,
		_ => tracing::Level::TRACE,
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::fmt::layer()
				.with_writer(std::io::stderr)
				.with_ansi(use_color),
		)
		.with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
		.init();
}
