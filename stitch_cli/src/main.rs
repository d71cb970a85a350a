use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use stitch_cli::OutputFormat;
use stitch_cli::StitchCli;
use stitch_cli::init_tracing;
use stitch_core::BuildReport;
use stitch_core::Site;
use stitch_core::StitchConfig;
use stitch_core::StitchError;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply an `owo_colors` style only when color is enabled.
macro_rules! colored {
	($text:expr, $style:ident) => {
		if color_enabled() {
			format!("{}", $text.$style())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = StitchCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	match run(&args) {
		Ok(report) => {
			print_report(&report, args.format);
			if !report.is_ok() {
				process::exit(1);
			}
		}
		Err(e) => {
			let report: miette::Report = e.into();
			eprintln!("{report:?}");
			process::exit(2);
		}
	}
}

fn resolve_root() -> PathBuf {
	std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn run(args: &StitchCli) -> Result<BuildReport, StitchError> {
	let root = resolve_root();
	let config = StitchConfig::resolve(&root, args.overrides(), args.config.as_deref())?;
	tracing::debug!(?config, "resolved config");

	let runtime = tokio::runtime::Builder::new_current_thread()
		.enable_all()
		.build()?;

	runtime.block_on(async {
		let site = Site::new(root, config);
		let renders = site.spawn_renders().await?;

		// Ctrl-C cancels whatever has not rendered yet.
		let token = renders.cancellation_token();
		tokio::spawn(async move {
			if tokio::signal::ctrl_c().await.is_ok() {
				token.cancel();
			}
		});

		Ok::<_, StitchError>(renders.join().await)
	})
}

fn print_report(report: &BuildReport, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			let pages: Vec<serde_json::Value> = report
				.pages
				.iter()
				.map(|page| {
					serde_json::json!({
						"path": page.path,
						"bytes": page.output.len(),
					})
				})
				.collect();
			let failures: Vec<serde_json::Value> = report
				.failures
				.iter()
				.map(|failure| {
					serde_json::json!({
						"path": failure.path,
						"message": failure.error.to_string(),
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": report.is_ok(),
				"rendered": pages,
				"failures": failures,
				"cancelled": report.cancelled,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			for page in &report.pages {
				println!(
					"{} {} ({} bytes)",
					colored!("rendered", green),
					page.path.display(),
					page.output.len()
				);
			}
			for path in &report.cancelled {
				println!("{} {}", colored!("cancelled", yellow), path.display());
			}
			for failure in &report.failures {
				eprintln!(
					"{} {}: {}",
					colored!("failed", red),
					failure.path.display(),
					failure.error
				);
			}

			let summary = format!(
				"Rendered {} of {} content file(s).",
				report.success_count(),
				report.total()
			);
			if report.is_ok() {
				println!("{}", colored!(summary, bold));
			} else {
				println!(
					"{} {} failed, {} cancelled.",
					colored!(summary, bold),
					report.failures.len(),
					report.cancelled.len()
				);
			}
		}
	}
}
