use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::StitchConfig;
use crate::StitchError;
use crate::StitchResult;
use crate::context::RenderContext;
use crate::data::load_namespace;
use crate::discover::CONTENT_FILE_PATTERNS;
use crate::discover::DiscoverOptions;
use crate::discover::discover_files;
use crate::front_matter;
use crate::namespace::GlobalNamespace;
use crate::render::RenderOptions;
use crate::render::Renderer;

/// One discovered content file and its raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
	/// Path relative to the content directory.
	pub path: PathBuf,
	pub text: String,
}

impl ContentItem {
	pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			text: text.into(),
		}
	}

	/// Template name used in error messages, with `/` separators.
	pub fn name(&self) -> String {
		self.path.to_string_lossy().replace('\\', "/")
	}

	/// Split off the front matter, compose the context, and render the body.
	pub fn render(&self, renderer: &Renderer, namespace: &GlobalNamespace) -> StitchResult<String> {
		let front_matter = front_matter::extract(&self.text)?;
		let context = RenderContext::compose(front_matter.data, namespace);
		renderer.render(&self.name(), front_matter.body, &context)
	}
}

/// The rendered output of one content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
	/// Path relative to the content directory.
	pub path: PathBuf,
	pub output: String,
}

/// A content item that failed to render.
#[derive(Debug)]
pub struct PageError {
	/// Path relative to the content directory.
	pub path: PathBuf,
	pub error: StitchError,
}

impl fmt::Display for PageError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.path.display(), self.error)
	}
}

/// Everything a render run produced. Each list is sorted by path.
#[derive(Debug, Default)]
pub struct BuildReport {
	pub pages: Vec<RenderedPage>,
	pub failures: Vec<PageError>,
	pub cancelled: Vec<PathBuf>,
}

impl BuildReport {
	/// Returns true when every item rendered.
	pub fn is_ok(&self) -> bool {
		self.failures.is_empty() && self.cancelled.is_empty()
	}

	pub fn has_failures(&self) -> bool {
		!self.failures.is_empty()
	}

	pub fn success_count(&self) -> usize {
		self.pages.len()
	}

	/// Total number of items that were dispatched.
	pub fn total(&self) -> usize {
		self.pages.len() + self.failures.len() + self.cancelled.len()
	}

	pub fn page(&self, path: impl AsRef<Path>) -> Option<&RenderedPage> {
		let path = path.as_ref();
		self.pages.iter().find(|page| page.path == path)
	}

	fn sort(&mut self) {
		self.pages.sort_by(|a, b| a.path.cmp(&b.path));
		self.failures.sort_by(|a, b| a.path.cmp(&b.path));
		self.cancelled.sort();
	}
}

enum Outcome {
	Rendered(String),
	Failed(StitchError),
	Cancelled,
}

/// A set of in-flight page renders, one task per content item.
///
/// Every task carries its own cancellation token, a child of the set's token,
/// so one item can be cancelled without touching the others. Tasks share only
/// the immutable renderer and namespace.
pub struct RenderSet {
	tasks: JoinSet<(PathBuf, Outcome)>,
	tokens: HashMap<PathBuf, CancellationToken>,
	cancel_all: CancellationToken,
}

impl RenderSet {
	/// Spawn one render task per path (relative to `content_dir`). Must be
	/// called from within a tokio runtime.
	pub fn spawn(
		renderer: Arc<Renderer>,
		namespace: &GlobalNamespace,
		content_dir: &Path,
		paths: Vec<PathBuf>,
	) -> Self {
		let cancel_all = CancellationToken::new();
		let mut tasks = JoinSet::new();
		let mut tokens = HashMap::with_capacity(paths.len());

		for path in paths {
			let token = cancel_all.child_token();
			tokens.insert(path.clone(), token.clone());

			let renderer = Arc::clone(&renderer);
			let namespace = namespace.clone();
			let source = content_dir.join(&path);
			tasks.spawn(async move {
				let outcome = tokio::select! {
					biased;
					() = token.cancelled() => Outcome::Cancelled,
					outcome = render_file(source, path.clone(), renderer, namespace) => outcome,
				};
				(path, outcome)
			});
		}

		Self {
			tasks,
			tokens,
			cancel_all,
		}
	}

	/// Number of items in the set.
	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	/// Cancel the render of a single item. Returns false when `path` is not
	/// part of this set.
	pub fn cancel(&self, path: impl AsRef<Path>) -> bool {
		match self.tokens.get(path.as_ref()) {
			Some(token) => {
				token.cancel();
				true
			}
			None => false,
		}
	}

	/// Cancel every item that has not finished yet.
	pub fn cancel_all(&self) {
		self.cancel_all.cancel();
	}

	/// A token that cancels the whole set, for use after the set has been
	/// moved into [`RenderSet::join`].
	pub fn cancellation_token(&self) -> CancellationToken {
		self.cancel_all.clone()
	}

	/// Wait for every task and collect the outcomes into a report.
	pub async fn join(mut self) -> BuildReport {
		let mut report = BuildReport::default();

		while let Some(joined) = self.tasks.join_next().await {
			match joined {
				Ok((path, outcome)) => {
					self.tokens.remove(&path);
					match outcome {
						Outcome::Rendered(output) => report.pages.push(RenderedPage { path, output }),
						Outcome::Failed(error) => {
							tracing::warn!(path = %path.display(), %error, "page failed to render");
							report.failures.push(PageError { path, error });
						}
						Outcome::Cancelled => report.cancelled.push(path),
					}
				}
				Err(join_error) => {
					tracing::error!(%join_error, "render task did not complete");
				}
			}
		}

		// Tasks that panicked or were aborted never reported their path.
		for path in self.tokens.into_keys() {
			report.failures.push(PageError {
				path,
				error: StitchError::TaskFailed("render task did not complete".to_string()),
			});
		}

		report.sort();
		report
	}
}

#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
async fn render_file(
	source: PathBuf,
	path: PathBuf,
	renderer: Arc<Renderer>,
	namespace: GlobalNamespace,
) -> Outcome {
	let text = match tokio::fs::read_to_string(&source).await {
		Ok(text) => text,
		Err(e) => return Outcome::Failed(e.into()),
	};

	let item = ContentItem::new(path, text);
	match item.render(&renderer, &namespace) {
		Ok(output) => {
			tracing::debug!(bytes = output.len(), "rendered page");
			Outcome::Rendered(output)
		}
		Err(error) => Outcome::Failed(error),
	}
}

/// A site rooted at a directory, ready to build with a resolved config.
#[derive(Debug, Clone)]
pub struct Site {
	root: PathBuf,
	config: StitchConfig,
}

impl Site {
	pub fn new(root: impl Into<PathBuf>, config: StitchConfig) -> Self {
		Self {
			root: root.into(),
			config,
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn config(&self) -> &StitchConfig {
		&self.config
	}

	/// Load the global namespace from inline config data and the data
	/// directory.
	pub async fn load_namespace(&self) -> StitchResult<GlobalNamespace> {
		load_namespace(
			&self.config.data_dir(&self.root),
			&self.config.data,
			&self.config.exclude,
		)
		.await
	}

	/// Content file paths relative to the content directory, sorted.
	pub fn discover_content(&self) -> StitchResult<Vec<PathBuf>> {
		let options = DiscoverOptions::new(&CONTENT_FILE_PATTERNS, &self.config.exclude)?;
		discover_files(&self.config.content_dir(&self.root), &options)
	}

	pub fn renderer(&self) -> Renderer {
		Renderer::new(
			self.config.templates_dir(&self.root),
			RenderOptions::from(&self.config),
		)
	}

	/// Load the namespace and discover the content set, then dispatch one
	/// render task per item. Setup errors are returned; per-item errors end
	/// up in the report produced by [`RenderSet::join`].
	pub async fn spawn_renders(&self) -> StitchResult<RenderSet> {
		let namespace = self.load_namespace().await?;
		let paths = self.discover_content()?;
		tracing::info!(count = paths.len(), "rendering content");

		Ok(RenderSet::spawn(
			Arc::new(self.renderer()),
			&namespace,
			&self.config.content_dir(&self.root),
			paths,
		))
	}

	/// Run the whole pipeline and wait for every page.
	pub async fn build(&self) -> StitchResult<BuildReport> {
		let renders = self.spawn_renders().await?;
		let report = renders.join().await;
		tracing::info!(
			rendered = report.pages.len(),
			failed = report.failures.len(),
			cancelled = report.cancelled.len(),
			"build finished"
		);
		Ok(report)
	}
}
