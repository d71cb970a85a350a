use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::StitchError;
use crate::StitchResult;

/// Glob patterns selecting data files, relative to the data directory.
pub const DATA_FILE_PATTERNS: [&str; 1] = ["**/*.{json,yaml,yml,toml,sh}"];

/// Glob patterns selecting content files, relative to the content directory.
pub const CONTENT_FILE_PATTERNS: [&str; 1] = ["**/*.{txt,md,html,njk,son}"];

/// Which files to pick up under a directory.
#[derive(Debug, Clone)]
pub struct DiscoverOptions {
	/// Files are kept when their path relative to the root matches one of
	/// these.
	pub include_set: GlobSet,
	/// Gitignore-style patterns for files and directories to skip.
	pub exclude_patterns: Vec<String>,
}

impl DiscoverOptions {
	pub fn new(include_patterns: &[&str], exclude_patterns: &[String]) -> StitchResult<Self> {
		Ok(Self {
			include_set: build_glob_set(include_patterns)?,
			exclude_patterns: exclude_patterns.to_vec(),
		})
	}
}

/// Build a `GlobSet` from a list of glob pattern strings.
fn build_glob_set(patterns: &[&str]) -> StitchResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			StitchError::InvalidPattern {
				pattern: (*pattern).to_string(),
				reason: e.to_string(),
			}
		})?;
		builder.add(glob);
	}
	builder.build().map_err(|e| {
		StitchError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Build a `Gitignore` matcher from the configured exclude patterns.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> StitchResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			StitchError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
	}
	builder.build().map_err(|e| {
		StitchError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Collect every matching file under `root`, as paths relative to `root`,
/// sorted for deterministic ordering.
///
/// Hidden entries (names starting with `.`) are skipped. A missing `root`
/// yields no files.
pub fn discover_files(root: &Path, options: &DiscoverOptions) -> StitchResult<Vec<PathBuf>> {
	let mut files = Vec::new();
	if !root.is_dir() {
		tracing::warn!(dir = %root.display(), "directory does not exist, nothing to discover");
		return Ok(files);
	}

	let exclude = build_exclude_matcher(root, &options.exclude_patterns)?;
	let mut visited_dirs = HashSet::new();

	walk_dir(
		root,
		root,
		options,
		&exclude,
		&mut visited_dirs,
		&mut files,
	)?;

	files.sort();
	tracing::debug!(dir = %root.display(), count = files.len(), "discovered files");
	Ok(files)
}

fn is_hidden(name: &str) -> bool {
	name.starts_with('.')
}

fn walk_dir(
	root: &Path,
	dir: &Path,
	options: &DiscoverOptions,
	exclude: &Gitignore,
	visited_dirs: &mut HashSet<PathBuf>,
	files: &mut Vec<PathBuf>,
) -> StitchResult<()> {
	// Detect symlink cycles by tracking canonical paths.
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical) {
		return Err(StitchError::SymlinkCycle {
			path: dir.display().to_string(),
		});
	}

	for entry in std::fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path
			.file_name()
			.and_then(|name| name.to_str())
			.is_some_and(is_hidden)
		{
			continue;
		}

		let is_dir = path.is_dir();
		if exclude.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if is_dir {
			walk_dir(root, &path, options, exclude, visited_dirs, files)?;
			continue;
		}

		if let Ok(relative) = path.strip_prefix(root) {
			if options.include_set.is_match(relative) {
				files.push(relative.to_path_buf());
			}
		}
	}

	Ok(())
}
