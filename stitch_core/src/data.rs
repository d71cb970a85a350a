use std::path::Path;
use std::path::PathBuf;

use serde_json::Map;
use serde_json::Value;
use tokio::task::JoinSet;

use crate::DataFormat;
use crate::DataSource;
use crate::StitchError;
use crate::StitchResult;
use crate::discover::DATA_FILE_PATTERNS;
use crate::discover::DiscoverOptions;
use crate::discover::discover_files;
use crate::namespace::DataEntry;
use crate::namespace::GlobalNamespace;
use crate::namespace::NamespaceBuilder;

/// Build the global namespace from inline data and every data file under
/// `data_dir`.
///
/// Inline entries go in first so that files at the same path replace them.
/// All files are loaded before the namespace is frozen; the first failure
/// aborts the remaining loads and is returned.
pub async fn load_namespace(
	data_dir: &Path,
	inline: &Map<String, Value>,
	exclude: &[String],
) -> StitchResult<GlobalNamespace> {
	let options = DiscoverOptions::new(&DATA_FILE_PATTERNS, exclude)?;
	let files = discover_files(data_dir, &options)?;
	let entries = load_entries(data_dir, files).await?;

	let mut builder = NamespaceBuilder::new();
	for (key, value) in inline {
		builder.insert(&[key], value.clone());
	}
	builder.extend(entries);

	let namespace = builder.finish();
	tracing::info!(
		dir = %data_dir.display(),
		keys = namespace.len(),
		"global namespace ready"
	);
	Ok(namespace)
}

/// Load the given data files (relative to `data_dir`) concurrently.
///
/// Entries come back in the order of `files`, whatever order the reads finish
/// in, so later files overwrite earlier ones deterministically.
pub async fn load_entries(data_dir: &Path, files: Vec<PathBuf>) -> StitchResult<Vec<DataEntry>> {
	let mut tasks = JoinSet::new();
	for (index, relative) in files.into_iter().enumerate() {
		let dir = data_dir.to_path_buf();
		tasks.spawn(async move { load_entry(&dir, relative).await.map(|entry| (index, entry)) });
	}

	let mut entries = Vec::with_capacity(tasks.len());
	while let Some(joined) = tasks.join_next().await {
		let loaded = joined.map_err(|e| StitchError::TaskFailed(e.to_string()))??;
		entries.push(loaded);
	}

	entries.sort_by_key(|(index, _)| *index);
	Ok(entries.into_iter().map(|(_, entry)| entry).collect())
}

#[tracing::instrument(level = "debug", skip_all, fields(path = %relative.display()))]
async fn load_entry(dir: &Path, relative: PathBuf) -> StitchResult<DataEntry> {
	let display = relative.display().to_string();
	let format = DataFormat::from_path(&relative)
		.ok_or_else(|| StitchError::UnsupportedDataFormat(display.clone()))?;

	let source = if format == DataFormat::Script {
		format.load(dir, &relative)?
	} else {
		let content = tokio::fs::read_to_string(dir.join(&relative))
			.await
			.map_err(|e| {
				StitchError::DataFile {
					path: display.clone(),
					reason: e.to_string(),
				}
			})?;
		DataSource::Static(format.parse(&content, &display)?)
	};

	let value = resolve_source(source).await?;
	tracing::debug!("loaded data file");
	Ok(DataEntry::from_relative_path(&relative, value))
}

/// Resolve a source to its value. Deferred producers may block, so they run
/// on the blocking pool.
pub async fn resolve_source(source: DataSource) -> StitchResult<Value> {
	match source {
		DataSource::Static(value) => Ok(value),
		deferred @ DataSource::Deferred(_) => {
			tokio::task::spawn_blocking(move || deferred.resolve())
				.await
				.map_err(|e| StitchError::TaskFailed(e.to_string()))?
		}
	}
}
