//! `stitch_core` is the core library for the `stitch` static-site renderer. It
//! merges a directory of data files into one global namespace, splits content
//! files into YAML front matter and a template body, and renders every body
//! with [`minijinja`](https://docs.rs/minijinja) against its own front matter
//! and the shared namespace.
//!
//! ## Processing Pipeline
//!
//! ```text
//! data/**/*.{json,yaml,yml,toml,sh}
//!   -> DataSource (static value, or deferred script output)
//!   -> NamespaceBuilder (path segments become nested keys)
//!   -> GlobalNamespace (frozen, shared by every render)
//!
//! content/**/*.{txt,md,html,njk,son}
//!   -> front_matter::extract (metadata + body)
//!   -> RenderContext::compose (page + data)
//!   -> Renderer (one task per file, collected into a BuildReport)
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration defaults, `stitch.toml` discovery, and layering of overrides.
//! - [`namespace`] - Building the global namespace from keyed data entries.
//! - [`front_matter`] - Splitting and parsing the metadata block of a content file.
//! - [`build`] - Concurrent rendering of every content file with per-item cancellation.
//!
//! ## Template Variables
//!
//! A content file like
//!
//! ```md
//! ---
//! title: Hello
//! ---
//! # {{ page.title }} on {{ data.site.name }}
//! ```
//!
//! sees its front matter under `page` and the namespace under `data`, so a
//! file at `data/site.json` containing `{"name": "Example"}` renders the body
//! as `# Hello on Example`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use stitch_core::ConfigOverrides;
//! use stitch_core::Site;
//! use stitch_core::StitchConfig;
//!
//! # async fn run() -> stitch_core::StitchResult<()> {
//! let root = Path::new(".");
//! let config = StitchConfig::resolve(root, ConfigOverrides::default(), None)?;
//! let report = Site::new(root, config).build().await?;
//!
//! for page in &report.pages {
//! 	println!("{}: {} bytes", page.path.display(), page.output.len());
//! }
//! for failure in &report.failures {
//! 	eprintln!("{failure}");
//! }
//! # Ok(())
//! # }
//! ```

pub use build::*;
pub use config::*;
pub use context::*;
pub use data::*;
pub use error::*;
pub use namespace::*;
pub use render::*;
pub use source::*;

pub mod build;
pub mod config;
mod context;
mod data;
pub mod discover;
#[allow(unused_assignments)]
mod error;
pub mod front_matter;
pub mod namespace;
mod render;
mod source;
