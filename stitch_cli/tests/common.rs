#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;

pub fn stitch_cmd(dir: &Path) -> Command {
	let mut cmd = Command::cargo_bin("stitch").unwrap_or_else(|e| panic!("stitch binary: {e}"));
	cmd.current_dir(dir);
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

pub fn write_file(root: &Path, relative: &str, content: &str) {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("mkdir {relative}: {e}"));
	}
	std::fs::write(&path, content).unwrap_or_else(|e| panic!("write {relative}: {e}"));
}

/// A small site with one data file, one partial, and two pages.
pub fn site_fixture(root: &Path) {
	write_file(root, "data/site.json", r#"{"name": "Example"}"#);
	write_file(root, "templates/footer.html", "<footer>{{ data.site.name }}</footer>");
	write_file(
		root,
		"content/index.md",
		"---\ntitle: Hello\n---\n# {{ page.title }} on {{ data.site.name }}\n",
	);
	write_file(root, "content/about.html", "{% include 'footer.html' %}");
}
