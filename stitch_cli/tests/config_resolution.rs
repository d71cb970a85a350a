mod common;

use predicates::prelude::*;
use stitch_core::AnyEmptyResult;

fn directory_fixture(root: &std::path::Path) {
	common::write_file(root, "content/index.md", "default dir");
	common::write_file(root, "flag-pages/index.md", "flag dir");
	common::write_file(root, "file-pages/index.md", "file pages dir");
}

#[test]
fn flags_override_defaults() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	directory_fixture(tmp.path());

	common::stitch_cmd(tmp.path())
		.args(["--contentdir", "flag-pages", "--format", "json"])
		.assert()
		.success()
		.stdout(predicate::str::contains("\"bytes\":8"));

	Ok(())
}

#[test]
fn config_file_overrides_flags() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	directory_fixture(tmp.path());
	common::write_file(tmp.path(), "stitch.toml", "contentdir = \"file-pages\"\n");
	common::write_file(tmp.path(), "file-pages/extra.md", "only here");

	common::stitch_cmd(tmp.path())
		.args(["--contentdir", "flag-pages"])
		.assert()
		.success()
		.stdout(predicate::str::contains("rendered extra.md"))
		.stdout(predicate::str::contains("Rendered 2 of 2"));

	Ok(())
}

#[test]
fn discovers_dot_config_candidate() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	directory_fixture(tmp.path());
	common::write_file(tmp.path(), "file-pages/extra.md", "only here");
	common::write_file(
		tmp.path(),
		".config/stitch.toml",
		"contentdir = \"file-pages\"\n",
	);

	common::stitch_cmd(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("rendered extra.md"));

	Ok(())
}

#[test]
fn explicit_config_path() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	directory_fixture(tmp.path());
	common::write_file(tmp.path(), "file-pages/extra.md", "only here");
	common::write_file(
		tmp.path(),
		"conf/site.yaml",
		"contentdir: file-pages\ndata:\n  site:\n    name: Inline\n",
	);
	common::write_file(tmp.path(), "file-pages/name.txt", "{{ data.site.name }}");

	let output = common::stitch_cmd(tmp.path())
		.args(["--config", "conf/site.yaml", "--format", "json"])
		.output()?;
	assert!(output.status.success());

	let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
	let paths: Vec<&str> = report["rendered"]
		.as_array()
		.map(|pages| pages.iter().filter_map(|page| page["path"].as_str()).collect())
		.unwrap_or_default();
	assert_eq!(paths, vec!["extra.md", "index.md", "name.txt"]);
	assert_eq!(report["rendered"][2]["bytes"], serde_json::json!(6));

	Ok(())
}

#[test]
fn deferred_script_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	directory_fixture(tmp.path());
	common::write_file(
		tmp.path(),
		"stitch.sh",
		"echo '{\"contentdir\": \"file-pages\"}'\n",
	);

	common::stitch_cmd(tmp.path())
		.args(["-c", "stitch.sh", "--format", "json"])
		.assert()
		.success()
		.stdout(predicate::str::contains("\"bytes\":14"));

	Ok(())
}

#[test]
fn explicit_config_wins_over_discovered_candidate() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	directory_fixture(tmp.path());
	common::write_file(tmp.path(), "stitch.toml", "contentdir = \"flag-pages\"\n");
	common::write_file(tmp.path(), "other.json", r#"{"contentdir": "file-pages"}"#);

	common::stitch_cmd(tmp.path())
		.args(["-c", "other.json", "--format", "json"])
		.assert()
		.success()
		.stdout(predicate::str::contains("\"bytes\":14"));

	Ok(())
}

#[test]
fn missing_config_file_is_fatal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::stitch_cmd(tmp.path())
		.args(["--config", "nope.toml"])
		.assert()
		.code(2)
		.stderr(predicate::str::contains("failed to load config file"));

	Ok(())
}

#[test]
fn invalid_config_file_is_fatal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(tmp.path(), "stitch.toml", "autoescape = \"sometimes\"\n");

	common::stitch_cmd(tmp.path())
		.assert()
		.code(2)
		.stderr(predicate::str::contains("failed to load config file"));

	Ok(())
}
