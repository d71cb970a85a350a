mod common;

use predicates::prelude::*;
use rstest::rstest;
use stitch_core::AnyEmptyResult;

#[test]
fn build_renders_every_page() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::site_fixture(tmp.path());

	common::stitch_cmd(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("rendered about.html"))
		.stdout(predicate::str::contains("rendered index.md"))
		.stdout(predicate::str::contains("Rendered 2 of 2 content file(s)."));

	Ok(())
}

#[test]
fn build_json_report() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::site_fixture(tmp.path());

	let output = common::stitch_cmd(tmp.path())
		.args(["--format", "json"])
		.output()?;
	assert!(output.status.success());

	let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(report["ok"], serde_json::json!(true));
	assert_eq!(report["rendered"][0]["path"], serde_json::json!("about.html"));
	assert_eq!(report["rendered"][1]["path"], serde_json::json!("index.md"));
	assert_eq!(report["failures"], serde_json::json!([]));
	assert_eq!(report["cancelled"], serde_json::json!([]));

	Ok(())
}

#[test]
fn page_failures_exit_with_one() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::site_fixture(tmp.path());
	common::write_file(tmp.path(), "content/broken.md", "---\ntitle: [oops\n---\nbody");

	common::stitch_cmd(tmp.path())
		.assert()
		.code(1)
		.stdout(predicate::str::contains("rendered index.md"))
		.stdout(predicate::str::contains("Rendered 2 of 3 content file(s). 1 failed"))
		.stderr(predicate::str::contains("failed broken.md"))
		.stderr(predicate::str::contains("invalid front matter"));

	Ok(())
}

#[test]
fn page_failures_in_json_report() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::site_fixture(tmp.path());
	common::write_file(tmp.path(), "content/broken.md", "{% if %}");

	let output = common::stitch_cmd(tmp.path())
		.args(["--format", "json"])
		.output()?;
	assert_eq!(output.status.code(), Some(1));

	let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(report["ok"], serde_json::json!(false));
	assert_eq!(report["failures"][0]["path"], serde_json::json!("broken.md"));
	assert!(
		report["failures"][0]["message"]
			.as_str()
			.is_some_and(|message| message.starts_with("template rendering failed"))
	);

	Ok(())
}

#[test]
fn bad_data_is_fatal() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::site_fixture(tmp.path());
	common::write_file(tmp.path(), "data/broken.json", "{ nope");

	common::stitch_cmd(tmp.path())
		.assert()
		.code(2)
		.stdout(predicate::str::contains("rendered").not())
		.stderr(predicate::str::contains("failed to load data file"));

	Ok(())
}

#[test]
fn data_scripts_feed_the_namespace() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(
		tmp.path(),
		"data/build.sh",
		"echo '{\"revision\": \"abc123\"}'\n",
	);
	common::write_file(tmp.path(), "content/index.txt", "rev {{ data.build.revision }}");

	let output = common::stitch_cmd(tmp.path())
		.args(["--format", "json"])
		.output()?;
	assert!(output.status.success());

	let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(report["rendered"][0]["path"], serde_json::json!("index.txt"));
	assert_eq!(report["rendered"][0]["bytes"], serde_json::json!(10));

	Ok(())
}

#[test]
fn empty_project_renders_nothing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::stitch_cmd(tmp.path())
		.assert()
		.success()
		.stdout(predicate::str::contains("Rendered 0 of 0 content file(s)."))
		.stderr(predicate::str::contains("directory does not exist"));

	Ok(())
}

#[test]
fn verbose_flag_raises_log_level() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::site_fixture(tmp.path());

	common::stitch_cmd(tmp.path())
		.assert()
		.success()
		.stderr(predicate::str::contains("rendering content").not());

	common::stitch_cmd(tmp.path())
		.arg("-v")
		.assert()
		.success()
		.stderr(predicate::str::contains("rendering content"));

	Ok(())
}

#[rstest]
#[case::long_help("--help", "--datadir")]
#[case::short_help("-h", "--config")]
#[case::long_version("--version", "stitch ")]
#[case::short_version("-V", "stitch ")]
fn help_and_version_exit_zero(#[case] flag: &str, #[case] expected: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::stitch_cmd(tmp.path())
		.arg(flag)
		.assert()
		.success()
		.stdout(predicate::str::contains(expected));

	Ok(())
}

#[test]
fn unknown_flag_exits_with_usage() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::stitch_cmd(tmp.path())
		.arg("--bogus")
		.assert()
		.code(2)
		.stderr(predicate::str::contains("Usage"));

	common::stitch_cmd(tmp.path())
		.args(["--format", "yaml"])
		.assert()
		.code(2);

	Ok(())
}
