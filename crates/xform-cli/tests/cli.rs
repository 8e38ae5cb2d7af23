use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

const SURVEY: &str = include_str!("../../xform-spec/tests/fixtures/survey.json");

fn odk_build() -> Command {
    Command::cargo_bin("odk-build").expect("binary")
}

#[test]
fn build_writes_xform_to_stdout() {
    let temp = assert_fs::TempDir::new().expect("temp dir");
    let form = temp.child("survey.json");
    form.write_str(SURVEY).expect("write form");

    odk_build()
        .args(["build", "--form"])
        .arg(form.path())
        .args(["--lang", "en", "--lang", "fr"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<h:html "))
        .stdout(predicate::str::contains("<translation lang=\"fr\">"))
        .stdout(predicate::str::contains(
            "<bind nodeset=\"/data/name\" type=\"string\" required=\"true()\" constraint=\"(. &gt; 1 and . &lt; 5) and (. != 'x')\"/>",
        ));
}

#[test]
fn build_writes_output_file_and_refuses_to_overwrite() {
    let temp = assert_fs::TempDir::new().expect("temp dir");
    let form = temp.child("survey.json");
    form.write_str(SURVEY).expect("write form");
    let out = temp.child("survey.xml");

    odk_build()
        .args(["build", "--form"])
        .arg(form.path())
        .arg("--out")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    out.assert(predicate::str::contains("<upload ref=\"/data/household/photo\" mediatype=\"image/*\">"));

    odk_build()
        .args(["build", "--form"])
        .arg(form.path())
        .arg("--out")
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    odk_build()
        .args(["build", "--form"])
        .arg(form.path())
        .arg("--out")
        .arg(out.path())
        .args(["--relative-refs", "--force"])
        .assert()
        .success();
    out.assert(predicate::str::contains("<input ref=\"household/visit\">"));
}

#[test]
fn build_can_emit_json_tree() {
    let temp = assert_fs::TempDir::new().expect("temp dir");
    let form = temp.child("survey.json");
    form.write_str(SURVEY).expect("write form");

    let output = odk_build()
        .args(["build", "--format", "json", "--form"])
        .arg(form.path())
        .output()
        .expect("run");
    assert!(output.status.success());
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(tree["name"], "h:html");
    assert_eq!(tree["children"][0]["children"][0]["val"], "Household Survey");
}

#[test]
fn check_accepts_valid_tree() {
    let temp = assert_fs::TempDir::new().expect("temp dir");
    let form = temp.child("survey.json");
    form.write_str(SURVEY).expect("write form");

    odk_build()
        .args(["check", "--form"])
        .arg(form.path())
        .assert()
        .success()
        .stdout("ok\n");
}

#[test]
fn check_reports_duplicate_names() {
    let temp = assert_fs::TempDir::new().expect("temp dir");
    let form = temp.child("dup.json");
    form.write_str(
        r#"{ "title": "Dup", "controls": [
            { "type": "inputText", "name": "q" },
            { "type": "inputDate", "name": "q" }
        ] }"#,
    )
    .expect("write form");

    odk_build()
        .args(["check", "--form"])
        .arg(form.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate control name 'q'"));
}

#[test]
fn build_rejects_unknown_control_type() {
    let temp = assert_fs::TempDir::new().expect("temp dir");
    let form = temp.child("bad.json");
    form.write_str(r#"{ "title": "Bad", "controls": [ { "type": "inputBarcode", "name": "b" } ] }"#)
        .expect("write form");

    odk_build()
        .args(["build", "--form"])
        .arg(form.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("inputBarcode"));
}

#[test]
fn missing_form_file_is_reported() {
    let temp = tempfile::tempdir().expect("temp dir");
    odk_build()
        .args(["check", "--form"])
        .arg(temp.path().join("absent.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn schema_prints_json_schema() {
    odk_build()
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"controls\""));
}
