//! End-to-end tests through the real process executor.
//!
//! A small shell script stands in for PhantomJS: it reads the program from
//! stdin, pulls the `page.render("...")` destination out of it and writes
//! bytes there, optionally printing something first.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::Duration;

use domshot::prelude::*;
use tempfile::TempDir;

const FAKE_IMAGE: &str = "FAKEPNG";

/// Write an executable fake browser. `extra` runs after the image is written.
fn fake_phantomjs(dir: &TempDir, extra: &str) -> PathBuf {
    let path = dir.path().join("phantomjs");
    let script = format!(
        "#!/bin/sh\n\
         out=$(sed -n 's/^page\\.render(\"\\(.*\\)\");$/\\1/p')\n\
         printf '{}' > \"$out\"\n\
         {}\n",
        FAKE_IMAGE, extra
    );
    fs::write(&path, script).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn shot_with(dir: &TempDir, executable: PathBuf) -> DomShot {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = RenderConfigBuilder::new()
        .executable(executable)
        .output_dir(dir.path())
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();
    DomShot::from_config(config)
}

fn temp_images(dir: &TempDir) -> usize {
    fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("tmp_domshot_"))
        .count()
}

#[test]
fn test_render_through_process() {
    let dir = TempDir::new().unwrap();
    let mut shot = shot_with(&dir, fake_phantomjs(&dir, "exit 0"));
    shot.load_css("body { background: white }");
    shot.load_html("<body><p>ohai</p></body>");

    let image = shot.render().unwrap();

    assert_eq!(image, FAKE_IMAGE.as_bytes());
    assert_eq!(temp_images(&dir), 0);
}

#[test]
fn test_harmless_stderr_is_ignored() {
    let dir = TempDir::new().unwrap();
    let exe = fake_phantomjs(
        &dir,
        "echo 'Unable to load library icui18n \"Cannot load library icui18n\"' >&2",
    );
    let mut shot = shot_with(&dir, exe);

    assert_eq!(shot.render().unwrap(), FAKE_IMAGE.as_bytes());
    assert_eq!(temp_images(&dir), 0);
}

#[test]
fn test_page_error_fails_render_despite_exit_zero() {
    let dir = TempDir::new().unwrap();
    let exe = fake_phantomjs(&dir, "echo \"TypeError: 'undefined' is not an object\"\nexit 0");
    let mut shot = shot_with(&dir, exe);

    match shot.render() {
        Err(DomshotError::Execution(lines)) => {
            assert_eq!(lines, "TypeError: 'undefined' is not an object");
        }
        other => panic!("Expected Execution error, got {:?}", other),
    }
    assert_eq!(temp_images(&dir), 0);
}

#[test]
fn test_page_error_without_newline_is_not_hidden_by_harmless_stderr() {
    let dir = TempDir::new().unwrap();
    let exe = fake_phantomjs(
        &dir,
        "printf 'ReferenceError: d3'\necho 'Unable to load library icui18n' >&2",
    );
    let mut shot = shot_with(&dir, exe);

    match shot.render() {
        Err(DomshotError::Execution(lines)) => assert_eq!(lines, "ReferenceError: d3"),
        other => panic!("Expected Execution error, got {:?}", other),
    }
    assert_eq!(temp_images(&dir), 0);
}

#[test]
fn test_render_to_destination() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("output.png");
    let mut shot = shot_with(&dir, fake_phantomjs(&dir, ""));

    shot.render_to(&dest).unwrap();

    assert_eq!(fs::read_to_string(&dest).unwrap(), FAKE_IMAGE);
    assert_eq!(temp_images(&dir), 0);
}

#[test]
fn test_missing_executable() {
    let dir = TempDir::new().unwrap();
    let mut shot = shot_with(&dir, dir.path().join("no-such-phantomjs"));

    let err = shot.render().unwrap_err();
    assert!(matches!(err, DomshotError::Launch(_)), "got {:?}", err);
    assert_eq!(temp_images(&dir), 0);
}

#[test]
fn test_hung_browser_times_out() {
    let dir = TempDir::new().unwrap();
    let exe = fake_phantomjs(&dir, "exec sleep 5");
    let config = RenderConfigBuilder::new()
        .executable(exe)
        .output_dir(dir.path())
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();
    let mut shot = DomShot::from_config(config);

    let err = shot.render().unwrap_err();

    assert!(matches!(err, DomshotError::Timeout(_)), "got {:?}", err);
    // The image was written before the hang; cleanup still removes it.
    assert_eq!(temp_images(&dir), 0);
}
