//! Integration tests for the render pipeline, using the mock executor.

use std::fs;
use std::sync::atomic::Ordering;

use chrono::{NaiveDate, NaiveTime};
use domshot::executor::mock::{MOCK_IMAGE, MockExecutor};
use domshot::prelude::*;
use domshot::SequentialOutputPath;
use tempfile::TempDir;

fn shot(dir: &TempDir, executor: MockExecutor) -> DomShot {
    let _ = env_logger::builder().is_test(true).try_init();

    DomShot::builder()
        .executor(Box::new(executor))
        .path_generator(Box::new(SequentialOutputPath::new(dir.path(), "tmp_domshot_")))
        .build()
}

/// No leftover temporary images in `dir`.
fn assert_no_temp_files(dir: &TempDir) {
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("tmp_domshot_"))
        .collect();
    assert!(leftovers.is_empty(), "temporary files left behind: {:?}", leftovers);
}

/// A clean run returns the image and removes the temporary file.
#[test]
fn test_clean_render() {
    let dir = TempDir::new().unwrap();
    let mut shot = shot(&dir, MockExecutor::new());
    shot.load_html("<body><p>ohai</p></body>");

    let image = shot.render().unwrap();

    assert_eq!(image, MOCK_IMAGE);
    assert_no_temp_files(&dir);
}

/// Known harmless warnings do not fail the render.
#[test]
fn test_allow_listed_warning_only() {
    let dir = TempDir::new().unwrap();
    let executor = MockExecutor::new().output(
        "\nUnable to load library icui18n \"Cannot load library icui18n: (libicui18n.so.48)\"\n\n",
    );
    let mut shot = shot(&dir, executor);

    assert!(shot.render().is_ok());
    assert_no_temp_files(&dir);
}

/// Any other output fails the render with the offending lines, after cleanup.
#[test]
fn test_unexpected_output_fails() {
    let dir = TempDir::new().unwrap();
    let executor = MockExecutor::new().output(
        "Unable to load library icui18n\nReferenceError: Can't find variable: d3\n  phantomjs://webpage.evaluate() : 2\n",
    );
    let mut shot = shot(&dir, executor);

    match shot.render() {
        Err(DomshotError::Execution(lines)) => {
            assert_eq!(
                lines,
                "ReferenceError: Can't find variable: d3\n  phantomjs://webpage.evaluate() : 2"
            );
        }
        other => panic!("Expected Execution error, got {:?}", other),
    }
    assert_no_temp_files(&dir);
}

/// Extra allow-list entries from the configuration are honoured.
#[test]
fn test_configured_ignored_warning() {
    let dir = TempDir::new().unwrap();
    let config = RenderConfigBuilder::new()
        .output_dir(dir.path())
        .ignore_warning("QFont::setPixelSize")
        .build()
        .unwrap();

    let mut shot = DomShot::builder()
        .config(config)
        .executor(Box::new(
            MockExecutor::new().output("QFont::setPixelSize: Pixel size <= 0 (0)\n"),
        ))
        .build();

    assert!(shot.render().is_ok());
    assert_no_temp_files(&dir);
}

/// Browser exits without writing the image.
#[test]
fn test_missing_image() {
    let dir = TempDir::new().unwrap();
    let mut shot = shot(&dir, MockExecutor::new().no_image());

    let err = shot.render().unwrap_err();
    assert!(matches!(err, DomshotError::Io { .. }), "got {:?}", err);
    assert_no_temp_files(&dir);
}

/// Variables, CSS, body and inline script all reach the executor.
#[test]
fn test_script_contents_reach_executor() {
    let dir = TempDir::new().unwrap();
    let executor = MockExecutor::new();
    let log = executor.script_log();
    let mut shot = shot(&dir, executor);

    shot.load_css("h1 { color: \"red\" }");
    shot.load_html("<body><h1></h1></body>");
    shot.set_var("day", NaiveDate::from_ymd_opt(2020, 1, 2).unwrap())
        .unwrap();
    shot.set_var("at", NaiveTime::from_hms_opt(13, 5, 9).unwrap())
        .unwrap();
    shot.set_var("matrix", NdArray::matrix(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap())
        .unwrap();
    shot.load_js("document.querySelector('h1').textContent = day + ' ' + at;");

    shot.render().unwrap();

    let script = log.lock().unwrap().clone().unwrap();
    assert!(script.contains(r#"h1 { color: \"red\" }"#));
    assert!(script.contains("<body><h1></h1></body>"));
    assert!(script.contains("var at = \"13:05:09\";"));
    assert!(script.contains("var day = \"2020-01-02\";"));
    assert!(script.contains("var matrix = [[1.0,2.0],[3.0,4.0]];"));
    assert!(script.contains("textContent = day + ' ' + at;"));
}

/// Loading files by extension, with unsupported types rejected.
#[test]
fn test_load_files() {
    let dir = TempDir::new().unwrap();
    let css = dir.path().join("style.css");
    let js = dir.path().join("app.js");
    fs::write(&css, "body { margin: 0 }").unwrap();
    fs::write(&js, "var ready = true;").unwrap();

    let mut shot = shot(&dir, MockExecutor::new());
    shot.load_files([&css, &js]).unwrap();

    assert_eq!(shot.document().css(), "body { margin: 0 }");
    assert_eq!(shot.document().js(), "var ready = true;");

    let err = shot.load_file(dir.path().join("notes.txt")).unwrap_err();
    assert!(matches!(err, DomshotError::UnsupportedFileType(_)));
    assert_eq!(shot.document().css(), "body { margin: 0 }");
}

/// `render_to` writes the image to the destination.
#[test]
fn test_render_to() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("output.png");
    let mut shot = shot(&dir, MockExecutor::new());

    shot.render_to(&dest).unwrap();

    assert_eq!(fs::read(&dest).unwrap(), MOCK_IMAGE);
    assert_no_temp_files(&dir);
}

/// Launch failures surface unchanged and leave nothing behind.
#[test]
fn test_launch_failure() {
    let dir = TempDir::new().unwrap();
    let executor = MockExecutor::fails_to_launch("phantomjs not found");
    let calls = executor.counter();
    let mut shot = shot(&dir, executor);

    let err = shot.render().unwrap_err();

    assert!(matches!(err, DomshotError::Launch(ref m) if m == "phantomjs not found"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_no_temp_files(&dir);
}

/// Async rendering runs on the blocking pool.
#[tokio::test]
async fn test_render_async() {
    let dir = TempDir::new().unwrap();
    let mut shot = shot(&dir, MockExecutor::new());
    shot.load_html("<body>async</body>");

    let image = shot.render_async().await.unwrap();

    assert_eq!(image, MOCK_IMAGE);
    assert_no_temp_files(&dir);
}

/// Several renderers can run concurrently without sharing temp paths.
#[tokio::test]
async fn test_concurrent_async_renders() {
    let dir = TempDir::new().unwrap();

    let mut handles = Vec::new();
    for i in 0..4 {
        let config = RenderConfigBuilder::new()
            .output_dir(dir.path())
            .file_prefix(format!("tmp_domshot_{}_", i))
            .build()
            .unwrap();
        let mut shot = DomShot::builder()
            .config(config)
            .executor(Box::new(MockExecutor::new().image(vec![i as u8; 8])))
            .build();
        shot.load_html(format!("<body>{}</body>", i));
        handles.push(tokio::spawn(shot.render_async()));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let image = handle.await.unwrap().unwrap();
        assert_eq!(image, vec![i as u8; 8]);
    }
    assert_no_temp_files(&dir);
}

/// Configuration validation.
#[test]
fn test_config_validation() {
    assert!(RenderConfigBuilder::new().viewport(0, 600).build().is_err());
    assert!(RenderConfigBuilder::new().executable("").build().is_err());
    assert!(RenderConfigBuilder::new().file_prefix("a/b").build().is_err());

    let config = RenderConfigBuilder::new()
        .viewport(1280, 720)
        .format(ImageFormat::Jpeg)
        .build()
        .unwrap();
    assert_eq!(config.viewport, Viewport::new(1280, 720));
}
