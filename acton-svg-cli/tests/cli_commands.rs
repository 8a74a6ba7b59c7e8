//! Integration tests for CLI commands

use acton_svg::config::ActonSvgConfig;
use acton_svg_cli_lib::{CheckCommand, RenderCommand, SanitizeCommand};
use std::fs;
use tempfile::TempDir;

const HOSTILE_SVG: &str = r#"<?xml version="1.0"?><svg onload="alert(1)"><script>alert(1)</script><rect/></svg>"#;

#[tokio::test]
async fn test_check_classifies_by_content() {
    let temp_dir = TempDir::new().unwrap();
    let svg = temp_dir.path().join("logo.svg");
    let fake = temp_dir.path().join("fake.svg");
    fs::write(&svg, HOSTILE_SVG).unwrap();
    fs::write(&fake, [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();

    let results = CheckCommand::new(vec![svg, fake], false).classify().await.unwrap();

    assert!(results[0].svg);
    assert_eq!(results[0].declared, "image/svg+xml");
    assert!(!results[1].svg);
    assert_eq!(results[1].detected.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn test_check_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.svg");

    assert!(CheckCommand::new(vec![missing], false).classify().await.is_err());
}

#[tokio::test]
async fn test_sanitize_batch_writes_outputs_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let out_dir = temp_dir.path().join("clean");
    let first = temp_dir.path().join("first.svg");
    let second = temp_dir.path().join("second.svg");
    let broken = temp_dir.path().join("broken.svg");
    fs::write(&first, HOSTILE_SVG).unwrap();
    fs::write(&second, "<svg><circle r=\"2\"/></svg>").unwrap();
    fs::write(&broken, "<svg><g></svg>").unwrap();

    let outcomes = SanitizeCommand::new(vec![first.clone(), second, broken])
        .with_title(Some("Logo".to_string()))
        .with_out_dir(Some(out_dir.clone()))
        .run()
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].0, first);

    let written = fs::read_to_string(out_dir.join("first.sanitized.svg")).unwrap();
    assert_eq!(written, "<svg><title>Logo</title><rect/></svg>");
    let first = outcomes[0].1.as_ref().unwrap();
    assert_eq!(first.report.removed_elements, 1);
    assert_eq!(first.report.removed_attributes, 1);

    assert!(out_dir.join("second.sanitized.svg").exists());
    assert!(outcomes[2].1.is_err());
    assert!(!out_dir.join("broken.sanitized.svg").exists());
}

#[tokio::test]
async fn test_render_inline_and_image() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("logo.svg"), HOSTILE_SVG).unwrap();

    let mut config = ActonSvgConfig::default();
    config.storage.base_path = temp_dir.path().to_path_buf();

    let command = RenderCommand::new(vec!["logo.svg".into(), "missing.svg".into()], None)
        .with_alt(Some("Logo".to_string()));

    // Image references read nothing, so the missing file still gets an <img>
    let elements = command.render(&config).await.unwrap();
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].to_html(), r#"<img src="/files/logo.svg" alt="Logo" />"#);
    assert_eq!(elements[1].to_html(), r#"<img alt="Logo" />"#);

    config.formatter.render_as_image = false;
    let elements = command.render(&config).await.unwrap();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].to_html(), "<svg><rect/></svg>");
}
