//! Configuration files in every supported format.

use docmeter::{DocmeterConfig, DocmeterError, DocumentProcessor};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_formats_agree() {
    let dir = tempdir().unwrap();
    let toml_path = dir.path().join("docmeter.toml");
    let yaml_path = dir.path().join("docmeter.yml");
    let json_path = dir.path().join("docmeter.json");
    fs::write(&toml_path, "thumbnail_size = 128\n\n[images]\nmax_width = 1800\n\n[quality]\nwords_per_page = 300\n").unwrap();
    fs::write(&yaml_path, "thumbnail_size: 128\nimages:\n  max_width: 1800\nquality:\n  words_per_page: 300\n").unwrap();
    fs::write(
        &json_path,
        r#"{"thumbnail_size": 128, "images": {"max_width": 1800}, "quality": {"words_per_page": 300}}"#,
    )
    .unwrap();

    let from_toml = DocmeterConfig::from_file(&toml_path).unwrap();
    let from_yaml = DocmeterConfig::from_file(&yaml_path).unwrap();
    let from_json = DocmeterConfig::from_file(&json_path).unwrap();

    assert_eq!(from_toml, from_yaml);
    assert_eq!(from_toml, from_json);
    assert_eq!(from_toml.images.max_width, 1800);
    assert_eq!(from_toml.images.max_height, 2400);
    assert_eq!(from_toml.quality.words_per_page, 300);
    assert_eq!(from_toml.thumbnail_size, 128);
    assert!(from_toml.validate().is_ok());
}

#[test]
fn test_loaded_config_is_validated_by_processor() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("docmeter.toml");
    fs::write(&path, "[images]\njpeg_quality = 0\n").unwrap();

    let config = DocmeterConfig::from_file(&path).unwrap();
    let err = DocumentProcessor::new(config).err().unwrap();

    assert!(matches!(err, DocmeterError::Validation { .. }));
    assert!(err.to_string().contains("jpeg_quality"));
}

#[test]
fn test_malformed_files_are_validation_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("docmeter.yaml");
    fs::write(&path, "images: [unclosed").unwrap();

    let err = DocmeterConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, DocmeterError::Validation { .. }));
}
