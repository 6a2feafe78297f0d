use super::*;
use std::fs;
use tempfile::TempDir;

fn txt_extensions() -> Vec<String> {
    vec!["txt".to_string(), "md".to_string()]
}

fn write_file(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("should write test file");
}

#[test]
fn loads_documents_recursively() {
    let temp = TempDir::new().expect("should create temp dir");
    let nested = temp.path().join("nested");
    fs::create_dir(&nested).expect("should create nested dir");

    write_file(temp.path(), "a.txt", "top level");
    write_file(&nested, "b.txt", "nested content");

    let documents = load_documents(temp.path(), &txt_extensions()).expect("should load");

    assert_eq!(documents.len(), 2);
    assert!(documents.iter().any(|d| d.text == "top level"));
    assert!(documents.iter().any(|d| d.text == "nested content"));
}

#[test]
fn traversal_order_is_sorted_and_stable() {
    let temp = TempDir::new().expect("should create temp dir");
    write_file(temp.path(), "zebra.txt", "z");
    write_file(temp.path(), "alpha.txt", "a");
    write_file(temp.path(), "mango.txt", "m");

    let first = load_documents(temp.path(), &txt_extensions()).expect("should load");
    let second = load_documents(temp.path(), &txt_extensions()).expect("should load");

    let texts: Vec<&str> = first.iter().map(|d| d.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "m", "z"]);
    assert_eq!(first, second);
}

#[test]
fn ignores_unrecognized_extensions() {
    let temp = TempDir::new().expect("should create temp dir");
    write_file(temp.path(), "notes.txt", "keep");
    write_file(temp.path(), "binary.dat", "drop");
    write_file(temp.path(), "readme.md", "keep too");

    let documents = load_documents(temp.path(), &txt_extensions()).expect("should load");

    assert_eq!(documents.len(), 2);
    assert!(documents.iter().all(|d| d.text != "drop"));
}

#[test]
fn missing_directory_is_an_error() {
    let temp = TempDir::new().expect("should create temp dir");
    let missing = temp.path().join("does-not-exist");

    let result = load_documents(&missing, &txt_extensions());

    assert!(matches!(result, Err(crate::RagError::SourceData(_))));
}

#[test]
fn empty_directory_yields_empty_sequence() {
    let temp = TempDir::new().expect("should create temp dir");

    let documents = load_documents(temp.path(), &txt_extensions()).expect("should load");

    assert!(documents.is_empty());
}

#[test]
fn source_records_the_file_path() {
    let temp = TempDir::new().expect("should create temp dir");
    write_file(temp.path(), "origin.txt", "content");

    let documents = load_documents(temp.path(), &txt_extensions()).expect("should load");

    assert_eq!(documents.len(), 1);
    assert!(documents[0].source.ends_with("origin.txt"));
}
