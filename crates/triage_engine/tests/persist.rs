use std::fs;

use tempfile::TempDir;
use triage_engine::{ensure_state_dir, PersistError, StateFiles};

#[test]
fn creates_missing_state_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("state");
    assert!(!new_dir.exists());
    ensure_state_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn read_of_missing_file_is_none() {
    let temp = TempDir::new().unwrap();
    let writer = StateFiles::new(temp.path().to_path_buf());
    assert!(writer.read("preferences.ron").unwrap().is_none());
}

#[test]
fn write_replaces_existing_content() {
    let temp = TempDir::new().unwrap();
    let writer = StateFiles::new(temp.path().join("nested"));

    let first = writer.write("preferences.ron", "a").unwrap();
    assert_eq!(fs::read_to_string(&first).unwrap(), "a");

    let second = writer.write("preferences.ron", "b").unwrap();
    assert_eq!(first, second);
    assert_eq!(writer.read("preferences.ron").unwrap().as_deref(), Some("b"));
}

#[test]
fn no_partial_file_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = StateFiles::new(file_path.clone());
    assert!(writer.write("preferences.ron", "data").is_err());
    assert!(!file_path.with_file_name("preferences.ron").exists());
}

#[test]
fn write_leaves_only_the_target_behind() {
    let temp = TempDir::new().unwrap();
    let files = StateFiles::new(temp.path().to_path_buf());
    files.write("preferences.ron", "(auto_analyze: true)").unwrap();

    let names: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["preferences.ron".to_string()]);
}

#[test]
fn file_in_place_of_state_dir_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("state");
    fs::write(&file_path, "x").unwrap();

    let err = ensure_state_dir(&file_path).unwrap_err();
    assert!(matches!(err, PersistError::NotADirectory(path) if path == file_path));
}
