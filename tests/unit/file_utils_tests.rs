/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use lang2sql::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_fileExists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "crimes.csv", "ID\n1\n")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::dir_exists(&test_file));

    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_fileExists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

/// Test that find_files only returns matching extensions, sorted
#[test]
fn test_findFiles_withMixedFiles_shouldReturnSortedCsvOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "chicago_crimes_2024.csv", "a\n")?;
    common::create_test_file(temp_dir.path(), "chicago_crimes_2023.csv", "a\n")?;
    common::create_test_file(temp_dir.path(), "chicago_crime_2022.CSV", "a\n")?;
    common::create_test_file(temp_dir.path(), "other_file.txt", "a\n")?;

    let files = FileManager::find_files(temp_dir.path(), "csv")?;
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();

    assert_eq!(
        names,
        vec!["chicago_crime_2022.CSV", "chicago_crimes_2023.csv", "chicago_crimes_2024.csv"]
    );

    Ok(())
}

/// Test that a leading dot in the extension is accepted
#[test]
fn test_findFiles_withDottedExtension_shouldMatch() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "a.csv", "a\n")?;

    assert_eq!(FileManager::find_files(temp_dir.path(), ".csv")?.len(), 1);

    Ok(())
}

/// Test that write_to_file creates missing parent directories
#[test]
fn test_writeToFile_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("conf.json");

    FileManager::write_to_file(&path, "{}")?;

    assert_eq!(fs::read_to_string(&path)?, "{}");
    assert_eq!(FileManager::read_to_string(&path)?, "{}");

    Ok(())
}

/// Test that ensure_dir is a no-op on existing directories
#[test]
fn test_ensureDir_withExistingDir_shouldSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    FileManager::ensure_dir(temp_dir.path())?;
    FileManager::ensure_dir(temp_dir.path().join("new"))?;

    assert!(FileManager::dir_exists(temp_dir.path().join("new")));

    Ok(())
}

/// Test that read_to_string reports missing files
#[test]
fn test_readToString_withMissingFile_shouldFail() {
    assert!(FileManager::read_to_string("definitely_missing.csv").is_err());
}

/// Test that find_files orders nested files by full path
#[test]
fn test_findFiles_withNestedDirectories_shouldSortByFullPath() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "b.csv", "a\n")?;
    fs::create_dir_all(temp_dir.path().join("a"))?;
    common::create_test_file(&temp_dir.path().join("a"), "z.csv", "a\n")?;
    common::create_test_file(temp_dir.path(), "c.csv", "a\n")?;

    let files = FileManager::find_files(temp_dir.path(), "csv")?;
    let relative: Vec<_> = files
        .iter()
        .map(|p| p.strip_prefix(temp_dir.path()).unwrap().to_path_buf())
        .collect();

    assert_eq!(
        relative,
        vec![
            std::path::Path::new("a").join("z.csv"),
            std::path::PathBuf::from("b.csv"),
            std::path::PathBuf::from("c.csv"),
        ]
    );

    Ok(())
}
