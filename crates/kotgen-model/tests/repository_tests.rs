//! Integration tests for the class bytes repository over real JARs and
//! class directories

use kotgen_model::{ApiError, ClassBytesRepository};
use kotgen_testkit::{write_class_dir, write_class_jar, ClassFileBuilder, MethodBuilder};
use tempfile::TempDir;

fn class_bytes(internal_name: &str) -> Vec<u8> {
    ClassFileBuilder::new(internal_name)
        .method(MethodBuilder::new("size", "()I"))
        .build()
}

#[test]
fn test_finds_classes_in_jar_and_directory_roots() {
    let temp = TempDir::new().unwrap();
    let jar = temp.path().join("api.jar");
    write_class_jar(&jar, &[("org/acme/Project", class_bytes("org/acme/Project"))]).unwrap();
    let dir = temp.path().join("classes");
    write_class_dir(&dir, &[("org/acme/Task", class_bytes("org/acme/Task"))]).unwrap();

    let mut repository = ClassBytesRepository::open(&[jar, dir]).unwrap();
    assert!(repository.class_bytes_for("org.acme.Project").unwrap().is_some());
    assert!(repository.class_bytes_for("org.acme.Task").unwrap().is_some());
    assert!(repository.class_bytes_for("org.acme.Missing").unwrap().is_none());
    repository.close();
}

#[test]
fn test_finds_nested_classes() {
    let temp = TempDir::new().unwrap();
    let jar = temp.path().join("api.jar");
    write_class_jar(
        &jar,
        &[
            ("org/acme/Outer", class_bytes("org/acme/Outer")),
            ("org/acme/Outer$Inner", class_bytes("org/acme/Outer$Inner")),
        ],
    )
    .unwrap();

    let mut repository = ClassBytesRepository::open(&[jar]).unwrap();
    assert!(repository.class_bytes_for("org.acme.Outer").unwrap().is_some());
    assert!(repository
        .class_bytes_for("org.acme.Outer.Inner")
        .unwrap()
        .is_some());
    repository.close();
}

#[test]
fn test_finds_kotlin_file_classes() {
    let temp = TempDir::new().unwrap();
    let jar = temp.path().join("api.jar");
    write_class_jar(&jar, &[("org/acme/HelpersKt", class_bytes("org/acme/HelpersKt"))]).unwrap();

    let mut repository = ClassBytesRepository::open(&[jar]).unwrap();
    assert!(repository.class_bytes_for("org.acme.Helpers").unwrap().is_some());
    repository.close();
}

#[test]
fn test_first_root_wins_for_duplicates() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("first.jar");
    let second = temp.path().join("second.jar");
    let first_bytes = ClassFileBuilder::new("org/acme/Project")
        .method(MethodBuilder::new("first", "()V"))
        .build();
    let second_bytes = ClassFileBuilder::new("org/acme/Project")
        .method(MethodBuilder::new("second", "()V"))
        .build();
    write_class_jar(&first, &[("org/acme/Project", first_bytes.clone())]).unwrap();
    write_class_jar(&second, &[("org/acme/Project", second_bytes)]).unwrap();

    let mut repository = ClassBytesRepository::open(&[first, second]).unwrap();
    let found = repository.class_bytes_for("org.acme.Project").unwrap().unwrap();
    assert_eq!(found, first_bytes);
    repository.close();
}

#[test]
fn test_all_class_source_names_deduplicates_across_roots() {
    let temp = TempDir::new().unwrap();
    let jar = temp.path().join("api.jar");
    write_class_jar(
        &jar,
        &[
            ("org/acme/Project", class_bytes("org/acme/Project")),
            ("org/acme/Task", class_bytes("org/acme/Task")),
        ],
    )
    .unwrap();
    let dir = temp.path().join("classes");
    write_class_dir(&dir, &[("org/acme/Project", class_bytes("org/acme/Project"))]).unwrap();

    let mut repository = ClassBytesRepository::open(&[jar, dir]).unwrap();
    let names = repository.all_class_source_names().unwrap();
    assert_eq!(names, vec!["org.acme.Project", "org.acme.Task"]);
    repository.close();
}

#[test]
fn test_directory_root_with_glob_metacharacters_in_its_name() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("build [dev] *classes*");
    write_class_dir(&dir, &[("org/acme/Project", class_bytes("org/acme/Project"))]).unwrap();

    let mut repository = ClassBytesRepository::open(&[dir]).unwrap();
    assert_eq!(
        repository.all_class_source_names().unwrap(),
        vec!["org.acme.Project"]
    );
    assert!(repository.class_bytes_for("org.acme.Project").unwrap().is_some());
    repository.close();
}

#[test]
fn test_module_info_is_never_listed() {
    let temp = TempDir::new().unwrap();
    let jar = temp.path().join("api.jar");
    write_class_jar(
        &jar,
        &[
            ("module-info", class_bytes("module-info")),
            ("org/acme/package-info", class_bytes("org/acme/package-info")),
            ("org/acme/Project", class_bytes("org/acme/Project")),
        ],
    )
    .unwrap();

    let mut repository = ClassBytesRepository::open(&[jar]).unwrap();
    assert_eq!(
        repository.all_class_source_names().unwrap(),
        vec!["org.acme.Project"]
    );
    repository.close();
}

#[test]
fn test_missing_root_is_fatal_at_open() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.jar");
    assert!(ClassBytesRepository::open(&[missing]).is_err());
}

#[test]
fn test_close_is_idempotent_and_use_after_close_fails() {
    let temp = TempDir::new().unwrap();
    let jar = temp.path().join("api.jar");
    write_class_jar(&jar, &[("org/acme/Project", class_bytes("org/acme/Project"))]).unwrap();

    let mut repository = ClassBytesRepository::open(&[jar]).unwrap();
    repository.close();
    repository.close();
    assert!(repository.is_closed());
    assert!(matches!(
        repository.class_bytes_for("org.acme.Project"),
        Err(ApiError::RepositoryClosed)
    ));
    assert!(matches!(
        repository.all_class_source_names(),
        Err(ApiError::RepositoryClosed)
    ));
}
