use super::*;

#[test]
fn test_new_creates_manifest_directory() {
    let temp = TempDir::new().unwrap();

    let engine = engine_for(temp.path());

    assert!(temp.path().join(MANIFEST_DIR_NAME).is_dir());
    assert!(!engine.is_initialized());
    assert_eq!(
        engine.manifest_file(),
        temp.path().join(MANIFEST_DIR_NAME).join(MANIFEST_FILE_NAME)
    );
}

#[test]
fn test_new_fails_for_missing_root() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope");

    let result = Engine::new(&Config::new(&missing, Mode::Init, ResetPolicy::BestEffort));

    assert!(matches!(result, Err(EngineError::SourceDirectoryMissing(p)) if p == missing));
    assert!(!missing.exists());
}

#[test]
fn test_new_fails_when_root_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("file.txt");
    fs::write(&file, "x").unwrap();

    let result = Engine::new(&Config::new(&file, Mode::Init, ResetPolicy::BestEffort));

    assert!(matches!(result, Err(EngineError::SourceDirectoryMissing(_))));
}

#[test]
fn test_initialize_records_hello_world_tree() {
    let temp = hello_world_tree();
    let mut engine = engine_for(temp.path());

    let summary = initialize(&mut engine);

    assert_eq!(summary.files_recorded, 2);
    assert!(engine.is_initialized());
    assert_eq!(
        read_records(&engine),
        vec![
            Record::new("a.txt", HELLO_SHA256),
            Record::new("sub/b.txt", WORLD_SHA256),
        ]
    );
}

#[test]
fn test_initialize_reports_progress() {
    let temp = hello_world_tree();
    fs::write(temp.path().join("c.txt"), "c").unwrap();
    fs::write(temp.path().join("d.txt"), "d").unwrap();
    let mut engine = engine_for(temp.path());

    let mut reported = Vec::new();
    engine.initialize(|p| reported.push(p)).unwrap();

    assert_eq!(reported, vec![25, 50, 75, 100]);
}

#[test]
fn test_initialize_empty_tree() {
    let temp = TempDir::new().unwrap();
    let mut engine = engine_for(temp.path());

    let mut reported = Vec::new();
    let summary = engine.initialize(|p| reported.push(p)).unwrap();

    assert_eq!(summary.files_recorded, 0);
    assert_eq!(reported, vec![100]);
    assert!(read_records(&engine).is_empty());
    assert_eq!(engine.record_count().unwrap(), 0);
}

#[test]
fn test_initialize_skips_manifest_directory_contents() {
    let temp = hello_world_tree();
    let mut engine = engine_for(temp.path());
    fs::write(engine.manifest_dir().join("notes"), "not recorded").unwrap();

    initialize(&mut engine);

    let paths: Vec<String> = read_records(&engine).into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["a.txt", "sub/b.txt"]);
}

#[test]
fn test_initialize_records_nested_reserved_name() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("sub/.treeseal")).unwrap();
    fs::write(temp.path().join("sub/.treeseal/manifest"), "user data").unwrap();
    let mut engine = engine_for(temp.path());

    initialize(&mut engine);

    let paths: Vec<String> = read_records(&engine).into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["sub/.treeseal/manifest"]);
}

#[test]
fn test_initialize_order_is_stable() {
    let temp = TempDir::new().unwrap();
    for name in ["zeta", "alpha", "mid"] {
        fs::write(temp.path().join(name), name).unwrap();
    }
    let mut engine = engine_for(temp.path());

    initialize(&mut engine);

    let paths: Vec<String> = read_records(&engine).into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn test_initialize_path_with_colon() {
    let temp = TempDir::new().unwrap();
    #[cfg(unix)]
    let name = "odd:name.txt";
    #[cfg(not(unix))]
    let name = "plain.txt";
    fs::write(temp.path().join(name), "hello").unwrap();
    let mut engine = engine_for(temp.path());

    initialize(&mut engine);

    assert_eq!(read_records(&engine), vec![Record::new(name, HELLO_SHA256)]);
    engine.validate(|_| {}).unwrap();
}

#[test]
fn test_double_initialize_is_rejected() {
    let temp = hello_world_tree();
    let mut engine = engine_for(temp.path());
    initialize(&mut engine);
    let before = fs::read(engine.manifest_file()).unwrap();

    fs::write(temp.path().join("new.txt"), "new").unwrap();
    let mut second = engine_for(temp.path());
    let result = second.initialize(|_| {});

    assert!(matches!(result, Err(EngineError::AlreadyInitialized(_))));
    assert_eq!(fs::read(engine.manifest_file()).unwrap(), before);
}

#[test]
fn test_double_initialize_on_same_engine_is_rejected() {
    let temp = hello_world_tree();
    let mut engine = engine_for(temp.path());
    initialize(&mut engine);

    let result = engine.initialize(|_| {});

    assert!(matches!(result, Err(EngineError::AlreadyInitialized(_))));
}

#[test]
#[cfg(unix)]
fn test_unreadable_file_aborts_without_manifest() {
    use std::os::unix::fs::PermissionsExt;

    if nix::unistd::geteuid().is_root() {
        return;
    }

    let temp = hello_world_tree();
    let locked = temp.path().join("sub/b.txt");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    let mut engine = engine_for(temp.path());

    let result = engine.initialize(|_| {});

    match result {
        Err(EngineError::Checksum { path, .. }) => assert_eq!(path, "sub/b.txt"),
        other => panic!("Expected Checksum error, got {other:?}"),
    }
    assert!(!engine.is_initialized());
    assert!(!engine.manifest_file().exists());
    assert_eq!(fs::read_dir(engine.manifest_dir()).unwrap().count(), 0);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}

#[test]
#[cfg(unix)]
fn test_unreadable_directory_is_traversal_error() {
    use std::os::unix::fs::PermissionsExt;

    if nix::unistd::geteuid().is_root() {
        return;
    }

    let temp = hello_world_tree();
    let locked = temp.path().join("sub");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    let mut engine = engine_for(temp.path());

    let result = engine.initialize(|_| {});

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    assert!(matches!(result, Err(EngineError::Traversal { .. })));
    assert!(!engine.manifest_file().exists());
}

#[test]
#[cfg(unix)]
fn test_symlinks_are_not_recorded() {
    let temp = hello_world_tree();
    std::os::unix::fs::symlink("a.txt", temp.path().join("link")).unwrap();
    let mut engine = engine_for(temp.path());

    let summary = initialize(&mut engine);

    assert_eq!(summary.files_recorded, 2);
}
