use super::*;
use crate::config::{Mode, ResetPolicy};
use std::fs;
use std::io::Cursor;
use tempfile::TempDir;

const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
const WORLD_SHA256: &str = "486ea46224d1bb4fb680f34f7c9ad96a8f24ec88be73ea8e5a6c65260e9cb8a7";

fn engine_for(root: &Path) -> Engine {
    Engine::new(&Config::new(root, Mode::Init, ResetPolicy::BestEffort)).unwrap()
}

/// `a.txt` = "hello", `sub/b.txt` = "world".
fn hello_world_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.txt"), "hello").unwrap();
    fs::create_dir(temp.path().join("sub")).unwrap();
    fs::write(temp.path().join("sub/b.txt"), "world").unwrap();
    temp
}

fn read_records(engine: &Engine) -> Vec<Record> {
    let bytes = fs::read(engine.manifest_file()).unwrap();
    ManifestReader::new(Cursor::new(bytes))
        .unwrap()
        .map(|item| item.unwrap().1)
        .collect()
}

fn initialize(engine: &mut Engine) -> InitSummary {
    engine.initialize(|_| {}).unwrap()
}

fn write_manifest(engine: &Engine, payload: &str) {
    let bytes = zstd::encode_all(payload.as_bytes(), 0).unwrap();
    fs::write(engine.manifest_file(), bytes).unwrap();
}

mod init;
