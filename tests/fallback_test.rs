use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(cargo_bin!("cartsync"));
    cmd.env_remove("RUST_LOG")
        .arg("--state-dir")
        .arg(dir.path())
        .args(["--store", "rocksdb", "cart", "show"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("cart is empty"))
        .stderr(predicate::str::contains(
            "'storage-rocksdb' feature is not enabled; falling back to the JSON file store",
        ));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(cargo_bin!("cartsync"));
    cmd.env_remove("RUST_LOG")
        .arg("--state-dir")
        .arg(dir.path())
        .args(["--store", "rocksdb", "cart", "show"]);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("falling back").not());
    assert!(dir.path().join("rocksdb").exists());
}
