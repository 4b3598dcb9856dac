//! Almacenamiento de objetos en disco.

use saberes_core::ObjectStorage;
use saberes_persistence::FsObjectStorage;

#[test]
fn upload_publishes_under_bucket_and_rejects_overwrite() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut st = FsObjectStorage::new(dir.path(), "https://cdn.saberes.org/storage/");
    let url = st.upload("user-1/100-foto.png", b"png").expect("upload");
    assert_eq!(url, "https://cdn.saberes.org/storage/spaces/user-1/100-foto.png");
    assert_eq!(std::fs::read(dir.path().join("spaces/user-1/100-foto.png")).unwrap(), b"png");
    assert_eq!(st.path_from_url(&url).as_deref(), Some("user-1/100-foto.png"));

    let err = st.upload("user-1/100-foto.png", b"again").unwrap_err();
    assert!(err.message.contains("already exists"));
}

#[test]
fn remove_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut st = FsObjectStorage::new(dir.path(), "http://localhost");
    st.upload("a/1-x.png", b"x").unwrap();
    st.remove("a/1-x.png").unwrap();
    st.remove("a/1-x.png").unwrap();
    assert!(!dir.path().join("spaces/a/1-x.png").exists());
}

#[test]
fn traversal_paths_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut st = FsObjectStorage::new(dir.path(), "http://localhost");
    assert!(st.upload("../escape.png", b"x").is_err());
    assert!(st.upload("/etc/passwd", b"x").is_err());
    assert!(st.upload("", b"x").is_err());
}
