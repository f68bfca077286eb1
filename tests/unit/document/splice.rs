use super::*;

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "fbxbake_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn splice_keeps_head_and_tail() {
    let text = "head\nMIDDLE\ntail\n";
    let out = splice(text, 5, 12, "new\n").unwrap();
    assert_eq!(out, "head\nnew\ntail\n");
}

#[test]
fn splice_rejects_bad_ranges() {
    assert!(splice("abc", 2, 1, "").is_err());
    assert!(splice("abc", 0, 4, "").is_err());
    assert!(splice("é", 1, 2, "").is_err());
}

#[test]
fn write_staged_replaces_target_and_cleans_up() {
    let dir = temp_dir("write_staged");
    std::fs::create_dir_all(&dir).unwrap();
    let target = dir.join("out.fbx");
    std::fs::write(&target, "old").unwrap();

    write_staged(&target, "new contents", &dir).unwrap();

    assert_eq!(read_text(&target).unwrap(), "new contents");
    let leftovers = std::fs::read_dir(&dir)
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .file_name()
                .to_string_lossy()
                .ends_with(".partial")
        })
        .count();
    assert_eq!(leftovers, 0);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn read_missing_file_names_path() {
    let err = read_text(std::path::Path::new("/definitely/not/here.fbx")).unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.fbx"));
}

#[test]
fn failed_copy_fallback_removes_staging_file() {
    let dir = temp_dir("write_staged_fail");
    let scratch = dir.join("scratch");
    let target = dir.join("out.fbx");
    std::fs::create_dir_all(target.join("occupied")).unwrap();

    assert!(write_staged(&target, "new contents", &scratch).is_err());

    assert!(target.is_dir());
    assert_eq!(std::fs::read_dir(&scratch).unwrap().count(), 0);
    let _ = std::fs::remove_dir_all(&dir);
}
