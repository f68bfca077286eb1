use super::*;
use chrono::TimeZone as _;

fn temp_dir(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "fbxbake_cfg_{tag}_{}_{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn defaults_match_documented_values() {
    let cfg = ExportConfig::default();
    assert_eq!(cfg.output_dir, PathBuf::from("Exports"));
    assert_eq!(cfg.frame_rate, 24);
    assert_eq!(cfg.id_floor, 6_000_001);
    assert_eq!(cfg.sanitize_marker, "PreRotation");
    assert!(!cfg.include_path_name);
    assert!(cfg.validate().is_ok());
}

#[test]
fn default_output_name_is_timestamped() {
    let t = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
    assert_eq!(default_output_name(t), "capture_20240309_070501.fbx");
}

#[test]
fn resolved_output_path_joins_dir_and_name() {
    let mut cfg = ExportConfig::default();
    cfg.output_dir = PathBuf::from("out");
    cfg.output_file = Some("take.fbx".to_owned());
    assert_eq!(cfg.resolved_output_path(), PathBuf::from("out/take.fbx"));

    cfg.output_file = None;
    let generated = cfg.resolved_output_path();
    let name = generated.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("capture_") && name.ends_with(".fbx"));
}

#[test]
fn validate_rejects_bad_values() {
    let mut cfg = ExportConfig::default();
    cfg.frame_rate = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = ExportConfig::default();
    cfg.sanitize_marker.clear();
    assert!(cfg.validate().is_err());

    let mut cfg = ExportConfig::default();
    cfg.output_file = Some("../escape.fbx".to_owned());
    assert!(cfg.validate().is_err());
}

#[test]
fn id_floor_must_leave_room_to_mint() {
    let mut cfg = ExportConfig::default();
    cfg.id_floor = i64::MAX;
    assert!(matches!(cfg.validate(), Err(BakeError::Configuration(_))));
    cfg.id_floor = MAX_ID_FLOOR;
    assert!(cfg.validate().is_ok());
    cfg.id_floor = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn template_is_required() {
    let err = ExportConfig::default().template().unwrap_err();
    assert!(matches!(err, BakeError::Configuration(_)));
    let cfg = ExportConfig::for_template("scene.fbx");
    assert_eq!(cfg.template().unwrap(), Path::new("scene.fbx"));
}

#[test]
fn from_path_fills_missing_keys_with_defaults() {
    let dir = temp_dir("load");
    let path = dir.join("cfg.json");
    std::fs::write(&path, r#"{ "frame_rate": 30, "output_file": "a.fbx" }"#).unwrap();
    let cfg = ExportConfig::from_path(&path).unwrap();
    assert_eq!(cfg.frame_rate, 30);
    assert_eq!(cfg.output_file.as_deref(), Some("a.fbx"));
    assert_eq!(cfg.id_floor, DEFAULT_ID_FLOOR);

    std::fs::write(&path, r#"{ "frame_rate": 0 }"#).unwrap();
    assert!(ExportConfig::from_path(&path).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
