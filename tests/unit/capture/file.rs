use super::*;
use glam::Vec3;

#[test]
fn parses_objects_with_optional_fields() {
    let json = r#"{
        "objects": [
            { "name": "Rig", "is_root": true },
            {
                "name": "Cube",
                "path": "/Rig//Cube",
                "rest": { "position": [0, 1, 0] },
                "positions": [[0, 0, 0], [1, 0, 0], [2, 0, 0]]
            }
        ]
    }"#;
    let capture = CaptureFile::from_reader(json.as_bytes()).unwrap();
    assert_eq!(capture.objects.len(), 2);

    let tracked = capture.into_tracked();
    assert!(tracked[0].is_root);
    assert!(tracked[0].samples.is_empty());

    let cube = &tracked[1];
    assert_eq!(cube.path.as_deref(), Some("Rig/Cube"));
    assert_eq!(cube.rest.position, Vec3::Y);
    assert_eq!(cube.rest.scale, Vec3::ONE);
    assert_eq!(cube.samples.positions[2], Vec3::new(2.0, 0.0, 0.0));
    assert!(cube.samples.rotations.is_empty());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = CaptureFile::from_reader("{ \"objects\": [ { } ] }".as_bytes()).unwrap_err();
    assert!(matches!(err, BakeError::Serde(_)));
}

#[test]
fn blank_names_are_rejected() {
    let err = CaptureFile::from_reader(r#"{ "objects": [ { "name": " " } ] }"#.as_bytes())
        .unwrap_err();
    assert!(err.to_string().contains("no name"));
}

#[test]
fn missing_file_is_a_configuration_error() {
    let err = CaptureFile::from_path("/definitely/not/here/capture.json").unwrap_err();
    assert!(matches!(err, BakeError::Configuration(_)));
}
