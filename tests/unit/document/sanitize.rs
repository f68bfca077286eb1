use super::*;

const SAMPLE: &str = "Model: 1, \"Model::Arm\", \"Null\" {\n\
                      \tProperties70:  {\n\
                      \t\tP: \"PreRotation\", \"Vector3D\", \"Vector\", \"\",-90,0,12.5\r\n\
                      \t\tP: \"Lcl Rotation\", \"Lcl Rotation\", \"\", \"A\",1,2,3\n\
                      \t}\n\
                      }";

#[test]
fn marker_lines_are_zeroed_keeping_indent() {
    let (out, n) = sanitize_counted(SAMPLE, DEFAULT_SANITIZE_MARKER);
    assert_eq!(n, 1);
    assert!(out.contains(
        "\n\t\tP: \"PreRotation\", \"Vector3D\", \"Vector\", \"\",0,0,0\r\n"
    ));
    assert!(out.contains("\"Lcl Rotation\", \"\", \"A\",1,2,3\n"));
    assert!(out.ends_with("\t}\n}"));
}

#[test]
fn sanitization_is_idempotent() {
    let once = sanitize(SAMPLE, DEFAULT_SANITIZE_MARKER);
    let twice = sanitize(&once, DEFAULT_SANITIZE_MARKER);
    assert_eq!(once, twice);
}

#[test]
fn text_without_marker_is_byte_identical() {
    let text = "A: 1\r\nB: 2\n\nC: 3";
    assert_eq!(sanitize(text, DEFAULT_SANITIZE_MARKER), text);
    assert_eq!(sanitize(SAMPLE, ""), SAMPLE);
}

#[test]
fn copy_with_missing_template_writes_nothing() {
    let out = std::env::temp_dir().join(format!("fbxbake_sanitize_missing_{}.fbx", std::process::id()));
    let _ = std::fs::remove_file(&out);
    let err = copy_sanitized(Path::new("/no/such/template.fbx"), &out, DEFAULT_SANITIZE_MARKER)
        .unwrap_err();
    assert!(matches!(err, BakeError::Configuration(_)));
    assert!(!out.exists());
}
