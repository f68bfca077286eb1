use super::*;

const TEMPLATE: &str = "Objects:  {\n\
                        \tModel: 2035615390896, \"Model::Cube\", \"Mesh\" {\n\
                        \t}\n\
                        \tModel: 77, \"Model::Cube.001\", \"Null\" {\n\
                        \t}\n\
                        \tAnimationStack: 11, \"AnimStack::Take 001\", \"\" {\n\
                        \t}\n\
                        \tAnimationLayer: 12, \"AnimLayer::Extra\", \"\" {\n\
                        \t}\n\
                        \tAnimationLayer: 13, \"AnimLayer::BaseLayer\", \"\" {\n\
                        \t}\n\
                        }\n\
                        Connections:  {\n\
                        \t;Model::Cube, Model::RootNode\n\
                        \tC: \"OO\",2035615390896,0\n\
                        }\n";

#[test]
fn base_layer_is_preferred_over_other_layers() {
    let conn = ConnectionsManager::new(TEMPLATE);
    assert_eq!(conn.get_animation_base_layer_id().unwrap(), ObjectId(13));
}

#[test]
fn first_layer_is_used_without_base_layer() {
    let conn = ConnectionsManager::new("\tAnimationLayer: 99, \"AnimLayer::Walk\", \"\" {\n");
    assert_eq!(conn.get_animation_base_layer_id().unwrap(), ObjectId(99));
}

#[test]
fn missing_layer_is_not_found() {
    let conn = ConnectionsManager::new("Objects:  {\n}\n");
    assert!(
        conn.get_animation_base_layer_id()
            .unwrap_err()
            .is_not_found()
    );
}

#[test]
fn object_search_matches_exact_names() {
    let conn = ConnectionsManager::new(TEMPLATE);
    assert_eq!(
        conn.search_object_id("Cube").unwrap(),
        ObjectId(2_035_615_390_896)
    );
    assert_eq!(conn.search_object_id("Cube.001").unwrap(), ObjectId(77));
    let err = conn.search_object_id("Sphere").unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("Model::Sphere"));
}

#[test]
fn existing_ids_cover_declared_objects() {
    let conn = ConnectionsManager::new(TEMPLATE);
    let ids = conn.existing_ids().unwrap();
    assert_eq!(
        ids,
        vec![
            ObjectId(2_035_615_390_896),
            ObjectId(77),
            ObjectId(11),
            ObjectId(12),
            ObjectId(13)
        ]
    );
}

#[test]
fn records_render_comment_and_connection_lines() {
    let mut conn = ConnectionsManager::new(TEMPLATE);
    conn.add_connection_item(
        ConnectionKind::AnimCurveNode,
        "T",
        ObjectId(6_000_001),
        "Model",
        "Cube",
        ObjectId(77),
        Relation::ObjectProperty,
        "Lcl Translation",
    );
    conn.add_connection_item(
        ConnectionKind::AnimCurveNode,
        "T",
        ObjectId(6_000_001),
        "AnimLayer",
        "BaseLayer",
        ObjectId(13),
        Relation::ObjectObject,
        "",
    );
    assert_eq!(
        conn.render_records(),
        "\n\t;AnimCurveNode::T, Model::Cube\n\tC: \"OP\",6000001,77, \"Lcl Translation\"\n\
         \n\t;AnimCurveNode::T, AnimLayer::BaseLayer\n\tC: \"OO\",6000001,13\n"
    );
}

#[test]
fn duplicates_are_kept() {
    let mut conn = ConnectionsManager::new("");
    for _ in 0..2 {
        conn.add_connection_item(
            ConnectionKind::AnimCurve,
            "",
            ObjectId(1),
            "AnimCurveNode",
            "T",
            ObjectId(2),
            Relation::ObjectProperty,
            "d|X",
        );
    }
    assert_eq!(conn.records().len(), 2);
}

#[test]
fn curve_before_its_node_is_dangling() {
    let mut conn = ConnectionsManager::new("");
    conn.add_connection_item(
        ConnectionKind::AnimCurve,
        "",
        ObjectId(5),
        "AnimCurveNode",
        "T",
        ObjectId(4),
        Relation::ObjectProperty,
        "d|X",
    );
    assert_eq!(conn.dangling_curve_targets(), vec![ObjectId(4)]);
}

#[test]
fn edit_inserts_before_close_brace_only() {
    let dir = std::env::temp_dir().join(format!("fbxbake_conn_edit_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("scene.fbx");
    let trailer = "Takes:  {\n\tCurrent: \"\"\n}\n";
    std::fs::write(&path, format!("{TEMPLATE}{trailer}")).unwrap();

    let mut conn = ConnectionsManager::new(TEMPLATE);
    conn.add_connection_item(
        ConnectionKind::AnimCurveNode,
        "S",
        ObjectId(6_000_001),
        "AnimLayer",
        "BaseLayer",
        ObjectId(13),
        Relation::ObjectObject,
        "",
    );
    conn.edit_target_file(&path).unwrap();

    let out = std::fs::read_to_string(&path).unwrap();
    let expected_head = TEMPLATE.strip_suffix("}\n").unwrap();
    assert!(out.starts_with(expected_head));
    assert!(out.ends_with(&format!(
        "\tC: \"OO\",2035615390896,0\n\n\t;AnimCurveNode::S, AnimLayer::BaseLayer\n\tC: \"OO\",6000001,13\n}}\n{trailer}"
    )));
    let _ = std::fs::remove_dir_all(&dir);
}

const TWIN_HANDS: &str = "Objects:  {\n\
                          \tModel: 10, \"Model::Arm_L\", \"Null\" {\n\
                          \t}\n\
                          \tModel: 11, \"Model::Hand\", \"Null\" {\n\
                          \t}\n\
                          \tModel: 20, \"Model::Arm_R\", \"Null\" {\n\
                          \t}\n\
                          \tModel: 21, \"Model::Hand\", \"Null\" {\n\
                          \t}\n\
                          }\n\
                          Connections:  {\n\
                          \tC: \"OO\",10,0\n\
                          \tC: \"OO\",11,10\n\
                          \tC: \"OO\",20,0\n\
                          \tC: \"OO\",21,20\n\
                          }\n";

#[test]
fn path_picks_between_same_named_models() {
    let conn = ConnectionsManager::new(TWIN_HANDS);
    assert_eq!(conn.search_object_id_by_path("Arm_L/Hand").unwrap(), ObjectId(11));
    assert_eq!(conn.search_object_id_by_path("Arm_R/Hand").unwrap(), ObjectId(21));
    assert_eq!(conn.search_object_id("Hand").unwrap(), ObjectId(11));
}

#[test]
fn path_lookup_uses_bare_model_name() {
    let conn = ConnectionsManager::new(TEMPLATE);
    assert_eq!(
        conn.search_object_id_by_path("Rig/Body/Cube").unwrap(),
        ObjectId(2_035_615_390_896)
    );
}

#[test]
fn unmatched_hierarchy_falls_back_to_first_by_name() {
    let conn = ConnectionsManager::new(TWIN_HANDS);
    assert_eq!(conn.search_object_id_by_path("Leg/Hand").unwrap(), ObjectId(11));
    assert!(
        conn.search_object_id_by_path("Arm_L/Foot")
            .unwrap_err()
            .is_not_found()
    );
    assert!(conn.search_object_id_by_path("/").unwrap_err().is_not_found());
}
