//! Mover tuning loads from an overridden data root.

use data_runtime::configs::mover::MoverTuning;
use std::fs;

#[test]
fn env_override_root_is_honored() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("config")).unwrap();
    fs::write(
        dir.path().join("config/mover.json"),
        r#"{"run_speed": 3.5, "jump_power": 6.0}"#,
    )
    .unwrap();
    // Serialized via env var; safe as long as this is the only test in the
    // binary touching DATA_ROOT_FOR_TESTS.
    std::env::set_var("DATA_ROOT_FOR_TESTS", dir.path());
    let t = MoverTuning::load_default().expect("load");
    std::env::remove_var("DATA_ROOT_FOR_TESTS");
    assert!((t.run_speed - 3.5).abs() < f32::EPSILON);
    assert!((t.jump_power - 6.0).abs() < f32::EPSILON);
    // Untouched fields keep shipped defaults.
    assert!((t.gravity_modifier - 19.291_105).abs() < 1e-6);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    // No override set; workspace has no data/config/mover.json in tests.
    let t = MoverTuning::default();
    assert!((t.fixed_step - 1.0 / 60.0).abs() < 1e-9);
}
