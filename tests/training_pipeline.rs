//! End-to-end training runs: dataset file in, artifact file out.

use std::path::Path;

use bcw::{
    run_training, ModelArtifact, PipelineError, TrainingConfig, FEATURE_COUNT, FEATURE_NAMES,
};

/// Write `n` UCI-layout rows; malignant samples run larger on every feature.
fn write_wdbc(path: &Path, n: usize, seed: u64) {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut out = String::new();
    for i in 0..n {
        let malignant = rng.f64() < 0.37;
        let values: Vec<String> = (0..FEATURE_COUNT)
            .map(|j| {
                let base = (j as f64 + 1.0) * if malignant { 1.5 } else { 1.0 };
                format!("{:.5}", base * (0.8 + 0.4 * rng.f64()))
            })
            .collect();
        let code = if malignant { "M" } else { "B" };
        out.push_str(&format!("{},{},{}\n", 842302 + i, code, values.join(",")));
    }
    std::fs::write(path, out).expect("write dataset");
}

fn config_for(dir: &Path) -> TrainingConfig {
    let mut cfg = TrainingConfig::default();
    cfg.dataset.path = dir.join("wdbc.data");
    cfg.output.artifact_path = dir.join("model.json");
    cfg.output.log_file = None;
    cfg
}

#[test]
fn training_writes_a_loadable_artifact() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_wdbc(&dir.path().join("wdbc.data"), 569, 7);
    let cfg = config_for(dir.path());

    let report = run_training(&cfg).expect("training");
    assert_eq!(report.artifact_path, cfg.output.artifact_path);

    let training = &report.artifact.training;
    assert_eq!(training.train_samples + training.test_samples, 569);
    // ceil(569 * 0.2)
    assert_eq!(training.test_samples, 114);
    assert!(training.fit.converged);

    let metrics = report.evaluation().expect("held-out metrics");
    assert_eq!(metrics.samples, 114);
    assert!(metrics.accuracy > 0.9, "{metrics:?}");

    let loaded = ModelArtifact::load(&cfg.output.artifact_path).expect("load");
    assert_eq!(loaded, report.artifact);
    assert_eq!(loaded.model.n_features(), FEATURE_COUNT);
    assert_eq!(loaded.model.feature_names[0], FEATURE_NAMES[0]);
    assert_eq!(loaded.model.classes, vec!["malignant", "benign"]);
}

#[test]
fn retraining_with_same_seed_is_reproducible() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_wdbc(&dir.path().join("wdbc.data"), 200, 11);
    let cfg = config_for(dir.path());

    let first = run_training(&cfg).expect("first run").artifact;
    let second = run_training(&cfg).expect("second run").artifact;
    assert_eq!(first.model, second.model);
    assert_eq!(first.evaluation, second.evaluation);
}

#[test]
fn yaml_config_drives_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data = dir.path().join("wdbc.data");
    let artifact = dir.path().join("out").join("model.json");
    write_wdbc(&data, 150, 3);
    std::fs::create_dir_all(artifact.parent().expect("parent")).expect("mkdir");

    let yaml = format!(
        "version: \"1.0\"\nname: test\ndataset:\n  path: {:?}\n  test_fraction: 0.25\n  seed: 9\nmodel:\n  c: 0.5\noutput:\n  artifact_path: {:?}\n  log_file: null\n",
        data, artifact
    );
    let cfg = TrainingConfig::from_yaml(&yaml).expect("yaml");
    let report = run_training(&cfg).expect("training");

    assert!(artifact.exists());
    assert_eq!(report.artifact.training.seed, 9);
    assert_eq!(report.artifact.training.test_samples, 38);
    assert_eq!(report.artifact.training.solver.c, 0.5);
}

#[test]
fn malformed_dataset_leaves_no_artifact() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("wdbc.data"), "842302,X,1.0,2.0\n").expect("write");
    let cfg = config_for(dir.path());

    let err = run_training(&cfg).unwrap_err();
    assert!(matches!(err, PipelineError::Dataset(_)), "{err}");
    assert!(!cfg.output.artifact_path.exists());
}
