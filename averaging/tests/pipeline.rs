use std::path::Path;

use averaging::{
    aggregate::AGGREGATE_CSV_COLUMNS,
    metadata::METADATA_CSV_COLUMNS,
    pipeline::{self, PipelineConfig},
    settings::BudgetPolicy,
    Error,
};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 3, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn write_metadata(dir: &Path, rows: &[(&str, &str, &str, &str, u32)]) {
    let mut content = METADATA_CSV_COLUMNS.join(",");
    content.push('\n');
    for (dataset, search, strategy, size, budget) in rows {
        content.push_str(&format!("{dataset},{search},{strategy},{size},{budget}\n"));
    }
    std::fs::write(dir.join("metadata.csv"), content).unwrap();
}

/// Writes a raw result file sampled every `step` seconds, with a pandas-like index column.
fn write_raw(dir: &Path, name: &str, budget: i64, step: i64, offset: f64) {
    let mut content =
        String::from(",Timestamp,single_best_optimization_score,single_best_test_score\n");
    let mut second = 0;
    let mut row = 0;
    while second <= budget {
        let ts = start_time() + TimeDelta::seconds(second) + TimeDelta::milliseconds(300);
        let score = offset + second as f64 / (budget as f64 * 10.0);
        content.push_str(&format!(
            "{row},{},{score},{}\n",
            ts.format("%Y-%m-%d %H:%M:%S%.6f"),
            score / 2.0
        ));
        second += step;
        row += 1;
    }
    std::fs::write(dir.join(name), content).unwrap();
}

fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), AGGREGATE_CSV_COLUMNS);
    reader.records().map(|r| r.unwrap()).collect()
}

fn list_dir(path: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(path)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn averages_ten_splits_into_one_file() {
    let input = tempfile::tempdir().unwrap();
    write_metadata(input.path(), &[("ALOI", "ue", "balanced", "100", 100)]);
    for split in 1..=10 {
        write_raw(
            input.path(),
            &format!("ALOI_{split}_ue_balanced_100.csv"),
            100,
            7,
            split as f64 / 100.0,
        );
    }

    let config = PipelineConfig::new(input.path());
    let report = pipeline::run(&config).unwrap();

    assert_eq!(report.written.len(), 1);
    assert_eq!(report.written[0].num_splits, 10);
    assert!(report.skipped.is_empty());
    assert_eq!(list_dir(&config.output_dir), vec!["ALOI_ue_balanced_100"]);

    let rows = read_rows(&config.output_dir.join("ALOI_ue_balanced_100"));
    assert_eq!(rows.len(), 100);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row[0].parse::<i64>().unwrap(), i as i64 + 1);
        let optimization_std: f64 = row[3].parse().unwrap();
        let test_std: f64 = row[4].parse().unwrap();
        assert!(optimization_std > 0.0);
        assert!(test_std > 0.0);
    }

    // splits only differ by a constant offset: mean offset is 0.055
    let first: f64 = rows[0][1].parse().unwrap();
    assert!((first - 0.055).abs() < 1e-9, "{first}");
}

#[test]
fn only_individual_runs_produce_nothing() {
    let input = tempfile::tempdir().unwrap();
    let sentinel = BudgetPolicy::default().individual_run_budget as u32;
    write_metadata(
        input.path(),
        &[
            ("ALOI", "ue", "balanced", "100", sentinel),
            ("Wilt", "bo", "stratified", "50", sentinel),
        ],
    );
    write_raw(input.path(), "ALOI_1_ue_balanced_100.csv", 60, 5, 0.1);

    let config = PipelineConfig::new(input.path());
    let report = pipeline::run(&config).unwrap();

    assert!(report.written.is_empty());
    assert!(report.skipped.is_empty());
    assert!(list_dir(&config.output_dir).is_empty());
}

#[test]
fn empty_group_is_skipped() {
    let input = tempfile::tempdir().unwrap();
    write_metadata(
        input.path(),
        &[
            ("ALOI", "ue", "balanced", "100", 30),
            ("ALOI", "ue", "stratified", "100", 30),
        ],
    );
    write_raw(input.path(), "ALOI_1_ue_balanced_100.csv", 30, 3, 0.2);
    write_raw(input.path(), "ALOI_2_ue_balanced_100.csv", 30, 4, 0.3);

    let mut config = PipelineConfig::new(input.path());
    config.write_manifest = true;
    let report = pipeline::run(&config).unwrap();

    assert_eq!(report.written.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].1.token(), "ue_stratified_100");
    assert_eq!(
        list_dir(&config.output_dir),
        vec!["ALOI_ue_balanced_100", "manifest.csv"]
    );
    assert_eq!(
        read_rows(&config.output_dir.join("ALOI_ue_balanced_100")).len(),
        30
    );

    let mut manifest = csv::Reader::from_path(config.output_dir.join("manifest.csv")).unwrap();
    let records: Vec<csv::StringRecord> = manifest.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][0], "ALOI");
    assert_eq!(&records[0][4], "2");
}

#[test]
fn existing_output_dir_aborts() {
    let input = tempfile::tempdir().unwrap();
    write_metadata(input.path(), &[("ALOI", "ue", "balanced", "100", 20)]);
    write_raw(input.path(), "ALOI_1_ue_balanced_100.csv", 20, 2, 0.1);

    let config = PipelineConfig::new(input.path());
    std::fs::create_dir(&config.output_dir).unwrap();

    assert!(matches!(
        pipeline::run(&config),
        Err(Error::OutputDirExists(_))
    ));
    assert!(list_dir(&config.output_dir).is_empty());
}

#[test]
fn missing_score_column_aborts() {
    let input = tempfile::tempdir().unwrap();
    write_metadata(input.path(), &[("ALOI", "ue", "balanced", "100", 20)]);
    std::fs::write(
        input.path().join("ALOI_1_ue_balanced_100.csv"),
        "Timestamp,single_best_optimization_score\n2023-03-01 10:00:00,0.5\n",
    )
    .unwrap();

    let config = PipelineConfig::new(input.path());
    assert!(matches!(
        pipeline::run(&config),
        Err(Error::MissingColumn { .. })
    ));
}

#[test]
fn missing_metadata_aborts() {
    let input = tempfile::tempdir().unwrap();
    let config = PipelineConfig::new(input.path());
    assert!(matches!(
        pipeline::run(&config),
        Err(Error::Metadata { .. })
    ));
    assert!(!config.output_dir.exists());

    // a corrected rerun is not blocked by a leftover output directory
    write_metadata(input.path(), &[("ALOI", "ue", "balanced", "100", 20)]);
    write_raw(input.path(), "ALOI_1_ue_balanced_100.csv", 20, 2, 0.1);
    let report = pipeline::run(&config).unwrap();
    assert_eq!(report.written.len(), 1);
}

#[test]
fn baseline_uses_fallback_budget() {
    let input = tempfile::tempdir().unwrap();
    write_metadata(
        input.path(),
        &[
            ("Wilt", "default", "balanced", "100", 0),
            ("Wilt", "bo", "balanced", "100", 50),
        ],
    );
    write_raw(input.path(), "Wilt_1_default_balanced_100.csv", 10, 1, 0.5);
    write_raw(input.path(), "Wilt_1_bo_balanced_100.csv", 40, 2, 0.5);

    let mut config = PipelineConfig::new(input.path());
    config.policy.baseline_budget = 45;
    let report = pipeline::run(&config).unwrap();

    assert_eq!(report.written.len(), 2);
    for output in &report.written {
        assert_eq!(read_rows(&output.path).len(), 45);
    }
}
