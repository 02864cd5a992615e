use motifweek::graph::{ExternalId, Status};
use motifweek::{PeriodDriver, PipelineConfig, PipelineError, SampleSpec};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SIGNUPS: &[&str] = &[
    "L1|L0|080620|09:00:00|10|1|1",
    "L2|L0|080703|09:00:00|10|1|1",
    "L3|L0|080710|09:00:00|10|1|1",
    "L9|L0|080711|09:00:00|-|1|1",
    "L4|L0|080717|09:00:00|10|1|1",
];

const CALLS: &[&str] = &[
    // period 0: 080701 .. 080708
    "L1|L2|080702|10:00:00|5|1|2",
    "L2|L1|080702|10:05:00|5|2|1",
    "L1|L3|080702|11:00:00|5|1|3",
    "L3|L1|080702|11:05:00|5|3|1",
    "L2|L3|080703|10:00:00|5|2|3",
    "L3|L2|080703|10:05:00|5|3|2",
    "L5|L1|080704|10:00:00|5|5|1",
    "garbage line",
    "L6|L7|080705|10:00:00|5|6|7",
    "L7|L6|080705|10:05:00|5|7|6",
    // period 1: 080708 .. 080715
    "L1|L4|080709|10:00:00|5|1|4",
    "L4|L1|080709|10:05:00|5|4|1",
    "L3|L4|080710|10:00:00|5|3|4",
    "L4|L3|080710|10:05:00|5|4|3",
    "L6|L7|080711|10:00:00|-|6|7",
    "L6|L7|080711|10:00:01|5|6|7",
    "L7|L6|080711|10:05:00|5|7|6",
    "L5|L6|080712|10:00:00|5|5|6",
    "L6|L5|080712|10:05:00|5|6|5",
];

fn write_lines(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

fn setup(dir: &Path) -> PipelineConfig {
    let signup = write_lines(dir, "mm.txt", SIGNUPS);
    let calls = write_lines(dir, "me.txt", CALLS);
    let out = dir.join("out");
    fs::create_dir_all(&out).unwrap();

    let mut config = PipelineConfig::new(signup, vec![calls], "080701", "080715");
    config.sampling.seed = Some(11);
    config.output.dir = out.clone();
    config.output.report = Some(out.join("report.jsonl"));
    config
}

fn externals(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line.split('\t').next().unwrap().to_string())
        .collect()
}

#[test]
fn test_two_period_run() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());
    let out = config.output.dir.clone();

    let mut driver = PeriodDriver::new(config).unwrap();
    let reports = driver.run().unwrap();
    assert_eq!(reports.len(), 2);

    // period 0: L5 only ever sent once to L1 and is dropped
    let first = &reports[0];
    assert_eq!(first.outlier.removed_isolated, 1);
    assert_eq!(first.outlier.surviving, 5);
    assert_eq!(first.outlier.stream.malformed, 1);
    assert_eq!(first.label.existing, 2);
    assert_eq!(first.label.adopted, 1);
    assert_eq!(externals(&out.join("all0.txt")), ["1", "2", "3", "6", "7"]);
    assert_eq!(externals(&out.join("adopted0.txt")), ["3"]);
    assert_eq!(externals(&out.join("unobserved0.txt")), ["6", "7"]);

    // mutual tie between two unlabelled nodes, in canonical order
    let unobserved = fs::read_to_string(out.join("unobserved0.txt")).unwrap();
    let zeros = "0,0,0,0,0,0,0,0,0,0,0,0";
    let mutual = "0,0,0,0,1,0,0,0,0,0,0,0";
    assert_eq!(
        unobserved.lines().next().unwrap(),
        format!("6\t0\t0\t{}\t{}\t{}", mutual, zeros, mutual)
    );

    // period 1: L2 is silent and dropped, L5 returns under a fresh id
    let second = &reports[1];
    assert_eq!(second.outlier.removed(), 1);
    assert_eq!(second.label.adopted, 1);
    assert_eq!(externals(&out.join("all1.txt")), ["1", "3", "6", "7", "4", "5"]);
    assert_eq!(externals(&out.join("adopted1.txt")), ["4"]);
    assert_eq!(externals(&out.join("unobserved1.txt")), ["6", "7", "5"]);

    let graph = driver.graph();
    assert!(graph.check_consistency().is_ok());
    assert!(graph.resolve(ExternalId::parse("L2").unwrap()).live().is_none());
    let l3 = graph.resolve(ExternalId::parse("L3").unwrap()).live().unwrap();
    assert_eq!(graph.get(l3).unwrap().status(), Status::Existing);

    let report = fs::read_to_string(out.join("report.jsonl")).unwrap();
    assert_eq!(report.lines().count(), 2);
    assert!(report.lines().all(|line| line.contains("\"cutoffs\"")));
}

#[test]
fn test_frequencies_survive_filtering() {
    let dir = TempDir::new().unwrap();
    let mut config = setup(dir.path());
    config.schedule.end = "080708".to_string();

    let mut driver = PeriodDriver::new(config).unwrap();
    driver.run().unwrap();

    let graph = driver.graph();
    let l6 = graph.resolve(ExternalId::parse("L6").unwrap()).live().unwrap();
    let record = graph.get(l6).unwrap();
    assert_eq!((record.in_freq, record.out_freq), (1, 1));
    assert_eq!(record.working_edges(), 0);
}

#[test]
fn test_seeded_runs_match() {
    let run = || {
        let dir = TempDir::new().unwrap();
        let mut config = setup(dir.path());
        config.sampling.calls = vec![SampleSpec {
            len: Some(2),
            outcome: None,
            indep: true,
        }];
        let out = config.output.dir.clone();
        PeriodDriver::new(config).unwrap().run().unwrap();
        (fs::read_to_string(out.join("all0.txt")).unwrap(), fs::read_to_string(out.join("all1.txt")).unwrap())
    };

    let (first0, first1) = run();
    assert_eq!(first0.lines().count(), 2);
    assert_eq!((first0, first1), run());
}

#[test]
fn test_missing_log_aborts() {
    let dir = TempDir::new().unwrap();
    let mut config = setup(dir.path());
    config.interaction_logs.push(dir.path().join("missing.txt"));
    // the second log is only opened once the first is exhausted
    config.schedule.end = "080729".to_string();

    let mut driver = PeriodDriver::new(config).unwrap();
    assert!(matches!(driver.run(), Err(PipelineError::Ingest(_))));
}

#[test]
fn test_invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    let mut config = setup(dir.path());
    config.filter.percentile = 2.0;
    assert!(matches!(PeriodDriver::new(config), Err(PipelineError::Config(_))));
}
