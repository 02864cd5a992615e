use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use motifweek::algo::{aggregate_motifs, percentile, EgoCensus};
use motifweek::graph::{EventTime, ExternalId, Status, TemporalGraph};
use motifweek::ingest::{outlier_pass, OutlierParams, PeriodWindow};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use tempfile::NamedTempFile;

fn window() -> PeriodWindow {
    PeriodWindow::new(
        0,
        EventTime::parse_boundary("080701").unwrap(),
        EventTime::parse_boundary("080708").unwrap(),
        EventTime::parse_boundary("080715").unwrap(),
    )
    .unwrap()
}

/// Random interaction log with `records` lines over `nodes` actors
fn interaction_log(nodes: u64, records: usize) -> NamedTempFile {
    let mut rng = StdRng::seed_from_u64(17);
    let mut file = NamedTempFile::new().unwrap();
    for i in 0..records {
        let s = rng.gen_range(0..nodes);
        let r = rng.gen_range(0..nodes);
        let secs = i * 600_000 / records;
        writeln!(
            file,
            "L{}|L{}|0807{:02}|{:02}:{:02}:{:02}|5|1|2",
            s,
            r,
            2 + secs / 86_400,
            secs % 86_400 / 3600,
            secs % 3600 / 60,
            secs % 60
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}

/// Benchmark the outlier pass over logs of growing size
fn bench_outlier_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("outlier_pass");
    group.sample_size(10);

    for records in [10_000usize, 100_000].iter() {
        let log = interaction_log(2_000, *records);
        group.bench_with_input(BenchmarkId::from_parameter(records), records, |b, _| {
            b.iter(|| {
                let mut graph = TemporalGraph::new();
                outlier_pass(&mut graph, &[log.path()], &window(), &OutlierParams::default(), None)
                    .unwrap()
            });
        });
    }
    group.finish();
}

/// Benchmark the census over random graphs
fn bench_motif_census(c: &mut Criterion) {
    let mut group = c.benchmark_group("motif_census");

    for size in [1_000u64, 10_000].iter() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut graph = TemporalGraph::new();
        let ids: Vec<_> = (0..*size)
            .map(|i| {
                let status = if i % 3 == 0 { Status::Existing } else { Status::Unobserved };
                graph.insert(ExternalId(i), status).live().unwrap()
            })
            .collect();
        for _ in 0..*size * 5 {
            let a = ids[rng.gen_range(0..ids.len())];
            let b = ids[rng.gen_range(0..ids.len())];
            if let Some((s, r)) = graph.get_pair_mut(a, b) {
                let (s_lab, r_lab) = (s.status().is_labelled(), r.status().is_labelled());
                s.link_to(b, r_lab);
                r.link_from(a, s_lab);
            }
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| aggregate_motifs(&mut graph, &EgoCensus).unwrap());
        });
    }
    group.finish();
}

/// Benchmark nearest-rank percentile selection
fn bench_percentile(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(5);
    let values: Vec<u64> = (0..1_000_000).map(|_| rng.gen_range(0..10_000)).collect();

    c.bench_function("percentile_1m", |b| {
        b.iter(|| {
            let mut column = values.clone();
            criterion::black_box(percentile(&mut column, 0.99))
        });
    });
}

criterion_group!(benches, bench_outlier_pass, bench_motif_census, bench_percentile);
criterion_main!(benches);
