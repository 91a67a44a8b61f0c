use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flight_core::{FlightRecord, GeoConfig, Trajectory};
use flight_tracker::{TrackerConfig, TrajectoryBuilder};

fn synthetic_flight(len: u64) -> Trajectory {
    let records: Vec<FlightRecord> = (0..len)
        .map(|i| {
            let t = i as f64;
            FlightRecord::new(
                50.0 + 0.0004 * t,
                20.0 + 0.0007 * t + 0.0001 * (t / 7.0).sin(),
                250.0 + 10.0 * (t / 11.0).cos(),
                (60.0 + 0.5 * t) % 360.0,
                i * 73,
            )
        })
        .collect();
    Trajectory::from_records(&records, &GeoConfig::default()).unwrap()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    let builder = TrajectoryBuilder::new(TrackerConfig::default()).unwrap();

    for len in [100u64, 1_000] {
        let flight = synthetic_flight(len);

        group.bench_function(format!("dead_reckoning_{}", len), |b| {
            b.iter(|| black_box(builder.build_dead_reckoning(black_box(&flight)).unwrap()))
        });

        group.bench_function(format!("kalman_{}", len), |b| {
            b.iter(|| black_box(builder.build_kalman(black_box(&flight)).unwrap()))
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let flight = synthetic_flight(10_000);
    let (start, end) = flight.time_span();

    c.bench_function("trajectory_at", |b| {
        b.iter(|| {
            let mut t = start;
            while t < end {
                black_box(flight.at(black_box(t)).unwrap());
                t += 997;
            }
        })
    });
}

criterion_group!(benches, bench_build, bench_lookup);
criterion_main!(benches);
