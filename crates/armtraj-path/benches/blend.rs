use armtraj_math::Pose;
use armtraj_path::{resolve_and_blend, Motion, PoseChain, TrajectorySettings};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// A zig-zag of line corners followed by two arcs.
fn build_chain(corners: usize) -> (PoseChain, Motion) {
    let mut chain = PoseChain::new();
    let mut ids = Vec::with_capacity(corners + 1);
    for i in 0..=corners {
        let y = if i % 2 == 0 { 0.0 } else { 50.0 };
        ids.push(chain.insert(Pose::new(i as f64 * 40.0, y, 100.0, 0.0, 90.0, i as f64)));
    }
    for pair in ids.windows(2) {
        chain
            .set_blend(pair[0], Motion::Lin(pair[1]), 5.0)
            .expect("waypoints exist");
    }
    let x = corners as f64 * 40.0;
    let last = ids[corners];
    let top = chain.insert(Pose::new(x + 50.0, 100.0, 100.0, 0.0, 90.0, 0.0));
    let end = chain.insert(Pose::new(x, 200.0, 100.0, 0.0, 90.0, 0.0));
    let arc_start = chain.insert(chain.pose(last).expect("waypoint exists"));
    chain
        .set_blend(last, Motion::Circ([arc_start, top, end]), 5.0)
        .expect("waypoints exist");
    (chain, Motion::Lin(ids[0]))
}

fn bench_blend(c: &mut Criterion) {
    let settings = TrajectorySettings::default();
    let mut group = c.benchmark_group("resolve_and_blend");
    for corners in [4, 32, 256] {
        let (chain, head) = build_chain(corners);
        group.bench_function(format!("{corners}_corners"), |b| {
            b.iter(|| {
                resolve_and_blend(
                    black_box(&chain),
                    Some(Pose::at(-40.0, 0.0, 100.0)),
                    head,
                    black_box(&settings),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_blend);
criterion_main!(benches);
