//! # Calculator Benchmarks
//!
//! - Feed-forward analysis of tandem networks of growing length
//! - Grid and coordinate-descent optimization of the resulting bounds

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use snc_core::analysis::{AnalysisType, BoundType};
use snc_core::ids::{FlowId, VertexId};
use snc_core::network::Network;
use snc_core::optimization::OptimizationType;
use snc_core::symbolic_math::{constant_rate_service, ebb_arrival};
use snc_core::{analyze, optimize};

/// A tandem of `hops` servers crossed by a through flow, with one cross flow per server.
fn tandem(hops: usize) -> (Network, FlowId, VertexId) {
    let mut network = Network::new();
    let vertices: Vec<VertexId> = (0..hops)
        .map(|i| {
            network.add_vertex(
                constant_rate_service(10.0 + i as f64).unwrap(),
                format!("v{}", i),
            )
        })
        .collect();
    let through = network
        .add_flow(
            ebb_arrival(1.0, 5.0, 1.0).unwrap(),
            &vertices,
            &vec![1; hops],
            "through",
        )
        .unwrap();
    for (i, vertex) in vertices.iter().enumerate() {
        network
            .add_flow(ebb_arrival(2.0, 4.0, 1.0).unwrap(), &[*vertex], &[0], format!("cross{}", i))
            .unwrap();
    }
    let last = *vertices.last().unwrap();
    (network, through, last)
}

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    for hops in [2usize, 8, 32].iter() {
        group.throughput(Throughput::Elements(*hops as u64));
        group.bench_with_input(BenchmarkId::from_parameter(hops), hops, |b, &hops| {
            let (network, flow, vertex) = tandem(hops);
            b.iter(|| {
                black_box(analyze(
                    flow,
                    vertex,
                    AnalysisType::Simple,
                    BoundType::Delay,
                    &network,
                ))
            });
        });
    }
    group.finish();
}

fn bench_optimizers(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");
    let (network, flow, vertex) = tandem(3);
    for kind in [OptimizationType::Simple, OptimizationType::Gradient] {
        group.bench_function(format!("{:?}", kind), |b| {
            b.iter(|| {
                black_box(optimize(
                    flow,
                    vertex,
                    0.05,
                    0.5,
                    AnalysisType::Simple,
                    kind,
                    BoundType::Delay,
                    5.0,
                    &network,
                ))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_analysis, bench_optimizers);
criterion_main!(benches);
