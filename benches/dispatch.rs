use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use quetzal::event::MergeRequestEvent;
use quetzal::{
    ActionSet, ConditionSet, Dispatcher, DispatcherConfig, EventAdapter, EventKind, MatchContext,
    MatchingEngine, Policy, RemoteClient, RemoteError, Target,
};

/// Accepts every call without recording it.
struct NullClient;

impl RemoteClient for NullClient {
    fn update_labels(&self, _: &Target, _: &[String], _: &[String]) -> Result<String, RemoteError> {
        Ok(String::new())
    }

    fn update_state(&self, _: &Target, _: &str) -> Result<String, RemoteError> {
        Ok(String::new())
    }

    fn approve(&self, _: &Target) -> Result<String, RemoteError> {
        Ok(String::new())
    }

    fn create_note(&self, _: &Target, _: &str) -> Result<String, RemoteError> {
        Ok(String::new())
    }
}

fn policy_set(n: usize) -> Arc<[Policy]> {
    // One in eight policies matches the benchmark event.
    (0..n)
        .map(|i| {
            let label = if i % 8 == 0 { "critical" } else { "docs" };
            Policy::new(format!("p{i}"), EventKind::MergeRequest)
                .with_conditions(
                    ConditionSet::default()
                        .with_state(["opened"])
                        .with_labels([label])
                        .with_forbidden_labels(["wip"]),
                )
                .with_actions(ActionSet::new().add_labels(["triaged"]))
        })
        .collect()
}

fn bench_matching(c: &mut Criterion) {
    let policies = policy_set(1024);
    let event = MergeRequestEvent::new(1, 1)
        .with_state("opened")
        .with_labels(["api", "critical"]);
    let engine = MatchingEngine::new(MatchContext::now());

    let mut group = c.benchmark_group("matching");
    group.throughput(Throughput::Elements(policies.len() as u64));
    group.bench_function("sequential_1024", |b| {
        b.iter(|| policies.iter().filter(|p| engine.is_match(p, &event)).count());
    });
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let event: Arc<dyn EventAdapter> = Arc::new(
        MergeRequestEvent::new(1, 1)
            .with_state("opened")
            .with_labels(["api", "critical"]),
    );
    let client: Arc<dyn RemoteClient> = Arc::new(NullClient);

    let mut group = c.benchmark_group("dispatch");
    for n in [64usize, 1024] {
        let policies = policy_set(n);
        group.throughput(Throughput::Elements(n as u64));
        for workers in [1usize, 4] {
            let dispatcher = Dispatcher::new(DispatcherConfig { workers });
            group.bench_function(format!("{n}_policies_{workers}_workers"), |b| {
                b.iter(|| {
                    dispatcher
                        .dispatch_all(Arc::clone(&policies), Arc::clone(&event), Arc::clone(&client))
                        .map(|r| r.len())
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_matching, bench_dispatch);
criterion_main!(benches);
