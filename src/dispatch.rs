//! Concurrent policy dispatch.
//!
//! One request gets its own short-lived pipeline:
//!
//! ```text
//! producer --(rendezvous)--> worker 0..N --(one channel each)--> fan-in --> DispatchStream
//! ```
//!
//! The producer hands out policy indices, workers evaluate and, on a match,
//! execute the policy's actions before emitting a [`DispatchResult`]. The
//! fan-in merges every worker channel and closes the output only once all of
//! them have disconnected, so the stream ends exactly when every policy has
//! been evaluated. Output order is not input order.
//!
//! Cancelling (or dropping) the stream closes the done channel. Every stage
//! selects on it and stops taking new work; results already emitted stay
//! emitted.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, select, Receiver, Select, Sender};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::{ActionExecutor, OperationResult};
use crate::condition::MatchContext;
use crate::error::{ExecutionError, QuetzalResult};
use crate::event::EventAdapter;
use crate::matcher::MatchingEngine;
use crate::policy::Policy;
use crate::remote::RemoteClient;

/// Dispatcher tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatcherConfig {
    /// Evaluator threads per dispatch. Never more than the number of
    /// policies, never fewer than one.
    pub workers: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
        }
    }
}

/// A matched policy and the outcome of its actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    /// The matched policy.
    pub policy: Policy,
    /// One result per executed operation, in execution order.
    pub operations: Vec<OperationResult>,
}

/// Runs policy sets against events.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    cfg: DispatcherConfig,
}

impl Dispatcher {
    /// A dispatcher using `cfg`.
    #[must_use]
    pub const fn new(cfg: DispatcherConfig) -> Self {
        Self { cfg }
    }

    /// Current settings.
    #[must_use]
    pub const fn config(&self) -> &DispatcherConfig {
        &self.cfg
    }

    /// Starts evaluating `policies` against `event` and returns the stream
    /// of matches.
    pub fn dispatch(
        &self,
        policies: Arc<[Policy]>,
        event: Arc<dyn EventAdapter>,
        client: Arc<dyn RemoteClient>,
    ) -> QuetzalResult<DispatchStream> {
        let delivery = Uuid::new_v4();
        let engine = MatchingEngine::new(MatchContext::now());
        let workers = self.cfg.workers.min(policies.len()).max(1);

        let (done_tx, done_rx) = bounded::<()>(0);
        let (work_tx, work_rx) = bounded::<usize>(0);
        let (out_tx, out_rx) = bounded::<DispatchResult>(0);

        tracing::debug!(
            delivery = %delivery,
            event = %event.resource_type(),
            policies = policies.len(),
            workers,
            "dispatch started"
        );

        let mut worker_rxs = Vec::with_capacity(workers);
        for n in 0..workers {
            let (tx, rx) = bounded::<DispatchResult>(0);
            let worker = Worker {
                delivery,
                engine,
                policies: Arc::clone(&policies),
                event: Arc::clone(&event),
                client: Arc::clone(&client),
                work_rx: work_rx.clone(),
                out_tx: tx,
                done_rx: done_rx.clone(),
            };
            spawn(format!("quetzal-worker-{n}"), move || worker.run())?;
            worker_rxs.push(rx);
        }
        drop(work_rx);

        let total = policies.len();
        let producer_done = done_rx.clone();
        spawn("quetzal-producer".to_string(), move || {
            produce(total, &work_tx, &producer_done);
        })?;

        spawn("quetzal-fan-in".to_string(), move || {
            fan_in(delivery, total, worker_rxs, &out_tx, &done_rx);
        })?;

        Ok(DispatchStream {
            delivery,
            rx: out_rx,
            done: Some(done_tx),
        })
    }

    /// Dispatches and waits for every result.
    pub fn dispatch_all(
        &self,
        policies: Arc<[Policy]>,
        event: Arc<dyn EventAdapter>,
        client: Arc<dyn RemoteClient>,
    ) -> QuetzalResult<Vec<DispatchResult>> {
        Ok(self.dispatch(policies, event, client)?.collect_results())
    }
}

fn spawn<F>(name: String, f: F) -> QuetzalResult<()>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(f)
        .map_err(|source| ExecutionError::Spawn { name, source })?;
    Ok(())
}

fn produce(total: usize, work_tx: &Sender<usize>, done_rx: &Receiver<()>) {
    for idx in 0..total {
        select! {
            send(work_tx, idx) -> res => {
                if res.is_err() {
                    return;
                }
            }
            recv(done_rx) -> _ => return,
        }
    }
}

struct Worker {
    delivery: Uuid,
    engine: MatchingEngine,
    policies: Arc<[Policy]>,
    event: Arc<dyn EventAdapter>,
    client: Arc<dyn RemoteClient>,
    work_rx: Receiver<usize>,
    out_tx: Sender<DispatchResult>,
    done_rx: Receiver<()>,
}

impl Worker {
    fn run(self) {
        let executor = ActionExecutor::new(self.client.as_ref());
        loop {
            let idx = select! {
                recv(self.work_rx) -> msg => match msg {
                    Ok(idx) => idx,
                    Err(_) => return,
                },
                recv(self.done_rx) -> _ => return,
            };
            let Some(policy) = self.policies.get(idx) else {
                continue;
            };
            if !self.engine.evaluate(policy, self.event.as_ref()).matched {
                continue;
            }

            tracing::info!(delivery = %self.delivery, policy = %policy.name, "policy matched");
            let result = DispatchResult {
                policy: policy.clone(),
                operations: executor.execute(policy, self.event.as_ref()),
            };
            select! {
                send(self.out_tx, result) -> res => {
                    if res.is_err() {
                        return;
                    }
                }
                recv(self.done_rx) -> _ => return,
            }
        }
    }
}

fn fan_in(
    delivery: Uuid,
    total: usize,
    mut worker_rxs: Vec<Receiver<DispatchResult>>,
    out_tx: &Sender<DispatchResult>,
    done_rx: &Receiver<()>,
) {
    let mut matched = 0usize;
    let mut cancelled = false;

    while !worker_rxs.is_empty() {
        let (i, msg) = {
            let mut sel = Select::new();
            for rx in &worker_rxs {
                sel.recv(rx);
            }
            let op = sel.select();
            let i = op.index();
            (i, op.recv(&worker_rxs[i]))
        };
        let Ok(result) = msg else {
            // That worker has exited.
            worker_rxs.swap_remove(i);
            continue;
        };

        matched += 1;
        select! {
            send(out_tx, result) -> res => {
                if res.is_err() {
                    cancelled = true;
                    break;
                }
            }
            recv(done_rx) -> _ => {
                cancelled = true;
                break;
            }
        }
    }

    tracing::info!(
        delivery = %delivery,
        policies = total,
        matched,
        cancelled,
        "dispatch complete"
    );
}

/// Matches for one dispatch, in completion order.
///
/// Dropping the stream cancels any work still in flight.
#[derive(Debug)]
pub struct DispatchStream {
    delivery: Uuid,
    rx: Receiver<DispatchResult>,
    done: Option<Sender<()>>,
}

impl DispatchStream {
    /// Id attached to this dispatch's log events.
    #[must_use]
    pub const fn delivery(&self) -> Uuid {
        self.delivery
    }

    /// Stops the pipeline from taking on further policies.
    ///
    /// Idempotent. Results already emitted can still be received.
    pub fn cancel(&mut self) {
        if self.done.take().is_some() {
            tracing::debug!(delivery = %self.delivery, "dispatch cancelled");
        }
    }

    /// Whether [`DispatchStream::cancel`] has been called.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.done.is_none()
    }

    /// Blocks until the dispatch finishes and returns every result.
    #[must_use]
    pub fn collect_results(self) -> Vec<DispatchResult> {
        self.collect()
    }
}

impl Iterator for DispatchStream {
    type Item = DispatchResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.rx.recv().ok()
    }
}

impl Drop for DispatchStream {
    fn drop(&mut self) {
        // Threads are not joined; every stage exits once the done channel
        // closes or its peers disconnect.
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionSet;
    use crate::condition::ConditionSet;
    use crate::event::{EventKind, MergeRequestEvent};
    use crate::remote::DryRunClient;

    fn labelled(name: &str, label: &str) -> Policy {
        Policy::new(name, EventKind::MergeRequest)
            .with_conditions(ConditionSet::default().with_labels([label]))
            .with_actions(ActionSet::new().with_comment("seen"))
    }

    fn run(policies: Vec<Policy>, workers: usize) -> Vec<DispatchResult> {
        let event: Arc<dyn EventAdapter> =
            Arc::new(MergeRequestEvent::new(1, 2).with_labels(["api", "critical"]));
        let client: Arc<dyn RemoteClient> = Arc::new(DryRunClient::new());
        Dispatcher::new(DispatcherConfig { workers })
            .dispatch_all(policies.into(), event, client)
            .unwrap()
    }

    #[test]
    fn emits_only_matches() {
        let results = run(
            vec![
                labelled("a", "critical"),
                labelled("b", "docs"),
                labelled("c", "api"),
            ],
            2,
        );
        let mut names: Vec<_> = results.iter().map(|r| r.policy.name.clone()).collect();
        names.sort();
        assert_eq!(names, ["a", "c"]);
        assert!(results.iter().all(|r| r.operations.len() == 1));
    }

    #[test]
    fn empty_policy_set_finishes() {
        assert!(run(Vec::new(), 4).is_empty());
    }

    #[test]
    fn zero_workers_still_runs_one() {
        assert_eq!(run(vec![labelled("a", "api")], 0).len(), 1);
    }

    #[test]
    fn duplicate_names_are_evaluated_independently() {
        let results = run(vec![labelled("dup", "api"), labelled("dup", "api")], 3);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn cancel_is_idempotent() {
        let event: Arc<dyn EventAdapter> = Arc::new(MergeRequestEvent::new(1, 2));
        let client: Arc<dyn RemoteClient> = Arc::new(DryRunClient::new());
        let policies: Arc<[Policy]> = vec![Policy::new("a", EventKind::MergeRequest)].into();
        let mut stream = Dispatcher::default().dispatch(policies, event, client).unwrap();
        assert!(!stream.is_cancelled());
        stream.cancel();
        stream.cancel();
        assert!(stream.is_cancelled());
        // The stream still terminates.
        let _ = stream.by_ref().count();
    }

    #[test]
    fn default_workers_is_at_least_one() {
        assert!(DispatcherConfig::default().workers >= 1);
    }
}
