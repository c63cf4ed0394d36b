//! The `Broker`/`ResultBackend` abstraction a coordinator dispatches
//! work through, plus an in-memory implementation that executes worker
//! functions directly in-process. Production deployments would swap in a
//! transport that actually crosses a process boundary; this crate only
//! defines the seam and the one implementation this system ships with.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use async_trait::async_trait;
use diagnostic::{diagnostic::Diagnostic, error_kind::ErrorKind};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;
use workflow_ir::{TaskArgs, Topic};

/// A task dispatched onto a worker queue, keyed by the correlation id the
/// coordinator uses to match its eventual reply back to the workflow node
/// that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEnvelope {
  pub corr_id: Uuid,
  pub topic: Topic,
  pub args: TaskArgs,
}

/// What a worker produced, in the shape that crosses the wire back to the
/// coordinator: either a value or the error code/message pair a
/// `Diagnostic` reduces to once it leaves the process that raised it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Outcome {
  Value(f64),
  Failed { code: String, message: String },
}

impl From<Result<f64, Diagnostic>> for Outcome {
  fn from(result: Result<f64, Diagnostic>) -> Self {
    match result {
      Ok(v) => Outcome::Value(v),
      Err(d) => Outcome::Failed {
        code: d.kind.code().to_string(),
        message: d.message,
      },
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope {
  pub corr_id: Uuid,
  pub outcome: Outcome,
}

/// Publishes task envelopes onto worker queues. Implementations own the
/// transport; this system only needs one to be able to route a
/// `TaskEnvelope` somewhere and eventually produce a matching
/// `ResultEnvelope` on the paired `ResultBackend`.
#[async_trait]
pub trait Broker: Send + Sync {
  async fn publish(&self, envelope: TaskEnvelope) -> Result<(), Diagnostic>;
}

/// Where task results land. A coordinator subscribes once and matches
/// incoming `ResultEnvelope`s to its wait table by `corr_id`; `get` exists
/// for the rare case a result arrives before the subscriber is set up.
#[async_trait]
pub trait ResultBackend: Send + Sync {
  async fn store(&self, result: ResultEnvelope);
  fn subscribe(&self) -> broadcast::Receiver<ResultEnvelope>;
  fn get(&self, corr_id: Uuid) -> Option<ResultEnvelope>;
}

pub struct InMemoryResultBackend {
  tx: broadcast::Sender<ResultEnvelope>,
  seen: Mutex<HashMap<Uuid, ResultEnvelope>>,
}

impl Default for InMemoryResultBackend {
  fn default() -> Self {
    let (tx, _rx) = broadcast::channel(1024);
    Self {
      tx,
      seen: Mutex::new(HashMap::new()),
    }
  }
}

#[async_trait]
impl ResultBackend for InMemoryResultBackend {
  async fn store(&self, result: ResultEnvelope) {
    self.seen.lock().unwrap().insert(result.corr_id, result.clone());
    // no subscribers yet (or all lagged) is not an error: `get` still has it.
    let _ = self.tx.send(result);
  }

  fn subscribe(&self) -> broadcast::Receiver<ResultEnvelope> {
    self.tx.subscribe()
  }

  fn get(&self, corr_id: Uuid) -> Option<ResultEnvelope> {
    self.seen.lock().unwrap().get(&corr_id).cloned()
  }
}

/// Dispatches a task by running the matching worker function directly.
/// `sub`/`div` share a queue with their list-form counterparts and are
/// told apart by `args.pair`, per `Topic::queue_name`.
fn execute(topic: Topic, args: &TaskArgs) -> Result<f64, Diagnostic> {
  match topic {
    Topic::AddQ => workers::add(args),
    Topic::SubQ if args.pair.is_some() => workers::sub_list(args),
    Topic::SubQ => workers::sub(args),
    Topic::MulQ => workers::mul(args),
    Topic::DivQ if args.pair.is_some() => workers::div_list(args),
    Topic::DivQ => workers::div(args),
    Topic::XsumQ => workers::xsum(args),
    Topic::XprodQ => workers::xprod(args),
  }
}

/// A `Broker` that never leaves the process: `publish` runs the worker
/// synchronously and stores its outcome immediately. This is what the
/// in-memory property tests dispatch through — no network, no queue, but
/// the same envelope/outcome contract a real transport would have.
pub struct InMemoryBroker {
  backend: Arc<InMemoryResultBackend>,
}

impl InMemoryBroker {
  pub fn new(backend: Arc<InMemoryResultBackend>) -> Self {
    Self { backend }
  }
}

#[async_trait]
impl Broker for InMemoryBroker {
  async fn publish(&self, envelope: TaskEnvelope) -> Result<(), Diagnostic> {
    let outcome = execute(envelope.topic, &envelope.args).into();
    self.backend.store(ResultEnvelope { corr_id: envelope.corr_id, outcome }).await;
    Ok(())
  }
}

/// A `Broker` that always fails to publish, for exercising
/// `BROKER_UNAVAILABLE` without standing up a real transport.
pub struct UnavailableBroker;

#[async_trait]
impl Broker for UnavailableBroker {
  async fn publish(&self, _envelope: TaskEnvelope) -> Result<(), Diagnostic> {
    Err(Diagnostic::from_kind(ErrorKind::BrokerUnavailable))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use workflow_ir::TaskArgs;

  #[tokio::test]
  async fn publish_stores_a_matching_result() {
    let backend = Arc::new(InMemoryResultBackend::default());
    let broker = InMemoryBroker::new(backend.clone());
    let corr_id = Uuid::now_v7();

    broker
      .publish(TaskEnvelope {
        corr_id,
        topic: Topic::AddQ,
        args: TaskArgs::scalar(2.0, 3.0),
      })
      .await
      .unwrap();

    match backend.get(corr_id).unwrap().outcome {
      Outcome::Value(v) => assert_eq!(v, 5.0),
      Outcome::Failed { .. } => panic!("expected a value"),
    }
  }

  #[tokio::test]
  async fn publish_stores_a_worker_failure_as_an_outcome_not_an_error() {
    let backend = Arc::new(InMemoryResultBackend::default());
    let broker = InMemoryBroker::new(backend.clone());
    let corr_id = Uuid::now_v7();

    broker
      .publish(TaskEnvelope {
        corr_id,
        topic: Topic::DivQ,
        args: TaskArgs::scalar(1.0, 0.0),
      })
      .await
      .unwrap();

    match backend.get(corr_id).unwrap().outcome {
      Outcome::Failed { code, .. } => assert_eq!(code, "DIVIDE_BY_ZERO"),
      Outcome::Value(_) => panic!("expected a failure"),
    }
  }

  #[tokio::test]
  async fn subscribers_observe_results_published_after_they_subscribed() {
    let backend = Arc::new(InMemoryResultBackend::default());
    let broker = InMemoryBroker::new(backend.clone());
    let mut rx = backend.subscribe();
    let corr_id = Uuid::now_v7();

    broker
      .publish(TaskEnvelope {
        corr_id,
        topic: Topic::MulQ,
        args: TaskArgs::scalar(4.0, 5.0),
      })
      .await
      .unwrap();

    let observed = rx.recv().await.unwrap();
    assert_eq!(observed.corr_id, corr_id);
  }

  #[tokio::test]
  async fn unavailable_broker_raises_broker_unavailable() {
    let err = UnavailableBroker
      .publish(TaskEnvelope {
        corr_id: Uuid::now_v7(),
        topic: Topic::AddQ,
        args: TaskArgs::scalar(1.0, 1.0),
      })
      .await
      .unwrap_err();
    assert_eq!(err.kind.code(), "BROKER_UNAVAILABLE");
  }
}
