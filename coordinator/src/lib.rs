//! Drives a compiled workflow to completion against a `Broker`/
//! `ResultBackend` pair: publishes each `Task` node, stitches a `Chain`'s
//! stages together by feeding one stage's result into the next's
//! `TaskArgs`, fans a `Chord`'s header out concurrently and folds the
//! ordered results into its body, and enforces a single overall deadline
//! for the whole request.

use std::{sync::Arc, time::Duration};

use broker::{Broker, Outcome, ResultBackend, ResultEnvelope, TaskEnvelope};
use diagnostic::{diagnostic::Diagnostic, error_kind::ErrorKind};
use futures::future::{try_join_all, BoxFuture};
use telemetry::Telemetry;
use tokio::sync::broadcast;
use uuid::Uuid;
use workflow_ir::{Ir, TaskArgs, Topic};

const DEFAULT_DEADLINE_MS: u64 = 3000;

pub struct Coordinator {
  broker: Arc<dyn Broker>,
  backend: Arc<dyn ResultBackend>,
  deadline: Duration,
  telemetry: Option<Telemetry>,
}

impl Coordinator {
  pub fn new(broker: Arc<dyn Broker>, backend: Arc<dyn ResultBackend>) -> Self {
    Self {
      broker,
      backend,
      deadline: Duration::from_millis(DEFAULT_DEADLINE_MS),
      telemetry: None,
    }
  }

  pub fn with_deadline(mut self, deadline: Duration) -> Self {
    self.deadline = deadline;
    self
  }

  pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
    self.telemetry = Some(telemetry);
    self
  }

  /// Resolves a compiled workflow to its final numeric result, or the
  /// `Diagnostic` that stopped it. A bare `Ir::Const` never touches the
  /// broker at all.
  pub async fn execute(&self, ir: &Ir) -> Result<f64, Diagnostic> {
    let outcome = match tokio::time::timeout(self.deadline, self.resolve(ir)).await {
      Ok(result) => result,
      Err(_elapsed) => {
        if let Some(telemetry) = &self.telemetry {
          telemetry.timed_out(self.deadline.as_millis());
        }
        Err(Diagnostic::from_kind(ErrorKind::Timeout))
      },
    };

    if let Some(telemetry) = &self.telemetry {
      match &outcome {
        Ok(result) => telemetry.completed(*result),
        Err(diagnostic) => telemetry.failed(diagnostic.kind.code()),
      }
    }

    outcome
  }

  fn resolve<'a>(&'a self, ir: &'a Ir) -> BoxFuture<'a, Result<f64, Diagnostic>> {
    Box::pin(async move {
      match ir {
        Ir::Const(v) => Ok(*v),

        Ir::Task { topic, args } => self.publish_and_await(*topic, args.clone()).await.map(|(_, v)| v),

        Ir::Chain(stages) => {
          let mut prev = self.resolve(&stages[0]).await?;
          for stage in &stages[1..] {
            let Ir::Task { topic, args } = stage else {
              return Err(internal("a chain stage past the first must be a task"));
            };
            let args = TaskArgs {
              result: Some(prev),
              ..args.clone()
            };
            let (corr_id, result) = self.publish_and_await(*topic, args).await?;
            if let Some(telemetry) = &self.telemetry {
              telemetry.chain_stage_materialized(corr_id, result);
            }
            prev = result;
          }
          Ok(prev)
        },

        Ir::Chord { header, body } => {
          let header_results = try_join_all(header.iter().map(|child| self.resolve(child))).await?;
          let Ir::Task { topic, args } = body.as_ref() else {
            return Err(internal("a chord body must be a task"));
          };
          if let Some(telemetry) = &self.telemetry {
            telemetry.chord_body_materialized(header_results.len());
          }
          let args = match topic {
            Topic::SubQ | Topic::DivQ => TaskArgs {
              pair: Some(header_results),
              ..args.clone()
            },
            _ => TaskArgs {
              children_result: Some(header_results),
              ..args.clone()
            },
          };
          self.publish_and_await(*topic, args).await.map(|(_, v)| v)
        },
      }
    })
  }

  /// Publishes one task and waits for its matching result on the
  /// backend's broadcast stream, discarding results for other in-flight
  /// correlation ids along the way. Returns the correlation id alongside
  /// the value so a `Chain` can attribute each stage's telemetry to the
  /// task that produced it.
  async fn publish_and_await(&self, topic: Topic, args: TaskArgs) -> Result<(Uuid, f64), Diagnostic> {
    let corr_id = Uuid::now_v7();
    let mut results = self.backend.subscribe();

    if let Some(telemetry) = &self.telemetry {
      telemetry.task_published(corr_id, topic.worker_name());
    }

    self.broker.publish(TaskEnvelope { corr_id, topic, args }).await?;

    let outcome = if let Some(envelope) = self.backend.get(corr_id) {
      envelope.outcome
    } else {
      loop {
        match results.recv().await {
          Ok(ResultEnvelope { corr_id: id, outcome }) if id == corr_id => break outcome,
          Ok(_) => continue,
          Err(broadcast::error::RecvError::Lagged(_)) => continue,
          Err(broadcast::error::RecvError::Closed) => return Err(Diagnostic::from_kind(ErrorKind::BrokerUnavailable)),
        }
      }
    };

    if let Some(telemetry) = &self.telemetry {
      telemetry.result_observed(corr_id, outcome_label(&outcome));
    }

    outcome_to_result(outcome).map(|v| (corr_id, v))
  }
}

fn outcome_label(outcome: &Outcome) -> &'static str {
  match outcome {
    Outcome::Value(_) => "value",
    Outcome::Failed { .. } => "failed",
  }
}

fn outcome_to_result(outcome: Outcome) -> Result<f64, Diagnostic> {
  match outcome {
    Outcome::Value(v) => Ok(v),
    Outcome::Failed { code, message } => Err(Diagnostic::new(kind_from_code(&code), message)),
  }
}

fn kind_from_code(code: &str) -> ErrorKind {
  match code {
    "DIVIDE_BY_ZERO" => ErrorKind::DivideByZero,
    "WORKER_TYPE_ERROR" => ErrorKind::WorkerTypeError,
    _ => ErrorKind::Internal,
  }
}

fn internal(message: &str) -> Diagnostic {
  Diagnostic::new(ErrorKind::Internal, message.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use broker::{InMemoryBroker, InMemoryResultBackend, UnavailableBroker};
  use diagnostic::DiagnosticEngine;
  use telemetry::VecSink;

  fn compile(source: &str) -> Ir {
    let mut engine = DiagnosticEngine::new();
    let tree = parser::parse(source, &mut engine).expect("valid expression");
    compiler::compile(&tree)
  }

  fn in_memory_coordinator() -> Coordinator {
    let backend = Arc::new(InMemoryResultBackend::default());
    let broker = Arc::new(InMemoryBroker::new(backend.clone()));
    Coordinator::new(broker, backend)
  }

  #[tokio::test]
  async fn s1_single_task_resolves_directly() {
    let coordinator = in_memory_coordinator();
    let result = coordinator.execute(&compile("5 + 3")).await.unwrap();
    assert_eq!(result, 8.0);
  }

  #[tokio::test]
  async fn s2_chain_threads_the_result_through_each_stage() {
    let coordinator = in_memory_coordinator();
    let result = coordinator.execute(&compile("(2 + 3) * 4")).await.unwrap();
    assert_eq!(result, 20.0);
  }

  #[tokio::test]
  async fn s3_chain_fixed_left_computes_in_declared_order() {
    let coordinator = in_memory_coordinator();
    let result = coordinator.execute(&compile("10 - 8 / 2")).await.unwrap();
    assert_eq!(result, 6.0);
  }

  #[tokio::test]
  async fn s4_flat_aggregator_resolves_in_one_call() {
    let coordinator = in_memory_coordinator();
    let result = coordinator.execute(&compile("1+2+3+4+5")).await.unwrap();
    assert_eq!(result, 15.0);
  }

  #[tokio::test]
  async fn s5_chord_folds_header_results_into_the_body() {
    let coordinator = in_memory_coordinator();
    let result = coordinator.execute(&compile("(1+2)*(3+4)")).await.unwrap();
    assert_eq!(result, 21.0);
  }

  #[tokio::test]
  async fn non_commutative_chord_preserves_operand_order() {
    let coordinator = in_memory_coordinator();
    let result = coordinator.execute(&compile("(10+0) - (1+2)")).await.unwrap();
    assert_eq!(result, 7.0);
  }

  #[tokio::test]
  async fn a_bare_constant_never_touches_the_broker() {
    let coordinator = in_memory_coordinator();
    let result = coordinator.execute(&Ir::Const(42.0)).await.unwrap();
    assert_eq!(result, 42.0);
  }

  #[tokio::test]
  async fn divide_by_zero_propagates_as_a_diagnostic() {
    let coordinator = in_memory_coordinator();
    let err = coordinator.execute(&compile("1 / 0")).await.unwrap_err();
    assert_eq!(err.kind.code(), "DIVIDE_BY_ZERO");
  }

  #[tokio::test]
  async fn an_unavailable_broker_surfaces_as_broker_unavailable() {
    let backend = Arc::new(InMemoryResultBackend::default());
    let coordinator = Coordinator::new(Arc::new(UnavailableBroker), backend);
    let err = coordinator.execute(&compile("1 + 1")).await.unwrap_err();
    assert_eq!(err.kind.code(), "BROKER_UNAVAILABLE");
  }

  /// A broker that never answers, to exercise the deadline deterministically
  /// instead of racing a real worker against a near-zero timeout.
  struct SilentBroker;

  #[async_trait::async_trait]
  impl Broker for SilentBroker {
    async fn publish(&self, _envelope: TaskEnvelope) -> Result<(), Diagnostic> {
      std::future::pending::<()>().await;
      Ok(())
    }
  }

  #[tokio::test]
  async fn a_short_deadline_times_out_an_unresponsive_worker() {
    let backend = Arc::new(InMemoryResultBackend::default());
    let coordinator = Coordinator::new(Arc::new(SilentBroker), backend).with_deadline(Duration::from_millis(10));
    let err = coordinator.execute(&compile("1 + 1")).await.unwrap_err();
    assert_eq!(err.kind.code(), "TIMEOUT");
  }

  #[tokio::test]
  async fn telemetry_observes_a_published_task_and_the_final_result() {
    let backend = Arc::new(InMemoryResultBackend::default());
    let broker = Arc::new(InMemoryBroker::new(backend.clone()));
    let sink = Arc::new(VecSink::default());
    let coordinator = Coordinator::new(broker, backend).with_telemetry(Telemetry::new(sink.clone()));

    coordinator.execute(&compile("5 + 3")).await.unwrap();

    let lines = sink.lines();
    assert!(lines.iter().any(|l| l.contains("published add")));
    assert!(lines.iter().any(|l| l.contains("result observed")));
    assert!(lines.iter().any(|l| l.contains("request completed result=8")));
  }

  #[tokio::test]
  async fn telemetry_observes_each_chain_stage_as_it_materializes() {
    let backend = Arc::new(InMemoryResultBackend::default());
    let broker = Arc::new(InMemoryBroker::new(backend.clone()));
    let sink = Arc::new(VecSink::default());
    let coordinator = Coordinator::new(broker, backend).with_telemetry(Telemetry::new(sink.clone()));

    let result = coordinator.execute(&compile("(2 + 3) * 4")).await.unwrap();
    assert_eq!(result, 20.0);

    let lines = sink.lines();
    assert!(lines.iter().any(|l| l.contains("chain stage materialized") && l.contains("result=5")));
  }
}
