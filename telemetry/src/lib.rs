//! Structured logging for the task lifecycle a coordinator drives through:
//! a task gets published, a result gets observed, a chain stage or chord
//! body gets materialized from an earlier result, a request times out or
//! completes. One line per event, written through a `Sink` so tests can
//! capture them instead of printing.

use std::{
  fmt,
  sync::{Arc, Mutex},
};

use colored::*;
use uuid::Uuid;

#[derive(Debug)]
pub enum LogType<'a> {
  Error(&'a str),
  Warn(&'a str),
  Info(&'a str),
  Debug(&'a str),
}

impl fmt::Display for LogType<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LogType::Error(msg) => write!(f, "{} {}", "[Error]".red().bold(), msg.red().bold()),
      LogType::Warn(msg) => write!(f, "{} {}", "[Warn]".yellow().bold(), msg.yellow().bold()),
      LogType::Info(msg) => write!(f, "{} {}", "[Info]".cyan().bold(), msg.cyan().bold()),
      LogType::Debug(msg) => write!(f, "{} {}", "[Debug]", msg),
    }
  }
}

pub trait Sink: Send + Sync {
  fn emit(&self, line: String);
}

pub struct StdoutSink;

impl Sink for StdoutSink {
  fn emit(&self, line: String) {
    println!("{}", line);
  }
}

/// Captures emitted lines in memory instead of printing them, for
/// asserting on telemetry output in tests.
#[derive(Default)]
pub struct VecSink {
  lines: Mutex<Vec<String>>,
}

impl Sink for VecSink {
  fn emit(&self, line: String) {
    self.lines.lock().unwrap().push(line);
  }
}

impl VecSink {
  pub fn lines(&self) -> Vec<String> {
    self.lines.lock().unwrap().clone()
  }
}

impl<T: Sink + ?Sized> Sink for Arc<T> {
  fn emit(&self, line: String) {
    (**self).emit(line)
  }
}

pub struct Telemetry {
  sink: Box<dyn Sink>,
}

impl Telemetry {
  pub fn new(sink: impl Sink + 'static) -> Self {
    Self { sink: Box::new(sink) }
  }

  fn log(&self, log_type: LogType) {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
    self.sink.emit(format!("[{}] {}", now, log_type));
  }

  pub fn task_published(&self, corr_id: Uuid, worker: &str) {
    self.log(LogType::Debug(&format!("published {worker} corr_id={corr_id}")));
  }

  pub fn result_observed(&self, corr_id: Uuid, outcome: &str) {
    self.log(LogType::Debug(&format!("result observed corr_id={corr_id} outcome={outcome}")));
  }

  pub fn chain_stage_materialized(&self, corr_id: Uuid, result: f64) {
    self.log(LogType::Debug(&format!("chain stage materialized corr_id={corr_id} result={result}")));
  }

  pub fn chord_body_materialized(&self, header_size: usize) {
    self.log(LogType::Debug(&format!("chord body materialized header_size={header_size}")));
  }

  pub fn timed_out(&self, deadline_ms: u128) {
    self.log(LogType::Warn(&format!("request timed out after {deadline_ms}ms")));
  }

  pub fn completed(&self, result: f64) {
    self.log(LogType::Info(&format!("request completed result={result}")));
  }

  pub fn failed(&self, code: &str) {
    self.log(LogType::Error(&format!("request failed code={code}")));
  }
}
