//! The compiled workflow IR: a closed sum type with four variants. The
//! compiler (the `compiler` crate) is the only producer of `Ir` values;
//! this crate only owns the type and the invariants its constructors
//! enforce — a Chain always has at least two stages, a Chord's header
//! always has at least two entries and its body is always a single Task.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One topic per worker class. `sub_list`/`div_list` calls are routed onto
/// `SubQ`/`DivQ` too — they share a queue with the scalar `sub`/`div`
/// workers and are told apart by `TaskArgs`'s shape, not by topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
  AddQ,
  SubQ,
  MulQ,
  DivQ,
  XsumQ,
  XprodQ,
}

impl Topic {
  /// The queue name a `Broker` implementation would route this topic to.
  pub fn queue_name(&self) -> &'static str {
    match self {
      Topic::AddQ | Topic::XsumQ => "add_tasks",
      Topic::SubQ => "sub_tasks",
      Topic::MulQ | Topic::XprodQ => "mul_tasks",
      Topic::DivQ => "div_tasks",
    }
  }

  pub fn worker_name(&self) -> &'static str {
    match self {
      Topic::AddQ => "add",
      Topic::SubQ => "sub",
      Topic::MulQ => "mul",
      Topic::DivQ => "div",
      Topic::XsumQ => "xsum",
      Topic::XprodQ => "xprod",
    }
  }
}

impl fmt::Display for Topic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.worker_name())
  }
}

/// The parameter record a task envelope carries. A single struct covers
/// every worker kind; unused fields are left `None`/empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskArgs {
  pub x: Option<f64>,
  pub y: Option<f64>,
  pub result: Option<f64>,
  pub is_left_fixed: bool,
  pub children_result: Option<Vec<f64>>,
  pub constants: Option<Vec<f64>>,
  /// The explicit two-element list form used by `sub_list`/`div_list`:
  /// `{x: number[]}`. Kept distinct from the scalar `x`/`y` fields above
  /// since it carries operands in left-to-right order rather than a pair
  /// of named operands, and since it crosses the wire as a JSON array a
  /// worker still has to check the length of rather than trust.
  pub pair: Option<Vec<f64>>,
}

impl TaskArgs {
  pub fn scalar(x: f64, y: f64) -> Self {
    Self {
      x: Some(x),
      y: Some(y),
      ..Default::default()
    }
  }

  /// Builds the `TaskArgs` for a chain-continuation stage: the fixed
  /// operand always travels in `y`, regardless of which side of the
  /// original expression it came from; `is_left_fixed` alone decides
  /// whether the worker computes `y OP result` (`true`) or `result OP y`
  /// (`false`).
  pub fn chain_fixed(y: f64, is_left_fixed: bool) -> Self {
    Self {
      y: Some(y),
      is_left_fixed,
      ..Default::default()
    }
  }

  pub fn constants(values: Vec<f64>) -> Self {
    Self {
      constants: Some(values),
      ..Default::default()
    }
  }

  pub fn empty_aggregate() -> Self {
    Self::default()
  }

  pub fn pair(left: f64, right: f64) -> Self {
    Self {
      pair: Some(vec![left, right]),
      ..Default::default()
    }
  }
}

/// The compiled workflow. `Const` is emitted only for literals; the
/// compiler never folds arithmetic across operator nodes, so every other
/// node corresponds to at least one remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum Ir {
  Const(f64),
  Task {
    topic: Topic,
    args: TaskArgs,
  },
  /// Sequential composition; stage `i`'s result becomes `result` in stage
  /// `i+1`'s `TaskArgs`. Always has at least 2 stages — `chain()`
  /// collapses a single-stage request to that stage directly.
  Chain(Vec<Ir>),
  /// Fan-out/fan-in: every header entry runs concurrently, then `body`
  /// (always a `Task`) observes their results in header order. Always has
  /// at least 2 header entries.
  Chord {
    header: Vec<Ir>,
    body: Box<Ir>,
  },
}

impl Ir {
  pub fn task(topic: Topic, args: TaskArgs) -> Self {
    Ir::Task { topic, args }
  }

  /// Builds a `Chain`, collapsing to the single stage when there's only
  /// one — a Chain of length 1 is never observable outside this module.
  pub fn chain(mut stages: Vec<Ir>) -> Self {
    assert!(!stages.is_empty(), "a Chain needs at least one stage");
    if stages.len() == 1 {
      return stages.pop().unwrap();
    }
    Ir::Chain(stages)
  }

  /// Builds a `Chord`. `header` must already have at least 2 entries and
  /// `body` must be a `Task` — both are invariants the compiler is
  /// responsible for upholding; this only asserts them.
  pub fn chord(header: Vec<Ir>, body: Ir) -> Self {
    assert!(header.len() >= 2, "a Chord needs at least two header children");
    assert!(matches!(body, Ir::Task { .. }), "a Chord body must be a single Task");
    Ir::Chord {
      header,
      body: Box::new(body),
    }
  }
}

impl fmt::Display for Ir {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Ir::Const(v) => write!(f, "const({})", v),
      Ir::Task { topic, args } => write!(f, "{}{}", topic.worker_name(), format_args(args)),
      Ir::Chain(stages) => {
        let rendered: Vec<String> = stages.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", rendered.join(" -> "))
      },
      Ir::Chord { header, body } => {
        let rendered: Vec<String> = header.iter().map(|s| s.to_string()).collect();
        write!(f, "chord([{}], {})", rendered.join(", "), body)
      },
    }
  }
}

fn format_args(args: &TaskArgs) -> String {
  let mut parts = Vec::new();

  if let Some(x) = args.x {
    parts.push(format!("{}", x));
  }
  if let Some(y) = args.y {
    if args.x.is_none() {
      parts.push(format!("y={}", y));
    } else {
      parts.push(format!("{}", y));
    }
  }
  if let Some(result) = args.result {
    parts.push(format!("result={}", result));
  }
  if args.is_left_fixed {
    parts.push("is_left_fixed=true".to_string());
  }
  if let Some(children) = &args.children_result {
    parts.push(format!(
      "children_result=[{}]",
      children.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
    ));
  }
  if let Some(constants) = &args.constants {
    parts.push(format!(
      "constants=[{}]",
      constants.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
    ));
  }
  if let Some(pair) = &args.pair {
    parts.push(format!(
      "x=[{}]",
      pair.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
    ));
  }

  if parts.is_empty() {
    String::new()
  } else {
    format!("({})", parts.join(", "))
  }
}
