//! The workflow compiler: lowers an `OperatorTree` into `workflow_ir::Ir`,
//! flattening commutative operator runs into a single remote call where
//! possible and preserving left-to-right order for non-commutative
//! operators. This is a pure, total, deterministic function over
//! already-validated trees — it never fails; every failure mode belongs
//! to lexing, parsing, or execution.

pub mod render;

use parser::tree::{Op, OperatorTree};
use workflow_ir::{Ir, TaskArgs, Topic};

fn topic(op: Op) -> Topic {
  match op {
    Op::Add => Topic::AddQ,
    Op::Sub => Topic::SubQ,
    Op::Mul => Topic::MulQ,
    Op::Div => Topic::DivQ,
  }
}

/// The list-form topic a `Chord` body uses for a non-commutative operator
/// with two non-constant operands. It reuses the scalar operator's own
/// topic — `sub_list`/`div_list` share a queue with `sub`/`div` and are
/// distinguished by the envelope's `TaskArgs::pair` field, not by topic.
fn topic_list(op: Op) -> Topic {
  topic(op)
}

fn aggregator(op: Op) -> Topic {
  match op {
    Op::Add => Topic::XsumQ,
    Op::Mul => Topic::XprodQ,
    _ => unreachable!("aggregator is only defined for commutative operators"),
  }
}

fn identity(op: Op) -> f64 {
  match op {
    Op::Add => 0.0,
    Op::Mul => 1.0,
    _ => unreachable!("identity is only defined for commutative operators"),
  }
}

/// Lowers an operator tree into the workflow IR.
pub fn compile(tree: &OperatorTree) -> Ir {
  match tree {
    OperatorTree::Literal(v) => Ir::Const(*v),

    OperatorTree::Binary { op, left, right } => match (left.as_ref(), right.as_ref()) {
      // Both children are literals, regardless of commutativity.
      (OperatorTree::Literal(l), OperatorTree::Literal(r)) => Ir::task(topic(*op), TaskArgs::scalar(*l, *r)),

      // Commutative operator, at least one non-literal child.
      _ if op.is_commutative() => compile_commutative(*op, tree),

      // Non-commutative operator.
      _ => compile_noncommutative(*op, left, right),
    },
  }
}

/// Collects the maximal left-to-right list of operands reachable through
/// nodes sharing `op`.
fn flatten<'a>(node: &'a OperatorTree, op: Op, out: &mut Vec<&'a OperatorTree>) {
  match node {
    OperatorTree::Binary {
      op: node_op,
      left,
      right,
    } if *node_op == op => {
      flatten(left, op, out);
      flatten(right, op, out);
    },
    other => out.push(other),
  }
}

fn compile_commutative(op: Op, tree: &OperatorTree) -> Ir {
  let mut operand_refs = Vec::new();
  flatten(tree, op, &mut operand_refs);

  let mut tasks: Vec<Ir> = Vec::new();
  let mut constants: Vec<f64> = Vec::new();
  for operand in operand_refs {
    match compile(operand) {
      Ir::Const(v) => constants.push(v),
      other => tasks.push(other),
    }
  }

  let op_topic = topic(op);
  let agg = aggregator(op);

  match (tasks.len(), constants.len()) {
    (0, 0) => Ir::Const(identity(op)),
    (0, 1) => Ir::Const(constants[0]),
    (0, 2) => Ir::task(op_topic, TaskArgs::scalar(constants[0], constants[1])),
    (0, _) => Ir::task(agg, TaskArgs::constants(constants)),

    (1, 0) => tasks.into_iter().next().unwrap(),
    (1, 1) => Ir::chain(vec![
      tasks.into_iter().next().unwrap(),
      // commutative: no `is_left_fixed` needed, order doesn't matter.
      Ir::task(op_topic, TaskArgs::chain_fixed(constants[0], false)),
    ]),
    (1, _) => {
      let mut header = tasks;
      header.push(Ir::task(agg, TaskArgs::constants(constants)));
      Ir::chord(header, Ir::task(agg, TaskArgs::empty_aggregate()))
    },

    (_, 0) => Ir::chord(tasks, Ir::task(agg, TaskArgs::empty_aggregate())),
    (_, 1) => Ir::chain(vec![
      Ir::chord(tasks, Ir::task(agg, TaskArgs::empty_aggregate())),
      Ir::task(op_topic, TaskArgs::chain_fixed(constants[0], false)),
    ]),
    (_, _) => {
      let mut header = tasks;
      header.push(Ir::task(agg, TaskArgs::constants(constants)));
      Ir::chord(header, Ir::task(agg, TaskArgs::empty_aggregate()))
    },
  }
}

fn compile_noncommutative(op: Op, left: &OperatorTree, right: &OperatorTree) -> Ir {
  let lw = compile(left);
  let rw = compile(right);

  match (lw, rw) {
    (Ir::Const(_), Ir::Const(_)) => unreachable!("R2 already handles both-literal nodes"),

    // Left is a remote subtree, right is a constant: chain the predecessor
    // into `result OP y`.
    (lw, Ir::Const(c)) => Ir::chain(vec![lw, Ir::task(topic(op), TaskArgs::chain_fixed(c, false))]),

    // Left is a constant, right is a remote subtree: chain the predecessor
    // into `y OP result`.
    (Ir::Const(c), rw) => Ir::chain(vec![rw, Ir::task(topic(op), TaskArgs::chain_fixed(c, true))]),

    // Both sides are remote: run them concurrently and let the list-form
    // body apply the operator to the ordered pair.
    (lw, rw) => Ir::chord(vec![lw, rw], Ir::task(topic_list(op), TaskArgs::empty_aggregate())),
  }
}
