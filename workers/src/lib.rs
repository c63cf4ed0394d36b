//! Pure worker contract functions. Each one mirrors what a remote worker
//! process would compute given a task envelope's `TaskArgs` — no I/O, no
//! shared state, same inputs always produce the same output. The
//! `coordinator`/`broker` crates are what actually dispatch these by
//! topic; this crate only owns the arithmetic and the input validation a
//! worker would perform on a deserialized envelope.

use diagnostic::{diagnostic::Diagnostic, error_kind::ErrorKind};
use workflow_ir::TaskArgs;

fn type_error(message: impl Into<String>) -> Diagnostic {
  Diagnostic::new(ErrorKind::WorkerTypeError, message.into())
}

fn divide_by_zero() -> Diagnostic {
  Diagnostic::from_kind(ErrorKind::DivideByZero)
}

/// Resolves the two operands a binary worker should combine: either the
/// direct `x`/`y` pair for a first-stage task, or `y` against the
/// predecessor's `result` for a chain-continuation stage. Returns
/// `(left, right)` in the order the operator should apply them.
fn binary_operands(args: &TaskArgs) -> Result<(f64, f64), Diagnostic> {
  if let Some(result) = args.result {
    let y = args
      .y
      .ok_or_else(|| type_error("chain-continuation task is missing its fixed operand"))?;
    return Ok(if args.is_left_fixed { (y, result) } else { (result, y) });
  }

  match (args.x, args.y) {
    (Some(x), Some(y)) => Ok((x, y)),
    _ => Err(type_error("binary task requires either `result` or both `x` and `y`")),
  }
}

pub fn add(args: &TaskArgs) -> Result<f64, Diagnostic> {
  let (a, b) = binary_operands(args)?;
  Ok(a + b)
}

pub fn sub(args: &TaskArgs) -> Result<f64, Diagnostic> {
  let (a, b) = binary_operands(args)?;
  Ok(a - b)
}

pub fn mul(args: &TaskArgs) -> Result<f64, Diagnostic> {
  let (a, b) = binary_operands(args)?;
  Ok(a * b)
}

pub fn div(args: &TaskArgs) -> Result<f64, Diagnostic> {
  let (a, b) = binary_operands(args)?;
  if b == 0.0 {
    return Err(divide_by_zero());
  }
  Ok(a / b)
}

/// Collects the operand list `xsum`/`xprod` fold over: a chord body sees
/// its header's results in `children_result`, a flat aggregate sees
/// `constants`. Both may be absent, in which case the worker folds over
/// nothing and returns the operator's identity.
fn aggregate_operands(args: &TaskArgs) -> Vec<f64> {
  let mut values = Vec::new();
  if let Some(children) = &args.children_result {
    values.extend_from_slice(children);
  }
  if let Some(constants) = &args.constants {
    values.extend_from_slice(constants);
  }
  values
}

pub fn xsum(args: &TaskArgs) -> Result<f64, Diagnostic> {
  Ok(aggregate_operands(args).into_iter().sum())
}

pub fn xprod(args: &TaskArgs) -> Result<f64, Diagnostic> {
  Ok(aggregate_operands(args).into_iter().product())
}

/// Validates and unpacks the two-element list form `sub_list`/`div_list`
/// read their operands from. The list travels as a JSON array over the
/// wire, so its length isn't guaranteed by the type system the way the
/// compiler's own output is — a worker has to check it.
fn pair_operands(args: &TaskArgs) -> Result<(f64, f64), Diagnostic> {
  let pair = args
    .pair
    .as_ref()
    .ok_or_else(|| type_error("list task requires a two-element `x`"))?;
  match pair.as_slice() {
    [left, right] => Ok((*left, *right)),
    other => Err(type_error(format!("list task requires exactly 2 operands, got {}", other.len()))),
  }
}

pub fn sub_list(args: &TaskArgs) -> Result<f64, Diagnostic> {
  let (a, b) = pair_operands(args)?;
  Ok(a - b)
}

pub fn div_list(args: &TaskArgs) -> Result<f64, Diagnostic> {
  let (a, b) = pair_operands(args)?;
  if b == 0.0 {
    return Err(divide_by_zero());
  }
  Ok(a / b)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn add_combines_direct_operands() {
    assert_eq!(add(&TaskArgs::scalar(2.0, 3.0)).unwrap(), 5.0);
  }

  #[test]
  fn sub_continues_a_chain_with_fixed_operand_on_the_left() {
    // 10 - (8 / 2): the div stage hands its result to sub, which must
    // compute `10 - result`, not `result - 10`.
    let args = TaskArgs::chain_fixed(10.0, true);
    let args = TaskArgs { result: Some(4.0), ..args };
    assert_eq!(sub(&args).unwrap(), 6.0);
  }

  #[test]
  fn sub_continues_a_chain_with_fixed_operand_on_the_right() {
    // (2 + 3) - 4: the add stage hands its result to sub as the left side.
    let args = TaskArgs::chain_fixed(4.0, false);
    let args = TaskArgs { result: Some(5.0), ..args };
    assert_eq!(sub(&args).unwrap(), 1.0);
  }

  #[test]
  fn div_rejects_a_zero_divisor() {
    let err = div(&TaskArgs::scalar(1.0, 0.0)).unwrap_err();
    assert_eq!(err.kind.code(), "DIVIDE_BY_ZERO");
  }

  #[test]
  fn binary_worker_without_operands_is_a_type_error() {
    let err = add(&TaskArgs::default()).unwrap_err();
    assert_eq!(err.kind.code(), "WORKER_TYPE_ERROR");
  }

  #[test]
  fn xsum_folds_header_results_and_constants() {
    let args = TaskArgs {
      children_result: Some(vec![1.0, 2.0]),
      constants: Some(vec![3.0]),
      ..Default::default()
    };
    assert_eq!(xsum(&args).unwrap(), 6.0);
  }

  #[test]
  fn xsum_of_nothing_is_the_additive_identity() {
    assert_eq!(xsum(&TaskArgs::empty_aggregate()).unwrap(), 0.0);
  }

  #[test]
  fn xprod_of_nothing_is_the_multiplicative_identity() {
    assert_eq!(xprod(&TaskArgs::empty_aggregate()).unwrap(), 1.0);
  }

  #[test]
  fn sub_list_applies_the_pair_in_order() {
    assert_eq!(sub_list(&TaskArgs::pair(10.0, 4.0)).unwrap(), 6.0);
  }

  #[test]
  fn div_list_rejects_a_zero_second_element() {
    let err = div_list(&TaskArgs::pair(1.0, 0.0)).unwrap_err();
    assert_eq!(err.kind.code(), "DIVIDE_BY_ZERO");
  }

  #[test]
  fn div_list_rejects_a_malformed_pair() {
    let args = TaskArgs {
      pair: Some(vec![1.0, 2.0, 3.0]),
      ..Default::default()
    };
    let err = div_list(&args).unwrap_err();
    assert_eq!(err.kind.code(), "WORKER_TYPE_ERROR");
  }
}
