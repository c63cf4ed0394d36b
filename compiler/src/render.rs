//! Human-readable rendering of a compiled workflow, for the `"workflow"`
//! field of the calculate response.

use workflow_ir::Ir;

pub fn render(ir: &Ir) -> String {
  ir.to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use workflow_ir::{Ir, TaskArgs, Topic};

  #[test]
  fn renders_a_bare_constant() {
    assert_eq!(render(&Ir::Const(8.0)), "const(8)");
  }

  #[test]
  fn renders_a_chain_with_an_arrow() {
    let ir = Ir::Chain(vec![
      Ir::task(Topic::AddQ, TaskArgs::scalar(2.0, 3.0)),
      Ir::task(Topic::MulQ, TaskArgs::chain_fixed(4.0, false)),
    ]);
    assert_eq!(render(&ir), "add(2, 3) -> mul(y=4)");
  }
}
