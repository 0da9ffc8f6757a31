//! Conditional mutations: replacing a comparison operator with its negation.

use crate::error::{MutatrixError, Result};
use crate::mutator::{Mutator, NodeMut, NodeRef};
use crate::types::TypeIndex;
use syn::BinOp;

pub const NEGATED: &str = "conditional/negated";

/// The negation of a comparison operator, e.g. `<` becomes `>=`.
fn negation_of(op: &BinOp) -> Option<BinOp> {
    match op {
        BinOp::Eq(_) => Some(BinOp::Ne(Default::default())),
        BinOp::Ne(_) => Some(BinOp::Eq(Default::default())),
        BinOp::Lt(_) => Some(BinOp::Ge(Default::default())),
        BinOp::Ge(_) => Some(BinOp::Lt(Default::default())),
        BinOp::Gt(_) => Some(BinOp::Le(Default::default())),
        BinOp::Le(_) => Some(BinOp::Gt(Default::default())),
        _ => None,
    }
}

/// `conditional/negated`: a comparison operator is replaced by its negation; one
/// mutation per matching node.
pub struct ConditionalNegated;

impl Mutator for ConditionalNegated {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        match node {
            NodeRef::Expr(syn::Expr::Binary(binary)) => negation_of(&binary.op).is_some(),
            _ => false,
        }
    }

    fn mutation_count(&self, _types: &TypeIndex, node: NodeRef<'_>) -> usize {
        if self.matches(node) {
            1
        } else {
            0
        }
    }

    fn mutate(&self, _types: &TypeIndex, node: NodeMut<'_>, variant: usize) -> Result<()> {
        let misuse = || MutatrixError::NoSuchMutation(NEGATED.to_string(), variant);

        match node {
            NodeMut::Expr(syn::Expr::Binary(binary)) => {
                binary.op = negation_of(&binary.op).ok_or_else(misuse)?;
                Ok(())
            }
            _ => Err(misuse()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{assert_mutation_count, mutants};
    use super::*;

    #[test]
    fn test_conditional_negated_six_comparisons() {
        // One site per comparison operator, as in the shipped fixture.
        let src = "
fn spread(a: i32, b: i32) -> [bool; 6] {
    [a == b, a != b, a < b, a <= b, a > b, a >= b]
}
";
        assert_mutation_count(NEGATED, src, 6);
    }

    #[test]
    fn test_conditional_negated_flips() {
        let all = mutants(NEGATED, "fn f(a: i32, b: i32) -> bool { a <= b }");
        assert_eq!(all.len(), 1);
        assert!(all[0].contains("a > b"));

        let all = mutants(NEGATED, "fn f(a: i32, b: i32) -> bool { a == b }");
        assert!(all[0].contains("a != b"));
    }

    #[test]
    fn test_conditional_negated_ignores_logical_operators() {
        assert_mutation_count(NEGATED, "fn f(a: bool, b: bool) -> bool { a && b }", 0);
        assert_mutation_count(NEGATED, "fn f(a: bool, b: bool) -> bool { a || b }", 0);
    }
}
