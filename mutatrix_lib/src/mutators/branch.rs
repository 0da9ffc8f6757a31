//! Branch mutations: emptying the body of an `if` branch, an `else` branch, or a
//! match arm so the branch no longer does anything.

use crate::error::{MutatrixError, Result};
use crate::mutator::{Mutator, NodeMut, NodeRef};
use crate::types::TypeIndex;

pub const IF: &str = "branch/if";
pub const ELSE: &str = "branch/else";
pub const CASE: &str = "branch/case";

/// True if the block's trailing expression makes it produce a value, in which case
/// emptying it would change the type of the surrounding expression.
fn block_yields_value(block: &syn::Block) -> bool {
    match block.stmts.last() {
        Some(syn::Stmt::Expr(expr, None)) => !is_unit_expr(expr),
        _ => false,
    }
}

/// Trailing expressions that are unit-typed even without a semicolon.
fn is_unit_expr(expr: &syn::Expr) -> bool {
    match expr {
        syn::Expr::Assign(_) => true,
        syn::Expr::Binary(binary) => super::is_assign_op(&binary.op),
        syn::Expr::While(_) => true,
        syn::Expr::ForLoop(_) => true,
        _ => false,
    }
}

/// True if `block` can be emptied without damaging the surrounding program.
fn block_is_emptiable(block: &syn::Block) -> bool {
    !block.stmts.is_empty() && !block_yields_value(block)
}

fn empty_block() -> syn::Block {
    syn::Block {
        brace_token: Default::default(),
        stmts: Vec::new(),
    }
}

/// `branch/if`: the body of an `if` branch is replaced with an empty block; one
/// mutation per branch with a non-empty body.
pub struct BranchIf;

impl Mutator for BranchIf {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        matches!(node, NodeRef::Expr(syn::Expr::If(_)))
    }

    fn mutation_count(&self, _types: &TypeIndex, node: NodeRef<'_>) -> usize {
        match node {
            NodeRef::Expr(syn::Expr::If(expr)) if block_is_emptiable(&expr.then_branch) => 1,
            _ => 0,
        }
    }

    fn mutate(&self, _types: &TypeIndex, node: NodeMut<'_>, variant: usize) -> Result<()> {
        match node {
            NodeMut::Expr(syn::Expr::If(expr)) => {
                expr.then_branch.stmts.clear();
                Ok(())
            }
            _ => Err(MutatrixError::NoSuchMutation(IF.to_string(), variant)),
        }
    }
}

/// `branch/else`: the body of an `else` branch is replaced with an empty block.
/// `else if` chains are left to `branch/if` on the nested `if`.
pub struct BranchElse;

impl BranchElse {
    fn else_block_of<'a>(expr: &'a syn::ExprIf) -> Option<&'a syn::Block> {
        match &expr.else_branch {
            Some((_, else_expr)) => match else_expr.as_ref() {
                syn::Expr::Block(block) => Some(&block.block),
                _ => None,
            },
            None => None,
        }
    }
}

impl Mutator for BranchElse {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        matches!(
            node,
            NodeRef::Expr(syn::Expr::If(expr)) if expr.else_branch.is_some()
        )
    }

    fn mutation_count(&self, _types: &TypeIndex, node: NodeRef<'_>) -> usize {
        match node {
            NodeRef::Expr(syn::Expr::If(expr)) => match Self::else_block_of(expr) {
                Some(block) if block_is_emptiable(block) => 1,
                _ => 0,
            },
            _ => 0,
        }
    }

    fn mutate(&self, _types: &TypeIndex, node: NodeMut<'_>, variant: usize) -> Result<()> {
        let misuse = || MutatrixError::NoSuchMutation(ELSE.to_string(), variant);

        match node {
            NodeMut::Expr(syn::Expr::If(expr)) => match &mut expr.else_branch {
                Some((_, else_expr)) => match else_expr.as_mut() {
                    syn::Expr::Block(block) => {
                        block.block.stmts.clear();
                        Ok(())
                    }
                    _ => Err(misuse()),
                },
                None => Err(misuse()),
            },
            _ => Err(misuse()),
        }
    }
}

/// `branch/case`: a match arm's body is replaced with an empty block.  The wildcard
/// arm is the default case and is skipped.
pub struct BranchCase;

impl BranchCase {
    /// Indices of the arms this operator can empty.
    fn mutable_arms(expr: &syn::ExprMatch) -> Vec<usize> {
        expr.arms
            .iter()
            .enumerate()
            .filter(|(_, arm)| {
                if matches!(arm.pat, syn::Pat::Wild(_)) {
                    return false;
                }
                match arm.body.as_ref() {
                    syn::Expr::Block(block) => block_is_emptiable(&block.block),
                    _ => false,
                }
            })
            .map(|(index, _)| index)
            .collect()
    }
}

impl Mutator for BranchCase {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        matches!(node, NodeRef::Expr(syn::Expr::Match(_)))
    }

    fn mutation_count(&self, _types: &TypeIndex, node: NodeRef<'_>) -> usize {
        match node {
            NodeRef::Expr(syn::Expr::Match(expr)) => Self::mutable_arms(expr).len(),
            _ => 0,
        }
    }

    fn mutate(&self, _types: &TypeIndex, node: NodeMut<'_>, variant: usize) -> Result<()> {
        let misuse = || MutatrixError::NoSuchMutation(CASE.to_string(), variant);

        match node {
            NodeMut::Expr(syn::Expr::Match(expr)) => {
                let arm_index = *Self::mutable_arms(expr).get(variant).ok_or_else(misuse)?;
                expr.arms[arm_index].body = Box::new(syn::Expr::Block(syn::ExprBlock {
                    attrs: Vec::new(),
                    label: None,
                    block: empty_block(),
                }));
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
    fn test_branch_if_empties_body() {
        let src = "fn f(a: i32) { if a > 0 { log(a); } }";
        let all = mutants(IF, src);
        assert_eq!(all.len(), 1);
        assert!(!all[0].contains("log(a)"));
        assert!(all[0].contains("if a > 0 {}"));
    }

    #[test]
    fn test_branch_if_skips_empty_and_value_bodies() {
        assert_mutation_count(IF, "fn f(a: i32) { if a > 0 {} }", 0);
        assert_mutation_count(
            IF,
            "fn f(a: i32) -> i32 { if a > 0 { a } else { 0 } }",
            0,
        );
    }

    #[test]
    fn test_branch_if_counts_each_branch() {
        let src = "
fn f(a: i32) {
    if a > 0 {
        log(a);
    }
    if a < 0 {
        log(-a);
    }
}
";
        assert_mutation_count(IF, src, 2);
    }

    #[test]
    fn test_branch_else_empties_else_body() {
        let src = "fn f(a: i32) { if a > 0 { log(a); } else { warn(a); } }";
        let all = mutants(ELSE, src);
        assert_eq!(all.len(), 1);
        assert!(all[0].contains("log(a)"));
        assert!(!all[0].contains("warn(a)"));
    }

    #[test]
    fn test_branch_else_skips_else_if() {
        let src = "fn f(a: i32) { if a > 0 { log(a); } else if a < 0 { warn(a); } }";
        assert_mutation_count(ELSE, src, 0);
    }

    #[test]
    fn test_branch_case_three_arms_skips_wildcard() {
        let src = "
fn f(n: u8) {
    match n {
        0 => {
            zero();
        }
        1 => {
            one();
        }
        2 => {
            two();
        }
        _ => {
            many();
        }
    }
}
";
        let all = mutants(CASE, src);
        assert_eq!(all.len(), 3);
        assert!(!all[0].contains("zero()"));
        assert!(all[0].contains("many()"));
        assert!(!all[1].contains("one()"));
        assert!(!all[2].contains("two()"));
    }

    #[test]
    fn test_branch_case_skips_expression_arms() {
        // Arm bodies that are plain expressions produce the match value; emptying
        // them is not well formed.
        let src = "fn f(n: u8) -> u8 { match n { 0 => 1, _ => 2 } }";
        assert_mutation_count(CASE, src, 0);
    }
}
