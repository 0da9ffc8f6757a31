//! Expression mutations: dropping a side-effecting call statement from its block.

use crate::error::{MutatrixError, Result};
use crate::mutator::{Mutator, NodeMut, NodeRef};
use crate::types::TypeIndex;

pub const REMOVE: &str = "expression/remove";

/// True if `stmt` is a side-effecting call statement: a function call, a method
/// call, or a macro invocation in statement position.
fn is_call_statement(stmt: &syn::Stmt) -> bool {
    match stmt {
        syn::Stmt::Expr(expr, Some(_)) => matches!(
            expr,
            syn::Expr::Call(_) | syn::Expr::MethodCall(_) | syn::Expr::Macro(_)
        ),
        syn::Stmt::Macro(_) => true,
        _ => false,
    }
}

/// `expression/remove`: a side-effecting call expression-statement is dropped from
/// its enclosing block.
pub struct ExpressionRemove;

impl ExpressionRemove {
    fn removable_indices(block: &syn::Block) -> Vec<usize> {
        block
            .stmts
            .iter()
            .enumerate()
            .filter(|(_, stmt)| is_call_statement(stmt))
            .map(|(index, _)| index)
            .collect()
    }
}

impl Mutator for ExpressionRemove {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        matches!(node, NodeRef::Block(_))
    }

    fn mutation_count(&self, _types: &TypeIndex, node: NodeRef<'_>) -> usize {
        match node {
            NodeRef::Block(block) => Self::removable_indices(block).len(),
            _ => 0,
        }
    }

    fn mutate(&self, _types: &TypeIndex, node: NodeMut<'_>, variant: usize) -> Result<()> {
        let misuse = || MutatrixError::NoSuchMutation(REMOVE.to_string(), variant);

        match node {
            NodeMut::Block(block) => {
                let index = *Self::removable_indices(block).get(variant).ok_or_else(misuse)?;
                block.stmts.remove(index);
                Ok(())
            }
            _ => Err(misuse()),
        }
    }
}
