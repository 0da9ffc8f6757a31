//! Statement mutations: removing an assignment statement from its enclosing block.

use super::is_assign_op;
use crate::error::{MutatrixError, Result};
use crate::mutator::{Mutator, NodeMut, NodeRef};
use crate::types::TypeIndex;

pub const REMOVE: &str = "statement/remove";

/// True if `stmt` can be deleted from a block without damaging the program: plain
/// and compound assignments only.  `let` bindings, items, control flow, and block
/// tail expressions stay.
fn is_removable(stmt: &syn::Stmt) -> bool {
    match stmt {
        syn::Stmt::Expr(expr, Some(_)) => match expr {
            syn::Expr::Assign(_) => true,
            syn::Expr::Binary(binary) => is_assign_op(&binary.op),
            _ => false,
        },
        _ => false,
    }
}

/// `statement/remove`: an assignment statement is removed from its enclosing block;
/// one mutation per removable statement.
pub struct StatementRemove;

impl StatementRemove {
    fn removable_indices(block: &syn::Block) -> Vec<usize> {
        block
            .stmts
            .iter()
            .enumerate()
            .filter(|(_, stmt)| is_removable(stmt))
            .map(|(index, _)| index)
            .collect()
    }
}

impl Mutator for StatementRemove {
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
