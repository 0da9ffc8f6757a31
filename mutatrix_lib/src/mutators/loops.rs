//! Loop mutations: swapping `break` and `continue`, and forcing a range loop to run
//! at most once.

use crate::error::{MutatrixError, Result};
use crate::mutator::{Mutator, NodeMut, NodeRef};
use crate::types::TypeIndex;
use syn::parse_quote;

pub const BREAK: &str = "loop/break";
pub const RANGE_BREAK: &str = "loop/range_break";

/// `loop/break`: a plain `break` becomes `continue` and a plain `continue` becomes
/// `break`.  Labeled or value-carrying forms are left alone; rewriting them does not
/// produce a well-formed loop.
pub struct LoopBreak;

impl Mutator for LoopBreak {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        matches!(
            node,
            NodeRef::Expr(syn::Expr::Break(_)) | NodeRef::Expr(syn::Expr::Continue(_))
        )
    }

    fn mutation_count(&self, _types: &TypeIndex, node: NodeRef<'_>) -> usize {
        match node {
            NodeRef::Expr(syn::Expr::Break(expr)) => {
                if expr.label.is_none() && expr.expr.is_none() {
                    1
                } else {
                    0
                }
            }
            NodeRef::Expr(syn::Expr::Continue(expr)) => {
                if expr.label.is_none() {
                    1
                } else {
                    0
                }
            }
            _ => 0,
        }
    }

    fn mutate(&self, _types: &TypeIndex, node: NodeMut<'_>, variant: usize) -> Result<()> {
        let misuse = || MutatrixError::NoSuchMutation(BREAK.to_string(), variant);

        let expr = match node {
            NodeMut::Expr(expr) => expr,
            _ => return Err(misuse()),
        };

        match expr {
            syn::Expr::Break(broken) => {
                let attrs = std::mem::take(&mut broken.attrs);
                *expr = syn::Expr::Continue(syn::ExprContinue {
                    attrs,
                    continue_token: Default::default(),
                    label: None,
                });
                Ok(())
            }
            syn::Expr::Continue(continued) => {
                let attrs = std::mem::take(&mut continued.attrs);
                *expr = syn::Expr::Break(syn::ExprBreak {
                    attrs,
                    break_token: Default::default(),
                    label: None,
                    expr: None,
                });
                Ok(())
            }
            _ => Err(misuse()),
        }
    }
}

/// `loop/range_break`: an unconditional `break` is prepended to a `for` loop body,
/// so the loop executes at most once.
pub struct LoopRangeBreak;

impl Mutator for LoopRangeBreak {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        matches!(node, NodeRef::Expr(syn::Expr::ForLoop(_)))
    }

    fn mutation_count(&self, _types: &TypeIndex, node: NodeRef<'_>) -> usize {
        if self.matches(node) {
            1
        } else {
            0
        }
    }

    fn mutate(&self, _types: &TypeIndex, node: NodeMut<'_>, variant: usize) -> Result<()> {
        match node {
            NodeMut::Expr(syn::Expr::ForLoop(expr)) => {
                let break_stmt: syn::Stmt = parse_quote! { break; };
                expr.body.stmts.insert(0, break_stmt);
                Ok(())
            }
            _ => Err(MutatrixError::NoSuchMutation(RANGE_BREAK.to_string(), variant)),
        }
    }
}
