//! The `mutator` module provides the trait implemented by every mutation operator and the
//! node model the operators work against.

use crate::error::Result;
use crate::types::TypeIndex;
use proc_macro2::Span;
use syn::spanned::Spanned;

/// A borrowed view of a mutable site candidate in the syntax tree.
///
/// Operators inspect nodes through this enum; the traversal hands out only the node
/// kinds an operator can act on.
#[derive(Clone, Copy)]
pub enum NodeRef<'a> {
    /// An expression node.
    Expr(&'a syn::Expr),

    /// A block of statements.
    Block(&'a syn::Block),
}

impl<'a> NodeRef<'a> {
    /// The source span of the node, used by node filters to map the node back to its
    /// position in the file.
    pub fn span(&self) -> Span {
        match self {
            NodeRef::Expr(e) => e.span(),
            NodeRef::Block(b) => b.span(),
        }
    }

    /// The 1-based line on which the node starts.
    pub fn start_line(&self) -> usize {
        self.span().start().line
    }
}

/// A mutable view of the node an operator is about to rewrite.
pub enum NodeMut<'a> {
    Expr(&'a mut syn::Expr),
    Block(&'a mut syn::Block),
}

impl<'a> NodeMut<'a> {
    /// Reborrow the node immutably, e.g. to re-run the shape predicate.
    pub fn as_ref(&self) -> NodeRef<'_> {
        match self {
            NodeMut::Expr(e) => NodeRef::Expr(&**e),
            NodeMut::Block(b) => NodeRef::Block(&**b),
        }
    }
}

/// An owned copy of a node, taken by the walker before an operator mutates it and
/// written back afterwards to revert the mutation.
#[derive(Clone)]
pub enum NodeSnapshot {
    Expr(syn::Expr),
    Block(syn::Block),
}

impl NodeSnapshot {
    /// Capture the current state of `node`.
    pub fn of(node: NodeRef<'_>) -> NodeSnapshot {
        match node {
            NodeRef::Expr(e) => NodeSnapshot::Expr(e.clone()),
            NodeRef::Block(b) => NodeSnapshot::Block(b.clone()),
        }
    }

    /// Write the saved state back over `node`.
    pub fn restore(self, node: NodeMut<'_>) {
        match (self, node) {
            (NodeSnapshot::Expr(saved), NodeMut::Expr(e)) => *e = saved,
            (NodeSnapshot::Block(saved), NodeMut::Block(b)) => *b = saved,
            // The walker restores the same node it snapshotted, so the kinds
            // cannot disagree.
            _ => unreachable!("snapshot and node kind mismatch"),
        }
    }
}

/// Trait implemented by every mutation operator.
///
/// An operator is a pure function over a single node: it never mutates eagerly, it only
/// proposes.  `mutation_count` reports how many distinct mutations the operator offers
/// at a node (zero when the node is of the right shape but offers nothing, or when a
/// type guardrail rejects it), and `mutate` applies exactly one of them in place.
///
/// The walker reverts each mutation by restoring a [`NodeSnapshot`] taken before
/// `mutate` ran, so apply and revert are exact inverses by construction.
///
/// # Contract
///
/// `matches` is the shape predicate the traversal uses to line up its counting and
/// mutating passes.  It must be *stable under the operator's own mutations*: a node
/// this operator has mutated must still satisfy `matches`.  Operators therefore match
/// on node shape (an `if` expression, a binary expression with an operator from a
/// closed set) rather than on content the mutation changes.
pub trait Mutator {
    /// Return true if this operator targets nodes shaped like `node`.
    fn matches(&self, node: NodeRef<'_>) -> bool;

    /// The number of distinct mutations proposed at `node`.  Only meaningful when
    /// `matches(node)` is true.
    fn mutation_count(&self, types: &TypeIndex, node: NodeRef<'_>) -> usize;

    /// Apply mutation `variant` (in `0..mutation_count`) to `node` in place.
    fn mutate(&self, types: &TypeIndex, node: NodeMut<'_>, variant: usize) -> Result<()>;
}
