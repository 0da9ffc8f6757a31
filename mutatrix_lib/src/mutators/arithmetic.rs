//! Arithmetic operator mutations: swapping binary arithmetic, bitwise, and
//! compound-assignment operators for their alternatives or inverses.

use crate::error::{MutatrixError, Result};
use crate::mutator::{Mutator, NodeMut, NodeRef};
use crate::types::TypeIndex;
use syn::BinOp;

pub const BASE: &str = "arithmetic/base";
pub const ASSIGNMENT: &str = "arithmetic/assignment";
pub const BITWISE: &str = "arithmetic/bitwise";
pub const INVERT: &str = "arithmetic/invert";
pub const ASSIGN_INVERT: &str = "arithmetic/assign_invert";

/// Index of `op` within the binary arithmetic set, if it belongs to it.
fn arith_index(op: &BinOp) -> Option<usize> {
    match op {
        BinOp::Add(_) => Some(0),
        BinOp::Sub(_) => Some(1),
        BinOp::Mul(_) => Some(2),
        BinOp::Div(_) => Some(3),
        BinOp::Rem(_) => Some(4),
        _ => None,
    }
}

fn arith_op(index: usize) -> BinOp {
    match index {
        0 => BinOp::Add(Default::default()),
        1 => BinOp::Sub(Default::default()),
        2 => BinOp::Mul(Default::default()),
        3 => BinOp::Div(Default::default()),
        _ => BinOp::Rem(Default::default()),
    }
}

/// Index of `op` within the arithmetic compound-assignment set.
fn assign_index(op: &BinOp) -> Option<usize> {
    match op {
        BinOp::AddAssign(_) => Some(0),
        BinOp::SubAssign(_) => Some(1),
        BinOp::MulAssign(_) => Some(2),
        BinOp::DivAssign(_) => Some(3),
        BinOp::RemAssign(_) => Some(4),
        _ => None,
    }
}

fn assign_op(index: usize) -> BinOp {
    match index {
        0 => BinOp::AddAssign(Default::default()),
        1 => BinOp::SubAssign(Default::default()),
        2 => BinOp::MulAssign(Default::default()),
        3 => BinOp::DivAssign(Default::default()),
        _ => BinOp::RemAssign(Default::default()),
    }
}

/// Index of `op` within the binary bitwise set.
fn bitwise_index(op: &BinOp) -> Option<usize> {
    match op {
        BinOp::BitAnd(_) => Some(0),
        BinOp::BitOr(_) => Some(1),
        BinOp::BitXor(_) => Some(2),
        BinOp::Shl(_) => Some(3),
        BinOp::Shr(_) => Some(4),
        _ => None,
    }
}

fn bitwise_op(index: usize) -> BinOp {
    match index {
        0 => BinOp::BitAnd(Default::default()),
        1 => BinOp::BitOr(Default::default()),
        2 => BinOp::BitXor(Default::default()),
        3 => BinOp::Shl(Default::default()),
        _ => BinOp::Shr(Default::default()),
    }
}

/// Every set has five members, so a matching node always offers four alternatives.
const ALTERNATIVES: usize = 4;

/// True if `binary` is string concatenation rather than numeric addition.
fn is_string_concat(types: &TypeIndex, binary: &syn::ExprBinary) -> bool {
    matches!(binary.op, BinOp::Add(_) | BinOp::AddAssign(_))
        && (types.is_string_expr(&binary.left) || types.is_string_expr(&binary.right))
}

fn binary_of<'a>(node: &'a NodeRef<'_>) -> Option<&'a syn::ExprBinary> {
    match node {
        NodeRef::Expr(syn::Expr::Binary(binary)) => Some(binary),
        _ => None,
    }
}

/// Swap the operator of the binary expression behind `node` for the one produced by
/// `make(target)`, where `target` is the `variant`th member of the set excluding the
/// current operator.
fn swap_operator(
    name: &str,
    node: NodeMut<'_>,
    variant: usize,
    index_of: fn(&BinOp) -> Option<usize>,
    make: fn(usize) -> BinOp,
) -> Result<()> {
    let misuse = || MutatrixError::NoSuchMutation(name.to_string(), variant);

    let binary = match node {
        NodeMut::Expr(syn::Expr::Binary(binary)) => binary,
        _ => return Err(misuse()),
    };
    let current = index_of(&binary.op).ok_or_else(misuse)?;

    let target = (0..=ALTERNATIVES)
        .filter(|i| *i != current)
        .nth(variant)
        .ok_or_else(misuse)?;
    binary.op = make(target);

    Ok(())
}

/// `arithmetic/base`: a binary arithmetic operator is replaced by each of the other
/// four arithmetic operators.
pub struct ArithmeticBase;

impl Mutator for ArithmeticBase {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        binary_of(&node).is_some_and(|b| arith_index(&b.op).is_some())
    }

    fn mutation_count(&self, types: &TypeIndex, node: NodeRef<'_>) -> usize {
        match binary_of(&node) {
            Some(binary) if arith_index(&binary.op).is_some() => {
                if is_string_concat(types, binary) {
                    0
                } else {
                    ALTERNATIVES
                }
            }
            _ => 0,
        }
    }

    fn mutate(&self, _types: &TypeIndex, node: NodeMut<'_>, variant: usize) -> Result<()> {
        swap_operator(BASE, node, variant, arith_index, arith_op)
    }
}

/// `arithmetic/assignment`: a compound assignment is replaced by each other
/// compound-assignment form.
pub struct ArithmeticAssignment;

impl Mutator for ArithmeticAssignment {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        binary_of(&node).is_some_and(|b| assign_index(&b.op).is_some())
    }

    fn mutation_count(&self, types: &TypeIndex, node: NodeRef<'_>) -> usize {
        match binary_of(&node) {
            Some(binary) if assign_index(&binary.op).is_some() => {
                if is_string_concat(types, binary) {
                    0
                } else {
                    ALTERNATIVES
                }
            }
            _ => 0,
        }
    }

    fn mutate(&self, _types: &TypeIndex, node: NodeMut<'_>, variant: usize) -> Result<()> {
        swap_operator(ASSIGNMENT, node, variant, assign_index, assign_op)
    }
}

/// `arithmetic/bitwise`: a binary bitwise operator is replaced by each of the other
/// four bitwise operators.
pub struct ArithmeticBitwise;

impl Mutator for ArithmeticBitwise {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        binary_of(&node).is_some_and(|b| bitwise_index(&b.op).is_some())
    }

    fn mutation_count(&self, _types: &TypeIndex, node: NodeRef<'_>) -> usize {
        match binary_of(&node) {
            Some(binary) if bitwise_index(&binary.op).is_some() => ALTERNATIVES,
            _ => 0,
        }
    }

    fn mutate(&self, _types: &TypeIndex, node: NodeMut<'_>, variant: usize) -> Result<()> {
        swap_operator(BITWISE, node, variant, bitwise_index, bitwise_op)
    }
}

/// The inverse of an arithmetic operator: `+` ↔ `-`, `*` ↔ `/`.
fn inverse_of(op: &BinOp) -> Option<BinOp> {
    match op {
        BinOp::Add(_) => Some(BinOp::Sub(Default::default())),
        BinOp::Sub(_) => Some(BinOp::Add(Default::default())),
        BinOp::Mul(_) => Some(BinOp::Div(Default::default())),
        BinOp::Div(_) => Some(BinOp::Mul(Default::default())),
        _ => None,
    }
}

fn assign_inverse_of(op: &BinOp) -> Option<BinOp> {
    match op {
        BinOp::AddAssign(_) => Some(BinOp::SubAssign(Default::default())),
        BinOp::SubAssign(_) => Some(BinOp::AddAssign(Default::default())),
        BinOp::MulAssign(_) => Some(BinOp::DivAssign(Default::default())),
        BinOp::DivAssign(_) => Some(BinOp::MulAssign(Default::default())),
        _ => None,
    }
}

/// `arithmetic/invert`: the operator is swapped with its inverse; one mutation per
/// matching node.
pub struct ArithmeticInvert;

impl Mutator for ArithmeticInvert {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        binary_of(&node).is_some_and(|b| inverse_of(&b.op).is_some())
    }

    fn mutation_count(&self, types: &TypeIndex, node: NodeRef<'_>) -> usize {
        match binary_of(&node) {
            Some(binary) if inverse_of(&binary.op).is_some() => {
                if is_string_concat(types, binary) {
                    0
                } else {
                    1
                }
            }
            _ => 0,
        }
    }

    fn mutate(&self, _types: &TypeIndex, node: NodeMut<'_>, variant: usize) -> Result<()> {
        let misuse = || MutatrixError::NoSuchMutation(INVERT.to_string(), variant);

        match node {
            NodeMut::Expr(syn::Expr::Binary(binary)) => {
                binary.op = inverse_of(&binary.op).ok_or_else(misuse)?;
                Ok(())
            }
            _ => Err(misuse()),
        }
    }
}

/// `arithmetic/assign_invert`: the compound-assignment analogue of
/// `arithmetic/invert`.
pub struct ArithmeticAssignInvert;

impl Mutator for ArithmeticAssignInvert {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        binary_of(&node).is_some_and(|b| assign_inverse_of(&b.op).is_some())
    }

    fn mutation_count(&self, types: &TypeIndex, node: NodeRef<'_>) -> usize {
        match binary_of(&node) {
            Some(binary) if assign_inverse_of(&binary.op).is_some() => {
                if is_string_concat(types, binary) {
                    0
                } else {
                    1
                }
            }
            _ => 0,
        }
    }

    fn mutate(&self, _types: &TypeIndex, node: NodeMut<'_>, variant: usize) -> Result<()> {
        let misuse = || MutatrixError::NoSuchMutation(ASSIGN_INVERT.to_string(), variant);

        match node {
            NodeMut::Expr(syn::Expr::Binary(binary)) => {
                binary.op = assign_inverse_of(&binary.op).ok_or_else(misuse)?;
                Ok(())
            }
            _ => Err(misuse()),
        }
    }
}
