//! The `mutators` module contains the shipped mutation operators, one submodule per
//! operator category.  Operator names follow the `category/operator` convention used
//! on the command line and in annotations.

pub mod arithmetic;
pub mod branch;
pub mod conditional;
pub mod expression;
pub mod loops;
pub mod numbers;
pub mod statement;

use crate::error::Result;
use crate::registry::MutatorRegistry;

/// Register every operator shipped with the library.
pub fn register_builtin(registry: &mut MutatorRegistry) -> Result<()> {
    registry.register(arithmetic::BASE, || Box::new(arithmetic::ArithmeticBase))?;
    registry.register(arithmetic::ASSIGNMENT, || {
        Box::new(arithmetic::ArithmeticAssignment)
    })?;
    registry.register(arithmetic::BITWISE, || {
        Box::new(arithmetic::ArithmeticBitwise)
    })?;
    registry.register(arithmetic::INVERT, || Box::new(arithmetic::ArithmeticInvert))?;
    registry.register(arithmetic::ASSIGN_INVERT, || {
        Box::new(arithmetic::ArithmeticAssignInvert)
    })?;
    registry.register(branch::IF, || Box::new(branch::BranchIf))?;
    registry.register(branch::ELSE, || Box::new(branch::BranchElse))?;
    registry.register(branch::CASE, || Box::new(branch::BranchCase))?;
    registry.register(conditional::NEGATED, || {
        Box::new(conditional::ConditionalNegated)
    })?;
    registry.register(expression::REMOVE, || {
        Box::new(expression::ExpressionRemove)
    })?;
    registry.register(loops::BREAK, || Box::new(loops::LoopBreak))?;
    registry.register(loops::RANGE_BREAK, || Box::new(loops::LoopRangeBreak))?;
    registry.register(numbers::INCREMENTER, || {
        Box::new(numbers::NumbersIncrementer)
    })?;
    registry.register(numbers::DECREMENTER, || {
        Box::new(numbers::NumbersDecrementer)
    })?;
    registry.register(statement::REMOVE, || Box::new(statement::StatementRemove))?;

    Ok(())
}

/// Return true if `op` is a compound-assignment operator.
pub(crate) fn is_assign_op(op: &syn::BinOp) -> bool {
    matches!(
        op,
        syn::BinOp::AddAssign(_)
            | syn::BinOp::SubAssign(_)
            | syn::BinOp::MulAssign(_)
            | syn::BinOp::DivAssign(_)
            | syn::BinOp::RemAssign(_)
            | syn::BinOp::BitXorAssign(_)
            | syn::BinOp::BitAndAssign(_)
            | syn::BinOp::BitOrAssign(_)
            | syn::BinOp::ShlAssign(_)
            | syn::BinOp::ShrAssign(_)
    )
}
