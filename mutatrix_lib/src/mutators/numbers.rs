//! Number mutations: nudging integer literals up or down by one.

use crate::error::{MutatrixError, Result};
use crate::mutator::{Mutator, NodeMut, NodeRef};
use crate::types::TypeIndex;

pub const INCREMENTER: &str = "numbers/incrementer";
pub const DECREMENTER: &str = "numbers/decrementer";

fn int_literal(node: NodeRef<'_>) -> Option<&syn::LitInt> {
    match node {
        NodeRef::Expr(syn::Expr::Lit(lit)) => match &lit.lit {
            syn::Lit::Int(int) => Some(int),
            _ => None,
        },
        _ => None,
    }
}

fn literal_value(node: NodeRef<'_>) -> Option<u128> {
    int_literal(node).and_then(|int| int.base10_parse::<u128>().ok())
}

/// The largest value a literal with this suffix can hold.  An unsuffixed literal's
/// type is not knowable from the token; those are bounded only by the widest type
/// and a rare out-of-range mutant is left for the compile phase to triage.
fn suffix_max(suffix: &str) -> u128 {
    match suffix {
        "i8" => i8::MAX as u128,
        "i16" => i16::MAX as u128,
        "i32" => i32::MAX as u128,
        "i64" => i64::MAX as u128,
        "i128" => i128::MAX as u128,
        "isize" => isize::MAX as u128,
        "u8" => u8::MAX as u128,
        "u16" => u16::MAX as u128,
        "u32" => u32::MAX as u128,
        "u64" => u64::MAX as u128,
        "usize" => usize::MAX as u128,
        _ => u128::MAX,
    }
}

/// The literal's value and the largest value its declared type can represent, when
/// the node is an integer literal.
fn literal_value_and_max(node: NodeRef<'_>) -> Option<(u128, u128)> {
    let int = int_literal(node)?;
    let value = int.base10_parse::<u128>().ok()?;
    Some((value, suffix_max(int.suffix())))
}

/// Rewrite the literal behind `node` to `value`, keeping its suffix and position.
fn set_literal(node: NodeMut<'_>, value: u128, name: &str, variant: usize) -> Result<()> {
    let lit = match node {
        NodeMut::Expr(syn::Expr::Lit(lit)) => lit,
        _ => return Err(MutatrixError::NoSuchMutation(name.to_string(), variant)),
    };
    let (suffix, span) = match &lit.lit {
        syn::Lit::Int(int) => (int.suffix().to_string(), int.span()),
        _ => return Err(MutatrixError::NoSuchMutation(name.to_string(), variant)),
    };

    let repr = format!("{}{}", value, suffix);
    lit.lit = syn::Lit::Int(syn::LitInt::new(&repr, span));

    Ok(())
}

/// `numbers/incrementer`: an integer literal `n` becomes `n + 1`.
pub struct NumbersIncrementer;

impl Mutator for NumbersIncrementer {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        int_literal(node).is_some()
    }

    fn mutation_count(&self, _types: &TypeIndex, node: NodeRef<'_>) -> usize {
        match literal_value_and_max(node) {
            Some((value, max)) if value < max => 1,
            _ => 0,
        }
    }

    fn mutate(&self, _types: &TypeIndex, node: NodeMut<'_>, variant: usize) -> Result<()> {
        let value = match literal_value_and_max(node.as_ref()) {
            Some((value, max)) if value < max => value,
            _ => return Err(MutatrixError::NoSuchMutation(INCREMENTER.to_string(), variant)),
        };

        set_literal(node, value + 1, INCREMENTER, variant)
    }
}

/// `numbers/decrementer`: an integer literal `n` becomes `n - 1`.  Zero is left
/// alone; the literal's type may be unsigned.
pub struct NumbersDecrementer;

impl Mutator for NumbersDecrementer {
    fn matches(&self, node: NodeRef<'_>) -> bool {
        int_literal(node).is_some()
    }

    fn mutation_count(&self, _types: &TypeIndex, node: NodeRef<'_>) -> usize {
        match literal_value(node) {
            Some(value) if value > 0 => 1,
            _ => 0,
        }
    }

    fn mutate(&self, _types: &TypeIndex, node: NodeMut<'_>, variant: usize) -> Result<()> {
        let value = match literal_value(node.as_ref()) {
            Some(value) if value > 0 => value,
            _ => return Err(MutatrixError::NoSuchMutation(DECREMENTER.to_string(), variant)),
        };

        set_literal(node, value - 1, DECREMENTER, variant)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{assert_mutation_count, mutants};
    use super::*;

    #[test]
    fn test_numbers_incrementer_two_literals() {
        let src = "
fn f(n: i64) -> i64 {
    let base = 10;
    base * n + 3
}
";
        let all = mutants(INCREMENTER, src);
        assert_eq!(all.len(), 2);
        assert!(all[0].contains("let base = 11;"));
        assert!(all[0].contains("base * n + 3"));
        assert!(all[1].contains("let base = 10;"));
        assert!(all[1].contains("base * n + 4"));
    }

    #[test]
    fn test_numbers_incrementer_keeps_suffix() {
        let all = mutants(INCREMENTER, "fn f() -> u8 { 41u8 }");
        assert_eq!(all.len(), 1);
        assert!(all[0].contains("42u8"));
    }

    #[test]
    fn test_numbers_incrementer_respects_type_range() {
        // A literal already at its type's maximum proposes nothing.
        assert_mutation_count(INCREMENTER, "fn f() -> u8 { 255u8 }", 0);
        assert_mutation_count(INCREMENTER, "fn f() -> i8 { 127i8 }", 0);
        assert_mutation_count(INCREMENTER, "fn f() -> u16 { 65535u16 }", 0);

        let all = mutants(INCREMENTER, "fn f() -> u8 { 254u8 }");
        assert_eq!(all.len(), 1);
        assert!(all[0].contains("255u8"));
    }

    #[test]
    fn test_numbers_decrementer() {
        let all = mutants(DECREMENTER, "fn f() -> i32 { 100 }");
        assert_eq!(all.len(), 1);
        assert!(all[0].contains("99"));
    }

    #[test]
    fn test_numbers_decrementer_skips_zero() {
        assert_mutation_count(DECREMENTER, "fn f() -> i32 { 0 }", 0);
    }

    #[test]
    fn test_numbers_skip_array_length_types() {
        // The `4` in the type is an array length, not a mutable literal.
        assert_mutation_count(INCREMENTER, "fn f(buf: [u8; 4]) -> usize { buf.len() }", 0);
    }

    #[test]
    fn test_numbers_skip_string_literals() {
        assert_mutation_count(INCREMENTER, "fn f() -> &'static str { \"10\" }", 0);
    }
}
