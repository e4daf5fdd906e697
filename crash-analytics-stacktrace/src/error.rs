use crate::Dialect;

/// Two frame- or thread-typed operands did not share a dialect.
///
/// Operations requiring both operands to be the same dialect (cross-dialect
/// comparison, paired-unknown renaming, …) fail loudly rather than silently
/// coercing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("dialect mismatch: {left} vs {right}")]
pub struct DialectMismatch {
    /// Dialect of the left-hand operand.
    pub left: Dialect,
    /// Dialect of the right-hand operand.
    pub right: Dialect,
}
