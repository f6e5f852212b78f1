// ABOUTME: Sealed trait pattern for engine capability traits.
// ABOUTME: Only this crate's client types may implement them.

/// Sealed trait to prevent external implementations.
pub trait Sealed {}
