//! Pull-based, hash-memoized evaluation.
//!
//! A value request first derives the plug's digest from its node's hash
//! contributions and the digests of its inputs, then looks that digest up in
//! the value cache. Nodes only compute on a miss.

pub mod context;
pub mod engine;
pub mod evaluator;

pub use context::EvalContext;
pub use evaluator::ComputeNode;
