//! Evaluation contexts: immutable sets of named variables.
//!
//! A [`Context`] is never edited in place. Nodes that need to present
//! different variables to their inputs derive a new context through an
//! [`EditableScope`] and pass it down explicitly, so the caller's context is
//! untouched once the nested evaluation returns, on success or error.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::cache::hash::{Digest, HashAccumulator};
use crate::error::{GraphError, GraphResult};
use crate::model::Value;

pub const FRAME: &str = "frame";
pub const FRAMES_PER_SECOND: &str = "framesPerSecond";

/// Cooperative cancellation flag shared between a requester and the
/// computes it triggers.
#[derive(Clone, Default, Debug)]
pub struct Canceller {
    flag: Arc<AtomicBool>,
}

impl Canceller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Immutable mapping from variable name to value, with a precomputed digest.
///
/// Cloning is cheap. The canceller travels with the context but is not part
/// of its identity.
#[derive(Clone)]
pub struct Context {
    variables: Arc<BTreeMap<String, Value>>,
    digest: Digest,
    canceller: Option<Canceller>,
}

impl Context {
    pub fn new() -> Self {
        Self::from_variables(BTreeMap::new(), None)
    }

    /// A context holding only the `frame` variable.
    pub fn with_frame(frame: f64) -> Self {
        let mut variables = BTreeMap::new();
        variables.insert(FRAME.to_string(), Value::float(frame));
        Self::from_variables(variables, None)
    }

    fn from_variables(variables: BTreeMap<String, Value>, canceller: Option<Canceller>) -> Self {
        let mut h = HashAccumulator::new();
        h.append_u64(variables.len() as u64);
        for (name, value) in &variables {
            h.append_str(name);
            value.hash_into(&mut h);
        }
        Self {
            variables: Arc::new(variables),
            digest: h.finish(),
            canceller,
        }
    }

    pub fn get(&self, name: &str) -> GraphResult<&Value> {
        self.variables
            .get(name)
            .ok_or_else(|| GraphError::missing_variable(name))
    }

    pub fn get_or<'a>(&'a self, name: &str, default: &'a Value) -> &'a Value {
        self.variables.get(name).unwrap_or(default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn frame(&self) -> GraphResult<f64> {
        frame_of(self.get(FRAME)?)
    }

    pub fn hash(&self) -> Digest {
        self.digest
    }

    pub fn canceller(&self) -> Option<&Canceller> {
        self.canceller.as_ref()
    }

    pub fn with_canceller(&self, canceller: Canceller) -> Self {
        Self {
            variables: Arc::clone(&self.variables),
            digest: self.digest,
            canceller: Some(canceller),
        }
    }

    /// Fails with [`GraphError::Cancelled`] once the attached canceller fires.
    pub fn check_cancelled(&self) -> GraphResult<()> {
        match &self.canceller {
            Some(c) if c.is_cancelled() => Err(GraphError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Starts an editable copy of this context.
    pub fn scope(&self) -> EditableScope {
        EditableScope {
            variables: (*self.variables).clone(),
            canceller: self.canceller.clone(),
        }
    }

    /// Builds a derived context by running `edit` over an [`EditableScope`].
    pub fn derive<F>(&self, edit: F) -> GraphResult<Context>
    where
        F: FnOnce(&mut EditableScope) -> GraphResult<()>,
    {
        let mut scope = self.scope();
        edit(&mut scope)?;
        Ok(scope.finish())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.variables == other.variables
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("variables", &self.variables)
            .field("digest", &self.digest)
            .finish()
    }
}

fn frame_of(value: &Value) -> GraphResult<f64> {
    value.as_float().ok_or_else(|| GraphError::TypeMismatch {
        plug: format!("context:{}", FRAME),
        expected: "float".into(),
        found: value.data_type().to_string(),
    })
}

/// A private, mutable copy of a context. Publishing it with
/// [`finish`](EditableScope::finish) freezes it into a new [`Context`].
pub struct EditableScope {
    variables: BTreeMap<String, Value>,
    canceller: Option<Canceller>,
}

impl EditableScope {
    pub fn get(&self, name: &str) -> GraphResult<&Value> {
        self.variables
            .get(name)
            .ok_or_else(|| GraphError::missing_variable(name))
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    pub fn frame(&self) -> GraphResult<f64> {
        frame_of(self.get(FRAME)?)
    }

    pub fn set_frame(&mut self, frame: f64) -> &mut Self {
        self.set(FRAME, frame)
    }

    pub fn finish(self) -> Context {
        Context::from_variables(self.variables, self.canceller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_contexts_hash_equal() {
        let a = Context::new().derive(|s| {
            s.set("a", 1i64).set("b", "x");
            Ok(())
        });
        let b = Context::new().derive(|s| {
            s.set("b", "x").set("a", 1i64);
            Ok(())
        });
        assert_eq!(a.unwrap().hash(), b.unwrap().hash());
    }

    #[test]
    fn test_different_values_hash_differently() {
        assert_ne!(Context::with_frame(1.0).hash(), Context::with_frame(2.0).hash());
    }

    #[test]
    fn test_missing_variable() {
        let ctx = Context::new();
        assert_eq!(
            ctx.get("frame").unwrap_err(),
            GraphError::MissingVariable {
                name: "frame".to_string()
            }
        );
        assert_eq!(ctx.get_or("frame", &Value::Int(1)), &Value::Int(1));
    }

    #[test]
    fn test_derive_leaves_original_untouched() {
        let ctx = Context::with_frame(5.0);
        let derived = ctx
            .derive(|s| {
                let f = s.frame()?;
                s.set_frame(f * 2.0);
                Ok(())
            })
            .unwrap();
        assert_eq!(ctx.frame().unwrap(), 5.0);
        assert_eq!(derived.frame().unwrap(), 10.0);
    }

    #[test]
    fn test_failed_derive_leaves_original_untouched() {
        let ctx = Context::with_frame(5.0);
        let result = ctx.derive(|s| {
            s.set_frame(99.0);
            Err(GraphError::Cancelled)
        });
        assert!(result.is_err());
        assert_eq!(ctx.frame().unwrap(), 5.0);
    }

    #[test]
    fn test_canceller_not_part_of_identity() {
        let ctx = Context::with_frame(1.0);
        let canceller = Canceller::new();
        let cancellable = ctx.with_canceller(canceller.clone());
        assert_eq!(ctx.hash(), cancellable.hash());
        assert!(cancellable.check_cancelled().is_ok());
        canceller.cancel();
        assert_eq!(cancellable.check_cancelled(), Err(GraphError::Cancelled));
        assert!(ctx.check_cancelled().is_ok());
    }

    #[test]
    fn test_non_numeric_frame_is_a_type_mismatch() {
        let ctx = Context::new()
            .derive(|s| {
                s.set(FRAME, "ten");
                Ok(())
            })
            .unwrap();
        let expected = GraphError::TypeMismatch {
            plug: "context:frame".to_string(),
            expected: "float".to_string(),
            found: "string".to_string(),
        };
        assert_eq!(ctx.frame(), Err(expected.clone()));
        assert_eq!(ctx.scope().frame(), Err(expected));
    }
}
