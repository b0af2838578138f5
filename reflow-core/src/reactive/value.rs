//! Dynamically Typed Node Payload
//!
//! Every node in the registry carries a [`Value`]: a cheaply clonable,
//! type-erased payload. A single registry holds heterogeneous nodes (an
//! integer signal next to a string computer), so the payload is a tagged
//! `Any` rather than a generic parameter on the whole graph.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A type-erased reactive payload.
///
/// Cloning a `Value` is cheap: the underlying data is shared behind an `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// let v = Value::new(1314i64);
/// assert_eq!(v.get::<i64>(), Some(1314));
/// assert_eq!(v.get::<String>(), None);
/// ```
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    /// Wrap a concrete value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Downcast and clone the payload, or `None` on a type mismatch.
    pub fn get<T: Any + Clone>(&self) -> Option<T> {
        self.inner.downcast_ref::<T>().cloned()
    }

    /// Borrow the payload as a concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Check whether the payload is of type `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// The type name recorded at construction. Diagnostic only.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Value").field(&self.type_name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_round_trips_concrete_type() {
        let v = Value::new(42i64);
        assert_eq!(v.get::<i64>(), Some(42));
        assert!(v.is::<i64>());
    }

    #[test]
    fn value_rejects_wrong_type() {
        let v = Value::new("hello".to_string());
        assert_eq!(v.get::<i64>(), None);
        assert!(!v.is::<i64>());
        assert_eq!(v.get::<String>(), Some("hello".to_string()));
    }

    #[test]
    fn value_clone_shares_payload() {
        let v1 = Value::new(vec![1, 2, 3]);
        let v2 = v1.clone();
        assert_eq!(v2.get::<Vec<i32>>(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn value_records_type_name() {
        let v = Value::new(7u8);
        assert_eq!(v.type_name(), "u8");
    }
}
