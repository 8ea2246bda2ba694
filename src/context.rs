//! Request-scoped context carrying derived loggers.
//!
//! A [`Context`] is an immutable chain of keyed values. Deriving a new context
//! never changes the one it was derived from, so contexts can be handed to
//! concurrent tasks freely.

use crate::logger::Logger;
use serde_json::Value;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Field name used for request correlation.
pub const REQUEST_ID_FIELD: &str = "request_id";

struct Node {
    key: Cow<'static, str>,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Node>>,
}

#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

impl Context {
    /// Empty root context.
    pub fn background() -> Self {
        Self::default()
    }

    /// A child context with `value` bound under `key`, shadowing any earlier binding.
    pub fn with_value<T>(&self, key: impl Into<Cow<'static, str>>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            head: Some(Arc::new(Node {
                key: key.into(),
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// The nearest value bound under `key`, if it has type `T`.
    pub fn value<T>(&self, key: &str) -> Option<&T>
    where
        T: Any + Send + Sync,
    {
        self.nodes()
            .find(|node| node.key == key)
            .and_then(|node| node.value.downcast_ref::<T>())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes().map(|node| node.key.as_ref())
    }

    fn nodes(&self) -> impl Iterator<Item = &Node> {
        std::iter::successors(self.head.as_deref(), |node| node.parent.as_deref())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

/// Identifier correlating the records of one request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// A fresh random (v4 UUID) identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Logger {
    /// Derive a child carrying `fields` and bind it into a copy of `ctx`.
    ///
    /// The child extends the logger already bound in `ctx`, if any, so fields
    /// accumulate as a request passes through layers.
    pub fn derive_with_fields<I, K, V>(&self, ctx: &Context, fields: I) -> (Context, Logger)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let child = self.from_context(ctx).with_fields(fields);
        let ctx = ctx.with_value(self.context_key().to_string(), child.clone());
        (ctx, child)
    }

    /// The logger bound in `ctx`, or this logger when none is bound.
    pub fn from_context(&self, ctx: &Context) -> Logger {
        ctx.value::<Logger>(self.context_key())
            .cloned()
            .unwrap_or_else(|| self.clone())
    }

    /// Bind a child carrying the `request_id` field.
    pub fn with_request_id(&self, ctx: &Context, id: impl Into<RequestId>) -> (Context, Logger) {
        let id = id.into();
        let (ctx, child) = self.derive_with_fields(ctx, [(REQUEST_ID_FIELD, id.as_str())]);
        (ctx.with_value(REQUEST_ID_FIELD, id), child)
    }
}

/// Request identifier bound by [`Logger::with_request_id`], if any.
pub fn request_id(ctx: &Context) -> Option<&RequestId> {
    ctx.value::<RequestId>(REQUEST_ID_FIELD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_values_shadow_without_mutating_parent() {
        let root = Context::background().with_value("user", "alice".to_string());
        let child = root.with_value("user", "bob".to_string());

        assert_eq!(root.value::<String>("user").map(String::as_str), Some("alice"));
        assert_eq!(child.value::<String>("user").map(String::as_str), Some("bob"));
        assert_eq!(child.keys().collect::<Vec<_>>(), vec!["user", "user"]);
    }

    #[test]
    fn test_value_type_mismatch_is_none() {
        let ctx = Context::background().with_value("n", 7u32);
        assert_eq!(ctx.value::<u32>("n"), Some(&7));
        assert!(ctx.value::<String>("n").is_none());
        assert!(ctx.value::<u32>("missing").is_none());
    }

    #[test]
    fn test_derive_then_lookup() {
        let logger = Logger::noop();
        let root = Context::background();
        let (ctx, child) = logger.derive_with_fields(&root, [("tenant", "acme")]);

        let found = logger.from_context(&ctx);
        assert_eq!(found.fields(), child.fields());
        assert!(logger.from_context(&root).fields().is_empty());
    }

    #[test]
    fn test_derived_fields_accumulate() {
        let logger = Logger::noop();
        let (ctx, _) = logger.derive_with_fields(&Context::background(), [("a", 1)]);
        let (ctx, _) = logger.derive_with_fields(&ctx, [("b", 2)]);
        assert_eq!(
            logger.from_context(&ctx).fields(),
            &[("a".to_string(), json!(1)), ("b".to_string(), json!(2))]
        );
    }

    #[test]
    fn test_with_request_id() {
        let logger = Logger::noop();
        let (ctx, child) = logger.with_request_id(&Context::background(), "req-9");
        assert_eq!(request_id(&ctx).map(RequestId::as_str), Some("req-9"));
        assert_eq!(child.fields(), &[("request_id".to_string(), json!("req-9"))]);
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
        assert_eq!(RequestId::new().as_str().len(), 36);
    }
}
