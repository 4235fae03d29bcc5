//! Callback registry: sorts caller bindings into plain data and invocable
//! callbacks.
//!
//! The server only learns the *names* of callbacks (each mapped to `true`);
//! the functions themselves stay in a `CallbackTable` owned by the engine for
//! the duration of one interactive call.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use serde_json::{Map, Value};

/// What a callback resolves to. The error string is the callback's own message.
pub type CallbackResult = Result<Value, String>;

type CallbackFn = dyn Fn(Vec<Value>) -> BoxFuture<'static, CallbackResult> + Send + Sync;

/// A client-side function the server may invoke mid-call.
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    /// Wrap an async function taking the server-supplied positional args.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        Self(Arc::new(move |args| f(args).boxed()))
    }

    /// Wrap a synchronous function.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> CallbackResult + Send + Sync + 'static,
    {
        Self(Arc::new(move |args| future::ready(f(args)).boxed()))
    }

    pub fn invoke(&self, args: Vec<Value>) -> BoxFuture<'static, CallbackResult> {
        (self.0)(args)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// A single named entry passed to an interactive call.
#[derive(Debug, Clone)]
pub enum Binding {
    Value(Value),
    Callback(Callback),
}

impl Binding {
    pub fn is_invocable(&self) -> bool {
        matches!(self, Binding::Callback(_))
    }
}

impl From<Value> for Binding {
    fn from(value: Value) -> Self {
        Binding::Value(value)
    }
}

impl From<Callback> for Binding {
    fn from(callback: Callback) -> Self {
        Binding::Callback(callback)
    }
}

/// Name → binding map supplied by the caller.
///
/// ```ignore
/// let bindings = Bindings::new()
///     .value("player", json!("alice"))
///     .callback("getHand", Callback::sync(|_| Ok(json!(1))));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: BTreeMap<String, Binding>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, Binding::Value(value));
        self
    }

    pub fn callback(mut self, name: impl Into<String>, callback: Callback) -> Self {
        self.insert(name, Binding::Callback(callback));
        self
    }

    /// Insert or replace a binding.
    pub fn insert(&mut self, name: impl Into<String>, binding: impl Into<Binding>) {
        self.entries.insert(name.into(), binding.into());
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>, B: Into<Binding>> FromIterator<(K, B)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (K, B)>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        for (name, binding) in iter {
            bindings.insert(name, binding);
        }
        bindings
    }
}

/// Callbacks available to one interactive call.
#[derive(Debug, Default)]
pub struct CallbackTable {
    callbacks: BTreeMap<String, Callback>,
}

impl CallbackTable {
    pub fn get(&self, name: &str) -> Option<&Callback> {
        self.callbacks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.callbacks.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

/// Result of splitting a `Bindings` map.
#[derive(Debug)]
pub struct SplitBindings {
    /// Non-invocable entries, sent to the server as-is.
    pub values: Map<String, Value>,
    /// Invocable entry names, each mapped to `true`.
    pub methods: Map<String, Value>,
    pub table: CallbackTable,
}

pub fn split(bindings: Bindings) -> SplitBindings {
    let mut values = Map::new();
    let mut methods = Map::new();
    let mut callbacks = BTreeMap::new();

    for (name, binding) in bindings.entries {
        match binding {
            Binding::Value(value) => {
                values.insert(name, value);
            }
            Binding::Callback(callback) => {
                methods.insert(name.clone(), Value::Bool(true));
                callbacks.insert(name, callback);
            }
        }
    }

    SplitBindings {
        values,
        methods,
        table: CallbackTable { callbacks },
    }
}
