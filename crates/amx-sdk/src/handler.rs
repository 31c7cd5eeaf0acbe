//! Native function registry (name-based binding)
//!
//! A program image lists the natives it calls by name. Libraries put their
//! handlers into a `NativeFunctionRegistry`; the machine binds its native
//! table against one registry at a time.

use crate::context::NativeContext;
use crate::error::AmxResult;
use crate::value::Cell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A native function handler
pub type NativeFn = Arc<dyn Fn(&mut dyn NativeContext, &[Cell]) -> AmxResult<Cell> + Send + Sync>;

/// Registry of native functions indexed by name.
#[derive(Clone, Default)]
pub struct NativeFunctionRegistry {
    handlers: HashMap<String, NativeFn>,
}

impl NativeFunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a native function by name, replacing any earlier handler
    pub fn register(
        &mut self,
        name: &str,
        handler: impl Fn(&mut dyn NativeContext, &[Cell]) -> AmxResult<Cell> + Send + Sync + 'static,
    ) {
        self.handlers.insert(name.to_string(), Arc::new(handler));
    }

    /// Get a handler by name (used at bind time)
    pub fn get(&self, name: &str) -> Option<NativeFn> {
        self.handlers.get(name).cloned()
    }

    /// Check if a handler is registered
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for NativeFunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunctionRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// A named set of natives installed into a machine in one step
#[derive(Debug, Clone)]
pub struct NativeLibrary {
    name: String,
    registry: NativeFunctionRegistry,
}

impl NativeLibrary {
    /// Create an empty library
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: NativeFunctionRegistry::new(),
        }
    }

    /// Library name (e.g. "core", "fixed")
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The functions this library provides
    pub fn registry(&self) -> &NativeFunctionRegistry {
        &self.registry
    }

    /// Mutable access for library builders
    pub fn registry_mut(&mut self) -> &mut NativeFunctionRegistry {
        &mut self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = NativeFunctionRegistry::new();
        registry.register("min", |_ctx, _args| Ok(Cell::new(1)));

        assert!(registry.contains("min"));
        assert!(!registry.contains("max"));
        assert!(registry.get("min").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_replaces_handler() {
        let mut registry = NativeFunctionRegistry::new();
        registry.register("abs", |_ctx, _args| Ok(Cell::new(1)));
        registry.register("abs", |_ctx, _args| Ok(Cell::new(2)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names_are_sorted() {
        let mut library = NativeLibrary::new("core");
        library.registry_mut().register("toupper", |_ctx, _args| Ok(Cell::ZERO));
        library.registry_mut().register("clamp", |_ctx, _args| Ok(Cell::ZERO));
        library.registry_mut().register("max", |_ctx, _args| Ok(Cell::ZERO));

        assert_eq!(library.name(), "core");
        assert_eq!(library.registry().names(), vec!["clamp", "max", "toupper"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = NativeFunctionRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.names().is_empty());
    }
}
