//! Name-keyed dispatch table of function generators.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use super::{
    Abs, Darken, FunctionGenerator, Lighten, Mix, Percentage, Quote, Rgb, Rgba, Rounding,
    StrLength, ToLowerCase, ToUpperCase, Unquote,
};

/// The built-in registry, created on first use.
static BUILTIN: OnceLock<FunctionRegistry> = OnceLock::new();

/// An immutable mapping from function name to generator.
///
/// The registry never changes after it is built, so a single instance can be
/// shared by any number of compilations, including concurrent ones.
///
/// # Example
///
/// ```
/// use horizon_lattice_sass::functions::FunctionRegistry;
///
/// let registry = FunctionRegistry::builtin();
/// assert!(registry.contains("lighten"));
/// assert!(!registry.contains("calc"));
/// ```
pub struct FunctionRegistry {
    generators: HashMap<&'static str, Box<dyn FunctionGenerator>>,
}

impl FunctionRegistry {
    /// The shared registry holding every built-in function.
    pub fn builtin() -> &'static FunctionRegistry {
        BUILTIN.get_or_init(|| Self::builder().with_builtins().build())
    }

    /// Start building a custom registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up a generator by its exact name.
    pub fn get(&self, name: &str) -> Option<&dyn FunctionGenerator> {
        self.generators.get(name).map(|generator| generator.as_ref())
    }

    /// Check if a function is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.generators.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered functions.
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

/// Builder for [`FunctionRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    generators: HashMap<&'static str, Box<dyn FunctionGenerator>>,
}

impl RegistryBuilder {
    /// Register a generator under its own name. A later registration of the
    /// same name replaces the earlier one.
    pub fn register(mut self, generator: impl FunctionGenerator + 'static) -> Self {
        let name = generator.name();
        if self.generators.insert(name, Box::new(generator)).is_some() {
            tracing::warn!("Function '{}' registered twice, keeping the latest", name);
        }
        self
    }

    /// Register every built-in function.
    pub fn with_builtins(self) -> Self {
        self.register(Lighten)
            .register(Darken)
            .register(Mix)
            .register(Rgb)
            .register(Rgba)
            .register(Abs)
            .register(Rounding::CEIL)
            .register(Rounding::FLOOR)
            .register(Rounding::ROUND)
            .register(Percentage)
            .register(Quote)
            .register(Unquote)
            .register(ToUpperCase)
            .register(ToLowerCase)
            .register(StrLength)
    }

    /// Finish building.
    pub fn build(self) -> FunctionRegistry {
        FunctionRegistry {
            generators: self.generators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{ArgumentError, FunctionCall, Generated};
    use crate::render::Strategy;

    struct Shout;

    impl FunctionGenerator for Shout {
        fn name(&self) -> &'static str {
            "shout"
        }

        fn apply(&self, _call: &FunctionCall<'_>, _strategy: Strategy) -> Result<Generated, ArgumentError> {
            Ok(Generated::Text("HEY".into()))
        }
    }

    #[test]
    fn builtin_names() {
        let registry = FunctionRegistry::builtin();
        for name in ["lighten", "darken", "mix", "rgba", "round", "percentage", "unquote"] {
            assert!(registry.contains(name), "missing {name}");
        }
        assert_eq!(registry.len(), 15);
        assert!(registry.get("Lighten").is_none());
    }

    #[test]
    fn custom_registry() {
        let registry = FunctionRegistry::builder().register(Shout).build();
        assert_eq!(registry.names(), vec!["shout"]);
        assert!(!registry.contains("lighten"));
    }

    #[test]
    fn builtin_is_shared() {
        assert!(std::ptr::eq(FunctionRegistry::builtin(), FunctionRegistry::builtin()));
    }
}
