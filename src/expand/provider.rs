//! Variable provider capability and its lookup table.
//!
//! Providers are registered by name when the configuration is loaded and
//! looked up per route. Nothing is resolved by type or by reflection.

use rustc_hash::FxHashMap;

use crate::core::{ConfigurationError, ProviderError};
use crate::route::VariableBinding;

/// Supplies the bindings that expand templated routes.
///
/// `method_key` selects one of the provider's binding lists. Each call
/// returns the bindings in the order they should be expanded.
pub trait VariableProvider: Send + Sync {
    fn bindings(&self, method_key: &str) -> Result<Vec<VariableBinding>, ProviderError>;
}

impl<F> VariableProvider for F
where
    F: Fn(&str) -> Result<Vec<VariableBinding>, ProviderError> + Send + Sync,
{
    fn bindings(&self, method_key: &str) -> Result<Vec<VariableBinding>, ProviderError> {
        self(method_key)
    }
}

/// Name → provider lookup table.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: FxHashMap<String, Box<dyn VariableProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, provider: impl VariableProvider + 'static) {
        self.providers.insert(name.into(), Box::new(provider));
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Look up a provider by component name.
    pub fn resolve(&self, name: &str) -> Result<&dyn VariableProvider, ConfigurationError> {
        self.providers
            .get(name)
            .map(|p| p.as_ref())
            .ok_or_else(|| ConfigurationError::UnknownProvider(name.to_string()))
    }

    /// Ask the named provider for the binding list of `method_key`.
    pub fn invoke(
        &self,
        name: &str,
        method_key: &str,
    ) -> Result<Vec<VariableBinding>, ConfigurationError> {
        self.resolve(name)?
            .bindings(method_key)
            .map_err(|source| ConfigurationError::Provider {
                provider: name.to_string(),
                method: method_key.to_string(),
                source,
            })
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.providers.keys().collect();
        names.sort();
        f.debug_struct("ProviderRegistry")
            .field("providers", &names)
            .finish()
    }
}
