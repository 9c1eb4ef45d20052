//! Agent Battery Providers - Per-provider usage adapters
//!
//! Implements the `IProviderAdapter` port from `agentbattery-core` for
//! each supported provider. Adapters own two provider-specific concerns:
//! credential format validation and usage fetching; normalization is
//! shared through the port's default implementation.
//!
//! Official usage endpoints are stubbed: each adapter returns a fixed
//! placeholder figure until the real integrations land. Manual-auth
//! accounts bypass fetching entirely and report a zero-usage record.
//!
//! ## Components
//!
//! - [`OpenAiAdapter`] - OpenAI API key accounts
//! - [`ClaudeAdapter`] - Claude API key accounts
//! - [`CursorAdapter`] - Cursor session token accounts
//! - [`builtin_registry`] - Registry with all three adapters

pub mod claude;
pub mod cursor;
pub mod openai;

pub use claude::ClaudeAdapter;
pub use cursor::CursorAdapter;
pub use openai::OpenAiAdapter;

use std::sync::Arc;

use agentbattery_core::ports::AdapterRegistry;

/// Builds a registry holding the three built-in adapters
pub fn builtin_registry() -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    registry.register(Arc::new(OpenAiAdapter::new()));
    registry.register(Arc::new(ClaudeAdapter::new()));
    registry.register(Arc::new(CursorAdapter::new()));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentbattery_core::domain::Provider;

    #[test]
    fn test_builtin_registry_covers_all_providers() {
        let registry = builtin_registry();
        assert_eq!(registry.len(), 3);
        for provider in Provider::ALL {
            assert!(registry.get(provider).is_some());
        }
    }
}
