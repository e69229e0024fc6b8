//! The connector factory (§4.2): a process-wide registry mapping type
//! names to constructors, used by the action pipeline to build a fresh
//! instance on every successful `init` step.
//!
//! The source system resolves a type name to a constructor by dynamically
//! loading a module at a path; a compile-time language substitutes a
//! registry key for the module path (§9's design note explicitly sanctions
//! this). [`ModuleLoader`] is the injectable seam that performs that
//! resolution — production embedders supply one that knows how to turn a
//! resolved module path into a boxed constructor closure (e.g. by looking
//! it up in a `linkme`-style static registry, or simply matching on a
//! handful of builtin type names); tests supply a trivial one.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::connector::DynConnector;
use crate::error::FactoryError;
use crate::logging::LoggerProvider;

/// A function that builds a fresh connector instance for a given id.
pub type ConnectorConstructor = Arc<dyn Fn(&str) -> DynConnector + Send + Sync>;

/// Resolves a (possibly relative) module path from the config document
/// into a constructor. Injectable so the host decides how type names map
/// to code, matching §6's "The loader mapping itself is external and
/// injectable."
pub trait ModuleLoader: Send + Sync {
    /// Resolve `module_path` (already joined with `moduleBasePath` if it
    /// was relative) to a constructor, or `None` if nothing is registered
    /// for it.
    fn resolve(&self, module_path: &str) -> Option<ConnectorConstructor>;
}

/// Join a `connectorTypes` value with the controller's configured module
/// base path, per §6: a value starting with `./` is joined with
/// `moduleBasePath`; any other value passes through unchanged.
#[must_use]
pub fn resolve_module_path(raw: &str, module_base_path: &str) -> String {
    if let Some(rest) = raw.strip_prefix("./") {
        if module_base_path.is_empty() {
            format!("./{rest}")
        } else {
            format!("{}/{}", module_base_path.trim_end_matches('/'), rest)
        }
    } else {
        raw.to_string()
    }
}

/// A [`ModuleLoader`] that resolves nothing. Concrete wire protocols are out
/// of scope for this crate (§1's Non-goals); an embedder that registers at
/// least one real connector type supplies its own loader instead of this
/// one, which exists only so [`crate::controller::Controller`] has a usable
/// default when none is injected.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullModuleLoader;

impl ModuleLoader for NullModuleLoader {
    fn resolve(&self, _module_path: &str) -> Option<ConnectorConstructor> {
        None
    }
}

/// The process-wide type-name → constructor registry.
#[derive(Default)]
pub struct ConnectorFactory {
    type_map: RwLock<HashMap<String, ConnectorConstructor>>,
    logger_provider: RwLock<Option<Arc<dyn LoggerProvider>>>,
}

impl ConnectorFactory {
    /// Create an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registry wholesale with a deep copy of `type_map`, and
    /// set (or clear) the injected logger provider.
    ///
    /// "Deep copy" here means the factory's map is a fresh `HashMap` that
    /// does not alias the caller's map; the constructors themselves are
    /// `Arc`-shared, matching how the source's `typeMap` replacement is
    /// value-identical but container-distinct.
    pub fn init(
        &self,
        type_map: HashMap<String, ConnectorConstructor>,
        logger_provider: Option<Arc<dyn LoggerProvider>>,
    ) {
        *self.type_map.write() = type_map;
        *self.logger_provider.write() = logger_provider;
    }

    /// Rebind a single type name's constructor, leaving the rest of the
    /// registry untouched. Used by `update_connector_type` (§4.5): the
    /// factory is reinitialized from the updated config map, which in
    /// practice means calling [`Self::init`] again with every entry
    /// resolved, but a single-key rebind is exposed too since it is
    /// cheaper and matches the "rebinds a single key" framing in §5.
    pub fn rebind(&self, type_name: String, constructor: ConnectorConstructor) {
        self.type_map.write().insert(type_name, constructor);
    }

    /// Construct a new connector instance for `type_name`/`id`.
    ///
    /// # Errors
    ///
    /// - [`FactoryError::InvalidType`] if `type_name` is empty.
    /// - [`FactoryError::InvalidId`] if `id` is empty.
    /// - [`FactoryError::UnknownType`] if `type_name` isn't registered.
    pub fn create_connector(
        &self,
        type_name: &str,
        id: &str,
    ) -> Result<DynConnector, FactoryError> {
        if type_name.is_empty() {
            return Err(FactoryError::InvalidType);
        }
        if id.is_empty() {
            return Err(FactoryError::InvalidId);
        }
        let constructor = self
            .type_map
            .read()
            .get(type_name)
            .cloned()
            .ok_or_else(|| FactoryError::UnknownType(type_name.to_string()))?;

        let instance = constructor(id);
        if let Some(provider) = self.logger_provider.read().as_ref() {
            instance.set_logger(provider.get_logger(id));
        }
        Ok(instance)
    }
}
