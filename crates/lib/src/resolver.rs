//! Entry point tying a data source, a macro registry and a clock together.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    Clock, Result, SystemClock,
    constants::DEFAULT_DATE_FORMAT,
    eval::{EvalError, EvaluationContext, ParameterPositionContext, Scope},
    macros::MacroRegistry,
    model::{AttributePath, Id},
    source::{DataSource, StoreError},
    tree::{self, ResolvedTree},
};

/// Resolver settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Pattern used by `#DATE` when none is given.
    pub date_format: String,
    /// Render failures as `[message]`; when off they render as empty text.
    pub inline_diagnostics: bool,
    /// Seed for RANDOM/UUID output. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            inline_diagnostics: true,
            seed: None,
        }
    }
}

/// Resolves values and trees over a [`DataSource`].
///
/// The resolver is cheap to share. Each call creates its own
/// [`EvaluationContext`]; use [`Resolver::context`] to make several calls
/// share one cache.
///
/// ```
/// use std::sync::Arc;
/// use datasets::{InMemoryStore, Resolver};
///
/// let store = Arc::new(InMemoryStore::new());
/// let dsl = store.data_set_list("Customers");
/// let column = store.data_set(dsl, "Alice").unwrap();
/// let name = store.text_attribute(dsl, "Greeting").unwrap();
/// store.set_text(column, name, "Hello #CONCAT(Ali,ce)").unwrap();
///
/// let resolver = Resolver::new(store);
/// assert_eq!(resolver.resolve_reference("Customers.Alice.Greeting"), "Hello Alice");
/// ```
#[derive(Clone)]
pub struct Resolver {
    source: Arc<dyn DataSource>,
    registry: Arc<MacroRegistry>,
    clock: Arc<dyn Clock>,
    config: ResolverConfig,
}

impl Resolver {
    /// A resolver with the built-in macros, the system clock and default settings.
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            registry: Arc::new(MacroRegistry::builtin()),
            clock: Arc::new(SystemClock),
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_registry(mut self, registry: MacroRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn registry(&self) -> &MacroRegistry {
        &self.registry
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    /// A fresh request-scoped evaluation context.
    pub fn context(&self) -> EvaluationContext<'_> {
        EvaluationContext::new(
            self.source.as_ref(),
            &self.registry,
            self.clock.as_ref(),
            &self.config,
        )
    }

    /// Resolves `attribute` reached through `path` from column `data_set`.
    ///
    /// Failures are rendered inline.
    pub fn resolve(&self, data_set: &Id, attribute: &Id, path: &AttributePath) -> String {
        let mut context = self.context();
        let data_set = match self.source.data_set(data_set) {
            Ok(Some(data_set)) => data_set,
            Ok(None) => {
                let err = EvalError::Store(StoreError::DataSetNotFound {
                    id: *data_set,
                });
                return context.diagnostic(&err);
            }
            Err(err) => return context.diagnostic(&err.into()),
        };
        let position = ParameterPositionContext::new(
            data_set.data_set_list,
            data_set.id,
            path.clone(),
            *attribute,
        );
        context.resolve(&position).value.unwrap_or_default()
    }

    /// Resolves a dotted `dsl.ds.path....attr` reference.
    pub fn resolve_reference(&self, reference: &str) -> String {
        self.context().resolve_reference(reference)
    }

    /// Evaluates free text in the scope of column `data_set`.
    pub fn evaluate_text(&self, data_set: &Id, text: &str) -> String {
        let mut context = self.context();
        match self.source.data_set(data_set) {
            Ok(Some(data_set)) => context.evaluate_text(text, &Scope::for_data_set(&data_set)),
            Ok(None) => context.diagnostic(&EvalError::Store(
                StoreError::DataSetNotFound { id: *data_set },
            )),
            Err(err) => context.diagnostic(&err.into()),
        }
    }

    /// Builds the resolved tree of `data_set_list`.
    pub fn build_tree(&self, data_set_list: &Id) -> Result<ResolvedTree> {
        let mut context = self.context();
        Ok(tree::build_tree(&mut context, data_set_list)?)
    }
}
