//! Per-compilation planning context.
//!
//! A [`PlanContext`] bundles the graph under construction with the current
//! schema, scope, and root/non-root flag. Compilation threads contexts as
//! explicit input/output values: each recursively compiled source statement
//! gets a fresh child context, and its results are merged back into the
//! parent by value, never aliased.

use std::sync::Arc;

use crate::rillstream::config::EngineConfig;
use crate::rillstream::sql::plan::graph::FlowGraph;
use crate::rillstream::sql::schema::{Schema, StreamCatalog};
use crate::rillstream::sql::scope::SymbolTable;

/// Mutable handle for one (sub)query compilation.
#[derive(Debug, Clone)]
pub struct PlanContext {
    /// Ambient engine configuration
    pub config: Arc<EngineConfig>,
    /// Registered stream schemas
    pub catalog: Arc<StreamCatalog>,
    /// Whether this context compiles the outermost submitted query
    is_root: bool,
    /// The graph under construction
    pub graph: FlowGraph,
    /// Schema of the stream at the current frontier, once known
    schema: Option<Schema>,
    /// Names visible to the query being compiled
    scope: Arc<SymbolTable>,
}

impl PlanContext {
    /// Create the root context for a query submission.
    pub fn root(config: Arc<EngineConfig>, catalog: Arc<StreamCatalog>) -> Self {
        Self {
            config,
            catalog,
            is_root: true,
            graph: FlowGraph::new(),
            schema: None,
            scope: Arc::new(SymbolTable::new()),
        }
    }

    /// Create a fresh, non-root child context with an empty graph.
    ///
    /// The child shares configuration, catalog, and (by parent-chaining) the
    /// caller's scope, but builds its own graph; the caller splices the
    /// finished child graph back in as one unit.
    pub fn child(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            catalog: Arc::clone(&self.catalog),
            is_root: false,
            graph: FlowGraph::new(),
            schema: None,
            scope: Arc::clone(&self.scope),
        }
    }

    /// Whether this context compiles the outermost query.
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Schema of the stream at the current frontier.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Set the current schema.
    pub fn set_schema(&mut self, schema: Schema) {
        self.schema = Some(schema);
    }

    /// The scope visible to the query being compiled.
    pub fn scope(&self) -> &Arc<SymbolTable> {
        &self.scope
    }

    /// Replace the scope.
    pub fn set_scope(&mut self, scope: Arc<SymbolTable>) {
        self.scope = scope;
    }
}
