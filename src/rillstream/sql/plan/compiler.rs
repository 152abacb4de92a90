//! Query compiler.
//!
//! Recursively turns parsed statements into a connected [`FlowGraph`].
//! For a SELECT, the source statement (a named stream, a nested SELECT, or a
//! windowed join) compiles into a fresh child context; the finished child
//! graph is spliced into the enclosing graph as one unit, and projection,
//! filter, and sink layers attach downstream of it. Non-root SELECTs return
//! a new context exposing exactly their selected fields to the caller.

use std::sync::Arc;

use log::debug;

use crate::rillstream::config::{EngineConfig, CLIENT_SELECT_TARGET_KEY, CONSOLE_SELECT_TARGET};
use crate::rillstream::sql::ast::{
    DescribeStatement, FieldList, JoinedSource, SelectStatement, Statement, StreamStatement,
};
use crate::rillstream::sql::error::{SqlError, SqlResult};
use crate::rillstream::sql::plan::context::PlanContext;
use crate::rillstream::sql::plan::graph::FlowGraph;
use crate::rillstream::sql::plan::node::{PlanNode, WindowedJoinDescriptor};
use crate::rillstream::sql::schema::{Schema, StreamCatalog, TypedField};
use crate::rillstream::sql::scope::SymbolTable;

/// Compile a submitted statement into a finished operator graph.
///
/// Convenience entry point wrapping [`plan_statement`] with a fresh root
/// context. The returned graph is immutable from the caller's point of view
/// and ready for the operator instantiation step.
pub fn plan_query(
    stmt: &Statement,
    config: Arc<EngineConfig>,
    catalog: Arc<StreamCatalog>,
) -> SqlResult<FlowGraph> {
    let ctx = PlanContext::root(config, catalog);
    let out = plan_statement(stmt, ctx)?;
    Ok(out.graph)
}

/// Compile a statement within the given context, returning the output
/// context. Compilation errors abort immediately; no partial plan escapes.
pub fn plan_statement(stmt: &Statement, ctx: PlanContext) -> SqlResult<PlanContext> {
    match stmt {
        Statement::Select(select) => plan_select(select, ctx),
        Statement::Describe(describe) => plan_describe(describe, ctx),
    }
}

/// Compile a statement appearing in FROM position.
fn plan_stream(stmt: &StreamStatement, ctx: PlanContext) -> SqlResult<PlanContext> {
    match stmt {
        StreamStatement::NamedStream(name) => plan_named_stream(name, ctx),
        StreamStatement::Select(select) => plan_select(select, ctx),
        StreamStatement::Join(join) => plan_join(join, ctx),
    }
}

/// Bind a named stream from the catalog: one `StreamSource` node exposing
/// the registered schema, with a child scope holding all of its fields.
fn plan_named_stream(name: &str, mut ctx: PlanContext) -> SqlResult<PlanContext> {
    let schema = ctx.catalog.require(name)?.clone();

    let mut scope = SymbolTable::with_parent(Arc::clone(ctx.scope()));
    for field in &schema.fields {
        scope.add_symbol(field.clone());
    }

    ctx.graph.attach_layer(PlanNode::StreamSource {
        stream_name: name.to_string(),
        schema: schema.clone(),
    });
    ctx.set_scope(Arc::new(scope));
    ctx.set_schema(schema);
    Ok(ctx)
}

/// Compile a SELECT statement.
///
/// Steps, in order: compile the source into a fresh child context, splice
/// its graph in, attach a projection over the union of selected and
/// WHERE-referenced fields, attach the filter if present, then either route
/// output (root) or narrow back to exactly the selected fields and hand the
/// caller a scope exposing them (non-root).
fn plan_select(stmt: &SelectStatement, mut ctx: PlanContext) -> SqlResult<PlanContext> {
    // Build the source plan inside its own context. It may be a single
    // source node, or an entire DAG when the source is another SELECT.
    let source_in = ctx.child();
    let source_out = plan_stream(&stmt.source, source_in)?;

    let source_schema = source_out
        .schema()
        .cloned()
        .ok_or_else(|| SqlError::schema_error("source produced no schema", None))?;

    // Incorporate that entire plan into ours.
    let source_scope = Arc::clone(source_out.scope());
    ctx.graph.splice_subgraph(source_out.graph);

    // The (ordered) fields the user explicitly selected, tracked separately
    // from the wider required set below: sinks emit exactly these, in
    // declared order.
    let selected: Vec<String> = match &stmt.fields {
        FieldList::All => {
            return Err(SqlError::unsupported_feature(
                "cannot project to field list '*'; the source's full field set is not enumerable",
            ));
        }
        FieldList::Named(names) => names.clone(),
    };

    // required = selected ∪ fields(WHERE), deduplicated. The WHERE clause
    // may need fields that are not in the final projection.
    let mut required: Vec<String> = Vec::with_capacity(selected.len());
    for name in &selected {
        if !required.contains(name) {
            required.push(name.clone());
        }
    }
    if let Some(where_clause) = &stmt.where_clause {
        for name in &where_clause.required_fields {
            if !required.contains(name) {
                required.push(name.clone());
            }
        }
    }

    // Projection from the source schema down to the required fields,
    // resolved against the scope the source exposed.
    let projected_schema =
        Schema::from_scope(source_schema.stream_name.clone(), &required, &source_scope)?;
    debug!(
        "projecting {} -> {} fields for stream '{}'",
        source_schema.width(),
        projected_schema.width(),
        source_schema.stream_name
    );
    ctx.graph.attach_layer(PlanNode::Project {
        input_schema: source_schema,
        output_schema: projected_schema.clone(),
    });

    if let Some(where_clause) = &stmt.where_clause {
        ctx.graph.attach_layer(PlanNode::Filter {
            predicate_text: where_clause.text.clone(),
        });
    }

    if ctx.is_root() {
        // Root queries route their output to the client.
        let target = ctx
            .config
            .get_or(CLIENT_SELECT_TARGET_KEY, CONSOLE_SELECT_TARGET)
            .to_string();
        if target == CONSOLE_SELECT_TARGET {
            ctx.graph.attach_layer(PlanNode::ConsoleSink { fields: selected });
        } else {
            ctx.graph.attach_layer(PlanNode::BufferSink {
                buffer_name: target,
                fields: selected,
            });
        }
        ctx.set_schema(projected_schema);
        Ok(ctx)
    } else {
        // The initial projection may have carried WHERE-only fields; attach
        // a second, narrower projection that yields exactly the selected
        // fields for the enclosing query.
        let output_schema = Schema::from_scope(
            projected_schema.stream_name.clone(),
            &selected,
            &source_scope,
        )?;
        ctx.graph.attach_layer(PlanNode::Project {
            input_schema: projected_schema,
            output_schema: output_schema.clone(),
        });

        // Expose exactly the selected symbols, in declared order, in a new
        // scope layered on the enclosing query's scope.
        let mut out_scope = SymbolTable::with_parent(Arc::clone(ctx.scope()));
        for name in output_schema.field_names() {
            out_scope.add_symbol(source_scope.resolve(&name)?);
        }
        ctx.set_scope(Arc::new(out_scope));
        ctx.set_schema(output_schema);
        Ok(ctx)
    }
}

/// Compile a windowed two-stream join in FROM position.
///
/// Both input statements compile into their own child contexts; both
/// subgraphs splice into the enclosing graph, and one `WindowedJoin` node
/// attaches downstream of both terminals. The returned context exposes the
/// left payload fields followed by the right payload fields under the
/// join's output name.
fn plan_join(join: &JoinedSource, mut ctx: PlanContext) -> SqlResult<PlanContext> {
    let left_out = plan_stream(&join.left, ctx.child())?;
    let right_out = plan_stream(&join.right, ctx.child())?;

    let left_schema = left_out
        .schema()
        .cloned()
        .ok_or_else(|| SqlError::schema_error("left join input produced no schema", None))?;
    let right_schema = right_out
        .schema()
        .cloned()
        .ok_or_else(|| SqlError::schema_error("right join input produced no schema", None))?;

    // Key fields resolve against each side's own scope.
    let left_key = left_out.scope().resolve(&join.left_key)?;
    let right_key = right_out.scope().resolve(&join.right_key)?;

    // Splice both subgraphs, then wire the join node to both terminals.
    ctx.graph.splice_subgraph(left_out.graph);
    let mut frontier = ctx.graph.frontier().to_vec();
    ctx.graph.splice_subgraph(right_out.graph);
    frontier.extend_from_slice(ctx.graph.frontier());
    ctx.graph.set_frontier(frontier);

    let descriptor = WindowedJoinDescriptor {
        left_name: join.left.source_name(),
        right_name: join.right.source_name(),
        left_key,
        right_key,
        left_fields: left_schema.fields.clone(),
        right_fields: right_schema.fields.clone(),
        window_width: join.window_width,
        output_name: join.output_name.clone(),
        config: Arc::clone(&ctx.config),
    };
    debug!("planned windowed join: {:?}", descriptor);
    ctx.graph.attach_layer(PlanNode::WindowedJoin { descriptor });

    // The joined stream exposes both payload lists, left first.
    let mut out_fields: Vec<TypedField> = Vec::new();
    let mut out_scope = SymbolTable::with_parent(Arc::clone(ctx.scope()));
    for field in left_schema.fields.iter().chain(right_schema.fields.iter()) {
        out_scope.add_symbol(field.clone());
        out_fields.push(field.clone());
    }
    ctx.set_scope(Arc::new(out_scope));
    ctx.set_schema(Schema::new(join.output_name.clone(), out_fields));
    Ok(ctx)
}

/// Compile a DESCRIBE statement: a single informational node.
fn plan_describe(stmt: &DescribeStatement, mut ctx: PlanContext) -> SqlResult<PlanContext> {
    ctx.graph.attach_layer(PlanNode::Describe {
        identifier: stmt.identifier.clone(),
    });
    Ok(ctx)
}
