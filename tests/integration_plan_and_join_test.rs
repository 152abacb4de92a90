//! Integration test: compile a query over nested sources into a plan graph,
//! then drive the windowed join runtime end to end over two live feeds.

use rillstream::rillstream::config::{EngineConfig, CLIENT_SELECT_TARGET_KEY};
use rillstream::rillstream::sql::ast::{
    FieldList, JoinedSource, SelectStatement, Statement, StreamStatement, WhereConditions,
};
use rillstream::rillstream::sql::execution::join::WindowedJoinOperator;
use rillstream::rillstream::sql::execution::sink::{BufferRegistry, BufferSink};
use rillstream::rillstream::sql::execution::{FieldValue, StreamRecord};
use rillstream::rillstream::sql::plan::{plan_query, PlanNode};
use rillstream::rillstream::sql::schema::{FieldType, Schema, StreamCatalog, TypedField};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_catalog() -> Arc<StreamCatalog> {
    let mut catalog = StreamCatalog::new();
    catalog.register(Schema::new(
        "orders",
        vec![
            TypedField::new("id", FieldType::Integer),
            TypedField::new("customer", FieldType::String),
            TypedField::new("amount", FieldType::Float),
        ],
    ));
    catalog.register(Schema::new(
        "shipments",
        vec![
            TypedField::new("id", FieldType::Integer),
            TypedField::new("carrier", FieldType::String),
        ],
    ));
    Arc::new(catalog)
}

fn record(fields: Vec<(&str, FieldValue)>, timestamp: i64) -> StreamRecord {
    StreamRecord::with_timestamp(
        fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        timestamp,
    )
}

#[test]
fn test_nested_query_compiles_to_connected_graph() {
    init_logging();
    // SELECT customer FROM (SELECT customer, amount FROM orders WHERE id ...)
    let inner = SelectStatement::new(
        FieldList::named(vec!["customer", "amount"]),
        StreamStatement::NamedStream("orders".to_string()),
        Some(WhereConditions::new("id = 7", vec!["id"])),
    );
    let outer = Statement::Select(SelectStatement::new(
        FieldList::named(vec!["customer"]),
        StreamStatement::Select(inner),
        None,
    ));

    let graph = plan_query(&outer, Arc::new(EngineConfig::new()), test_catalog()).unwrap();

    // Every non-source node has at least one upstream; exactly one terminal.
    for id in 0..graph.len() {
        match graph.node(id) {
            PlanNode::StreamSource { .. } => assert!(graph.upstreams(id).is_empty()),
            _ => assert!(!graph.upstreams(id).is_empty(), "node {} disconnected", id),
        }
    }
    assert_eq!(graph.frontier().len(), 1);
    assert!(matches!(
        graph.node(graph.frontier()[0]),
        PlanNode::ConsoleSink { .. }
    ));

    // The inner query's wide projection carries the WHERE-only field `id`,
    // and its cleanup projection strips it again.
    let projections: Vec<_> = graph
        .nodes()
        .iter()
        .filter_map(|n| match n {
            PlanNode::Project { output_schema, .. } => Some(output_schema.field_names()),
            _ => None,
        })
        .collect();
    assert_eq!(
        projections,
        vec![
            vec!["customer", "amount", "id"],
            vec!["customer", "amount"],
            vec!["customer"],
        ]
    );
}

#[test]
fn test_buffer_target_routes_and_sink_captures() {
    init_logging();
    let stmt = Statement::Select(SelectStatement::new(
        FieldList::named(vec!["customer", "amount"]),
        StreamStatement::NamedStream("orders".to_string()),
        None,
    ));
    let config = EngineConfig::new().with_setting(CLIENT_SELECT_TARGET_KEY, "results");
    let graph = plan_query(&stmt, Arc::new(config), test_catalog()).unwrap();

    let (buffer_name, fields) = match graph.node(graph.frontier()[0]) {
        PlanNode::BufferSink {
            buffer_name,
            fields,
        } => (buffer_name.clone(), fields.clone()),
        other => panic!("expected BufferSink, got {}", other),
    };
    assert_eq!(buffer_name, "results");

    // Instantiate the sink against a driver-owned registry and feed it.
    let registry = BufferRegistry::new();
    let sink = BufferSink::new(registry.buffer(&buffer_name), fields);
    sink.emit(&record(
        vec![
            ("id", FieldValue::Integer(1)),
            ("customer", FieldValue::String("alice".to_string())),
            ("amount", FieldValue::Float(9.5)),
        ],
        1000,
    ));

    let captured = registry.drain("results");
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].fields.len(), 2); // id was not selected
}

#[tokio::test]
async fn test_planned_join_runs_over_live_feeds() {
    init_logging();
    // SELECT customer, carrier FROM orders JOIN shipments ON id WITHIN 5ms
    let join = JoinedSource::new(
        StreamStatement::NamedStream("orders".to_string()),
        StreamStatement::NamedStream("shipments".to_string()),
        "id",
        "id",
        Duration::from_millis(5),
        "shipped_orders",
    );
    let stmt = Statement::Select(SelectStatement::new(
        FieldList::named(vec!["customer", "carrier"]),
        StreamStatement::Join(join),
        None,
    ));

    let graph = plan_query(&stmt, Arc::new(EngineConfig::new()), test_catalog()).unwrap();
    let descriptor = graph
        .nodes()
        .iter()
        .find_map(|n| match n {
            PlanNode::WindowedJoin { descriptor } => Some(descriptor.clone()),
            _ => None,
        })
        .expect("plan contains the join");

    let operator = Arc::new(WindowedJoinOperator::new(descriptor));
    let (left_tx, left_rx) = mpsc::channel(16);
    let (right_tx, right_rx) = mpsc::channel(16);
    let (out_tx, mut out_rx) = mpsc::channel(16);
    let flow = tokio::spawn(Arc::clone(&operator).run(left_rx, right_rx, out_tx));

    let order = |id: i64, customer: &str, t: i64| {
        record(
            vec![
                ("id", FieldValue::Integer(id)),
                ("customer", FieldValue::String(customer.to_string())),
                ("amount", FieldValue::Float(1.0)),
            ],
            t,
        )
    };
    let shipment = |id: i64, carrier: &str, t: i64| {
        record(
            vec![
                ("id", FieldValue::Integer(id)),
                ("carrier", FieldValue::String(carrier.to_string())),
            ],
            t,
        )
    };

    left_tx.send(order(1, "alice", 10)).await.unwrap();
    left_tx.send(order(2, "bob", 11)).await.unwrap();
    right_tx.send(shipment(1, "acme", 13)).await.unwrap(); // within window
    right_tx.send(shipment(2, "acme", 20)).await.unwrap(); // outside window
    drop(left_tx);
    drop(right_tx);

    flow.await.unwrap().unwrap();

    let mut joined = Vec::new();
    while let Some(rec) = out_rx.recv().await {
        joined.push(rec);
    }
    assert_eq!(joined.len(), 1);
    assert_eq!(
        joined[0].fields.get("customer"),
        Some(&FieldValue::String("alice".to_string()))
    );
    assert_eq!(
        joined[0].fields.get("carrier"),
        Some(&FieldValue::String("acme".to_string()))
    );
}
