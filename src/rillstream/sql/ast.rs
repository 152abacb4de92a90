/*!
# Streaming SQL Abstract Syntax Tree (AST)

Statement types produced by the external parser and consumed by the plan
compiler. The AST is deliberately small: SELECT with an optional nested
source statement and optional WHERE conditions, windowed two-stream joins
in FROM position, and DESCRIBE.

## Design

- **Immutable**: nodes are built once by the parser and never mutated
- **Composable**: a SELECT's source may itself be a SELECT, to any depth
- **Opaque predicates**: WHERE conditions carry their raw text plus the set
  of field names they reference; the planner needs the names for projection
  pruning but never interprets the text itself
*/

use std::time::Duration;

/// Fields requested by a SELECT clause.
///
/// The `All` marker (`*`) is representable because the parser produces it,
/// but the planner rejects it: there is no general mechanism to enumerate a
/// source's full field set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldList {
    /// The `*` marker
    All,
    /// An ordered list of distinct field names
    Named(Vec<String>),
}

impl FieldList {
    /// Build a named field list from string slices.
    pub fn named(names: Vec<&str>) -> Self {
        FieldList::Named(names.into_iter().map(|s| s.to_string()).collect())
    }

    /// True if this is the `*` marker.
    pub fn is_all_fields(&self) -> bool {
        matches!(self, FieldList::All)
    }
}

/// WHERE clause conditions: opaque predicate text plus the field names it
/// references. The referenced names widen the projection so that filter
/// evaluation downstream still sees every field it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereConditions {
    /// Raw predicate text, uninterpreted by the planner
    pub text: String,
    /// Field names the predicate references
    pub required_fields: Vec<String>,
}

impl WhereConditions {
    /// Create WHERE conditions.
    pub fn new(text: impl Into<String>, required_fields: Vec<&str>) -> Self {
        Self {
            text: text.into(),
            required_fields: required_fields.into_iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// SELECT statement: fields, a source statement, optional WHERE conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Fields to project
    pub fields: FieldList,
    /// Source stream for the FROM clause; may be a named stream, a nested
    /// SELECT, or a windowed join
    pub source: Box<StreamStatement>,
    /// Optional WHERE clause
    pub where_clause: Option<WhereConditions>,
}

impl SelectStatement {
    /// Create a SELECT statement.
    pub fn new(
        fields: FieldList,
        source: StreamStatement,
        where_clause: Option<WhereConditions>,
    ) -> Self {
        Self {
            fields,
            source: Box::new(source),
            where_clause,
        }
    }
}

/// Windowed equi-join of two stream statements in FROM position.
///
/// The join matches one key field from each side; a pair of events is
/// joinable when the keys compare equal and the events' times fall within
/// `window_width` of each other.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedSource {
    /// Left input
    pub left: Box<StreamStatement>,
    /// Right input
    pub right: Box<StreamStatement>,
    /// Key field name on the left stream
    pub left_key: String,
    /// Key field name on the right stream
    pub right_key: String,
    /// Width of the time window over which the join is valid
    pub window_width: Duration,
    /// Name assigned to the joined output stream
    pub output_name: String,
}

impl JoinedSource {
    /// Create a joined source.
    pub fn new(
        left: StreamStatement,
        right: StreamStatement,
        left_key: impl Into<String>,
        right_key: impl Into<String>,
        window_width: Duration,
        output_name: impl Into<String>,
    ) -> Self {
        Self {
            left: Box::new(left),
            right: Box::new(right),
            left_key: left_key.into(),
            right_key: right_key.into(),
            window_width,
            output_name: output_name.into(),
        }
    }
}

/// A statement that can appear in FROM position.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamStatement {
    /// A named stream registered in the catalog
    NamedStream(String),
    /// A nested sub-SELECT used as a source
    Select(SelectStatement),
    /// A windowed two-stream join
    Join(JoinedSource),
}

impl StreamStatement {
    /// The name this source exposes to its consumers.
    pub fn source_name(&self) -> String {
        match self {
            StreamStatement::NamedStream(name) => name.clone(),
            StreamStatement::Select(_) => "subquery".to_string(),
            StreamStatement::Join(join) => join.output_name.clone(),
        }
    }
}

/// DESCRIBE statement: report metadata about a named object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeStatement {
    /// Identifier of the object to describe
    pub identifier: String,
}

impl DescribeStatement {
    /// Create a DESCRIBE statement.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}

/// Top-level statement submitted for compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A SELECT query
    Select(SelectStatement),
    /// A DESCRIBE command
    Describe(DescribeStatement),
}
