//! Simplified predicate filter.
//!
//! Evaluates a WHERE clause as a literal text match: a record passes when
//! its rendered field text contains the raw predicate text. This is a known
//! simplification carried over from the submission surface, not a general
//! boolean-expression evaluator; the planner treats predicate text as opaque
//! and this operator keeps that contract at runtime.

use crate::rillstream::sql::execution::types::StreamRecord;

/// Filter operator parameterized by raw predicate text.
#[derive(Debug, Clone)]
pub struct StrMatchFilter {
    predicate_text: String,
}

impl StrMatchFilter {
    /// Create a filter from the planned predicate text.
    pub fn new(predicate_text: impl Into<String>) -> Self {
        Self {
            predicate_text: predicate_text.into(),
        }
    }

    /// The raw predicate text.
    pub fn predicate_text(&self) -> &str {
        &self.predicate_text
    }

    /// True if the record passes the filter.
    pub fn matches(&self, record: &StreamRecord) -> bool {
        record
            .fields
            .values()
            .any(|value| value.to_string().contains(&self.predicate_text))
    }

    /// Pass the record through, or drop it.
    pub fn process(&self, record: StreamRecord) -> Option<StreamRecord> {
        if self.matches(&record) {
            Some(record)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rillstream::sql::execution::types::FieldValue;

    fn record(fields: Vec<(&str, FieldValue)>) -> StreamRecord {
        StreamRecord::new(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    #[test]
    fn test_substring_match_passes() {
        let filter = StrMatchFilter::new("alice");
        let rec = record(vec![(
            "customer",
            FieldValue::String("alice smith".to_string()),
        )]);
        assert!(filter.matches(&rec));
    }

    #[test]
    fn test_no_match_drops_record() {
        let filter = StrMatchFilter::new("alice");
        let rec = record(vec![("customer", FieldValue::String("bob".to_string()))]);
        assert!(filter.process(rec).is_none());
    }
}
