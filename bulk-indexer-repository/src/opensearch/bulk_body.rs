//! Request bodies and response parsing for the OpenSearch bulk and settings APIs.

use serde_json::{json, Map, Value};

use crate::errors::SearchError;
use crate::types::{BulkItemOutcome, BulkResponse, IndexSettings};
use bulk_indexer_shared::{IndexingRequest, Operation};

/// Source field holding the document-type discriminator.
pub const DOC_TYPE_FIELD: &str = "doc_type";

/// Build the newline-delimited bulk body: one action line per request,
/// followed by the source line for upserts.
pub fn bulk_lines(requests: &[IndexingRequest]) -> Vec<Value> {
    let mut lines = Vec::with_capacity(requests.len() * 2);

    for request in requests {
        let mut meta = Map::new();
        meta.insert("_index".to_string(), json!(request.index_type().index));
        meta.insert("_id".to_string(), json!(request.id()));
        if let Some(routing) = request.routing() {
            meta.insert("routing".to_string(), json!(routing));
        }

        match request.operation() {
            Operation::Upsert => {
                lines.push(json!({ "index": meta }));
                let mut source = request.source().cloned().unwrap_or_default();
                source.insert(
                    DOC_TYPE_FIELD.to_string(),
                    json!(request.index_type().doc_type),
                );
                lines.push(Value::Object(source));
            }
            Operation::Delete => {
                lines.push(json!({ "delete": meta }));
            }
        }
    }

    lines
}

/// Pair each submitted request with its item in the bulk response.
pub fn parse_bulk_response(
    requests: &[IndexingRequest],
    body: &Value,
) -> Result<BulkResponse, SearchError> {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::parse("Bulk response has no items"))?;

    if items.len() != requests.len() {
        return Err(SearchError::parse(format!(
            "Bulk response has {} items for {} requests",
            items.len(),
            requests.len()
        )));
    }

    let outcomes = requests
        .iter()
        .zip(items)
        .map(|(request, item)| parse_item(request, item))
        .collect();

    Ok(BulkResponse::new(outcomes))
}

fn parse_item(request: &IndexingRequest, item: &Value) -> BulkItemOutcome {
    let document = request.document_id();
    let action = item
        .as_object()
        .and_then(|object| object.values().next())
        .cloned()
        .unwrap_or(Value::Null);

    let status = action
        .get("status")
        .and_then(Value::as_u64)
        .map_or(0, |status| status as u16);

    if let Some(error) = action.get("error") {
        return BulkItemOutcome::rejected(document, status, error.to_string());
    }

    // Deleting a missing document is reported as 404 without an error.
    let missing_delete = request.operation() == Operation::Delete && status == 404;
    if (200..300).contains(&status) || missing_delete {
        BulkItemOutcome::applied(document, status)
    } else {
        BulkItemOutcome::rejected(document, status, format!("Unexpected item status {}", status))
    }
}

/// Extract replica count and refresh interval from a get-settings response.
///
/// The response is keyed by concrete index name, which differs from the
/// requested name when an alias is used; the first entry is taken.
pub fn parse_index_settings(body: &Value) -> Result<IndexSettings, SearchError> {
    let index = body
        .as_object()
        .and_then(|object| object.values().next())
        .and_then(|entry| entry.pointer("/settings/index"))
        .ok_or_else(|| SearchError::parse("Settings response has no index settings"))?;

    let number_of_replicas = match index.get("number_of_replicas") {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value.parse::<u32>().map_err(|e| {
            SearchError::parse(format!("Invalid number_of_replicas {}: {}", value, e))
        })?),
        Some(Value::Number(value)) => value.as_u64().map(|value| value as u32),
        Some(other) => {
            return Err(SearchError::parse(format!(
                "Invalid number_of_replicas: {}",
                other
            )))
        }
    };

    let refresh_interval = index
        .get("refresh_interval")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(IndexSettings::new(number_of_replicas, refresh_interval))
}

/// Body of a put-settings request. `None` values become `null`, which resets
/// the setting to the engine default.
pub fn settings_body(settings: &IndexSettings) -> Value {
    json!({
        "index": {
            "number_of_replicas": settings.number_of_replicas,
            "refresh_interval": settings.refresh_interval,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulk_indexer_shared::{DocumentId, IndexType};

    fn upsert(id: &str) -> IndexingRequest {
        let source = match json!({ "name": id }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        IndexingRequest::upsert(IndexType::new("issues", "issue"), id, source)
    }

    #[test]
    fn test_bulk_lines() {
        let requests = vec![
            upsert("I1").with_routing("P1"),
            IndexingRequest::delete(IndexType::new("issues", "issue"), "I2"),
        ];

        let lines = bulk_lines(&requests);

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            json!({ "index": { "_index": "issues", "_id": "I1", "routing": "P1" } })
        );
        assert_eq!(lines[1], json!({ "name": "I1", "doc_type": "issue" }));
        assert_eq!(lines[2], json!({ "delete": { "_index": "issues", "_id": "I2" } }));
    }

    #[test]
    fn test_parse_bulk_response_mixed() {
        let requests = vec![
            upsert("I1"),
            upsert("I2"),
            IndexingRequest::delete(IndexType::new("issues", "issue"), "I3"),
        ];
        let body = json!({
            "took": 3,
            "errors": true,
            "items": [
                { "index": { "_index": "issues", "_id": "I1", "status": 201 } },
                { "index": { "_index": "issues", "_id": "I2", "status": 403,
                    "error": { "type": "cluster_block_exception", "reason": "read-only" } } },
                { "delete": { "_index": "issues", "_id": "I3", "status": 404, "result": "not_found" } }
            ]
        });

        let response = parse_bulk_response(&requests, &body).unwrap();

        assert_eq!(
            response.acknowledged(),
            vec![
                DocumentId::new("issues", "issue", "I1"),
                DocumentId::new("issues", "issue", "I3"),
            ]
        );
        let failure = response.failures().next().unwrap();
        assert_eq!(failure.status, 403);
        assert!(failure.error.as_ref().unwrap().contains("cluster_block_exception"));
    }

    #[test]
    fn test_parse_bulk_response_item_count_mismatch() {
        let body = json!({ "items": [] });
        assert!(matches!(
            parse_bulk_response(&[upsert("I1")], &body),
            Err(SearchError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_index_settings() {
        let body = json!({
            "issues_v3": { "settings": { "index": {
                "number_of_replicas": "2",
                "refresh_interval": "1s",
                "number_of_shards": "5"
            } } }
        });

        let settings = parse_index_settings(&body).unwrap();

        assert_eq!(settings, IndexSettings::new(Some(2), Some("1s".to_string())));
    }

    #[test]
    fn test_parse_index_settings_defaults() {
        let body = json!({ "issues": { "settings": { "index": { "number_of_shards": "1" } } } });

        let settings = parse_index_settings(&body).unwrap();

        assert_eq!(settings, IndexSettings::default());
    }

    #[test]
    fn test_settings_body_resets_missing_values() {
        let body = settings_body(&IndexSettings::new(Some(1), None));
        assert_eq!(
            body,
            json!({ "index": { "number_of_replicas": 1, "refresh_interval": null } })
        );
    }
}
