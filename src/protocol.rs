//! Wire shapes exchanged with the monitoring consumer
//!
//! The transport is the host's business; this module only fixes the JSON
//! shapes and decodes untyped page requests. Malformed requests decode to a
//! [`RequestError`], which the logger turns into "no response".

use crate::aggregate::Summary;
use crate::event::QueryEvent;
use crate::pager::{Page, SortField, SortSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Reasons a page request is dropped
#[derive(Error, Debug, PartialEq)]
pub enum RequestError {
    #[error("request is not an object")]
    NotAnObject,

    #[error("resource must be a string")]
    ResourceNotString,

    #[error("pageIndex must be a non-negative integer")]
    InvalidPageIndex,

    #[error("invalid sortBy: {0}")]
    InvalidSort(String),
}

/// Result type for request decoding
pub type Result<T> = std::result::Result<T, RequestError>;

/// An execution reported by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    pub caller_id: String,
    pub query: String,
    pub execution_time_ms: f64,
    #[serde(default)]
    pub parameters: Value,
}

/// Response to a summary request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub resources: Vec<String>,
    pub total_queries: usize,
    pub total_time: f64,
}

impl From<Summary> for SummaryResponse {
    fn from(summary: Summary) -> Self {
        Self {
            resources: summary.callers,
            total_queries: summary.total_events,
            total_time: summary.total_execution_time_ms,
        }
    }
}

/// One element of a request's `sortBy` list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SortBy {
    pub id: SortField,
    #[serde(default)]
    pub desc: bool,
}

impl From<SortBy> for SortSpec {
    fn from(sort: SortBy) -> Self {
        Self {
            field: sort.id,
            descending: sort.desc,
        }
    }
}

/// A decoded page request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub resource: String,
    pub page_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<Vec<SortBy>>,
}

impl PageRequest {
    /// The sort to apply; only the first `sortBy` element counts
    pub fn sort(&self) -> Option<SortSpec> {
        self.sort_by
            .as_ref()
            .and_then(|list| list.first())
            .map(|s| SortSpec::from(*s))
    }
}

/// Response to a page request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub queries: Vec<QueryEvent>,
    pub page_count: usize,
}

impl From<Page> for PageResponse {
    fn from(page: Page) -> Self {
        Self {
            queries: page.events,
            page_count: page.page_count,
        }
    }
}

/// Decode an untyped page request
///
/// Checks each field separately so the error names what was wrong.
pub fn decode_page_request(value: &Value) -> Result<PageRequest> {
    let obj = value.as_object().ok_or(RequestError::NotAnObject)?;

    let resource = obj
        .get("resource")
        .and_then(Value::as_str)
        .ok_or(RequestError::ResourceNotString)?
        .to_string();

    let page_index = obj
        .get("pageIndex")
        .and_then(Value::as_u64)
        .and_then(|i| usize::try_from(i).ok())
        .ok_or(RequestError::InvalidPageIndex)?;

    let sort_by = match obj.get("sortBy") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(
            serde_json::from_value::<Vec<SortBy>>(raw.clone())
                .map_err(|e| RequestError::InvalidSort(e.to_string()))?,
        ),
    };

    Ok(PageRequest {
        resource,
        page_index,
        sort_by,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_minimal_request() {
        let req = decode_page_request(&json!({"resource": "shop", "pageIndex": 2})).unwrap();
        assert_eq!(req.resource, "shop");
        assert_eq!(req.page_index, 2);
        assert!(req.sort().is_none());
    }

    #[test]
    fn test_decode_uses_first_sort_only() {
        let req = decode_page_request(&json!({
            "resource": "shop",
            "pageIndex": 0,
            "sortBy": [
                {"id": "executionTime", "desc": true},
                {"id": "query", "desc": false}
            ]
        }))
        .unwrap();

        assert_eq!(req.sort(), Some(SortSpec::descending(SortField::ExecutionTime)));
    }

    #[test]
    fn test_empty_sort_list_means_unsorted() {
        let req = decode_page_request(&json!({"resource": "a", "pageIndex": 0, "sortBy": []})).unwrap();
        assert!(req.sort().is_none());
    }

    #[test]
    fn test_resource_not_string_rejected() {
        assert_eq!(
            decode_page_request(&json!({"resource": 5, "pageIndex": 0})),
            Err(RequestError::ResourceNotString)
        );
        assert_eq!(
            decode_page_request(&json!({"pageIndex": 0})),
            Err(RequestError::ResourceNotString)
        );
    }

    #[test]
    fn test_bad_page_index_rejected() {
        for bad in [json!(-1), json!(1.5), json!("0"), Value::Null] {
            assert_eq!(
                decode_page_request(&json!({"resource": "a", "pageIndex": bad})),
                Err(RequestError::InvalidPageIndex)
            );
        }
    }

    #[test]
    fn test_unknown_sort_field_rejected() {
        let err = decode_page_request(&json!({
            "resource": "a",
            "pageIndex": 0,
            "sortBy": [{"id": "date", "desc": false}]
        }))
        .unwrap_err();
        assert!(matches!(err, RequestError::InvalidSort(_)));
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(decode_page_request(&json!("shop")), Err(RequestError::NotAnObject));
    }

    #[test]
    fn test_summary_response_shape() {
        let response = SummaryResponse::from(Summary {
            callers: vec!["a".into(), "b".into()],
            total_events: 4,
            total_execution_time_ms: 50.0,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, json!({"resources": ["a", "b"], "totalQueries": 4, "totalTime": 50.0}));
    }

    #[test]
    fn test_page_response_shape() {
        let response = PageResponse::from(Page {
            events: vec![QueryEvent::with_timestamp("SELECT 1", 3.0, 9)],
            page_count: 1,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            json!({"queries": [{"date": 9, "query": "SELECT 1", "executionTime": 3.0}], "pageCount": 1})
        );
    }

    #[test]
    fn test_inbound_event_parameters_default() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"callerId":"a","query":"SELECT 1","executionTimeMs":4}"#).unwrap();
        assert_eq!(event.caller_id, "a");
        assert_eq!(event.execution_time_ms, 4.0);
        assert!(event.parameters.is_null());
    }
}
