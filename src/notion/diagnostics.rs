//! Read-only database inspection: entry count, schema, existing entries

use miette::Diagnostic;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::debug;

use crate::entities::MappedRecord;
use crate::notion::client::{ApiError, NotionApi, QueryPage};
use crate::notion::payload::{COMPANY_PROPERTY, POSITION_PROPERTY};

#[derive(Debug, Error, Diagnostic)]
pub enum DiagnosticsError {
    #[error("Failed to list database entries (page {page})")]
    #[diagnostic(code(huntr_notion::diagnostics::query))]
    Query {
        page: usize,
        #[source]
        #[diagnostic_source]
        source: ApiError,
    },

    #[error("Failed to retrieve database schema")]
    #[diagnostic(code(huntr_notion::diagnostics::schema))]
    Schema {
        #[source]
        #[diagnostic_source]
        source: ApiError,
    },

    #[error("Malformed query response on page {page}: has_more is set but next_cursor is missing")]
    #[diagnostic(code(huntr_notion::diagnostics::cursor))]
    MissingCursor { page: usize },
}

/// Walk every page of the database query, in order
pub fn for_each_page<A, F>(api: &A, mut visit: F) -> Result<usize, DiagnosticsError>
where
    A: NotionApi + ?Sized,
    F: FnMut(&QueryPage),
{
    let mut cursor: Option<String> = None;
    let mut pages = 0;

    loop {
        pages += 1;
        let page = api
            .query_database(cursor.as_deref())
            .map_err(|source| DiagnosticsError::Query {
                page: pages,
                source,
            })?;
        debug!(page = pages, results = page.results.len(), has_more = page.has_more, "query page");
        visit(&page);

        if !page.has_more {
            return Ok(pages);
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => return Err(DiagnosticsError::MissingCursor { page: pages }),
        }
    }
}

/// Number of entries in the database
pub fn count_entries<A: NotionApi + ?Sized>(api: &A) -> Result<usize, DiagnosticsError> {
    let mut total = 0;
    for_each_page(api, |page| total += page.results.len())?;
    Ok(total)
}

/// Property name to property type
pub fn describe_schema<A: NotionApi + ?Sized>(
    api: &A,
) -> Result<BTreeMap<String, String>, DiagnosticsError> {
    let info = api
        .retrieve_database()
        .map_err(|source| DiagnosticsError::Schema { source })?;

    Ok(info
        .properties
        .into_iter()
        .map(|(name, property)| (name, property.kind))
        .collect())
}

/// `(company, position)` pairs of every entry already in the database
pub fn existing_entries<A: NotionApi + ?Sized>(
    api: &A,
) -> Result<HashSet<(String, String)>, DiagnosticsError> {
    let mut keys = HashSet::new();
    for_each_page(api, |page| {
        for entry in &page.results {
            let properties = &entry["properties"];
            let company = plain_text(&properties[COMPANY_PROPERTY]["title"]);
            let position = plain_text(&properties[POSITION_PROPERTY]["rich_text"]);
            keys.insert((company, position));
        }
    })?;
    Ok(keys)
}

/// Split `records` into those not yet present and the number dropped
pub fn drop_existing(
    records: Vec<MappedRecord>,
    existing: &HashSet<(String, String)>,
) -> (Vec<MappedRecord>, usize) {
    let before = records.len();
    let kept: Vec<MappedRecord> = records
        .into_iter()
        .filter(|r| !existing.contains(&r.dedupe_key()))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Concatenate the text of a rich-text array
fn plain_text(items: &Value) -> String {
    items
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    item["plain_text"]
                        .as_str()
                        .or_else(|| item["text"]["content"].as_str())
                })
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::client::{DatabaseInfo, PropertyInfo};
    use crate::notion::payload::PageRequest;
    use serde_json::json;
    use std::cell::RefCell;

    /// Serves canned query pages and records the cursors it was asked for
    struct PagedApi {
        pages: Vec<QueryPage>,
        cursors: RefCell<Vec<Option<String>>>,
        fail_on: Option<usize>,
    }

    impl PagedApi {
        fn with_sizes(sizes: &[usize]) -> Self {
            let pages = sizes
                .iter()
                .enumerate()
                .map(|(i, &n)| QueryPage {
                    results: vec![json!({"id": "x"}); n],
                    has_more: i + 1 < sizes.len(),
                    next_cursor: (i + 1 < sizes.len()).then(|| format!("cursor-{}", i + 1)),
                })
                .collect();
            Self {
                pages,
                cursors: RefCell::new(Vec::new()),
                fail_on: None,
            }
        }
    }

    impl NotionApi for PagedApi {
        fn create_page(&self, _page: &PageRequest) -> Result<(), ApiError> {
            unreachable!("diagnostics never create pages")
        }

        fn query_database(&self, start_cursor: Option<&str>) -> Result<QueryPage, ApiError> {
            let mut cursors = self.cursors.borrow_mut();
            cursors.push(start_cursor.map(str::to_string));
            let idx = cursors.len() - 1;
            if self.fail_on == Some(idx) {
                return Err(ApiError::Status {
                    url: "http://fake/query".to_string(),
                    status: 502,
                    body: String::new(),
                });
            }
            Ok(self.pages[idx].clone())
        }

        fn retrieve_database(&self) -> Result<DatabaseInfo, ApiError> {
            let mut properties = BTreeMap::new();
            for (name, kind) in [("Company", "title"), ("Position", "rich_text"), ("Status", "status")] {
                properties.insert(
                    name.to_string(),
                    PropertyInfo {
                        kind: kind.to_string(),
                    },
                );
            }
            Ok(DatabaseInfo { properties })
        }
    }

    #[test]
    fn test_count_entries_over_three_pages() {
        let api = PagedApi::with_sizes(&[100, 100, 37]);

        assert_eq!(count_entries(&api).unwrap(), 237);
        assert_eq!(
            *api.cursors.borrow(),
            vec![
                None,
                Some("cursor-1".to_string()),
                Some("cursor-2".to_string())
            ]
        );
    }

    #[test]
    fn test_count_entries_empty_database() {
        let api = PagedApi::with_sizes(&[0]);
        assert_eq!(count_entries(&api).unwrap(), 0);
    }

    #[test]
    fn test_count_entries_fails_on_bad_page() {
        let mut api = PagedApi::with_sizes(&[100, 100, 37]);
        api.fail_on = Some(1);

        let err = count_entries(&api).unwrap_err();
        assert!(matches!(err, DiagnosticsError::Query { page: 2, .. }));
    }

    #[test]
    fn test_missing_cursor_is_malformed() {
        let mut api = PagedApi::with_sizes(&[5, 5]);
        api.pages[0].next_cursor = None;

        let err = count_entries(&api).unwrap_err();
        assert!(matches!(err, DiagnosticsError::MissingCursor { page: 1 }));
    }

    #[test]
    fn test_describe_schema() {
        let schema = describe_schema(&PagedApi::with_sizes(&[0])).unwrap();

        assert_eq!(schema.len(), 3);
        assert_eq!(schema["Company"], "title");
        assert_eq!(schema["Status"], "status");
    }

    #[test]
    fn test_existing_entries_and_drop_existing() {
        let mut api = PagedApi::with_sizes(&[1]);
        api.pages[0].results = vec![json!({
            "properties": {
                "Company": {"title": [{"plain_text": "Ac"}, {"plain_text": "me"}]},
                "Position": {"rich_text": [{"text": {"content": "Engineer"}}]}
            }
        })];

        let existing = existing_entries(&api).unwrap();
        assert!(existing.contains(&("Acme".to_string(), "Engineer".to_string())));

        let record = |company: &str, position: &str| MappedRecord {
            company: company.to_string(),
            position: position.to_string(),
            status: "Applied".to_string(),
            icon: None,
        };
        let (kept, dropped) = drop_existing(
            vec![record("Acme", "Engineer"), record("Acme", "PM")],
            &existing,
        );

        assert_eq!(dropped, 1);
        assert_eq!(kept, vec![record("Acme", "PM")]);
    }

    #[test]
    fn test_plain_text_of_missing_property() {
        assert_eq!(plain_text(&Value::Null), "");
    }
}
