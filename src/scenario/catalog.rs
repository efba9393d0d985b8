//! Built-in scenarios for the bundled fixture set.

use super::{Action, Expectation, QuerySpec, Scenario};
use crate::error::{HarnessError, Result};
use crate::fixtures;
use crate::normalize::IgnoreKeys;
use blackcheck_http::ResponseFormat;

pub const QUERY_PATTERN: &str = "\"120\"";
pub const FILTER_TERM_OR_SUBSCRIPTION: &str = "section:(\"Term\" OR \"Subscription\")";
pub const FILTER_TERM: &str = "section:(\"Term\")";
pub const FILTER_NO_MATCH: &str = "section:(\"Payment\")";

fn query(name: &str, description: &str, filter: Option<&str>) -> Scenario {
    Scenario {
        name: name.to_string(),
        description: description.to_string(),
        ingest: true,
        action: Action::Query(QuerySpec {
            pattern: QUERY_PATTERN.to_string(),
            filter: filter.map(str::to_string),
            format: ResponseFormat::Xml,
        }),
        expectation: Expectation::MatchesFixture {
            fixture: fixtures::EXPECTED_QUERY_RESULT.to_string(),
            ignore: IgnoreKeys::new(["blacklabResponse.summary"]),
            xml_attributes: false,
        },
    }
}

/// All built-in scenarios, in run order.
pub fn builtin() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "create-index".to_string(),
            description: "create an index and read back its status".to_string(),
            ingest: false,
            action: Action::Status,
            expectation: Expectation::Success,
        },
        Scenario {
            name: "index-content".to_string(),
            description: "ingest documents and compare the document listing".to_string(),
            ingest: true,
            action: Action::Content,
            expectation: Expectation::MatchesFixture {
                fixture: fixtures::EXPECTED_INDEX_CONTENT.to_string(),
                ignore: IgnoreKeys::new(["summary", "searchTime"]),
                xml_attributes: false,
            },
        },
        Scenario {
            name: "index-metadata".to_string(),
            description: "ingest documents and compare the index metadata".to_string(),
            ingest: true,
            action: Action::Metadata,
            expectation: Expectation::MatchesFixture {
                fixture: fixtures::EXPECTED_INDEX_METADATA.to_string(),
                ignore: IgnoreKeys::new(["indexName", "displayName", "versionInfo"]),
                xml_attributes: false,
            },
        },
        query(
            "query-xml-no-filter",
            "query \"120\" as XML without a filter",
            None,
        ),
        query(
            "query-xml-filter-term-or-subscription",
            "query \"120\" as XML filtered to the Term or Subscription sections",
            Some(FILTER_TERM_OR_SUBSCRIPTION),
        ),
        query(
            "query-xml-filter-term",
            "query \"120\" as XML filtered to the Term section",
            Some(FILTER_TERM),
        ),
        Scenario {
            name: "query-xml-filter-no-match".to_string(),
            description: "query \"120\" filtered to a section without matches".to_string(),
            ingest: true,
            action: Action::Query(QuerySpec {
                pattern: QUERY_PATTERN.to_string(),
                filter: Some(FILTER_NO_MATCH.to_string()),
                format: ResponseFormat::Xml,
            }),
            expectation: Expectation::EmptyList {
                path: "blacklabResponse.hits".to_string(),
            },
        },
    ]
}

/// Built-in scenarios named in `names`, in the order given. Empty `names`
/// selects everything.
pub fn select<S: AsRef<str>>(names: &[S]) -> Result<Vec<Scenario>> {
    let all = builtin();
    if names.is_empty() {
        return Ok(all);
    }
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            all.iter()
                .find(|s| s.name == name)
                .cloned()
                .ok_or_else(|| HarnessError::Config(format!("Unknown scenario: {}", name)))
        })
        .collect()
}
