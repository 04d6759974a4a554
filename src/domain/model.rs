use crate::utils::error::{CatalogError, ResponseFailure, Result, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The four catalog responses this tool knows how to fetch and transcribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Search,
    ProductLookup,
    PaginatedProducts,
    Taxonomy,
}

impl ResponseKind {
    pub const ALL: [ResponseKind; 4] = [
        ResponseKind::Search,
        ResponseKind::ProductLookup,
        ResponseKind::PaginatedProducts,
        ResponseKind::Taxonomy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Search => "search",
            ResponseKind::ProductLookup => "product_lookup",
            ResponseKind::PaginatedProducts => "paginated_products",
            ResponseKind::Taxonomy => "taxonomy",
        }
    }
}

impl std::fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscribeMode {
    /// Lay a list of records out as a conventional table.
    Dump,
    /// Walk the whole document key by key.
    Walk,
}

/// How one stored response is laid out in the workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDescriptor {
    pub kind: ResponseKind,
    pub file_name: String,
    pub sheet_name: String,
    /// 1-based row where the body (table header or first walked key) begins.
    pub start_row: u32,
    pub mode: TranscribeMode,
    #[serde(default)]
    pub dump_key: Option<String>,
    #[serde(default)]
    pub header_attributes: Vec<String>,
    #[serde(default)]
    pub include_index: bool,
    #[serde(default)]
    pub sparse_records: bool,
}

impl ResponseDescriptor {
    /// Layout used for the demo workbook.
    pub fn builtin(kind: ResponseKind) -> Self {
        let (file_name, sheet_name, start_row, mode, dump_key, header_attributes): (
            &str,
            &str,
            u32,
            TranscribeMode,
            Option<&str>,
            &[&str],
        ) = match kind {
            ResponseKind::Search => (
                "search.txt",
                "Search",
                7,
                TranscribeMode::Dump,
                Some("items"),
                &[
                    "query",
                    "sort",
                    "responseGroup",
                    "totalResults",
                    "start",
                    "numItems",
                ],
            ),
            ResponseKind::ProductLookup => (
                "productLookup.txt",
                "Product Lookup",
                1,
                TranscribeMode::Walk,
                None,
                &[],
            ),
            ResponseKind::PaginatedProducts => (
                "paginatedProducts.txt",
                "Paginated Products",
                5,
                TranscribeMode::Dump,
                Some("items"),
                &["category", "format", "nextPage", "totalPages"],
            ),
            ResponseKind::Taxonomy => (
                "taxonomy.txt",
                "Taxonomy",
                1,
                TranscribeMode::Walk,
                None,
                &[],
            ),
        };

        Self {
            kind,
            file_name: file_name.to_string(),
            sheet_name: sheet_name.to_string(),
            start_row,
            mode,
            dump_key: dump_key.map(str::to_string),
            header_attributes: header_attributes.iter().map(|a| a.to_string()).collect(),
            include_index: false,
            sparse_records: false,
        }
    }

    pub fn builtins() -> Vec<Self> {
        ResponseKind::ALL.into_iter().map(Self::builtin).collect()
    }
}

/// One API call and where its body is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub kind: ResponseKind,
    pub url: String,
    pub file_name: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, toml::Value>,
}

impl EndpointConfig {
    /// Queries issued against the demo API rooted at `base_url`.
    pub fn builtin(kind: ResponseKind, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let mut parameters = BTreeMap::new();
        parameters.insert("format".to_string(), toml::Value::String("json".to_string()));

        let (path, file_name) = match kind {
            ResponseKind::Search => {
                parameters.insert("query".to_string(), toml::Value::String("tv".to_string()));
                parameters.insert(
                    "sort".to_string(),
                    toml::Value::String("bestseller".to_string()),
                );
                parameters.insert(
                    "responseGroup".to_string(),
                    toml::Value::String("full".to_string()),
                );
                parameters.insert("numItems".to_string(), toml::Value::Integer(25));
                ("search", "search.txt")
            }
            ResponseKind::ProductLookup => ("items/46784935", "productLookup.txt"),
            ResponseKind::PaginatedProducts => {
                parameters.insert(
                    "category".to_string(),
                    toml::Value::String("1105910".to_string()),
                );
                ("paginated/items", "paginatedProducts.txt")
            }
            ResponseKind::Taxonomy => ("taxonomy", "taxonomy.txt"),
        };

        Self {
            kind,
            url: format!("{}/{}", base, path),
            file_name: file_name.to_string(),
            parameters,
        }
    }

    pub fn builtins(base_url: &str) -> Vec<Self> {
        ResponseKind::ALL
            .into_iter()
            .map(|kind| Self::builtin(kind, base_url))
            .collect()
    }

    /// Parameters rendered as query pairs. Arrays and tables are skipped;
    /// configuration validation rejects them up front.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.parameters
            .iter()
            .filter_map(|(name, value)| scalar_to_query(value).map(|v| (name.clone(), v)))
            .collect()
    }
}

pub(crate) fn scalar_to_query(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

/// Outcome of fetching one endpoint.
#[derive(Debug)]
pub struct FetchOutcome {
    pub kind: ResponseKind,
    pub file_name: String,
    pub result: Result<usize>,
}

#[derive(Debug, Default)]
pub struct FetchReport {
    pub outcomes: Vec<FetchOutcome>,
}

impl FetchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Number of stored responses, or every endpoint failure at once.
    pub fn into_result(self) -> Result<usize> {
        let total = self.outcomes.len();
        let failures: Vec<ResponseFailure> = self
            .outcomes
            .into_iter()
            .filter_map(|outcome| {
                let response = outcome.kind;
                outcome
                    .result
                    .err()
                    .map(|error| ResponseFailure { response, error })
            })
            .collect();

        if failures.is_empty() {
            Ok(total)
        } else {
            Err(CatalogError::ResponsesFailed {
                stage: Stage::Fetch,
                failures,
            })
        }
    }
}
