use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Order-preserving field map, exactly as the provider returned it.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Domain {
    #[serde(rename = "jobs")]
    Job,
    #[serde(rename = "realestate")]
    RealEstate,
    #[serde(rename = "policies")]
    Policy,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Job, Domain::RealEstate, Domain::Policy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Job => "jobs",
            Domain::RealEstate => "realestate",
            Domain::Policy => "policies",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single raw record from a provider. The field set differs per domain and
/// is carried opaquely; records are never mutated after fetch, display
/// enrichment clones first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl Record {
    pub fn new(fields: FieldMap) -> Self {
        Self { fields }
    }

    /// Wraps a JSON value if it is an object; anything else is dropped by
    /// the caller.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// String field lookup; missing or non-string fields read as "".
    pub fn text(&self, key: &str) -> &str {
        self.fields
            .get(key)
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
    }

    /// String field lookup with a fallback for a missing or non-string field.
    /// A present-but-empty string stays empty.
    pub fn text_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.fields.get(key) {
            Some(value) => value.as_str().unwrap_or(default),
            None => default,
        }
    }
}

/// Outcome tag of one adapter call. A provider-level error inside a valid
/// response keeps `Ok`; check `api_error` as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProviderMeta {
    pub ssl_mode: String,
    pub resolved_url: String,
}

/// Uniform result shape every adapter normalizes its provider envelope into.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedResult {
    pub status: FetchStatus,
    pub records: Vec<Record>,
    pub total_count: u64,
    pub page_info: serde_json::Value,
    pub meta: ProviderMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NormalizedResult {
    pub fn failed(meta: ProviderMeta, error: impl Into<String>) -> Self {
        Self {
            status: FetchStatus::Error,
            records: Vec::new(),
            total_count: 0,
            page_info: serde_json::Value::Null,
            meta,
            api_error: None,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status, FetchStatus::Ok)
    }
}

/// One parameterized outbound request. Filters are an open set forwarded to
/// the provider verbatim; unknown keys need no code change here. A filter key
/// that collides with a fixed parameter overrides it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalQuery {
    pub domain: Domain,
    pub region_code: String,
    pub page: u32,
    pub page_size: u32,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

impl ExternalQuery {
    pub fn new(domain: Domain, region_code: impl Into<String>, page_size: u32) -> Self {
        Self {
            domain,
            region_code: region_code.into(),
            page: 1,
            page_size,
            filters: BTreeMap::new(),
        }
    }

    pub fn with_filters(mut self, filters: BTreeMap<String, String>) -> Self {
        self.filters = filters;
        self
    }
}

/// Output of the natural-language intent collaborator, comprehensive mode
/// only. The hub forces all three search flags on regardless of what the
/// analyzer decided.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Intent {
    pub search_jobs: bool,
    pub search_realestate: bool,
    pub search_policies: bool,
    #[serde(default)]
    pub region_hint: Option<String>,
    #[serde(default)]
    pub intent_type: Option<String>,
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}
