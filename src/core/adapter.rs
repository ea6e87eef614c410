use crate::config::EndpointConfig;
use crate::core::client::{resolve_url, ClientCascade};
use crate::domain::model::{
    Domain, ExternalQuery, FetchStatus, NormalizedResult, ProviderMeta, Record,
};
use crate::domain::ports::XmlRecordParser;
use crate::utils::error::{HubError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// One gateway per provider domain. `fetch` never raises past this boundary;
/// every transport or parse fault comes back folded into the result.
#[async_trait]
pub trait GatewayAdapter: Send + Sync {
    fn domain(&self) -> Domain;
    async fn fetch(&self, query: &ExternalQuery) -> NormalizedResult;
}

/// Fixed provider parameters merged with the caller's open filter map.
/// Filters win on key collision, matching the upstream pass-through contract.
fn merge_params(
    fixed: &[(&str, String)],
    filters: &BTreeMap<String, String>,
) -> Vec<(String, String)> {
    let mut merged: BTreeMap<String, String> = fixed
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    for (key, value) in filters {
        merged.insert(key.clone(), value.clone());
    }
    merged.into_iter().collect()
}

/// Issues the GET through the TLS cascade and returns the body text together
/// with the provider metadata accumulated along the way. The metadata is
/// meaningful even when the call fails.
async fn request_text(
    cascade: &ClientCascade,
    base_url: &str,
    params: &[(String, String)],
) -> (ProviderMeta, Result<String>) {
    let url = match resolve_url(base_url, params) {
        Ok(url) => url,
        Err(e) => {
            let meta = ProviderMeta {
                ssl_mode: "unresolved".to_string(),
                resolved_url: base_url.to_string(),
            };
            return (meta, Err(e));
        }
    };

    let mut meta = ProviderMeta {
        ssl_mode: "exhausted".to_string(),
        resolved_url: url.to_string(),
    };

    match cascade.get(&url).await {
        Ok((posture, response)) => {
            meta.ssl_mode = posture.as_str().to_string();
            match response.error_for_status() {
                Ok(response) => match response.text().await {
                    Ok(text) => (meta, Ok(text)),
                    Err(e) => (meta, Err(HubError::Transport(e))),
                },
                Err(e) => (meta, Err(HubError::Transport(e))),
            }
        }
        Err(e) => (meta, Err(e)),
    }
}

/// Application-level error code embedded in an otherwise well-formed body.
/// Both JSON providers use the same `resultCode`/`resultMessage` pair. An
/// absent code reads as success.
fn provider_error(body: &Value) -> Option<HubError> {
    match body.get("resultCode").and_then(Value::as_i64) {
        Some(200) | None => None,
        Some(code) => {
            let message = body
                .get("resultMessage")
                .and_then(Value::as_str)
                .unwrap_or("Unknown API error")
                .to_string();
            Some(HubError::Provider { code, message })
        }
    }
}

/// Record list at a provider's result path; non-object entries are dropped.
fn collect_records(value: Option<&Value>) -> Vec<Record> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .cloned()
            .filter_map(Record::from_value)
            .collect(),
        _ => Vec::new(),
    }
}

/// Public-institution recruitment listings (JSON).
pub struct JobAdapter {
    endpoint: EndpointConfig,
    cascade: ClientCascade,
}

impl JobAdapter {
    pub fn new(endpoint: EndpointConfig, timeout: Duration) -> Self {
        Self {
            endpoint,
            cascade: ClientCascade::new(timeout),
        }
    }
}

#[async_trait]
impl GatewayAdapter for JobAdapter {
    fn domain(&self) -> Domain {
        Domain::Job
    }

    // No region parameter: the recruitment provider cannot filter by
    // district, so job records are region-ranked downstream instead.
    async fn fetch(&self, query: &ExternalQuery) -> NormalizedResult {
        let fixed = [
            ("serviceKey", self.endpoint.api_key.clone()),
            ("pageNo", query.page.to_string()),
            ("numOfRows", query.page_size.to_string()),
            ("resultType", "json".to_string()),
        ];
        let params = merge_params(&fixed, &query.filters);
        let (meta, body) = request_text(&self.cascade, &self.endpoint.base_url, &params).await;
        let text = match body {
            Ok(text) => text,
            Err(e) => return NormalizedResult::failed(meta, e.to_string()),
        };
        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => return NormalizedResult::failed(meta, HubError::Parse(e).to_string()),
        };

        let mut records = collect_records(value.get("result"));
        records.truncate(query.page_size as usize);
        let total_count = value
            .get("totalCount")
            .and_then(Value::as_u64)
            .unwrap_or(records.len() as u64);
        tracing::debug!(
            domain = %Domain::Job,
            count = records.len(),
            total = total_count,
            "normalized provider response"
        );

        NormalizedResult {
            status: FetchStatus::Ok,
            records,
            total_count,
            page_info: Value::Null,
            meta,
            api_error: provider_error(&value).map(|e| e.to_string()),
            error: None,
        }
    }
}

/// Apartment real-trade records (XML body). Parsing is delegated to the
/// external XML-record collaborator; whatever it drops stays dropped.
pub struct RealEstateAdapter {
    endpoint: EndpointConfig,
    cascade: ClientCascade,
    parser: Arc<dyn XmlRecordParser>,
}

impl RealEstateAdapter {
    pub fn new(
        endpoint: EndpointConfig,
        timeout: Duration,
        parser: Arc<dyn XmlRecordParser>,
    ) -> Self {
        Self {
            endpoint,
            cascade: ClientCascade::new(timeout),
            parser,
        }
    }
}

#[async_trait]
impl GatewayAdapter for RealEstateAdapter {
    fn domain(&self) -> Domain {
        Domain::RealEstate
    }

    async fn fetch(&self, query: &ExternalQuery) -> NormalizedResult {
        let fixed = [
            ("serviceKey", self.endpoint.api_key.clone()),
            ("LAWD_CD", query.region_code.clone()),
            ("pageNo", query.page.to_string()),
            ("numOfRows", query.page_size.to_string()),
        ];
        let params = merge_params(&fixed, &query.filters);
        let (meta, body) = request_text(&self.cascade, &self.endpoint.base_url, &params).await;
        let text = match body {
            Ok(text) => text,
            Err(e) => return NormalizedResult::failed(meta, e.to_string()),
        };

        let mut records = self.parser.parse_records(&text);
        records.truncate(query.page_size as usize);
        let total_count = records.len() as u64;
        tracing::debug!(
            domain = %Domain::RealEstate,
            count = records.len(),
            "normalized provider response"
        );

        NormalizedResult {
            status: FetchStatus::Ok,
            records,
            total_count,
            page_info: Value::Null,
            meta,
            api_error: None,
            error: None,
        }
    }
}

/// Youth-policy listings (JSON, nested result section).
pub struct PolicyAdapter {
    endpoint: EndpointConfig,
    cascade: ClientCascade,
}

impl PolicyAdapter {
    pub fn new(endpoint: EndpointConfig, timeout: Duration) -> Self {
        Self {
            endpoint,
            cascade: ClientCascade::new(timeout),
        }
    }
}

#[async_trait]
impl GatewayAdapter for PolicyAdapter {
    fn domain(&self) -> Domain {
        Domain::Policy
    }

    async fn fetch(&self, query: &ExternalQuery) -> NormalizedResult {
        let fixed = [
            ("apiKeyNm", self.endpoint.api_key.clone()),
            ("pageNum", query.page.to_string()),
            ("pageSize", query.page_size.to_string()),
            ("pageType", "1".to_string()),
            ("rtnType", "json".to_string()),
            ("zipCd", query.region_code.clone()),
        ];
        let params = merge_params(&fixed, &query.filters);
        let (meta, body) = request_text(&self.cascade, &self.endpoint.base_url, &params).await;
        let text = match body {
            Ok(text) => text,
            Err(e) => return NormalizedResult::failed(meta, e.to_string()),
        };
        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => return NormalizedResult::failed(meta, HubError::Parse(e).to_string()),
        };

        let result_section = value.get("result");
        let mut records =
            collect_records(result_section.and_then(|section| section.get("youthPolicyList")));
        records.truncate(query.page_size as usize);
        let page_info = result_section
            .and_then(|section| section.get("pagging"))
            .cloned()
            .unwrap_or(Value::Null);
        let total_count = page_info
            .get("totCount")
            .and_then(Value::as_u64)
            .unwrap_or(records.len() as u64);
        tracing::debug!(
            domain = %Domain::Policy,
            count = records.len(),
            total = total_count,
            "normalized provider response"
        );

        NormalizedResult {
            status: FetchStatus::Ok,
            records,
            total_count,
            page_info,
            meta,
            api_error: provider_error(&value).map(|e| e.to_string()),
            error: None,
        }
    }
}
