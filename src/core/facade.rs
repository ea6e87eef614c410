use crate::config::HubConfig;
use crate::core::adapter::{JobAdapter, PolicyAdapter, RealEstateAdapter};
use crate::core::format;
use crate::core::orchestrator::{AggregationOrchestrator, DomainFilters, DomainLimits};
use crate::core::stats::{self, AggregateSummary, Histogram, JobStatistics, PriceAnalysis};
use crate::domain::model::{Domain, FetchStatus, Intent, NormalizedResult, Record};
use crate::domain::ports::{IntentAnalyzer, RegionDirectory, RegionRanker, XmlRecordParser};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Fallback region (태안군) when neither the caller nor the intent names one.
const DEFAULT_REGION_CODE: &str = "44790";
/// Deal period requested when the caller leaves it unset.
const DEFAULT_DEAL_PERIOD: &str = "202506";

const COMPREHENSIVE_PREVIEW_LIMIT: usize = 3;
const JOB_LIST_LIMIT: usize = 15;
const POLICY_LIST_LIMIT: usize = 5;

/// External black boxes the hub consumes but does not implement.
pub struct Collaborators {
    pub regions: Arc<dyn RegionDirectory>,
    pub ranker: Arc<dyn RegionRanker>,
    pub xml_parser: Arc<dyn XmlRecordParser>,
    pub intents: Arc<dyn IntentAnalyzer>,
}

/// Top-level response envelope. Per-domain partial failure stays a success
/// with zero counts for the failed domain; only a fault that escapes the
/// whole operation body collapses into the failure shape.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ApiEnvelope<T> {
    Ok(T),
    Failed(FailureBody),
}

#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
}

impl<T: Serialize> ApiEnvelope<T> {
    fn from_result(result: anyhow::Result<T>, operation: &str) -> Self {
        match result {
            Ok(body) => ApiEnvelope::Ok(body),
            Err(e) => {
                tracing::error!(operation, error = %e, "request failed at the facade boundary");
                ApiEnvelope::Failed(FailureBody {
                    success: false,
                    error: e.to_string(),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionInfo {
    pub code: String,
    pub name: String,
}

/// Per-domain fetch detail kept alongside the display payload so a partial
/// failure is diagnosable from the envelope alone.
#[derive(Debug, Clone, Serialize)]
pub struct DomainDiagnostics {
    pub status: FetchStatus,
    pub ssl_mode: String,
    pub resolved_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&NormalizedResult> for DomainDiagnostics {
    fn from(result: &NormalizedResult) -> Self {
        Self {
            status: result.status,
            ssl_mode: result.meta.ssl_mode.clone(),
            resolved_url: result.meta.resolved_url.clone(),
            api_error: result.api_error.clone(),
            error: result.error.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PreviewData {
    pub jobs: Vec<Record>,
    pub realestate: Vec<Record>,
    pub policies: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct SearchMetadata {
    pub query: String,
    pub timestamp: String,
    pub intent_type: String,
}

#[derive(Debug, Serialize)]
pub struct ComprehensiveEnvelope {
    pub success: bool,
    pub summary: AggregateSummary,
    pub preview_data: PreviewData,
    pub region_info: RegionInfo,
    pub search_metadata: SearchMetadata,
    pub summary_message: String,
    pub diagnostics: BTreeMap<Domain, DomainDiagnostics>,
}

#[derive(Debug, Serialize)]
pub struct JobsEnvelope {
    pub success: bool,
    pub jobs: Vec<Record>,
    pub statistics: JobStatistics,
    pub total_count: usize,
    pub filters_applied: BTreeMap<String, String>,
    pub region_info: RegionInfo,
    pub summary_message: String,
    pub diagnostics: DomainDiagnostics,
}

#[derive(Debug, Serialize)]
pub struct RealEstateEnvelope {
    pub success: bool,
    pub properties: Vec<Record>,
    pub price_analysis: PriceAnalysis,
    pub deal_period: String,
    pub region_info: RegionInfo,
    pub summary_message: String,
    pub diagnostics: DomainDiagnostics,
}

#[derive(Debug, Serialize)]
pub struct PoliciesEnvelope {
    pub success: bool,
    pub policies: Vec<Record>,
    pub categories: Histogram,
    pub total_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords_used: Option<String>,
    pub region_info: RegionInfo,
    pub summary_message: String,
    pub diagnostics: DomainDiagnostics,
}

/// The public entry point: four display-ready operations over the three
/// provider domains. All state is request-scoped; the hub itself only holds
/// configuration and collaborator handles.
pub struct RegionHub {
    orchestrator: AggregationOrchestrator,
    regions: Arc<dyn RegionDirectory>,
    intents: Arc<dyn IntentAnalyzer>,
}

impl RegionHub {
    /// Validates the injected configuration and wires the adapters. No
    /// network activity happens here.
    pub fn new(config: HubConfig, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;
        let timeout = Duration::from_secs(config.timeout_secs);
        let orchestrator = AggregationOrchestrator::new(
            Arc::new(JobAdapter::new(config.job, timeout)),
            Arc::new(RealEstateAdapter::new(
                config.realestate,
                timeout,
                Arc::clone(&collaborators.xml_parser),
            )),
            Arc::new(PolicyAdapter::new(config.policy, timeout)),
            Arc::clone(&collaborators.ranker),
        );
        Ok(Self {
            orchestrator,
            regions: collaborators.regions,
            intents: collaborators.intents,
        })
    }

    fn region_info(&self, code: &str) -> RegionInfo {
        RegionInfo {
            code: code.to_string(),
            name: self.regions.region_name(code),
        }
    }

    pub async fn search_comprehensive(
        &self,
        query: &str,
        region_code: &str,
    ) -> ApiEnvelope<ComprehensiveEnvelope> {
        ApiEnvelope::from_result(
            self.comprehensive_inner(query, region_code).await,
            "search_comprehensive",
        )
    }

    pub async fn search_jobs(
        &self,
        region_code: &str,
        filters: BTreeMap<String, String>,
    ) -> ApiEnvelope<JobsEnvelope> {
        ApiEnvelope::from_result(self.jobs_inner(region_code, filters).await, "search_jobs")
    }

    pub async fn search_realestate(
        &self,
        region_code: &str,
        deal_ymd: &str,
    ) -> ApiEnvelope<RealEstateEnvelope> {
        ApiEnvelope::from_result(
            self.realestate_inner(region_code, deal_ymd).await,
            "search_realestate",
        )
    }

    pub async fn search_policies(
        &self,
        region_code: &str,
        keywords: Option<&str>,
    ) -> ApiEnvelope<PoliciesEnvelope> {
        ApiEnvelope::from_result(
            self.policies_inner(region_code, keywords).await,
            "search_policies",
        )
    }

    async fn comprehensive_inner(
        &self,
        query: &str,
        region_code: &str,
    ) -> anyhow::Result<ComprehensiveEnvelope> {
        let mut intent = self
            .intents
            .analyze(query)
            .context("intent analysis failed")?;
        // Comprehensive mode searches everything no matter what the
        // analyzer concluded.
        intent.search_jobs = true;
        intent.search_realestate = true;
        intent.search_policies = true;
        let region_code = effective_region(region_code, &intent);

        let mut requested = Vec::new();
        if intent.search_jobs {
            requested.push(Domain::Job);
        }
        if intent.search_realestate {
            requested.push(Domain::RealEstate);
        }
        if intent.search_policies {
            requested.push(Domain::Policy);
        }

        let filters = DomainFilters {
            job: intent.filters.clone(),
            realestate: BTreeMap::from([(
                "DEAL_YMD".to_string(),
                DEFAULT_DEAL_PERIOD.to_string(),
            )]),
            policy: BTreeMap::new(),
        };
        let mut results = self
            .orchestrator
            .aggregate_filtered(
                &requested,
                &region_code,
                &DomainLimits::comprehensive(),
                &filters,
            )
            .await;
        let diagnostics: BTreeMap<Domain, DomainDiagnostics> = results
            .iter()
            .map(|(domain, result)| (*domain, DomainDiagnostics::from(result)))
            .collect();

        let jobs = take_records(&mut results, Domain::Job);
        let properties = take_records(&mut results, Domain::RealEstate);
        let policies = take_records(&mut results, Domain::Policy);

        let region_info = self.region_info(&region_code);
        let summary = stats::summarize(&region_info.name, &jobs, &properties, &policies);
        let total = jobs.len() + properties.len() + policies.len();
        let summary_message = if total == 0 {
            format!("🔍 **{} 지역의 검색 결과가 없습니다.**", region_info.name)
        } else {
            format!(
                "🔍 **{} 통합 검색 결과** (일자리 {}건 · 부동산 {}건 · 정책 {}건)",
                region_info.name,
                jobs.len(),
                properties.len(),
                policies.len()
            )
        };

        Ok(ComprehensiveEnvelope {
            success: true,
            summary,
            preview_data: PreviewData {
                jobs: preview(&jobs),
                realestate: preview(&properties),
                policies: preview(&policies),
            },
            region_info,
            search_metadata: SearchMetadata {
                query: query.to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                intent_type: intent
                    .intent_type
                    .unwrap_or_else(|| "comprehensive".to_string()),
            },
            summary_message,
            diagnostics,
        })
    }

    async fn jobs_inner(
        &self,
        region_code: &str,
        filters: BTreeMap<String, String>,
    ) -> anyhow::Result<JobsEnvelope> {
        let mut results = self
            .orchestrator
            .aggregate_filtered(
                &[Domain::Job],
                region_code,
                &DomainLimits::focused(),
                &DomainFilters {
                    job: filters.clone(),
                    ..DomainFilters::default()
                },
            )
            .await;
        let result = results
            .remove(&Domain::Job)
            .context("job aggregation produced no result")?;
        let diagnostics = DomainDiagnostics::from(&result);
        let jobs = result.records;
        let region_info = self.region_info(region_code);

        let formatted: Vec<Record> = jobs
            .iter()
            .take(JOB_LIST_LIMIT)
            .enumerate()
            .map(|(i, job)| format::format_job(job, i + 1))
            .collect();
        let statistics = stats::job_statistics(&jobs);
        let summary_message = if jobs.is_empty() {
            format!(
                "📋 **{} 지역의 채용정보를 찾을 수 없습니다.**",
                region_info.name
            )
        } else {
            format!("📋 **채용정보** (총 {}건, 지역 관련성 순)", jobs.len())
        };

        Ok(JobsEnvelope {
            success: true,
            jobs: formatted,
            statistics,
            total_count: jobs.len(),
            filters_applied: filters,
            region_info,
            summary_message,
            diagnostics,
        })
    }

    async fn realestate_inner(
        &self,
        region_code: &str,
        deal_ymd: &str,
    ) -> anyhow::Result<RealEstateEnvelope> {
        let deal_period = if deal_ymd.is_empty() {
            DEFAULT_DEAL_PERIOD
        } else {
            deal_ymd
        };
        let mut results = self
            .orchestrator
            .aggregate_filtered(
                &[Domain::RealEstate],
                region_code,
                &DomainLimits::focused(),
                &DomainFilters {
                    realestate: BTreeMap::from([(
                        "DEAL_YMD".to_string(),
                        deal_period.to_string(),
                    )]),
                    ..DomainFilters::default()
                },
            )
            .await;
        let result = results
            .remove(&Domain::RealEstate)
            .context("real-estate aggregation produced no result")?;
        let diagnostics = DomainDiagnostics::from(&result);
        let properties = result.records;
        let region_info = self.region_info(region_code);

        let price_analysis = stats::price_range(&properties);
        let summary_message = if properties.is_empty() {
            format!(
                "🏠 **{} 지역의 실거래 내역이 없습니다.**",
                region_info.name
            )
        } else {
            format!(
                "🏠 **실거래가** (총 {}건, {} 기준)",
                properties.len(),
                deal_period
            )
        };

        Ok(RealEstateEnvelope {
            success: true,
            properties,
            price_analysis,
            deal_period: deal_period.to_string(),
            region_info,
            summary_message,
            diagnostics,
        })
    }

    async fn policies_inner(
        &self,
        region_code: &str,
        keywords: Option<&str>,
    ) -> anyhow::Result<PoliciesEnvelope> {
        let mut policy_filters = BTreeMap::new();
        if let Some(kw) = keywords.filter(|kw| !kw.is_empty()) {
            policy_filters.insert("plcyKywdNm".to_string(), kw.to_string());
        }
        let mut results = self
            .orchestrator
            .aggregate_filtered(
                &[Domain::Policy],
                region_code,
                &DomainLimits::focused(),
                &DomainFilters {
                    policy: policy_filters,
                    ..DomainFilters::default()
                },
            )
            .await;
        let result = results
            .remove(&Domain::Policy)
            .context("policy aggregation produced no result")?;
        let diagnostics = DomainDiagnostics::from(&result);
        let policies = result.records;
        let region_info = self.region_info(region_code);

        let formatted: Vec<Record> = policies
            .iter()
            .take(POLICY_LIST_LIMIT)
            .enumerate()
            .map(|(i, policy)| format::format_policy(policy, i + 1))
            .collect();
        let categories = stats::policy_categories(&policies);
        let summary_message = if policies.is_empty() {
            format!(
                "🏛️ **{} 지역의 청년정책을 찾을 수 없습니다.**",
                region_info.name
            )
        } else {
            format!("🏛️ **청년정책** (총 {}건, 지역 관련성 순)", policies.len())
        };

        Ok(PoliciesEnvelope {
            success: true,
            policies: formatted,
            categories,
            total_count: policies.len(),
            keywords_used: keywords.map(str::to_string),
            region_info,
            summary_message,
            diagnostics,
        })
    }
}

fn effective_region(explicit: &str, intent: &Intent) -> String {
    if !explicit.is_empty() {
        return explicit.to_string();
    }
    intent
        .region_hint
        .clone()
        .filter(|hint| !hint.is_empty())
        .unwrap_or_else(|| DEFAULT_REGION_CODE.to_string())
}

fn take_records(
    results: &mut BTreeMap<Domain, NormalizedResult>,
    domain: Domain,
) -> Vec<Record> {
    results
        .remove(&domain)
        .map(|result| result.records)
        .unwrap_or_default()
}

fn preview(records: &[Record]) -> Vec<Record> {
    records.iter().take(COMPREHENSIVE_PREVIEW_LIMIT).cloned().collect()
}
