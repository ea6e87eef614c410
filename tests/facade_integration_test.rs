use httpmock::prelude::*;
use ieum_hub::domain::model::FieldMap;
use ieum_hub::domain::ports::{IntentAnalyzer, RegionDirectory, RegionRanker, XmlRecordParser};
use ieum_hub::{ApiEnvelope, Collaborators, EndpointConfig, HubConfig, Intent, Record, RegionHub};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

struct StaticRegions;

impl RegionDirectory for StaticRegions {
    fn region_name(&self, code: &str) -> String {
        match code {
            "44790" => "태안군".to_string(),
            other => format!("지역 {}", other),
        }
    }
}

struct PassthroughRanker;

impl RegionRanker for PassthroughRanker {
    fn rank_by_region(&self, records: Vec<Record>, _region_code: &str) -> Vec<Record> {
        records
    }

    fn filter_active_policies(&self, records: Vec<Record>) -> Vec<Record> {
        records
    }
}

/// Stand-in for the external XML collaborator: each non-empty body line
/// becomes one trade record carrying that line as its deal amount.
struct AmountLineParser;

impl XmlRecordParser for AmountLineParser {
    fn parse_records(&self, text: &str) -> Vec<Record> {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let mut fields = FieldMap::new();
                fields.insert(
                    "dealAmount".to_string(),
                    Value::String(line.trim().to_string()),
                );
                Record::new(fields)
            })
            .collect()
    }
}

struct FixedIntent;

impl IntentAnalyzer for FixedIntent {
    fn analyze(&self, _query: &str) -> anyhow::Result<Intent> {
        Ok(Intent::default())
    }
}

fn hub(server: &MockServer) -> RegionHub {
    let config = HubConfig::new(
        EndpointConfig::new(server.url("/job"), "job-key"),
        EndpointConfig::new(server.url("/trades"), "re-key"),
        EndpointConfig::new(server.url("/policy"), "policy-key"),
    )
    .with_timeout_secs(5);
    RegionHub::new(
        config,
        Collaborators {
            regions: Arc::new(StaticRegions),
            ranker: Arc::new(PassthroughRanker),
            xml_parser: Arc::new(AmountLineParser),
            intents: Arc::new(FixedIntent),
        },
    )
    .unwrap()
}

fn unwrap_ok<T>(envelope: ApiEnvelope<T>) -> T {
    match envelope {
        ApiEnvelope::Ok(body) => body,
        ApiEnvelope::Failed(failure) => panic!("unexpected failure: {}", failure.error),
    }
}

fn job_body(count: usize) -> Value {
    let jobs: Vec<Value> = (1..=count)
        .map(|i| {
            json!({
                "recrutPbancTtl": format!("채용공고 {}", i),
                "instNm": "한국수자원공사",
                "hireTypeNmLst": if i % 2 == 0 { "정규직" } else { "계약직" },
                "workRgnNmLst": "충남,세종",
                "pbancEndYmd": "20250630",
                "ncsCdNmLst": "정보통신,연구",
                "acbgCondLst": "학력무관"
            })
        })
        .collect();
    json!({"resultCode": 200, "totalCount": count, "result": jobs})
}

fn policy_body(count: usize) -> Value {
    let policies: Vec<Value> = (1..=count)
        .map(|i| {
            json!({
                "plcyNm": format!("청년정책 {}", i),
                "plcyNo": format!("R2025{:03}", i),
                "lclsfNm": if i % 2 == 0 { "주거" } else { "일자리" },
                "mclsfNm": "지원",
                "zipCd": "44790",
                "aplyYmd": "20250101 ~ 20251231"
            })
        })
        .collect();
    json!({
        "resultCode": 200,
        "result": {
            "youthPolicyList": policies,
            "pagging": {"totCount": count, "pageNum": 1, "pageSize": 30}
        }
    })
}

#[tokio::test]
async fn test_jobs_endpoint_formats_and_truncates() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/job")
            .query_param("numOfRows", "100")
            .query_param("ncsCdLst", "R600020");
        then.status(200).json_body(job_body(20));
    });

    let hub = hub(&server);
    let mut filters = BTreeMap::new();
    filters.insert("ncsCdLst".to_string(), "R600020".to_string());
    let body = unwrap_ok(hub.search_jobs("44790", filters).await);

    mock.assert();
    assert!(body.success);
    assert_eq!(body.total_count, 20);
    assert_eq!(body.jobs.len(), 15);
    assert_eq!(body.statistics.total, 20);
    assert_eq!(body.statistics.by_category.count_for("정보통신"), 20);
    assert_eq!(body.jobs[0].text("display_title"), "1. 한국수자원공사 (계약직)");
    assert_eq!(body.jobs[0].text("formatted_deadline"), "2025.06.30");
    assert_eq!(body.region_info.name, "태안군");
    assert!(body.summary_message.contains("총 20건"));
    assert_eq!(body.filters_applied["ncsCdLst"], "R600020");
    assert_eq!(body.diagnostics.ssl_mode, "default");
}

#[tokio::test]
async fn test_jobs_endpoint_zero_results_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/job");
        then.status(200).json_body(job_body(0));
    });

    let hub = hub(&server);
    let body = unwrap_ok(hub.search_jobs("44790", BTreeMap::new()).await);

    assert!(body.success);
    assert_eq!(body.total_count, 0);
    assert!(body.summary_message.contains("찾을 수 없습니다"));
}

#[tokio::test]
async fn test_realestate_endpoint_analyzes_prices() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/trades")
            .query_param("LAWD_CD", "44790")
            .query_param("DEAL_YMD", "202507");
        then.status(200).body("15,000\n25,000\n확인불가");
    });

    let hub = hub(&server);
    let body = unwrap_ok(hub.search_realestate("44790", "202507").await);

    mock.assert();
    assert!(body.success);
    assert_eq!(body.properties.len(), 3);
    assert_eq!(body.deal_period, "202507");
    assert_eq!(body.price_analysis.trend, "안정세");
    assert_eq!(body.price_analysis.min, Some(15_000));
    assert_eq!(body.price_analysis.max, Some(25_000));
    assert_eq!(body.price_analysis.sample_count, 2);
    assert!(body.summary_message.contains("총 3건"));
}

#[tokio::test]
async fn test_policies_endpoint_formats_top_five() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/policy")
            .query_param("zipCd", "44790")
            .query_param("plcyKywdNm", "주거");
        then.status(200).json_body(policy_body(7));
    });

    let hub = hub(&server);
    let body = unwrap_ok(hub.search_policies("44790", Some("주거")).await);

    mock.assert();
    assert!(body.success);
    assert_eq!(body.total_count, 7);
    assert_eq!(body.policies.len(), 5);
    assert_eq!(body.policies[0].text("display_title"), "1. 청년정책 1");
    assert!(body.policies[0]
        .text("detail_url")
        .ends_with("/ythPlcyDetail/R2025001"));
    assert_eq!(body.categories.total(), 7);
    assert_eq!(body.keywords_used.as_deref(), Some("주거"));
    assert!(body.summary_message.contains("총 7건"));
}

#[tokio::test]
async fn test_comprehensive_previews_all_three_domains() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/job").query_param("numOfRows", "20");
        then.status(200).json_body(job_body(5));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/trades")
            .query_param("DEAL_YMD", "202506")
            .query_param("numOfRows", "15");
        then.status(200).body("15,000\n25,000");
    });
    server.mock(|when, then| {
        when.method(GET).path("/policy").query_param("pageSize", "20");
        then.status(200).json_body(policy_body(4));
    });

    let hub = hub(&server);
    let body = unwrap_ok(hub.search_comprehensive("태안군 살기 어때?", "44790").await);

    assert!(body.success);
    assert_eq!(body.preview_data.jobs.len(), 3);
    assert_eq!(body.preview_data.realestate.len(), 2);
    assert_eq!(body.preview_data.policies.len(), 3);
    assert_eq!(body.summary.total_jobs, 5);
    assert_eq!(body.summary.total_properties, 2);
    assert_eq!(body.summary.total_policies, 4);
    assert_eq!(body.summary.avg_property_price, "2억 0만원");
    assert_eq!(body.summary.top_job_categories[0], "정보통신");
    assert_eq!(body.region_info.code, "44790");
    assert_eq!(body.search_metadata.intent_type, "comprehensive");
    assert_eq!(body.search_metadata.query, "태안군 살기 어때?");
    assert_eq!(body.diagnostics.len(), 3);
    assert!(body.summary_message.contains("일자리 5건"));
}

#[tokio::test]
async fn test_envelope_serializes_with_success_flag() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/job");
        then.status(200).json_body(job_body(1));
    });

    let hub = hub(&server);
    let envelope = hub.search_jobs("44790", BTreeMap::new()).await;
    let value = serde_json::to_value(&envelope).unwrap();

    assert_eq!(value["success"], Value::Bool(true));
    assert!(value["jobs"].is_array());
    assert!(value["statistics"]["by_deadline"].is_array());
    assert_eq!(value["region_info"]["name"], "태안군");
}
