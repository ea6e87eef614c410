//! Statistical summarization over ranked record sets. Everything here is a
//! synchronous pure function of its input; records are read, never touched.

use crate::domain::model::Record;
use serde::Serialize;
use std::collections::HashMap;

/// Bucket for records whose source field is empty or missing.
pub const OTHER_BUCKET: &str = "기타";

pub const NO_DATA: &str = "데이터 없음";
pub const NOT_COMPUTABLE: &str = "계산 불가";
pub const TREND_STABLE: &str = "안정세";
pub const TREND_NO_DATA: &str = "데이터 부족";
pub const RANGE_UNKNOWN: &str = "확인 불가";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub category: String,
    pub count: u64,
}

/// Ordered categorical histogram. The sort order is fixed at construction
/// and carried through serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Histogram {
    buckets: Vec<Bucket>,
}

impl Histogram {
    /// Count-descending, category-ascending on ties, so equal inputs always
    /// serialize identically.
    fn by_frequency(counts: HashMap<String, u64>) -> Self {
        let mut buckets: Vec<Bucket> = counts
            .into_iter()
            .map(|(category, count)| Bucket { category, count })
            .collect();
        buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
        Self { buckets }
    }

    /// Category-ascending; used where the key itself is chronological.
    fn by_key(counts: HashMap<String, u64>) -> Self {
        let mut buckets: Vec<Bucket> = counts
            .into_iter()
            .map(|(category, count)| Bucket { category, count })
            .collect();
        buckets.sort_by(|a, b| a.category.cmp(&b.category));
        Self { buckets }
    }

    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn count_for(&self, category: &str) -> u64 {
        self.buckets
            .iter()
            .find(|b| b.category == category)
            .map(|b| b.count)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct JobStatistics {
    pub total: usize,
    pub by_category: Histogram,
    pub by_type: Histogram,
    pub by_education: Histogram,
    pub by_region: Histogram,
    pub by_deadline: Histogram,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceAnalysis {
    pub trend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
    pub price_range: String,
    pub sample_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateSummary {
    pub region_name: String,
    pub total_jobs: usize,
    pub total_properties: usize,
    pub total_policies: usize,
    pub avg_property_price: String,
    pub top_job_categories: Vec<String>,
    pub urgent_policies: usize,
}

/// First comma segment of a multi-value provider field.
fn primary_segment(value: &str) -> &str {
    value.split(',').next().unwrap_or(value)
}

fn bucket_or_other(value: &str) -> String {
    if value.is_empty() {
        OTHER_BUCKET.to_string()
    } else {
        value.to_string()
    }
}

/// The five job histograms. Empty source fields land in the "기타" bucket,
/// except the deadline dimension where a non-8-digit or non-numeric value
/// excludes the record from that histogram entirely.
pub fn job_statistics(jobs: &[Record]) -> JobStatistics {
    let mut categories: HashMap<String, u64> = HashMap::new();
    let mut types: HashMap<String, u64> = HashMap::new();
    let mut education: HashMap<String, u64> = HashMap::new();
    let mut regions: HashMap<String, u64> = HashMap::new();
    let mut deadlines: HashMap<String, u64> = HashMap::new();

    for job in jobs {
        let category = bucket_or_other(primary_segment(job.text("ncsCdNmLst")));
        *categories.entry(category).or_insert(0) += 1;

        let hire_type = bucket_or_other(job.text("hireTypeNmLst"));
        *types.entry(hire_type).or_insert(0) += 1;

        let acbg = bucket_or_other(job.text("acbgCondLst"));
        *education.entry(acbg).or_insert(0) += 1;

        let region = bucket_or_other(primary_segment(job.text("workRgnNmLst")));
        *regions.entry(region).or_insert(0) += 1;

        let deadline = job.text("pbancEndYmd");
        if deadline.len() == 8 && deadline.chars().all(|c| c.is_ascii_digit()) {
            let month = format!("{}-{}", &deadline[..4], &deadline[4..6]);
            *deadlines.entry(month).or_insert(0) += 1;
        }
    }

    JobStatistics {
        total: jobs.len(),
        by_category: Histogram::by_frequency(categories),
        by_type: Histogram::by_frequency(types),
        by_education: Histogram::by_frequency(education),
        by_region: Histogram::by_frequency(regions),
        by_deadline: Histogram::by_key(deadlines),
    }
}

/// Deal amount in 10,000-won units. Unparsable values are dropped, never
/// zero-filled.
fn parse_deal_amount(raw: &str) -> Option<u64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

fn price_samples(properties: &[Record]) -> Vec<u64> {
    properties
        .iter()
        .filter_map(|p| parse_deal_amount(p.text("dealAmount")))
        .collect()
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Average sale price rendered in 억/만원 units. Distinguishes an empty
/// input ("데이터 없음") from a non-empty input where nothing parsed
/// ("계산 불가").
pub fn average_price(properties: &[Record]) -> String {
    if properties.is_empty() {
        return NO_DATA.to_string();
    }
    let prices = price_samples(properties);
    if prices.is_empty() {
        return NOT_COMPUTABLE.to_string();
    }
    let avg = prices.iter().sum::<u64>() / prices.len() as u64;
    if avg >= 10_000 {
        format!("{}억 {}만원", avg / 10_000, group_thousands(avg % 10_000))
    } else {
        format!("{}만원", group_thousands(avg))
    }
}

/// Price spread over the valid samples. The trend label is a constant the
/// upstream service has always reported, not a computed direction. Keep it
/// as-is.
pub fn price_range(properties: &[Record]) -> PriceAnalysis {
    let prices = price_samples(properties);
    match (prices.iter().min(), prices.iter().max()) {
        (Some(&min), Some(&max)) => PriceAnalysis {
            trend: TREND_STABLE.to_string(),
            min: Some(min),
            max: Some(max),
            price_range: format!("{}만원 ~ {}만원", group_thousands(min), group_thousands(max)),
            sample_count: prices.len(),
        },
        _ => PriceAnalysis {
            trend: TREND_NO_DATA.to_string(),
            min: None,
            max: None,
            price_range: RANGE_UNKNOWN.to_string(),
            sample_count: 0,
        },
    }
}

/// Top-n primary NCS categories by descending frequency.
pub fn top_job_categories(jobs: &[Record], n: usize) -> Vec<String> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for job in jobs {
        let category = bucket_or_other(primary_segment(job.text("ncsCdNmLst")));
        *counts.entry(category).or_insert(0) += 1;
    }
    Histogram::by_frequency(counts)
        .buckets
        .into_iter()
        .take(n)
        .map(|b| b.category)
        .collect()
}

/// Substring heuristic over the apply-period text and the policy name; the
/// upstream system never computed urgency from dates. Preserve exactly.
pub fn is_urgent_policy(policy: &Record) -> bool {
    policy.text("aplyYmd").contains("마감") || policy.text("plcyNm").contains("긴급")
}

/// Policy counts by large-classification name.
pub fn policy_categories(policies: &[Record]) -> Histogram {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for policy in policies {
        let category = bucket_or_other(policy.text("lclsfNm"));
        *counts.entry(category).or_insert(0) += 1;
    }
    Histogram::by_frequency(counts)
}

/// Cross-domain roll-up for the comprehensive envelope. Urgency is only
/// probed on the first five policies, mirroring the preview depth.
pub fn summarize(
    region_name: &str,
    jobs: &[Record],
    properties: &[Record],
    policies: &[Record],
) -> AggregateSummary {
    AggregateSummary {
        region_name: region_name.to_string(),
        total_jobs: jobs.len(),
        total_properties: properties.len(),
        total_policies: policies.len(),
        avg_property_price: average_price(properties),
        top_job_categories: top_job_categories(jobs, 3),
        urgent_policies: policies
            .iter()
            .take(5)
            .filter(|p| is_urgent_policy(p))
            .count(),
    }
}
