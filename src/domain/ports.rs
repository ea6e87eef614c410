use crate::domain::model::{Intent, Record};

/// Region-code (5-digit administrative code) to display-name resolution.
pub trait RegionDirectory: Send + Sync {
    fn region_name(&self, code: &str) -> String;
}

/// Region-relevance ranking and active-policy screening, consumed as a
/// black box. Job and Policy records go through `rank_by_region` after
/// fetch; real-estate records are already region-scoped at the source.
pub trait RegionRanker: Send + Sync {
    fn rank_by_region(&self, records: Vec<Record>, region_code: &str) -> Vec<Record>;
    fn filter_active_policies(&self, records: Vec<Record>) -> Vec<Record>;
}

/// Best-effort text-to-record conversion for the XML real-estate body.
/// Malformed entries are silently dropped; record order follows the body.
pub trait XmlRecordParser: Send + Sync {
    fn parse_records(&self, text: &str) -> Vec<Record>;
}

/// Natural-language intent analysis for the comprehensive operation.
pub trait IntentAnalyzer: Send + Sync {
    fn analyze(&self, query: &str) -> anyhow::Result<Intent>;
}
