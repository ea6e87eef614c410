use crate::core::adapter::GatewayAdapter;
use crate::domain::model::{Domain, ExternalQuery, NormalizedResult};
use crate::domain::ports::RegionRanker;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-domain page sizes for one aggregation pass.
#[derive(Debug, Clone, Copy)]
pub struct DomainLimits {
    pub job: u32,
    pub realestate: u32,
    pub policy: u32,
}

impl DomainLimits {
    /// Comprehensive previews fetch small pages from every domain.
    pub fn comprehensive() -> Self {
        Self {
            job: 20,
            realestate: 15,
            policy: 20,
        }
    }

    /// Single-domain pages fetch deeper so ranking has material to work on.
    pub fn focused() -> Self {
        Self {
            job: 100,
            realestate: 30,
            policy: 30,
        }
    }

    fn for_domain(&self, domain: Domain) -> u32 {
        match domain {
            Domain::Job => self.job,
            Domain::RealEstate => self.realestate,
            Domain::Policy => self.policy,
        }
    }
}

/// Extra filter maps forwarded verbatim to the respective provider.
#[derive(Debug, Clone, Default)]
pub struct DomainFilters {
    pub job: BTreeMap<String, String>,
    pub realestate: BTreeMap<String, String>,
    pub policy: BTreeMap<String, String>,
}

/// Fans one aggregation request out to the requested domain adapters. Each
/// fetch is independent: a faulted or empty domain never blocks the others,
/// so partial success is the default outcome shape.
pub struct AggregationOrchestrator {
    job: Arc<dyn GatewayAdapter>,
    realestate: Arc<dyn GatewayAdapter>,
    policy: Arc<dyn GatewayAdapter>,
    ranker: Arc<dyn RegionRanker>,
}

impl AggregationOrchestrator {
    pub fn new(
        job: Arc<dyn GatewayAdapter>,
        realestate: Arc<dyn GatewayAdapter>,
        policy: Arc<dyn GatewayAdapter>,
        ranker: Arc<dyn RegionRanker>,
    ) -> Self {
        Self {
            job,
            realestate,
            policy,
            ranker,
        }
    }

    pub async fn aggregate(
        &self,
        domains: &[Domain],
        region_code: &str,
        limits: &DomainLimits,
    ) -> BTreeMap<Domain, NormalizedResult> {
        self.aggregate_filtered(domains, region_code, limits, &DomainFilters::default())
            .await
    }

    /// The three fetches run as independent concurrent futures joined
    /// together; none cancels another. Job and Policy records then pass
    /// through the region-relevance ranker (policies are screened for
    /// active status first); real-estate records arrive region-scoped from
    /// the source and keep their provider order.
    pub async fn aggregate_filtered(
        &self,
        domains: &[Domain],
        region_code: &str,
        limits: &DomainLimits,
        filters: &DomainFilters,
    ) -> BTreeMap<Domain, NormalizedResult> {
        let fetch = |adapter: &Arc<dyn GatewayAdapter>, domain: Domain, extra: &BTreeMap<String, String>| {
            let adapter = Arc::clone(adapter);
            let query = ExternalQuery::new(domain, region_code, limits.for_domain(domain))
                .with_filters(extra.clone());
            let wanted = domains.contains(&domain);
            async move {
                if !wanted {
                    return None;
                }
                Some(adapter.fetch(&query).await)
            }
        };

        let (job, realestate, policy) = tokio::join!(
            fetch(&self.job, Domain::Job, &filters.job),
            fetch(&self.realestate, Domain::RealEstate, &filters.realestate),
            fetch(&self.policy, Domain::Policy, &filters.policy),
        );

        let mut results = BTreeMap::new();
        if let Some(mut result) = job {
            result.records = self
                .ranker
                .rank_by_region(std::mem::take(&mut result.records), region_code);
            results.insert(Domain::Job, result);
        }
        if let Some(result) = realestate {
            results.insert(Domain::RealEstate, result);
        }
        if let Some(mut result) = policy {
            let screened = self
                .ranker
                .filter_active_policies(std::mem::take(&mut result.records));
            result.records = self.ranker.rank_by_region(screened, region_code);
            results.insert(Domain::Policy, result);
        }

        tracing::info!(
            requested = domains.len(),
            succeeded = results.values().filter(|r| r.is_ok()).count(),
            region = region_code,
            "aggregation pass finished"
        );
        results
    }
}
