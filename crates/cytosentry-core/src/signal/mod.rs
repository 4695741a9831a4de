use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use reqwest::blocking::Client;

use crate::config::SignalConfig;
use crate::error::{EngineError, Result};
use crate::models::{SignalHit, SignalQuery, SignalSummary};

mod ledger;

pub use ledger::{LedgerDecision, MemoryLedger, RateLedger, SqliteLedger, WINDOW_SECS};

/// Evans 2001 screening thresholds for a disproportionality signal.
pub const PRR_SIGNAL_THRESHOLD: f64 = 2.0;
pub const MIN_REPORTS_FOR_SIGNAL: u64 = 3;

/// 2x2 contingency counts for one (product, adverse event) pair, as returned
/// by the reporting database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportCounts {
    /// Reports mentioning both the product and the event (cell a).
    pub product_event: u64,
    /// All reports mentioning the product (a + b).
    pub product_total: u64,
    /// All reports mentioning the event (a + c).
    pub event_total: u64,
    /// All reports in the database (a + b + c + d).
    pub all_total: u64,
}

/// Blocking access to the adverse-event reporting source. The ledger is a
/// parameter rather than captured state so a second source instance cannot
/// smuggle in a fresh, empty budget.
pub trait SignalSource: Send + Sync {
    /// Contract: implementations must call [`RateLedger::acquire_or_fail`]
    /// before every outbound request they issue — once per HTTP call, not
    /// once per pair. Sources that perform no outbound I/O (fixtures) leave
    /// the budget untouched.
    fn fetch_counts(
        &self,
        product: &str,
        adverse_event: &str,
        ledger: &dyn RateLedger,
    ) -> Result<ReportCounts>;
}

/// openFDA FAERS source. Each count is one `meta.results.total` lookup;
/// a pair costs four ledger slots (pair, product, event, background).
pub struct OpenFdaSource {
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for OpenFdaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenFdaSource")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenFdaSource {
    pub fn new(config: &SignalConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(StdDuration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn total_for(&self, search: Option<&str>, ledger: &dyn RateLedger) -> Result<u64> {
        ledger.acquire_or_fail()?;

        let mut request = self.http.get(&self.base_url).query(&[("limit", "1")]);
        if let Some(search) = search {
            request = request.query(&[("search", search)]);
        }

        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                EngineError::ExternalUnavailable(format!("signal source timed out: {e}"))
            } else {
                EngineError::Http(e)
            }
        })?;
        if !response.status().is_success() {
            return Err(EngineError::ExternalUnavailable(format!(
                "signal source returned status {}",
                response.status()
            )));
        }

        let value = response.json::<serde_json::Value>()?;
        value
            .pointer("/meta/results/total")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| {
                EngineError::ExternalUnavailable(
                    "signal source response missing meta.results.total".to_string(),
                )
            })
    }
}

impl SignalSource for OpenFdaSource {
    fn fetch_counts(
        &self,
        product: &str,
        adverse_event: &str,
        ledger: &dyn RateLedger,
    ) -> Result<ReportCounts> {
        let product_clause = format!("patient.drug.medicinalproduct:\"{product}\"");
        let event_clause = format!("patient.reaction.reactionmeddrapt:\"{adverse_event}\"");
        let pair_clause = format!("{product_clause}+AND+{event_clause}");

        Ok(ReportCounts {
            product_event: self.total_for(Some(&pair_clause), ledger)?,
            product_total: self.total_for(Some(&product_clause), ledger)?,
            event_total: self.total_for(Some(&event_clause), ledger)?,
            all_total: self.total_for(None, ledger)?,
        })
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
struct FixtureEntry {
    product: String,
    adverse_event: String,
    product_event: u64,
    product_total: u64,
    event_total: u64,
    all_total: u64,
}

/// Offline source backed by a JSON fixtures file: an array of per-pair
/// count records. Pairs absent from the file read as all-zero counts, which
/// surface as an undefined PRR. No outbound requests are made, so the rate
/// budget is never drawn on.
#[derive(Debug, Default)]
pub struct FixtureSource {
    counts: HashMap<(String, String), ReportCounts>,
}

impl FixtureSource {
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<FixtureEntry> = serde_json::from_str(&raw)?;
        let mut counts = HashMap::new();
        for entry in entries {
            counts.insert(
                (
                    entry.product.trim().to_ascii_lowercase(),
                    entry.adverse_event.trim().to_ascii_lowercase(),
                ),
                ReportCounts {
                    product_event: entry.product_event,
                    product_total: entry.product_total,
                    event_total: entry.event_total,
                    all_total: entry.all_total,
                },
            );
        }
        Ok(Self { counts })
    }
}

impl SignalSource for FixtureSource {
    fn fetch_counts(
        &self,
        product: &str,
        adverse_event: &str,
        _ledger: &dyn RateLedger,
    ) -> Result<ReportCounts> {
        let key = (product.to_string(), adverse_event.to_string());
        Ok(self.counts.get(&key).copied().unwrap_or_default())
    }
}

/// Proportional reporting ratio from the 2x2 table:
/// `(a / (a+b)) / (c / (c+d))`. `None` when a denominator is empty and the
/// ratio is undefined; undefined is reported as such, never coerced to zero.
#[must_use]
pub fn proportional_reporting_ratio(counts: &ReportCounts) -> Option<f64> {
    let a = counts.product_event;
    let ab = counts.product_total;
    if a > ab || ab > counts.all_total || counts.event_total > counts.all_total {
        return None;
    }
    let c = counts.event_total.checked_sub(a)?;
    let cd = counts.all_total.checked_sub(ab)?;
    if ab == 0 || cd == 0 || c == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss, reason = "report counts fit f64 exactly enough")]
    let ratio = (a as f64 / ab as f64) / (c as f64 / cd as f64);
    Some(ratio)
}

struct CacheEntry {
    fetched_at: DateTime<Utc>,
    summary: SignalSummary,
}

/// Rate-limited, TTL-cached disproportionality client. Patient-level scoring
/// never depends on this path; an unavailable source degrades only the
/// signal view.
pub struct SignalClient {
    source: Box<dyn SignalSource>,
    ledger: Box<dyn RateLedger>,
    cache_ttl: Duration,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl std::fmt::Debug for SignalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalClient")
            .field("cache_ttl", &self.cache_ttl)
            .finish_non_exhaustive()
    }
}

impl SignalClient {
    pub fn new(
        source: Box<dyn SignalSource>,
        ledger: Box<dyn RateLedger>,
        cache_ttl_secs: i64,
    ) -> Self {
        Self {
            source,
            ledger,
            cache_ttl: Duration::seconds(cache_ttl_secs.max(1)),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Builds the production client from configuration: openFDA source plus
    /// an in-process ledger. Multi-process deployments construct the client
    /// directly with a [`SqliteLedger`] on a shared path.
    pub fn from_config(config: &SignalConfig) -> Result<Self> {
        Ok(Self::new(
            Box::new(OpenFdaSource::new(config)?),
            Box::new(MemoryLedger::new(config.rate_budget_per_minute)?),
            config.cache_ttl_secs,
        ))
    }

    pub fn query(&self, query: &SignalQuery) -> Result<SignalSummary> {
        let normalized = query.normalized();
        if normalized.products.is_empty() || normalized.adverse_events.is_empty() {
            return Err(EngineError::InvalidInput(
                "signal query needs at least one product and one adverse event".to_string(),
            ));
        }
        let key = cache_key(&normalized);

        {
            let cache = self
                .cache
                .lock()
                .map_err(|_| EngineError::mutex_poisoned("signal cache"))?;
            if let Some(entry) = cache.get(&key)
                && Utc::now() - entry.fetched_at < self.cache_ttl
            {
                let mut summary = entry.summary.clone();
                summary.from_cache = true;
                return Ok(summary);
            }
        }

        let mut hits = Vec::new();
        for product in &normalized.products {
            for adverse_event in &normalized.adverse_events {
                let counts =
                    self.source
                        .fetch_counts(product, adverse_event, self.ledger.as_ref())?;
                let prr = proportional_reporting_ratio(&counts);
                let flagged = prr.is_some_and(|value| value >= PRR_SIGNAL_THRESHOLD)
                    && counts.product_event >= MIN_REPORTS_FOR_SIGNAL;
                hits.push(SignalHit {
                    product: product.clone(),
                    adverse_event: adverse_event.clone(),
                    report_count: counts.product_event,
                    prr,
                    flagged,
                });
            }
        }

        let summary = SignalSummary {
            hits,
            fetched_at: Utc::now(),
            from_cache: false,
        };

        // Only successful summaries enter the cache; a failure above has
        // already returned and can never be replayed as a stale answer.
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| EngineError::mutex_poisoned("signal cache"))?;
        cache.insert(
            key,
            CacheEntry {
                fetched_at: summary.fetched_at,
                summary: summary.clone(),
            },
        );
        Ok(summary)
    }
}

fn cache_key(normalized: &SignalQuery) -> String {
    let mut hasher = blake3::Hasher::new();
    for product in &normalized.products {
        hasher.update(product.as_bytes());
        hasher.update(b"\x1f");
    }
    hasher.update(b"\x1e");
    for event in &normalized.adverse_events {
        hasher.update(event.as_bytes());
        hasher.update(b"\x1f");
    }
    hasher.finalize().to_hex().to_string()
}
