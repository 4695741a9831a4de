use serde::{Deserialize, Serialize};

/// Request for disproportionality analysis: every product crossed with every
/// adverse event. Identifiers are normalized (trimmed, lowercased) before use
/// so equivalent queries share one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalQuery {
    pub products: Vec<String>,
    pub adverse_events: Vec<String>,
}

impl SignalQuery {
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut products: Vec<String> = self
            .products
            .iter()
            .map(|p| p.trim().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        products.sort();
        products.dedup();
        let mut adverse_events: Vec<String> = self
            .adverse_events
            .iter()
            .map(|e| e.trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        adverse_events.sort();
        adverse_events.dedup();
        Self {
            products,
            adverse_events,
        }
    }
}

/// One (product, event) cell of the disproportionality table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalHit {
    pub product: String,
    pub adverse_event: String,
    /// Reports mentioning both the product and the event.
    pub report_count: u64,
    /// Proportional reporting ratio; `None` when the background cell is empty
    /// and the ratio is undefined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prr: Option<f64>,
    /// Evans 2001 screening criterion: PRR >= 2 and at least 3 reports.
    pub flagged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub hits: Vec<SignalHit>,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
    pub from_cache: bool,
}
