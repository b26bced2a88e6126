//! Prometheus counters exposed on `/metrics`.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ErrorLabels {
    pub kind: String,
}

pub struct Metrics {
    registry: Registry,
    pub ideas_created: Counter,
    pub votes_cast: Counter,
    pub signups_sent: Counter,
    pub errors: Family<ErrorLabels, Counter>,
}

impl Metrics {
    pub fn new() -> Self {
        let ideas_created = Counter::default();
        let votes_cast = Counter::default();
        let signups_sent = Counter::default();
        let errors = Family::<ErrorLabels, Counter>::default();

        let mut registry = Registry::with_prefix("ideaboard");
        registry.register("ideas_created", "Ideas created", ideas_created.clone());
        registry.register("votes_cast", "Votes recorded", votes_cast.clone());
        registry.register("signups_sent", "Confirmation emails sent", signups_sent.clone());
        registry.register("http_errors", "Error responses by kind", errors.clone());

        Self {
            registry,
            ideas_created,
            votes_cast,
            signups_sent,
            errors,
        }
    }

    pub fn record_error(&self, kind: &str) {
        self.errors
            .get_or_create(&ErrorLabels {
                kind: kind.to_string(),
            })
            .inc();
    }

    /// OpenMetrics text exposition of every registered metric.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();
        encode(&mut buf, &self.registry)?;
        Ok(buf)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
