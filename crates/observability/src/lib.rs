use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    quotes_total: AtomicU64,
    quotes_rejected_total: AtomicU64,
    bookings_total: AtomicU64,
    bookings_rejected_total: AtomicU64,
    chat_messages_total: AtomicU64,
    fallback_replies_total: AtomicU64,
    cancelled_replies_total: AtomicU64,
    total_latency_millis: AtomicU64,
    latency_samples: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub quotes_total: u64,
    pub quotes_rejected_total: u64,
    pub bookings_total: u64,
    pub bookings_rejected_total: u64,
    pub chat_messages_total: u64,
    pub fallback_replies_total: u64,
    pub cancelled_replies_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_quote(&self) {
        self.quotes_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_quote_rejected(&self) {
        self.quotes_rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_booking(&self) {
        self.bookings_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_booking_rejected(&self) {
        self.bookings_rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_chat_message(&self) {
        self.chat_messages_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fallback(&self) {
        self.fallback_replies_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_cancelled_replies(&self, count: usize) {
        self.cancelled_replies_total
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Adds one handled request's latency. The snapshot averages over the
    /// observed samples, not over `requests_total`.
    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
        self.latency_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);
        let samples = self.latency_samples.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            quotes_total: self.quotes_total.load(Ordering::Relaxed),
            quotes_rejected_total: self.quotes_rejected_total.load(Ordering::Relaxed),
            bookings_total: self.bookings_total.load(Ordering::Relaxed),
            bookings_rejected_total: self.bookings_rejected_total.load(Ordering::Relaxed),
            chat_messages_total: self.chat_messages_total.load(Ordering::Relaxed),
            fallback_replies_total: self.fallback_replies_total.load(Ordering::Relaxed),
            cancelled_replies_total: self.cancelled_replies_total.load(Ordering::Relaxed),
            avg_latency_millis: if samples == 0 {
                0.0
            } else {
                latency as f64 / samples as f64
            },
        }
    }
}

/// Directives used when `RUST_LOG` is unset: the binary plus every library
/// crate of the workspace at `info`.
pub fn default_filter_directives(service_name: &str) -> String {
    [service_name, "safari_api", "safari_concierge", "safari_core"]
        .iter()
        .map(|target| format!("{target}=info"))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter_directives(service_name)));

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
