//! Prometheus metrics for the upload workflow

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Service-owned metric registry
pub struct Metrics {
    registry: Registry,
    uploads: IntCounter,
    upload_failures: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let uploads = IntCounter::new("videos_uploaded_total", "Total number of videos uploaded")?;
        let upload_failures = IntCounterVec::new(
            Opts::new(
                "video_upload_failures_total",
                "Total number of rejected or failed video uploads",
            ),
            &["reason"],
        )?;

        registry.register(Box::new(uploads.clone()))?;
        registry.register(Box::new(upload_failures.clone()))?;

        Ok(Self {
            registry,
            uploads,
            upload_failures,
        })
    }

    pub fn record_upload(&self) {
        self.uploads.inc();
    }

    pub fn record_upload_failure(&self, reason: &str) {
        self.upload_failures.with_label_values(&[reason]).inc();
    }

    /// Text exposition of every registered metric
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}
