use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::domain::entity::import::ImportSummary;

const DEFAULT_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Metrics は台帳サーバーの Prometheus メトリクス。
pub struct Metrics {
    pub http_requests_total: IntCounterVec,
    pub http_request_duration: HistogramVec,
    pub import_rows_total: IntCounterVec,
    pub import_runs_total: IntCounterVec,
    registry: Registry,
}

impl Metrics {
    /// service_name は全メトリクスの service ラベルに使用される。
    pub fn new(service_name: &str) -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests")
                .const_label("service", service_name),
            &["method", "path", "status"],
        )
        .expect("failed to create http_requests_total counter");

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Histogram of HTTP request latency",
            )
            .const_label("service", service_name)
            .buckets(DEFAULT_BUCKETS.to_vec()),
            &["method", "path"],
        )
        .expect("failed to create http_request_duration histogram");

        let import_rows_total = IntCounterVec::new(
            Opts::new(
                "resident_import_rows_total",
                "Total number of CSV rows processed by resident imports",
            )
            .const_label("service", service_name),
            &["outcome"],
        )
        .expect("failed to create resident_import_rows_total counter");

        let import_runs_total = IntCounterVec::new(
            Opts::new(
                "resident_import_runs_total",
                "Total number of resident CSV import requests",
            )
            .const_label("service", service_name),
            &["result"],
        )
        .expect("failed to create resident_import_runs_total counter");

        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("failed to register http_requests_total");
        registry
            .register(Box::new(http_request_duration.clone()))
            .expect("failed to register http_request_duration");
        registry
            .register(Box::new(import_rows_total.clone()))
            .expect("failed to register resident_import_rows_total");
        registry
            .register(Box::new(import_runs_total.clone()))
            .expect("failed to register resident_import_runs_total");

        Self {
            http_requests_total,
            http_request_duration,
            import_rows_total,
            import_runs_total,
            registry,
        }
    }

    pub fn record_http_request(&self, method: &str, path: &str, status: &str, duration_secs: f64) {
        self.http_requests_total
            .with_label_values(&[method, path, status])
            .inc();
        self.http_request_duration
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    fn add_import_rows(&self, summary: &ImportSummary) {
        let count = |n: usize| u64::try_from(n).unwrap_or(u64::MAX);
        self.import_rows_total
            .with_label_values(&["success"])
            .inc_by(count(summary.success_count));
        self.import_rows_total
            .with_label_values(&["error"])
            .inc_by(count(summary.error_count));
    }

    /// 完了した取り込みの行数を outcome 別に加算する。
    pub fn record_import(&self, summary: &ImportSummary) {
        self.add_import_rows(summary);
        self.import_runs_total.with_label_values(&["completed"]).inc();
    }

    /// 途中で中断した取り込みを記録する。中断前に処理した行も加算する。
    pub fn record_import_failure(&self, partial: &ImportSummary) {
        self.add_import_rows(partial);
        self.import_runs_total.with_label_values(&["failed"]).inc();
    }

    /// gather_metrics は Prometheus テキストフォーマットでメトリクスを返す。
    pub fn gather_metrics(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::error!(error = %e, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
