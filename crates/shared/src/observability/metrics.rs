//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics::Label;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// 耗时直方图分桶（秒），规则评估通常在亚毫秒级
const DURATION_BUCKETS: &[f64] = &[
    0.000_1, 0.000_5, 0.001, 0.002_5, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Metrics 资源守卫
pub struct MetricsHandle {
    server_handle: tokio::task::JoinHandle<()>,
}

impl MetricsHandle {
    /// 停止指标 HTTP 服务器
    pub fn shutdown(self) {
        self.server_handle.abort();
    }
}

/// 初始化 Prometheus 指标导出
///
/// 安装全局 recorder，并在 `metrics_port` 上启动 `/metrics` 端点。
pub async fn init(service_name: &str, config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            DURATION_BUCKETS,
        )?
        .install_recorder()?;

    let _ = PROMETHEUS_HANDLE.set(handle);

    describe_metrics();
    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let app = Router::new()
        .route("/metrics", get(render_metrics))
        .route("/health", get(|| async { "OK" }));

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(MetricsHandle { server_handle })
}

/// 指标描述会出现在 /metrics 端点的 HELP 注释中
fn describe_metrics() {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        metrics::Unit::Seconds,
        "HTTP request duration in seconds"
    );
    metrics::describe_counter!("rule_evaluations_total", "Total number of rule evaluations");
    metrics::describe_histogram!(
        "rule_evaluation_duration_seconds",
        metrics::Unit::Seconds,
        "Rule evaluation duration in seconds"
    );
    metrics::describe_counter!(
        "rule_compilations_total",
        "Total number of rule compilations by outcome"
    );
}

async fn render_metrics() -> String {
    get_handle()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// 获取全局 Prometheus handle（用于自定义渲染）
pub fn get_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// 记录 HTTP 请求（`path` 应为路由模板而非原始 URI）
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = vec![
        Label::new("method", method.to_string()),
        Label::new("path", path.to_string()),
        Label::new("status", status.to_string()),
    ];

    metrics::counter!("http_requests_total", labels.clone()).increment(1);
    metrics::histogram!("http_request_duration_seconds", labels).record(duration_secs);
}

/// 记录规则评估
#[inline]
pub fn record_rule_evaluation(matched: bool, duration_secs: f64) {
    let result = if matched { "matched" } else { "not_matched" };
    metrics::counter!("rule_evaluations_total", "result" => result).increment(1);
    metrics::histogram!("rule_evaluation_duration_seconds").record(duration_secs);
}

/// 记录规则编译（status: success / syntax_error / empty / error）
#[inline]
pub fn record_rule_compilation(status: &str) {
    metrics::counter!("rule_compilations_total", "status" => status.to_string()).increment(1);
}
