//! 可观测性模块集成测试
//!
//! 测试 metrics、middleware 和配置之间的协作。

mod metrics_tests {
    use rule_shared::observability::metrics::{
        record_http_request, record_rule_compilation, record_rule_evaluation,
    };

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/", 200, 0.001);
        record_http_request("POST", "/evaluate_rule", 200, 0.05);
        record_http_request("POST", "/rules", 201, 0.02);
        record_http_request("GET", "/rules/{id}", 404, 0.01);
        record_http_request("POST", "/create_rule", 400, 0.01);
    }

    #[test]
    fn test_record_rule_metrics_with_edge_cases() {
        record_rule_evaluation(true, 0.0);
        record_rule_evaluation(false, f64::MAX);
        record_rule_compilation("");
        record_rule_compilation("syntax_error");
    }
}

mod middleware_tests {
    use axum::{
        Router,
        body::Body,
        extract::Extension,
        http::{Request, StatusCode},
        middleware,
        routing::get,
    };
    use rule_shared::observability::middleware::{REQUEST_ID_HEADER, RequestId, http_tracing, request_id};
    use tower::ServiceExt;

    #[test]
    fn test_request_id_accessors() {
        let id = RequestId("req-1".to_string());
        assert_eq!(id.clone().as_str(), "req-1");
        assert!(format!("{:?}", id).contains("req-1"));
    }

    #[tokio::test]
    async fn test_request_id_visible_to_handlers() {
        let app = Router::new()
            .route(
                "/rules/{id}",
                get(|Extension(id): Extension<RequestId>| async move { id.0 }),
            )
            .layer(middleware::from_fn(http_tracing))
            .layer(middleware::from_fn(request_id));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/rules/abc")
                    .header(REQUEST_ID_HEADER, "trace-me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"trace-me");
    }
}

mod config_tests {
    use rule_shared::config::{AppConfig, CorsConfig};
    use rule_shared::observability::{ObservabilityConfig, ObservabilityGuard};

    #[test]
    fn test_observability_defaults() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.metrics_port, 9090);
        assert_eq!(config.log_level, "info");
        assert!(config.metrics_enabled);
    }

    #[test]
    fn test_restricted_cors() {
        let cors = CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        };
        assert!(!cors.is_permissive());
    }

    #[test]
    fn test_app_config_not_production_by_default() {
        assert!(!AppConfig::default().is_production());
    }

    #[test]
    fn test_empty_guard() {
        let guard = ObservabilityGuard::empty();
        assert!(!guard.metrics_enabled());
    }
}
