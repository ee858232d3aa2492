//! Tests for circuit breaker functionality

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use mockall::predicate::always;

    use super::super::breaker::CircuitBreaker;
    use super::super::registry::CircuitBreakerRegistry;
    use super::super::types::{CircuitBreakerConfig, CircuitBreakerError, CircuitState};
    use crate::config::{BreakerOverride, RegistryConfig};
    use crate::error::RegistryError;
    use crate::export::{
        BreakerExporter, ExportError, IdentifierError, InMemoryExporter, MockBreakerExporter,
    };

    fn two_strikes() -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: 2,
            reset_timeout: Duration::from_secs(30),
            ..Default::default()
        }
    }

    #[test]
    fn test_circuit_starts_closed() {
        let cb = CircuitBreaker::new("test");
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.is_allowed());
    }

    #[test]
    fn test_circuit_opens_after_failures() {
        let config = CircuitBreakerConfig {
            failure_threshold: 3,
            ..Default::default()
        };
        let cb = CircuitBreaker::with_config("test", config);

        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.is_allowed());
    }

    #[test]
    fn test_failures_outside_window_start_a_new_count() {
        let config = CircuitBreakerConfig {
            failure_threshold: 2,
            window_size: Duration::from_millis(20),
            ..Default::default()
        };
        let cb = CircuitBreaker::with_config("test", config);

        cb.record_failure();
        std::thread::sleep(Duration::from_millis(30));
        cb.record_failure();

        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.stats().failure_count, 1);
    }

    #[test]
    fn test_circuit_transitions_to_half_open() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            reset_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let cb = CircuitBreaker::with_config("test", config);

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);

        std::thread::sleep(Duration::from_millis(60));

        assert_eq!(cb.state(), CircuitState::HalfOpen);
    }

    #[test]
    fn test_circuit_closes_after_successes() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            success_threshold: 2,
            reset_timeout: Duration::from_millis(10),
            ..Default::default()
        };
        let cb = CircuitBreaker::with_config("test", config);

        cb.record_failure();
        std::thread::sleep(Duration::from_millis(20));

        cb.record_success();
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_limits_concurrent_requests() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            reset_timeout: Duration::from_millis(10),
            half_open_max_requests: 1,
            ..Default::default()
        };
        let cb = CircuitBreaker::with_config("test", config);

        cb.record_failure();
        std::thread::sleep(Duration::from_millis(20));

        assert!(cb.acquire());
        assert!(!cb.acquire());

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[test]
    fn test_call_success() {
        let cb = CircuitBreaker::new("test");

        let result: Result<i32, CircuitBreakerError<&str>> = cb.call(|| Ok(42));

        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_call_rejected_when_open() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            ..Default::default()
        };
        let cb = CircuitBreaker::with_config("test", config);

        cb.record_failure();

        let result: Result<i32, CircuitBreakerError<&str>> = cb.call(|| Ok(42));

        let err = result.unwrap_err();
        assert!(err.is_open());
        assert!(err.into_inner().is_none());
    }

    #[test]
    fn test_call_failure_is_counted() {
        let cb = CircuitBreaker::with_config("test", two_strikes());

        let result: Result<(), CircuitBreakerError<&str>> = cb.call(|| Err("boom"));

        assert_eq!(result.unwrap_err().into_inner(), Some("boom"));
        assert_eq!(cb.stats().total_failures, 1);
    }

    #[tokio::test]
    async fn test_call_async() {
        let cb = CircuitBreaker::with_config("test", two_strikes());

        let ok: Result<u8, CircuitBreakerError<&str>> = cb.call_async(|| async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        for _ in 0..2 {
            let _: Result<u8, CircuitBreakerError<&str>> =
                cb.call_async(|| async { Err("down") }).await;
        }

        let rejected: Result<u8, CircuitBreakerError<&str>> =
            cb.call_async(|| async { Ok(7) }).await;
        assert!(matches!(rejected, Err(CircuitBreakerError::Open { .. })));
    }

    #[test]
    fn test_trip_and_reset() {
        let cb = CircuitBreaker::new("test");

        cb.trip();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(cb.stats().opened_at.is_some());

        cb.reset();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.stats().opened_at.is_none());
    }

    #[test]
    fn test_configure_replaces_tuning() {
        let cb = CircuitBreaker::new("test");
        cb.configure(CircuitBreakerConfig::aggressive());

        assert_eq!(cb.config(), CircuitBreakerConfig::aggressive());
        for _ in 0..3 {
            cb.record_failure();
        }
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[test]
    fn test_stats() {
        let cb = CircuitBreaker::new("test");

        cb.record_success();
        cb.record_success();
        cb.record_failure();

        let stats = cb.stats();
        assert_eq!(stats.total_calls, 3);
        assert_eq!(stats.total_failures, 1);
        assert!((stats.failure_rate() - 33.33).abs() < 0.1);
    }

    #[test]
    fn test_registry_returns_same_instance() {
        let registry = CircuitBreakerRegistry::new();

        let cb1 = registry.get("component_a").unwrap();
        let cb2 = registry.get("component_b").unwrap();
        let cb1_again = registry.get("component_a").unwrap();

        assert!(Arc::ptr_eq(&cb1, &cb1_again));
        assert!(!Arc::ptr_eq(&cb1, &cb2));

        let names = registry.names();
        assert!(names.contains(&"component_a".to_string()));
        assert!(names.contains(&"component_b".to_string()));
        assert_eq!(registry.stats().created, 2);
    }

    #[test]
    fn test_first_config_wins() {
        let registry = CircuitBreakerRegistry::new();

        let first = registry
            .get_or_create("svc", CircuitBreakerConfig::aggressive())
            .unwrap();
        let second = registry
            .get_or_create("svc", CircuitBreakerConfig::lenient())
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.config(), CircuitBreakerConfig::aggressive());
    }

    #[test]
    fn test_no_exporter_no_error() {
        let registry = CircuitBreakerRegistry::new();
        assert!(!registry.has_exporter());

        let cb = registry
            .get_or_create("svc-a", CircuitBreakerConfig::default())
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), vec!["svc-a".to_string()]);
        assert!(Arc::ptr_eq(&cb, &registry.find("svc-a").unwrap()));
    }

    #[test]
    fn test_names_with_reserved_characters_are_fine_without_exporter() {
        let registry = CircuitBreakerRegistry::new();
        assert!(registry.get("db:primary").is_ok());
    }

    #[test]
    fn test_find_unknown_is_absent() {
        let registry = CircuitBreakerRegistry::new();
        assert!(registry.find("unknown").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_empty_name_rejected() {
        let registry = CircuitBreakerRegistry::new();

        let err = registry.get("").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_identifier_is_not_inserted() {
        let registry = CircuitBreakerRegistry::new();
        let mut exporter = MockBreakerExporter::new();
        exporter.expect_publish().never();
        registry.set_exporter(Arc::new(exporter));

        let err = registry
            .get_or_create("db:primary", CircuitBreakerConfig::default())
            .unwrap_err();

        match err {
            RegistryError::InvalidIdentifier { ref name, ref source } => {
                assert_eq!(name, "db:primary");
                assert_eq!(
                    source,
                    &IdentifierError::IllegalCharacter {
                        key: "value",
                        character: ':'
                    }
                );
            }
            ref other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.error_code(), "TRIPWIRE_INVALID_IDENTIFIER");
        assert!(registry.find("db:primary").is_none());
        assert_eq!(registry.stats().export_failures, 1);
        assert_eq!(registry.stats().created, 0);
    }

    #[test]
    fn test_publish_receives_identifier_and_breaker() {
        let registry = CircuitBreakerRegistry::with_config(
            RegistryConfig::default().with_namespace("com.example"),
        );
        let mut exporter = MockBreakerExporter::new();
        exporter
            .expect_publish()
            .withf(|breaker, identifier| {
                breaker.name() == "orders"
                    && identifier.as_str() == "com.example:type=CircuitBreaker,value=orders"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        registry.set_exporter(Arc::new(exporter));

        let first = registry.get("orders").unwrap();
        let again = registry.get("orders").unwrap();

        assert!(Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn test_publish_failure_leaves_map_unchanged() {
        let registry = CircuitBreakerRegistry::new();
        let mut exporter = MockBreakerExporter::new();
        exporter
            .expect_publish()
            .with(always(), always())
            .times(1)
            .returning(|_, identifier| Err(ExportError::rejected(identifier, "plane offline")));
        registry.set_exporter(Arc::new(exporter));

        let err = registry.get("billing").unwrap_err();

        assert!(matches!(err, RegistryError::PublishFailure { .. }));
        assert!(err.is_export_failure());
        assert!(registry.find("billing").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_retry_after_clearing_exporter() {
        let registry = CircuitBreakerRegistry::new();
        registry.set_exporter(Arc::new(MockBreakerExporter::new()));
        assert!(registry.get("a=b").is_err());

        assert!(registry.clear_exporter().is_some());
        assert!(registry.clear_exporter().is_none());
        assert!(registry.get("a=b").is_ok());
    }

    #[test]
    fn test_rebinding_exporter_does_not_publish_existing() {
        let registry = CircuitBreakerRegistry::new();
        let original = registry.get("svc-b").unwrap();

        let plane = InMemoryExporter::shared();
        registry.set_exporter(plane.clone());

        let found = registry.find("svc-b").unwrap();
        assert!(Arc::ptr_eq(&original, &found));
        assert!(plane.is_empty());

        registry.get("svc-c").unwrap();
        assert_eq!(
            plane.identifiers(),
            vec!["tripwire:type=CircuitBreaker,value=svc-c".to_string()]
        );
    }

    #[test]
    fn test_duplicate_publication_is_a_publish_failure() {
        let plane = InMemoryExporter::shared();
        let identifier =
            crate::export::ExternalIdentifier::new("tripwire", "CircuitBreaker", "shared").unwrap();
        plane
            .publish(Arc::new(CircuitBreaker::new("shared")), &identifier)
            .unwrap();

        let registry = CircuitBreakerRegistry::new();
        registry.set_exporter(plane.clone());

        let err = registry.get("shared").unwrap_err();
        match err {
            RegistryError::PublishFailure { identifier, source } => {
                assert_eq!(identifier, "tripwire:type=CircuitBreaker,value=shared");
                assert!(matches!(source, ExportError::AlreadyPublished { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(registry.find("shared").is_none());
    }

    #[test]
    fn test_override_applied_on_creation() {
        let config = RegistryConfig::default().with_override(
            "inventory",
            BreakerOverride {
                failure_threshold: Some(1),
                ..Default::default()
            },
        );
        let registry = CircuitBreakerRegistry::with_config(config);

        let inventory = registry
            .get_or_create("inventory", CircuitBreakerConfig::lenient())
            .unwrap();
        let search = registry
            .get_or_create("search", CircuitBreakerConfig::lenient())
            .unwrap();

        assert_eq!(inventory.config().failure_threshold, 1);
        assert_eq!(
            inventory.config().success_threshold,
            CircuitBreakerConfig::lenient().success_threshold
        );
        assert_eq!(search.config(), CircuitBreakerConfig::lenient());
    }

    #[test]
    fn test_custom_kind_in_published_identifier() {
        let config = RegistryConfig::default()
            .with_namespace("com.example.edge")
            .with_kind("EdgeBreaker");
        let registry = CircuitBreakerRegistry::try_with_config(config).unwrap();
        let plane = InMemoryExporter::shared();
        registry.set_exporter(plane.clone());

        registry.get("orders").unwrap();

        assert_eq!(
            plane.identifiers(),
            vec!["com.example.edge:type=EdgeBreaker,value=orders".to_string()]
        );
    }

    #[test]
    fn test_try_with_config_rejects_bad_identifier_settings() {
        let bad_namespace = RegistryConfig::default().with_namespace("a:b");
        let err = CircuitBreakerRegistry::try_with_config(bad_namespace).unwrap_err();
        assert!(matches!(err, RegistryError::Config { .. }));
        assert!(!err.is_export_failure());

        let empty_kind = RegistryConfig::default().with_kind("");
        assert!(CircuitBreakerRegistry::try_with_config(empty_kind).is_err());
    }

    #[test]
    fn test_try_with_config_rejects_zero_tuning() {
        let config = RegistryConfig::default().with_defaults(CircuitBreakerConfig {
            half_open_max_requests: 0,
            ..Default::default()
        });
        let err = CircuitBreakerRegistry::try_with_config(config).unwrap_err();
        assert_eq!(err.error_code(), "TRIPWIRE_CONFIG");
    }

    #[test]
    fn test_get_uses_registry_defaults() {
        let registry = CircuitBreakerRegistry::with_config(
            RegistryConfig::default().with_defaults(CircuitBreakerConfig::aggressive()),
        );

        let cb = registry.get("svc").unwrap();
        assert_eq!(cb.config(), CircuitBreakerConfig::aggressive());
    }

    #[test]
    fn test_reset_all_and_all_stats() {
        let registry = CircuitBreakerRegistry::new();
        registry.get("a").unwrap().trip();
        registry.get("b").unwrap().trip();

        assert!(
            registry
                .all_stats()
                .iter()
                .all(|(_, stats)| stats.state == CircuitState::Open)
        );

        registry.reset_all();
        assert!(
            registry
                .all_stats()
                .iter()
                .all(|(_, stats)| stats.state == CircuitState::Closed)
        );
    }
}
