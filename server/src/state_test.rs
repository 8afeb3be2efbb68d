use super::*;

#[test]
fn default_config_pings_before_idle_timeout() {
    assert!(RelayConfig::default().validate().is_ok());
}

#[test]
fn ping_not_shorter_than_idle_timeout_is_rejected() {
    for (ping, idle) in [(60, 60), (90, 60)] {
        let config = RelayConfig {
            ping_interval: Duration::from_secs(ping),
            idle_timeout: Duration::from_secs(idle),
            ..RelayConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ServerError::Keepalive { .. }),
            "{ping}s/{idle}s: {err}"
        );
    }
}
