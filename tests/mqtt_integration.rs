// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the MQTT transport using mockforge-mqtt.

use std::time::Duration;

use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use tokio::time::sleep;
use ventlink_lib::config::{BrokerKind, ConnectionMode, DeviceConnectionConfig, LocalCredential};
use ventlink_lib::protocol::{BrokerTarget, Connector, Link, MqttConnector};
use ventlink_lib::types::FanSpeed;
use ventlink_lib::{ConnectionStatus, Device, Error};

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18950);
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Starts a mock MQTT broker on the given port.
async fn start_mock_broker(port: u16) {
    let config = MqttConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };

    tokio::spawn(async move {
        let _ = start_mqtt_server(config).await;
    });

    // Give the broker time to bind before clients connect
    sleep(Duration::from_millis(500)).await;
}

fn local_target(port: u16) -> BrokerTarget {
    BrokerTarget {
        kind: BrokerKind::Local,
        host: "127.0.0.1".to_string(),
        port,
        client_id: format!("ventlink-test-{port}"),
        username: "NK6-EU-MHA0000A".to_string(),
        password: "hash".to_string(),
        tls: false,
        keep_alive: Duration::from_secs(30),
        connect_timeout: Duration::from_secs(5),
    }
}

fn local_config(port: u16) -> DeviceConnectionConfig {
    DeviceConnectionConfig::builder("NK6-EU-MHA0000A", "438")
        .host("127.0.0.1")
        .local_port(port)
        .local_credential(LocalCredential::password_hash("hash"))
        .mode(ConnectionMode::LocalOnly)
        .connect_timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

// ============================================================================
// MqttConnector Tests
// ============================================================================

mod mqtt_connector {
    use super::*;

    #[tokio::test]
    async fn connect_to_broker() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let result = MqttConnector::new().connect(&local_target(port)).await;
        assert!(result.is_ok(), "Failed to connect: {:?}", result.err());

        let (link, _inbound) = result.unwrap();
        assert!(link.is_connected());
        link.disconnect().await.unwrap();
        assert!(!link.is_connected());
    }

    #[tokio::test]
    async fn subscribe_and_publish() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (link, _inbound) = MqttConnector::new()
            .connect(&local_target(port))
            .await
            .unwrap();

        assert!(link.subscribe("438/NK6-EU-MHA0000A/status/current").await.is_ok());
        let payload = r#"{"msg":"REQUEST-CURRENT-STATE","time":"2024-03-01T12:00:00.000Z"}"#;
        assert!(
            link.publish("438/NK6-EU-MHA0000A/command", payload.to_string())
                .await
                .is_ok()
        );
        assert!(link.unsubscribe("438/NK6-EU-MHA0000A/status/current").await.is_ok());
        link.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn closed_port_is_reported() {
        let port = get_test_port();

        let result = MqttConnector::new().connect(&local_target(port)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn disconnect_twice_is_harmless() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let (link, _inbound) = MqttConnector::new()
            .connect(&local_target(port))
            .await
            .unwrap();
        assert!(link.disconnect().await.is_ok());
        assert!(link.disconnect().await.is_ok());
    }
}

// ============================================================================
// Device Tests
// ============================================================================

mod device_mqtt {
    use super::*;

    #[tokio::test]
    async fn local_only_device_connects() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let device = Device::new(local_config(port));
        let outcome = device.connect().await.unwrap();

        assert_eq!(outcome.status, ConnectionStatus::Local);
        assert!(device.is_connected());

        device.set_fan_speed(FanSpeed::new(6).unwrap()).await.unwrap();
        device.request_current_state().await.unwrap();

        device.disconnect().await;
        assert!(!device.is_connected());
    }

    #[tokio::test]
    async fn unreachable_broker_leaves_device_disconnected() {
        let port = get_test_port();

        let device = Device::new(local_config(port));
        let outcome = device.connect().await.unwrap();

        assert_eq!(outcome.status, ConnectionStatus::Disconnected);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].kind, BrokerKind::Local);
        assert!(matches!(
            device.power_on().await,
            Err(Error::NotConnected)
        ));
    }

    #[tokio::test]
    async fn reconnect_replaces_the_session() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let device = Device::new(local_config(port));
        assert!(device.connect().await.unwrap().is_connected());
        assert!(device.connect().await.unwrap().is_connected());
        assert_eq!(device.connection_status(), ConnectionStatus::Local);

        device.disconnect().await;
    }
}

// ============================================================================
// Inbound Routing
// ============================================================================
//
// NOTE: The mockforge-mqtt broker used for testing doesn't fully support
// pub/sub message forwarding between clients. Inbound routing is tested
// through the in-memory transport in tests/engine.rs and the unit tests in
// src/router.rs.
