//! RigSession state, configuration and locking.

use std::sync::Arc;
use std::time::Duration;

use catlink_core::caps::{CapabilityDescriptor, FreqRange, TransportDefaults};
use catlink_core::config::SessionConfig;
use catlink_core::engine::{Reply, TransactionRequest};
use catlink_core::error::Error;
use catlink_core::session::RigSession;
use catlink_core::types::{Manufacturer, ModeSet, ModelId, Region, Vfo, VfoSet};
use catlink_test_harness::MockTransport;

fn descriptor() -> Arc<CapabilityDescriptor> {
    let ab = VfoSet::of(&[Vfo::A, Vfo::B]);
    Arc::new(
        CapabilityDescriptor::builder(
            ModelId::new(Manufacturer::Yaesu, 998),
            Manufacturer::Yaesu,
            "Test Rig",
        )
        .vfos(ab)
        .rx_range(
            Region::One,
            FreqRange::rx(1_800_000, 30_000_000, ModeSet::SSB, ab),
        )
        .rx_range(
            Region::Two,
            FreqRange::rx(1_800_000, 54_000_000, ModeSet::SSB, ab),
        )
        .transport(TransportDefaults {
            timeout: Duration::from_millis(20),
            retry: 3,
            ..TransportDefaults::default()
        })
        .build(),
    )
}

#[tokio::test]
async fn starts_on_first_declared_vfo() {
    let session = RigSession::new(
        descriptor(),
        Box::new(MockTransport::new()),
        SessionConfig::default(),
    );
    assert_eq!(session.current_vfo().await, Vfo::A);
    assert_eq!(session.region(), Region::One);
}

#[tokio::test]
async fn undeclared_vfo_is_rejected() {
    let session = RigSession::new(
        descriptor(),
        Box::new(MockTransport::new()),
        SessionConfig::default(),
    );
    let desc = session.descriptor_arc();
    let mut inner = session.lock().await;

    let err = inner.state.set_current_vfo(&desc, Vfo::Sub).unwrap_err();
    assert!(matches!(err, Error::InvalidParameter(_)));
    assert_eq!(inner.state.current_vfo(), Vfo::A);

    inner.state.set_current_vfo(&desc, Vfo::B).unwrap();
    assert_eq!(inner.state.resolve(Vfo::Current), Vfo::B);
    // Current resolves to the selected VFO rather than being stored.
    inner.state.set_current_vfo(&desc, Vfo::Current).unwrap();
    assert_eq!(inner.state.current_vfo(), Vfo::B);
}

#[tokio::test]
async fn region_selects_range_list() {
    let config = SessionConfig::default().with_region(Region::Two);
    let session = RigSession::new(descriptor(), Box::new(MockTransport::new()), config);
    let desc = session.descriptor();

    assert!(desc
        .check_rx_frequency(session.region(), Vfo::A, 50_125_000)
        .is_ok());
    assert!(desc
        .check_rx_frequency(Region::One, Vfo::A, 50_125_000)
        .is_err());
}

#[tokio::test]
async fn retry_override_applies_to_engine() {
    let mut mock = MockTransport::new();
    let probe = mock.probe();
    mock.expect_silence(b"FA;");
    mock.expect_silence(b"FA;");
    let config = SessionConfig::default().with_retry(2);
    let session = RigSession::new(descriptor(), Box::new(mock), config);

    let mut inner = session.lock().await;
    assert_eq!(inner.engine.attempts(), 2);
    let request = TransactionRequest::query(
        "get_freq",
        b"FA;".to_vec(),
        Reply::Terminated {
            terminator: b';',
            max_len: 32,
        },
    );
    assert!(matches!(inner.transact(request).await, Err(Error::Timeout)));
    assert_eq!(probe.write_count(), 2);
}

#[tokio::test]
async fn lock_is_held_across_a_composite_operation() {
    let session = Arc::new(RigSession::new(
        descriptor(),
        Box::new(MockTransport::new()),
        SessionConfig::default(),
    ));

    let guard = session.lock().await;
    let other = Arc::clone(&session);
    let waiter = tokio::spawn(async move { other.current_vfo().await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    drop(guard);
    assert_eq!(waiter.await.unwrap(), Vfo::A);
}

#[tokio::test]
async fn close_twice_reports_not_connected() {
    let mock = MockTransport::new();
    let probe = mock.probe();
    let session = RigSession::new(descriptor(), Box::new(mock), SessionConfig::default());

    assert!(session.is_connected().await);
    session.close().await.unwrap();
    assert!(!probe.is_connected());
    assert!(matches!(session.close().await, Err(Error::NotConnected)));
}
