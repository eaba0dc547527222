use crate::integration::{TestHarness, ann, init_tracing};
use roomcast_core::{ClientEvent, ServerEvent};
use std::time::Duration;

/// A join whose connection disconnects while the persistence confirmation
/// is in flight must commit nothing and notify nobody.
#[tokio::test]
async fn test_join_in_flight_when_connection_dies_is_rolled_back() {
    init_tracing();

    let harness = TestHarness::new();
    let conn_a = harness.connect();
    let conn_b = harness.connect();
    harness.join(&conn_a, "demo", "ann@x.io").await;
    harness.store.set_delay_ms(50);

    let join_task = tokio::spawn({
        let coordinator = harness.coordinator.clone();
        let conn_b = conn_b.clone();
        async move {
            coordinator
                .handle_event(
                    &conn_b,
                    ClientEvent::Join {
                        room_name: "demo".to_owned(),
                        email: "bee@x.io".to_owned(),
                        password: None,
                    },
                )
                .await;
        }
    });

    // Let the join commit its live-table decision and enter the store
    // await, then kill the transport underneath it.
    tokio::time::sleep(Duration::from_millis(10)).await;
    harness.disconnect(&conn_b).await;
    join_task.await.expect("join task panicked");

    assert_eq!(harness.table.members("demo").unwrap(), vec![ann()]);
    assert!(
        harness
            .sink
            .find_for(&conn_b, |event| matches!(event, ServerEvent::Joined { .. }))
            .await
            .is_none(),
        "a dead connection never receives the join response"
    );
    assert!(
        harness
            .sink
            .find_for(&conn_a, |event| matches!(event, ServerEvent::UserJoined { .. }))
            .await
            .is_none(),
        "no join was committed, so nobody is notified"
    );
}
