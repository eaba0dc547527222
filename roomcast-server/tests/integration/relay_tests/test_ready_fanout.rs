use crate::integration::{TestHarness, cat, init_tracing};
use roomcast_core::{ClientEvent, ServerEvent};

#[tokio::test]
async fn test_ready_fans_out_to_every_other_member() {
    init_tracing();

    let harness = TestHarness::new();
    let conn_a = harness.connect();
    let conn_b = harness.connect();
    let conn_c = harness.connect();
    harness.join(&conn_a, "demo", "ann@x.io").await;
    harness.join(&conn_b, "demo", "bee@x.io").await;
    harness.join(&conn_c, "demo", "cat@x.io").await;

    harness
        .coordinator
        .handle_event(
            &conn_c,
            ClientEvent::Ready {
                room_name: "demo".to_owned(),
            },
        )
        .await;

    for observer in [&conn_a, &conn_b] {
        let ready = harness
            .sink
            .find_for(observer, |event| matches!(event, ServerEvent::Ready { .. }))
            .await
            .expect("other members should receive ready");
        assert!(matches!(
            ready,
            ServerEvent::Ready { from, identity } if from == conn_c && identity == cat()
        ));
    }

    assert!(
        harness
            .sink
            .find_for(&conn_c, |event| matches!(event, ServerEvent::Ready { .. }))
            .await
            .is_none(),
        "the sender does not hear its own ready"
    );
}

#[tokio::test]
async fn test_ready_skips_members_whose_transport_died() {
    init_tracing();

    let harness = TestHarness::new();
    let conn_a = harness.connect();
    let conn_b = harness.connect();
    harness.join(&conn_a, "demo", "ann@x.io").await;
    harness.join(&conn_b, "demo", "bee@x.io").await;

    // Transport died without a clean close; cleanup has not run yet.
    harness.sink.disconnect(&conn_b);

    harness
        .coordinator
        .handle_event(
            &conn_a,
            ClientEvent::Ready {
                room_name: "demo".to_owned(),
            },
        )
        .await;

    assert!(
        harness
            .sink
            .find_for(&conn_b, |event| matches!(event, ServerEvent::Ready { .. }))
            .await
            .is_none(),
        "a stale member mapping is skipped, not an error"
    );
}
