use crate::integration::{TestHarness, ann, bee, init_tracing};
use roomcast_core::ServerEvent;

#[tokio::test]
async fn test_creator_kicks_a_member() {
    init_tracing();

    let harness = TestHarness::new();
    let conn_a = harness.connect();
    let conn_b = harness.connect();
    harness.join(&conn_a, "demo", "ann@x.io").await;
    harness.join(&conn_b, "demo", "bee@x.io").await;

    harness.kick(&conn_a, "demo", "bee@x.io").await;

    let kicked = harness
        .sink
        .find_for(&conn_b, |event| matches!(event, ServerEvent::Kicked { .. }))
        .await
        .expect("target should get the kicked notice");
    assert!(matches!(
        kicked,
        ServerEvent::Kicked { room_name, by, .. } if room_name == "demo" && by == "ann"
    ));

    let user_left = harness
        .sink
        .find_for(&conn_a, |event| matches!(event, ServerEvent::UserLeft { .. }))
        .await
        .expect("remaining members should see user-left");
    assert!(matches!(
        user_left,
        ServerEvent::UserLeft { identity, was_kicked: true, by: Some(by), member_count: 1, .. }
            if identity == bee() && by == "ann"
    ));

    assert_eq!(harness.table.members("demo").unwrap(), vec![ann()]);
}

#[tokio::test]
async fn test_kicked_member_can_rejoin() {
    init_tracing();

    let harness = TestHarness::new();
    let conn_a = harness.connect();
    let conn_b = harness.connect();
    harness.join(&conn_a, "demo", "ann@x.io").await;
    harness.join(&conn_b, "demo", "bee@x.io").await;
    harness.kick(&conn_a, "demo", "bee@x.io").await;

    harness.join(&conn_b, "demo", "bee@x.io").await;

    assert_eq!(harness.table.members("demo").unwrap(), vec![ann(), bee()]);
}
