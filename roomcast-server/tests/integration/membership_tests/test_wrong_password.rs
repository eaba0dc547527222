use crate::integration::{TestHarness, ann, bee, init_tracing};
use roomcast_core::ServerEvent;

#[tokio::test]
async fn test_password_mismatch_is_rejected_without_state_change() {
    init_tracing();

    let harness = TestHarness::new();
    let conn_a = harness.connect();
    let conn_b = harness.connect();
    harness
        .join_with_password(&conn_a, "demo", "ann@x.io", Some("s3cret"))
        .await;

    harness
        .join_with_password(&conn_b, "demo", "bee@x.io", Some("wrong"))
        .await;

    assert!(
        harness
            .sink
            .find_for(&conn_b, |event| matches!(event, ServerEvent::Error { .. }))
            .await
            .is_some()
    );
    assert_eq!(harness.table.members("demo").unwrap(), vec![ann()]);

    harness
        .join_with_password(&conn_b, "demo", "bee@x.io", Some("s3cret"))
        .await;

    assert!(
        harness
            .sink
            .find_for(&conn_b, |event| matches!(event, ServerEvent::Joined { .. }))
            .await
            .is_some()
    );
    assert_eq!(harness.table.members("demo").unwrap(), vec![ann(), bee()]);
}
