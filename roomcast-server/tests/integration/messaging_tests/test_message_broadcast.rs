use crate::integration::{TestHarness, bee, init_tracing};
use roomcast_core::ServerEvent;

#[tokio::test]
async fn test_message_reaches_every_member_including_the_sender() {
    init_tracing();

    let harness = TestHarness::new();
    let conn_a = harness.connect();
    let conn_b = harness.connect();
    harness.join(&conn_a, "demo", "ann@x.io").await;
    harness.join(&conn_b, "demo", "bee@x.io").await;

    harness.send_message(&conn_b, "demo", "hello there").await;

    for observer in [&conn_a, &conn_b] {
        let received = harness
            .sink
            .find_for(observer, |event| {
                matches!(event, ServerEvent::MessageReceived(_))
            })
            .await
            .expect("every member should receive the message");
        let ServerEvent::MessageReceived(message) = received else {
            unreachable!()
        };
        assert_eq!(message.sender, bee());
        assert_eq!(message.text, "hello there");
        assert_eq!(message.room_name, "demo");
    }

    harness.request_history(&conn_a, "demo").await;
    let history = harness
        .sink
        .find_for(&conn_a, |event| {
            matches!(event, ServerEvent::MessageHistory { .. })
        })
        .await
        .unwrap();
    assert!(matches!(
        history,
        ServerEvent::MessageHistory { messages, .. } if messages.len() == 1
    ));
}

#[tokio::test]
async fn test_message_to_an_unknown_room_is_an_error() {
    init_tracing();

    let harness = TestHarness::new();
    let conn_a = harness.connect();
    harness.join(&conn_a, "demo", "ann@x.io").await;

    harness.send_message(&conn_a, "ghost-room", "anyone?").await;

    assert!(
        harness
            .sink
            .find_for(&conn_a, |event| matches!(event, ServerEvent::Error { .. }))
            .await
            .is_some()
    );
}
