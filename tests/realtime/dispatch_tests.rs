//! Message Dispatch Tests

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use chat_hub::domain::MessageRepository;
use chat_hub::presentation::websocket::messages::SendMessagePayload;
use chat_hub::presentation::websocket::{DispatchError, Gateway, MessageDispatcher};

use super::{Client, InMemoryMessages};

fn payload(text: &str, receiver: serde_json::Value) -> SendMessagePayload {
    SendMessagePayload {
        message_content: Some(text.to_string()),
        receiver_id: Some(receiver),
    }
}

#[tokio::test]
async fn test_message_reaches_all_tabs_of_both_parties() {
    let gateway = Arc::new(Gateway::new());
    let store = Arc::new(InMemoryMessages::default());
    let dispatcher = MessageDispatcher::new(store.clone(), gateway.clone());

    let mut h1 = Client::connect(&gateway);
    let mut h2 = Client::connect(&gateway);
    let mut h3 = Client::connect(&gateway);
    h1.lifecycle.hello(1);
    h2.lifecycle.hello(1);
    h3.lifecycle.hello(2);

    let delivery = dispatcher
        .handle_outgoing_message(h3.lifecycle.user_id(), payload("hi", json!(1)))
        .await
        .unwrap();

    assert_eq!(delivery.recipients, 3);
    for client in [&mut h1, &mut h2, &mut h3] {
        let received = client.messages();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].text, "hi");
        assert_eq!(received[0].sender_id, 2);
        assert_eq!(received[0].receiver_id, 1);
    }
}

#[tokio::test]
async fn test_history_keeps_messages_for_offline_receiver() {
    let gateway = Arc::new(Gateway::new());
    let store = Arc::new(InMemoryMessages::default());
    let dispatcher = MessageDispatcher::new(store.clone(), gateway.clone());

    let mut sender = Client::connect(&gateway);
    sender.lifecycle.hello(1);

    dispatcher
        .handle_outgoing_message(Some(1), payload("first", json!(2)))
        .await
        .unwrap();
    dispatcher
        .handle_outgoing_message(Some(1), payload("second", json!("2")))
        .await
        .unwrap();

    assert_eq!(sender.messages().len(), 2);

    let history = store.find_conversation(2, 1).await.unwrap();
    let texts: Vec<_> = history.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second"]);
}

#[tokio::test]
async fn test_unbound_connection_cannot_send() {
    let gateway = Arc::new(Gateway::new());
    let store = Arc::new(InMemoryMessages::default());
    let dispatcher = MessageDispatcher::new(store.clone(), gateway.clone());

    let lurker = Client::connect(&gateway);
    let mut receiver = Client::connect(&gateway);
    receiver.lifecycle.hello(2);

    let err = dispatcher
        .handle_outgoing_message(lurker.lifecycle.user_id(), payload("psst", json!(2)))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::UnboundSender));
    assert!(receiver.messages().is_empty());
    assert!(store.find_conversation(1, 2).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_disconnected_tab_gets_nothing() {
    let gateway = Arc::new(Gateway::new());
    let store = Arc::new(InMemoryMessages::default());
    let dispatcher = MessageDispatcher::new(store, gateway.clone());

    let mut closed = Client::connect(&gateway);
    let mut open = Client::connect(&gateway);
    closed.lifecycle.hello(1);
    open.lifecycle.hello(1);
    closed.lifecycle.disconnect();
    closed.drain();

    let delivery = dispatcher
        .handle_outgoing_message(Some(1), payload("to self", json!(1)))
        .await
        .unwrap();

    assert_eq!(delivery.recipients, 1);
    assert!(closed.messages().is_empty());
    assert_eq!(open.messages().len(), 1);
}
