//! Presence Tests

use std::sync::Arc;

use pretty_assertions::assert_eq;

use chat_hub::presentation::websocket::{ConnectionState, Gateway, ServerEvent};

use super::Client;

#[test]
fn test_two_users_come_and_go() {
    let gateway = Arc::new(Gateway::new());
    let mut a = Client::connect(&gateway);
    let mut b = Client::connect(&gateway);

    a.lifecycle.hello(1);
    b.lifecycle.hello(2);

    assert_eq!(a.presence(), vec![vec![1], vec![1, 2]]);
    assert_eq!(b.presence(), vec![vec![1], vec![1, 2]]);

    a.lifecycle.disconnect();
    assert_eq!(b.presence(), vec![vec![2]]);
    assert_eq!(gateway.registry().online_users(), vec![2]);
}

#[test]
fn test_user_stays_online_while_any_tab_is_open() {
    let gateway = Arc::new(Gateway::new());
    let mut tab1 = Client::connect(&gateway);
    let mut tab2 = Client::connect(&gateway);
    let mut watcher = Client::connect(&gateway);

    tab1.lifecycle.hello(7);
    tab2.lifecycle.hello(7);
    watcher.presence();

    tab1.lifecycle.disconnect();
    assert_eq!(watcher.presence(), vec![vec![7]]);

    tab2.lifecycle.disconnect();
    assert_eq!(watcher.presence(), vec![Vec::<i64>::new()]);
}

#[test]
fn test_unbound_client_sees_presence() {
    let gateway = Arc::new(Gateway::new());
    let mut lurker = Client::connect(&gateway);
    let mut user = Client::connect(&gateway);

    user.lifecycle.hello(3);

    assert_eq!(lurker.lifecycle.state(), ConnectionState::Unbound);
    assert_eq!(lurker.presence(), vec![vec![3]]);
}

#[test]
fn test_dropped_client_is_cleaned_up() {
    let gateway = Arc::new(Gateway::new());
    let mut watcher = Client::connect(&gateway);

    {
        let mut gone = Client::connect(&gateway);
        gone.lifecycle.hello(9);
    }

    assert!(gateway.registry().online_users().is_empty());
    assert_eq!(gateway.connection_count(), 1);
    assert_eq!(
        watcher.drain().last(),
        Some(&ServerEvent::OnlineUsersUpdated(vec![]))
    );
}
