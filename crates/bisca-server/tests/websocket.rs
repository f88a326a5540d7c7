use std::time::Duration;

use bisca_server::config::RoomSettings;
use bisca_server::{AppState, app};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(RoomSettings {
        hands_per_match: 1,
        trick_pause: Duration::from_millis(10),
    });
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });
    format!("ws://{addr}/ws")
}

async fn recv_json(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), client.next())
            .await
            .expect("message before timeout")
            .expect("stream open")
            .expect("valid frame");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn recv_type(client: &mut Client, kind: &str) -> Value {
    loop {
        let value = recv_json(client).await;
        if value["type"] == kind {
            return value;
        }
    }
}

async fn send(client: &mut Client, value: Value) {
    client.send(Message::Text(value.to_string())).await.unwrap();
}

#[tokio::test]
async fn two_clients_meet_in_a_room_and_get_dealt() {
    let url = spawn_server().await;
    let (mut ana, _) = connect_async(url.as_str()).await.unwrap();
    let (mut bea, _) = connect_async(url.as_str()).await.unwrap();

    let welcome = recv_type(&mut ana, "welcome").await;
    let ana_id = welcome["player_id"].as_str().unwrap().to_string();
    recv_type(&mut bea, "welcome").await;

    send(&mut ana, json!({"type": "ping"})).await;
    recv_type(&mut ana, "pong").await;

    send(&mut ana, json!({"type": "create_room", "nickname": "Ana", "capacity": 2})).await;
    let update = recv_type(&mut ana, "room_update").await;
    let room_id = update["room"]["room_id"].as_str().unwrap().to_string();
    assert_eq!(update["room"]["owner"], ana_id.as_str());

    send(
        &mut bea,
        json!({"type": "join_room", "room_id": room_id, "nickname": "Bea"}),
    )
    .await;
    let update = recv_type(&mut bea, "room_update").await;
    assert_eq!(update["room"]["players"].as_array().unwrap().len(), 2);

    send(&mut bea, json!({"type": "start_game"})).await;
    let err = recv_type(&mut bea, "error").await;
    assert!(err["message"].as_str().unwrap().contains("owner"));

    send(&mut ana, json!({"type": "start_game"})).await;
    let update = recv_type(&mut bea, "game_update").await;
    let game = &update["game"];
    assert_eq!(game["phase"], "in_progress");
    assert_eq!(game["hand"].as_array().unwrap().len(), 10);
    assert_eq!(game["turn"], ana_id.as_str());
    for player in game["players"].as_array().unwrap() {
        assert_eq!(player["hand_size"], 10);
    }

    send(&mut ana, json!({"type": "create_room", "nickname": "Ana"})).await;
    let err = recv_type(&mut ana, "error").await;
    assert_eq!(err["message"], "already in a room");

    send(&mut ana, json!({"type": "nonsense"})).await;
    let err = recv_type(&mut ana, "error").await;
    assert!(err["message"].as_str().unwrap().starts_with("bad message"));
}
