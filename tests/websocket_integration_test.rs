//! End-to-end tests against a local WebSocket consumer


use pose_streamer::{
    channel::sample_channel,
    codec::{decode, OutboundMessage, UpdatePayload},
    receiver::{LoggingSink, UpdateReceiver, UpdateSink},
    session::{SessionState, StreamSession},
    transport::WebSocketConnector,
    Error,
};
use std::thread;
use std::time::{Duration, Instant};
use test_helpers::{local_config, offer_until_taken, unused_port, wait_for, TestServer};

#[test]
fn test_frames_reach_consumer() {
    let server = TestServer::spawn();
    let mut session = StreamSession::new(&local_config(server.port), WebSocketConnector::new()).unwrap();
    let (producer, consumer) = sample_channel();
    session.start(consumer).unwrap();

    wait_for(|| session.state() == SessionState::Streaming);
    for sample in [10.0, 12.0, -2.0] {
        offer_until_taken(&producer, sample);
    }
    wait_for(|| session.frames_sent() == 3);
    session.shutdown().unwrap();
    assert_eq!(session.state(), SessionState::Closed);

    let frames = server.frames();
    assert_eq!(
        frames,
        vec![
            r#"{"type":"update","x":500,"y":0}"#,
            r#"{"type":"update","x":550,"y":0}"#,
            r#"{"type":"update","x":333,"y":0}"#,
        ]
    );
    let decoded: Vec<OutboundMessage> = frames.iter().map(|f| decode(f).unwrap()).collect();
    assert_eq!(decoded[2], OutboundMessage::update(333));
}

#[test]
fn test_session_feeds_update_receiver() {
    let receiver = UpdateReceiver::bind("127.0.0.1:0").unwrap();
    let port = receiver.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let mut updates: Vec<UpdatePayload> = Vec::new();
        receiver.accept_one(&mut updates).unwrap();
        updates
    });

    let mut session = StreamSession::new(&local_config(port), WebSocketConnector::new()).unwrap();
    let (producer, consumer) = sample_channel();
    session.start(consumer).unwrap();
    for sample in [4.0, -8.0] {
        offer_until_taken(&producer, sample);
    }
    wait_for(|| session.frames_sent() == 2);
    session.shutdown().unwrap();

    let updates = server.join().unwrap();
    assert_eq!(updates, vec![UpdatePayload { x: 200, y: 0 }, UpdatePayload { x: -100, y: 0 }]);

    let mut sink = LoggingSink::new(640, 360);
    for update in updates {
        sink.apply(update).unwrap();
    }
    assert_eq!(sink.position(), (540, 360));
}

#[test]
fn test_window_eviction_over_the_wire() {
    let server = TestServer::spawn();
    let mut session = StreamSession::new(&local_config(server.port), WebSocketConnector::new()).unwrap();
    let (producer, consumer) = sample_channel();
    session.start(consumer).unwrap();

    // Eight large values followed by eight zeros: the last frame sees only zeros
    for _ in 0..8 {
        offer_until_taken(&producer, 100.0);
    }
    for _ in 0..8 {
        offer_until_taken(&producer, 0.0);
    }
    wait_for(|| session.frames_sent() == 16);
    session.shutdown().unwrap();

    let frames = server.frames();
    assert_eq!(frames.len(), 16);
    assert_eq!(decode(&frames[7]).unwrap().x(), 5000);
    assert_eq!(decode(&frames[11]).unwrap().x(), 2500);
    assert_eq!(decode(&frames[15]).unwrap().x(), 0);
}

#[test]
fn test_connection_refused_fails_session() {
    let mut session = StreamSession::new(&local_config(unused_port()), WebSocketConnector::new()).unwrap();
    let (producer, consumer) = sample_channel();
    session.start(consumer).unwrap();

    wait_for(|| session.state().is_terminal());
    assert!(matches!(session.state(), SessionState::Failed(_)));
    assert!(!producer.offer(1.0));
    assert!(matches!(session.shutdown(), Err(Error::Transport(_))));
}

#[test]
fn test_peer_disconnect_is_terminal() {
    let server = TestServer::spawn_dropping();
    let mut session = StreamSession::new(&local_config(server.port), WebSocketConnector::new()).unwrap();
    let (producer, consumer) = sample_channel();
    session.start(consumer).unwrap();
    assert!(server.frames().is_empty());

    // Writes start failing once the reset from the closed peer arrives
    let deadline = Instant::now() + Duration::from_secs(5);
    while !session.state().is_terminal() {
        assert!(Instant::now() < deadline, "session never noticed the disconnect");
        producer.offer(1.0);
        thread::sleep(Duration::from_millis(5));
    }
    assert!(matches!(session.state(), SessionState::Failed(_)));

    let sent = session.frames_sent();
    for _ in 0..10 {
        assert!(!producer.offer(2.0));
    }
    assert_eq!(session.frames_sent(), sent);
    assert!(session.shutdown().is_err());
}

#[test]
fn test_shutdown_while_idle() {
    let server = TestServer::spawn();
    let mut session = StreamSession::new(&local_config(server.port), WebSocketConnector::new()).unwrap();
    let (_producer, consumer) = sample_channel();
    session.start(consumer).unwrap();
    wait_for(|| session.state() == SessionState::Streaming);

    let start = Instant::now();
    session.shutdown().unwrap();
    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(session.is_finished());
    assert!(server.frames().is_empty());
}
