// src/chat.rs

//! The streaming chat client.
//!
//! `send` appends the user's turn and a placeholder bot turn, then opens a
//! stream for the reply. Everything after that arrives as notifications
//! (`handle_frame`, `handle_transport_error`, `handle_transport_closed`)
//! tagged with the `StreamId` they belong to. Only the active stream may
//! touch the transcript; notifications for any other id are dropped.

use crate::constants::{
    CONNECTION_ERROR_MESSAGE, FLOW_DEFAULT, MALFORMED_EVENT_MESSAGE, STATUS_ERROR, STATUS_IDLE,
};
use crate::events::StreamEvent;
use crate::models::{ChatTurn, TurnId, TurnStyle};
use std::fmt;

/// Identifies one opened stream. Never reused within a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(pub u64);

/// Returned by `send`: the stream carrying the reply and the turn it renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHandle {
    pub stream: StreamId,
    pub turn: TurnId,
}

/// The single-line status shown next to the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStatus {
    Idle,
    Working(String),
    Error,
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowStatus::Idle => f.write_str(STATUS_IDLE),
            FlowStatus::Working(text) => f.write_str(text),
            FlowStatus::Error => f.write_str(STATUS_ERROR),
        }
    }
}

/// Where turns are displayed.
pub trait UiHost {
    fn append_turn(&mut self, turn: ChatTurn) -> TurnId;
    /// Re-renders an existing turn with new text.
    fn update_turn(&mut self, id: TurnId, text: &str, style: TurnStyle);
    fn set_status(&mut self, status: FlowStatus);
    fn clear_input(&mut self);
    fn clear_turns(&mut self);
}

/// An open server-push connection.
pub trait StreamChannel {
    fn close(&mut self);
}

/// Opens reply streams for user messages.
///
/// Opening never fails synchronously: connection problems are reported
/// later as a transport error for the returned stream's id.
pub trait ChatBackend {
    type Channel: StreamChannel;

    fn open_stream(&self, stream: StreamId, message: &str) -> Self::Channel;
}

/// What happened to a notification handed to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Applied; the stream stays open.
    Applied,
    /// Applied, and the stream is now closed.
    Closed,
    /// Not for the active stream, or carried nothing to apply.
    Ignored,
}

struct ActiveStream<C> {
    id: StreamId,
    turn: TurnId,
    buffer: String,
    channel: C,
}

pub struct StreamingChatClient<B: ChatBackend> {
    backend: B,
    next_stream: u64,
    active: Option<ActiveStream<B::Channel>>,
}

impl<B: ChatBackend> StreamingChatClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            next_stream: 0,
            active: None,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<StreamHandle> {
        self.active.as_ref().map(|a| StreamHandle {
            stream: a.id,
            turn: a.turn,
        })
    }

    /// Submits `message` and starts streaming the reply.
    ///
    /// Whitespace-only input is ignored and returns `None`.
    pub fn send<H: UiHost>(&mut self, host: &mut H, message: &str) -> Option<StreamHandle> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }

        self.close_active();

        host.append_turn(ChatTurn::user(message));
        host.clear_input();
        let turn = host.append_turn(ChatTurn::bot_placeholder());

        let id = StreamId(self.next_stream);
        self.next_stream += 1;

        log::info!("Opening chat stream {} ({} chars)", id.0, message.len());
        let channel = self.backend.open_stream(id, message);
        self.active = Some(ActiveStream {
            id,
            turn,
            buffer: String::new(),
            channel,
        });

        Some(StreamHandle { stream: id, turn })
    }

    /// Handles the raw payload of one SSE message for `stream`.
    pub fn handle_frame<H: UiHost>(&mut self, host: &mut H, stream: StreamId, data: &str) -> Dispatch {
        if !self.is_active(stream) {
            log::debug!("Dropping frame for inactive stream {}", stream.0);
            return Dispatch::Ignored;
        }

        match StreamEvent::parse(data) {
            Ok(event) => self.handle_event(host, stream, event),
            Err(e) => {
                log::error!("Error parsing stream event on stream {}: {}", stream.0, e);
                self.fail_turn(host, MALFORMED_EVENT_MESSAGE);
                Dispatch::Closed
            }
        }
    }

    /// Applies one decoded event to the active stream's turn.
    pub fn handle_event<H: UiHost>(
        &mut self,
        host: &mut H,
        stream: StreamId,
        event: StreamEvent,
    ) -> Dispatch {
        let Some(active) = self.active.as_mut().filter(|a| a.id == stream) else {
            return Dispatch::Ignored;
        };

        match event {
            StreamEvent::Flow(content) => {
                let text = if content.is_empty() {
                    FLOW_DEFAULT.to_string()
                } else {
                    content
                };
                host.set_status(FlowStatus::Working(text));
                Dispatch::Applied
            }
            StreamEvent::Chunk(content) => {
                active.buffer.push_str(&content);
                host.update_turn(active.turn, &active.buffer, TurnStyle::Normal);
                Dispatch::Applied
            }
            StreamEvent::Full(content) => {
                active.buffer = content;
                host.update_turn(active.turn, &active.buffer, TurnStyle::Normal);
                Dispatch::Applied
            }
            StreamEvent::Error(content) => {
                log::warn!("Backend reported an error on stream {}: {}", stream.0, content);
                self.fail_turn(host, &format!("Error: {}", content));
                Dispatch::Closed
            }
            StreamEvent::End => {
                log::info!("Stream {} ended", stream.0);
                self.close_active();
                Dispatch::Closed
            }
            StreamEvent::Unknown(kind) => {
                log::warn!("Ignoring unknown event type '{}' on stream {}", kind, stream.0);
                Dispatch::Ignored
            }
        }
    }

    /// The transport for `stream` failed before a terminal event.
    pub fn handle_transport_error<H: UiHost>(
        &mut self,
        host: &mut H,
        stream: StreamId,
        reason: &str,
    ) -> Dispatch {
        if !self.is_active(stream) {
            return Dispatch::Ignored;
        }

        log::error!("Chat stream {} failed: {}", stream.0, reason);
        self.fail_turn(host, CONNECTION_ERROR_MESSAGE);
        host.set_status(FlowStatus::Error);
        Dispatch::Closed
    }

    /// The server closed `stream`. Harmless after a terminal event; before
    /// one it is a transport failure.
    pub fn handle_transport_closed<H: UiHost>(&mut self, host: &mut H, stream: StreamId) -> Dispatch {
        self.handle_transport_error(host, stream, "stream closed before end event")
    }

    /// Removes every turn, resets the status and abandons any reply in flight.
    pub fn clear<H: UiHost>(&mut self, host: &mut H) {
        self.close_active();
        host.clear_turns();
        host.set_status(FlowStatus::Idle);
    }

    fn is_active(&self, stream: StreamId) -> bool {
        self.active.as_ref().is_some_and(|a| a.id == stream)
    }

    fn fail_turn<H: UiHost>(&mut self, host: &mut H, text: &str) {
        if let Some(active) = self.active.as_ref() {
            host.update_turn(active.turn, text, TurnStyle::Error);
        }
        self.close_active();
    }

    fn close_active(&mut self) {
        if let Some(mut active) = self.active.take() {
            log::debug!("Closing chat stream {}", active.id.0);
            active.channel.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingHost {
        turns: Vec<ChatTurn>,
        statuses: Vec<FlowStatus>,
        input_clears: usize,
    }

    impl RecordingHost {
        fn text(&self, id: TurnId) -> &str {
            &self.turns[id.0].text
        }

        fn style(&self, id: TurnId) -> TurnStyle {
            self.turns[id.0].style
        }
    }

    impl UiHost for RecordingHost {
        fn append_turn(&mut self, turn: ChatTurn) -> TurnId {
            self.turns.push(turn);
            TurnId(self.turns.len() - 1)
        }

        fn update_turn(&mut self, id: TurnId, text: &str, style: TurnStyle) {
            let turn = &mut self.turns[id.0];
            turn.text = text.to_string();
            turn.style = style;
        }

        fn set_status(&mut self, status: FlowStatus) {
            self.statuses.push(status);
        }

        fn clear_input(&mut self) {
            self.input_clears += 1;
        }

        fn clear_turns(&mut self) {
            self.turns.clear();
        }
    }

    #[derive(Default)]
    struct Ledger {
        opened: Vec<(StreamId, String)>,
        closed: Vec<StreamId>,
    }

    #[derive(Default, Clone)]
    struct MockBackend {
        ledger: Rc<RefCell<Ledger>>,
    }

    struct MockChannel {
        id: StreamId,
        ledger: Rc<RefCell<Ledger>>,
    }

    impl StreamChannel for MockChannel {
        fn close(&mut self) {
            self.ledger.borrow_mut().closed.push(self.id);
        }
    }

    impl ChatBackend for MockBackend {
        type Channel = MockChannel;

        fn open_stream(&self, stream: StreamId, message: &str) -> MockChannel {
            // the previous stream must already be closed
            let ledger = self.ledger.borrow();
            assert_eq!(ledger.opened.len(), ledger.closed.len());
            drop(ledger);

            self.ledger
                .borrow_mut()
                .opened
                .push((stream, message.to_string()));
            MockChannel {
                id: stream,
                ledger: self.ledger.clone(),
            }
        }
    }

    fn setup() -> (StreamingChatClient<MockBackend>, RecordingHost, Rc<RefCell<Ledger>>) {
        let backend = MockBackend::default();
        let ledger = backend.ledger.clone();
        (StreamingChatClient::new(backend), RecordingHost::default(), ledger)
    }

    fn frame(kind: &str, content: &str) -> String {
        serde_json::json!({ "type": kind, "content": content }).to_string()
    }

    #[test]
    fn test_send_appends_user_and_placeholder_turns() {
        let (mut client, mut host, ledger) = setup();

        let handle = client.send(&mut host, "  how do I sort a list?  ").unwrap();

        assert_eq!(host.turns.len(), 2);
        assert_eq!(host.turns[0].role, Role::User);
        assert_eq!(host.turns[0].text, "how do I sort a list?");
        assert_eq!(host.turns[1].role, Role::Bot);
        assert_eq!(host.style(handle.turn), TurnStyle::Pending);
        assert_eq!(handle.turn, TurnId(1));
        assert_eq!(host.input_clears, 1);
        assert_eq!(
            ledger.borrow().opened,
            vec![(handle.stream, "how do I sort a list?".to_string())]
        );
        assert!(client.is_streaming());
        assert_eq!(client.active(), Some(handle));
    }

    #[test]
    fn test_send_ignores_blank_input() {
        let (mut client, mut host, ledger) = setup();

        for input in ["", "   ", "\n\t "] {
            assert!(client.send(&mut host, input).is_none());
        }

        assert!(host.turns.is_empty());
        assert_eq!(host.input_clears, 0);
        assert!(ledger.borrow().opened.is_empty());
        assert!(!client.is_streaming());
    }

    #[test]
    fn test_chunks_accumulate_until_end() {
        let (mut client, mut host, ledger) = setup();
        let handle = client.send(&mut host, "hi").unwrap();

        assert_eq!(client.handle_frame(&mut host, handle.stream, &frame("message_chunk", "A")), Dispatch::Applied);
        assert_eq!(client.handle_frame(&mut host, handle.stream, &frame("message_chunk", "B")), Dispatch::Applied);
        assert_eq!(client.handle_frame(&mut host, handle.stream, r#"{"type":"end"}"#), Dispatch::Closed);

        assert_eq!(host.text(handle.turn), "AB");
        assert_eq!(host.style(handle.turn), TurnStyle::Normal);
        assert_eq!(ledger.borrow().closed, vec![handle.stream]);
        assert!(!client.is_streaming());

        // the server hanging up afterwards changes nothing
        assert_eq!(client.handle_transport_closed(&mut host, handle.stream), Dispatch::Ignored);
        assert_eq!(ledger.borrow().closed.len(), 1);
        assert_eq!(host.text(handle.turn), "AB");
    }

    #[test]
    fn test_full_message_replaces_buffer() {
        let (mut client, mut host, _) = setup();
        let handle = client.send(&mut host, "hi").unwrap();

        client.handle_frame(&mut host, handle.stream, &frame("chunk", "draft"));
        client.handle_frame(&mut host, handle.stream, &frame("full_message", "final"));
        client.handle_frame(&mut host, handle.stream, &frame("chunk", "!"));

        assert_eq!(host.text(handle.turn), "final!");
    }

    #[test]
    fn test_flow_then_error_stops_processing() {
        let (mut client, mut host, ledger) = setup();
        let handle = client.send(&mut host, "hi").unwrap();

        client.handle_frame(&mut host, handle.stream, &frame("flow", "Searching"));
        assert_eq!(host.statuses, vec![FlowStatus::Working("Searching".to_string())]);

        client.handle_frame(&mut host, handle.stream, &frame("chunk", "Hi"));
        assert_eq!(
            client.handle_frame(&mut host, handle.stream, &frame("error", "boom")),
            Dispatch::Closed
        );

        assert_eq!(host.text(handle.turn), "Error: boom");
        assert_eq!(host.style(handle.turn), TurnStyle::Error);
        assert_eq!(ledger.borrow().closed, vec![handle.stream]);

        assert_eq!(
            client.handle_frame(&mut host, handle.stream, &frame("chunk", "late")),
            Dispatch::Ignored
        );
        assert_eq!(host.text(handle.turn), "Error: boom");
        assert_eq!(host.statuses.len(), 1);
    }

    #[test]
    fn test_empty_flow_shows_default_status() {
        let (mut client, mut host, _) = setup();
        let handle = client.send(&mut host, "hi").unwrap();

        client.handle_frame(&mut host, handle.stream, r#"{"type":"flow","content":""}"#);

        assert_eq!(host.statuses, vec![FlowStatus::Working(FLOW_DEFAULT.to_string())]);
    }

    #[test]
    fn test_malformed_frame_fails_turn_once() {
        let (mut client, mut host, ledger) = setup();
        let handle = client.send(&mut host, "hi").unwrap();

        client.handle_frame(&mut host, handle.stream, &frame("flow", "generate"));
        client.handle_frame(&mut host, handle.stream, &frame("chunk", "partial"));
        assert_eq!(client.handle_frame(&mut host, handle.stream, "{not json"), Dispatch::Closed);
        assert_eq!(client.handle_frame(&mut host, handle.stream, "{still not json"), Dispatch::Ignored);

        assert_eq!(host.text(handle.turn), MALFORMED_EVENT_MESSAGE);
        assert_eq!(host.style(handle.turn), TurnStyle::Error);
        assert_eq!(ledger.borrow().closed, vec![handle.stream]);
    }

    #[test]
    fn test_unknown_event_type_is_ignored() {
        let (mut client, mut host, ledger) = setup();
        let handle = client.send(&mut host, "hi").unwrap();

        assert_eq!(
            client.handle_frame(&mut host, handle.stream, r#"{"type":"heartbeat"}"#),
            Dispatch::Ignored
        );
        client.handle_frame(&mut host, handle.stream, &frame("chunk", "ok"));

        assert!(client.is_streaming());
        assert_eq!(host.text(handle.turn), "ok");
        assert!(ledger.borrow().closed.is_empty());
    }

    #[test]
    fn test_second_send_cancels_first_stream() {
        let (mut client, mut host, ledger) = setup();

        let first = client.send(&mut host, "one").unwrap();
        client.handle_frame(&mut host, first.stream, &frame("chunk", "par"));
        let second = client.send(&mut host, "two").unwrap();

        assert_ne!(first.stream, second.stream);
        assert_eq!(ledger.borrow().closed, vec![first.stream]);
        assert_eq!(ledger.borrow().opened.len(), 2);
        assert_eq!(host.turns.len(), 4);

        // late events for the first stream are dropped
        assert_eq!(
            client.handle_frame(&mut host, first.stream, &frame("chunk", "tial")),
            Dispatch::Ignored
        );
        assert_eq!(
            client.handle_transport_error(&mut host, first.stream, "reset"),
            Dispatch::Ignored
        );
        assert_eq!(host.text(first.turn), "par");

        client.handle_frame(&mut host, second.stream, &frame("chunk", "fresh"));
        assert_eq!(host.text(second.turn), "fresh");
        assert_eq!(client.active(), Some(second));
    }

    #[test]
    fn test_transport_error_before_first_event() {
        let (mut client, mut host, ledger) = setup();
        let handle = client.send(&mut host, "hi").unwrap();

        assert_eq!(
            client.handle_transport_error(&mut host, handle.stream, "connection refused"),
            Dispatch::Closed
        );

        assert_eq!(host.text(handle.turn), CONNECTION_ERROR_MESSAGE);
        assert_eq!(host.style(handle.turn), TurnStyle::Error);
        assert_eq!(host.statuses, vec![FlowStatus::Error]);
        assert_eq!(ledger.borrow().closed, vec![handle.stream]);
    }

    #[test]
    fn test_server_hangup_mid_stream_is_a_transport_error() {
        let (mut client, mut host, ledger) = setup();
        let handle = client.send(&mut host, "hi").unwrap();

        client.handle_frame(&mut host, handle.stream, &frame("chunk", "half"));
        assert_eq!(client.handle_transport_closed(&mut host, handle.stream), Dispatch::Closed);

        assert_eq!(host.text(handle.turn), CONNECTION_ERROR_MESSAGE);
        assert_eq!(host.statuses.last(), Some(&FlowStatus::Error));
        assert_eq!(ledger.borrow().closed.len(), 1);
    }

    #[test]
    fn test_clear_while_streaming() {
        let (mut client, mut host, ledger) = setup();
        let handle = client.send(&mut host, "hi").unwrap();
        client.handle_frame(&mut host, handle.stream, &frame("flow", "generate"));

        client.clear(&mut host);

        assert!(host.turns.is_empty());
        assert_eq!(host.statuses.last(), Some(&FlowStatus::Idle));
        assert_eq!(ledger.borrow().closed, vec![handle.stream]);
        assert!(!client.is_streaming());
        assert_eq!(
            client.handle_frame(&mut host, handle.stream, &frame("chunk", "x")),
            Dispatch::Ignored
        );
    }

    #[test]
    fn test_clear_when_idle() {
        let (mut client, mut host, ledger) = setup();
        host.append_turn(ChatTurn::user("left over"));

        client.clear(&mut host);

        assert!(host.turns.is_empty());
        assert_eq!(host.statuses, vec![FlowStatus::Idle]);
        assert!(ledger.borrow().closed.is_empty());
    }

    #[test]
    fn test_flow_status_display() {
        assert_eq!(FlowStatus::Idle.to_string(), "Idle");
        assert_eq!(FlowStatus::Error.to_string(), "Error");
        assert_eq!(FlowStatus::Working("retrieve".into()).to_string(), "retrieve");
    }
}
