use crate::api::{ReplyOutcome, TransportEvent};
use crate::chat::{ChatBackend, StreamingChatClient};
use crate::documents::DocumentsPanel;
use crate::errors::ChatResult;
use crate::models::{Settings, UrlUploadRequest};
use crate::settings::SettingsForm;
use crate::transcript::Transcript;
use crossterm::event::KeyEvent;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Chat,
    Settings,
    Documents,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Chat, Tab::Settings, Tab::Documents];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Chat => "Chat",
            Tab::Settings => "Settings",
            Tab::Documents => "Documents",
        }
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn previous(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Everything the UI loop reacts to, delivered one at a time.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Transport(TransportEvent),
    Reply(Reply),
}

impl From<TransportEvent> for AppEvent {
    fn from(event: TransportEvent) -> Self {
        AppEvent::Transport(event)
    }
}

/// Results of the form requests started by `Command`s.
#[derive(Debug)]
pub enum Reply {
    SettingsSaved(ChatResult<ReplyOutcome>),
    SourcesLoaded(ChatResult<Vec<String>>),
    UrlUploaded(ChatResult<ReplyOutcome>),
    FilesUploaded(ChatResult<ReplyOutcome>),
    SourceDeleted {
        source: String,
        result: ChatResult<ReplyOutcome>,
    },
}

/// Request/response work the loop must start on the app's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SaveSettings(Settings),
    LoadSources,
    UploadUrl(UrlUploadRequest),
    UploadFiles(Vec<PathBuf>),
    DeleteSource(String),
}

pub struct App<B: ChatBackend> {
    pub tab: Tab,
    pub chat: StreamingChatClient<B>,
    pub transcript: Transcript,
    pub settings: SettingsForm,
    pub documents: DocumentsPanel,
    pub should_quit: bool,
}

impl<B: ChatBackend> App<B> {
    pub fn new(backend: B, models: Vec<String>, default_model: &str) -> Self {
        Self {
            tab: Tab::Chat,
            chat: StreamingChatClient::new(backend),
            transcript: Transcript::new(),
            settings: SettingsForm::new(models).with_default_model(default_model),
            documents: DocumentsPanel::new(),
            should_quit: false,
        }
    }

    /// Work to start before the first event: the source list.
    pub fn startup(&mut self) -> Vec<Command> {
        self.documents.begin_load_sources();
        vec![Command::LoadSources]
    }

    pub fn update(&mut self, event: AppEvent) -> Vec<Command> {
        match event {
            AppEvent::Key(key) => crate::key_handlers::handle_key(self, key),
            AppEvent::Tick => {
                self.transcript.status.set_thinking(self.chat.is_streaming());
                self.transcript.status.update_spinner();
                Vec::new()
            }
            AppEvent::Transport(event) => {
                self.handle_transport(event);
                Vec::new()
            }
            AppEvent::Reply(reply) => self.handle_reply(reply),
        }
    }

    pub fn send_input(&mut self) {
        let input = self.transcript.input.clone();
        self.chat.send(&mut self.transcript, &input);
        self.transcript.status.set_thinking(self.chat.is_streaming());
    }

    pub fn clear_chat(&mut self) {
        self.chat.clear(&mut self.transcript);
        self.transcript.status.set_thinking(false);
    }

    fn handle_transport(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Frame { stream, data } => {
                self.chat.handle_frame(&mut self.transcript, stream, &data);
            }
            TransportEvent::Failed { stream, reason } => {
                self.chat
                    .handle_transport_error(&mut self.transcript, stream, &reason);
            }
            TransportEvent::Closed { stream } => {
                self.chat.handle_transport_closed(&mut self.transcript, stream);
            }
        }
        self.transcript.status.set_thinking(self.chat.is_streaming());
    }

    fn handle_reply(&mut self, reply: Reply) -> Vec<Command> {
        let refresh = match reply {
            Reply::SettingsSaved(result) => {
                self.settings.finish_save(&result);
                false
            }
            Reply::SourcesLoaded(result) => {
                self.documents.finish_load_sources(result);
                false
            }
            Reply::UrlUploaded(result) => self.documents.finish_upload_url(&result),
            Reply::FilesUploaded(result) => self.documents.finish_upload_files(&result),
            Reply::SourceDeleted { source, result } => {
                self.documents.finish_delete(&source, &result)
            }
        };

        if refresh {
            self.documents.begin_load_sources();
            vec![Command::LoadSources]
        } else {
            Vec::new()
        }
    }
}
