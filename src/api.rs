use crate::{
    chat::{ChatBackend, StreamChannel, StreamId},
    constants::{
        CHAT_STREAM_PATH, DELETE_SOURCE_PATH, SETTINGS_PATH, SOURCES_PATH, UPLOAD_FILES_PATH,
        UPLOAD_URL_PATH,
    },
    errors::{ChatError, ChatResult},
    logging::log_api_call,
    models::{ApiCallLog, DeleteSourceRequest, ServerReply, Settings, UrlUploadRequest},
};
use chrono::Utc;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::{
    header::ACCEPT,
    multipart::{Form, Part},
    Client, Response,
};
use std::{path::PathBuf, time::Instant};
use tokio::{sync::mpsc, task::JoinHandle};

/// Outcome of a form-style request: whether the server accepted it, and
/// what it said either way.
#[derive(Debug, Clone)]
pub struct ReplyOutcome {
    pub success: bool,
    pub reply: ServerReply,
}

#[derive(Debug, Clone, Default)]
struct CallRecorder {
    log_dir: Option<String>,
}

impl CallRecorder {
    fn record(&self, endpoint: &str, summary: String, status: u16, started: Instant) {
        let Some(log_dir) = self.log_dir.as_deref() else {
            return;
        };
        log_api_call(
            log_dir,
            &ApiCallLog {
                timestamp: Utc::now(),
                endpoint: endpoint.to_string(),
                request_summary: summary,
                response_status: status,
                response_time_ms: started.elapsed().as_millis(),
            },
        );
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Client for the request/response endpoints: settings and document sources.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    recorder: CallRecorder,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            recorder: CallRecorder::default(),
        }
    }

    /// Records every call in `api_calls.log` under `log_dir`.
    pub fn with_call_log(mut self, log_dir: impl Into<String>) -> Self {
        self.recorder.log_dir = Some(log_dir.into());
        self
    }

    pub fn http_client(&self) -> &Client {
        &self.client
    }

    pub async fn save_settings(&self, settings: &Settings) -> ChatResult<ReplyOutcome> {
        let started = Instant::now();
        let response = self
            .client
            .post(join_url(&self.base_url, SETTINGS_PATH))
            .json(settings)
            .send()
            .await?;
        self.recorder.record(
            SETTINGS_PATH,
            format!("model={} temperature={}", settings.model, settings.temperature),
            response.status().as_u16(),
            started,
        );
        read_reply(response).await
    }

    pub async fn list_sources(&self) -> ChatResult<Vec<String>> {
        let started = Instant::now();
        let response = self
            .client
            .get(join_url(&self.base_url, SOURCES_PATH))
            .send()
            .await?;

        let status = response.status();
        self.recorder
            .record(SOURCES_PATH, "list sources".to_string(), status.as_u16(), started);
        if !status.is_success() {
            return Err(ChatError::api_error(format!("HTTP error! status: {}", status)));
        }

        Ok(response.json().await?)
    }

    pub async fn upload_url(&self, request: &UrlUploadRequest) -> ChatResult<ReplyOutcome> {
        let started = Instant::now();
        let response = self
            .client
            .post(join_url(&self.base_url, UPLOAD_URL_PATH))
            .json(request)
            .send()
            .await?;
        self.recorder.record(
            UPLOAD_URL_PATH,
            format!("url={} max_depth={}", request.url, request.max_depth),
            response.status().as_u16(),
            started,
        );
        read_reply(response).await
    }

    /// Uploads local files as repeated `files` multipart fields.
    pub async fn upload_files(&self, paths: &[PathBuf]) -> ChatResult<ReplyOutcome> {
        let mut form = Form::new();
        for path in paths {
            let bytes = tokio::fs::read(path).await?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    ChatError::invalid_input(format!("'{}' is not a file", path.display()))
                })?;
            form = form.part("files", Part::bytes(bytes).file_name(file_name));
        }

        let started = Instant::now();
        let response = self
            .client
            .post(join_url(&self.base_url, UPLOAD_FILES_PATH))
            .multipart(form)
            .send()
            .await?;
        self.recorder.record(
            UPLOAD_FILES_PATH,
            format!("{} file(s)", paths.len()),
            response.status().as_u16(),
            started,
        );
        read_reply(response).await
    }

    pub async fn delete_source(&self, source: &str) -> ChatResult<ReplyOutcome> {
        let started = Instant::now();
        let response = self
            .client
            .post(join_url(&self.base_url, DELETE_SOURCE_PATH))
            .json(&DeleteSourceRequest {
                source: source.to_string(),
            })
            .send()
            .await?;
        self.recorder.record(
            DELETE_SOURCE_PATH,
            format!("source={}", source),
            response.status().as_u16(),
            started,
        );
        read_reply(response).await
    }
}

/// Every form endpoint answers with JSON, success or not. A body that does
/// not parse is treated like an unreachable server.
async fn read_reply(response: Response) -> ChatResult<ReplyOutcome> {
    let success = response.status().is_success();
    let reply: ServerReply = response.json().await?;
    Ok(ReplyOutcome { success, reply })
}

/// Notifications from a running chat stream, tagged with its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The data of one SSE message.
    Frame { stream: StreamId, data: String },
    /// The request or the body stream failed.
    Failed { stream: StreamId, reason: String },
    /// The server finished the body.
    Closed { stream: StreamId },
}

/// A reply stream running on its own task. Closing aborts the task, which
/// drops the connection.
#[derive(Debug)]
pub struct HttpChannel {
    task: JoinHandle<()>,
}

impl StreamChannel for HttpChannel {
    fn close(&mut self) {
        self.task.abort();
    }
}

impl Drop for HttpChannel {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Streams replies from `GET /api/chat/stream`, forwarding every message
/// frame into `events` as something convertible from `TransportEvent`.
pub struct HttpChatBackend<T> {
    client: Client,
    base_url: String,
    recorder: CallRecorder,
    events: mpsc::UnboundedSender<T>,
}

impl<T> HttpChatBackend<T>
where
    T: From<TransportEvent> + Send + 'static,
{
    pub fn new(client: Client, base_url: impl Into<String>, events: mpsc::UnboundedSender<T>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            recorder: CallRecorder::default(),
            events,
        }
    }

    pub fn with_call_log(mut self, log_dir: impl Into<String>) -> Self {
        self.recorder.log_dir = Some(log_dir.into());
        self
    }
}

impl<T> ChatBackend for HttpChatBackend<T>
where
    T: From<TransportEvent> + Send + 'static,
{
    type Channel = HttpChannel;

    fn open_stream(&self, stream: StreamId, message: &str) -> HttpChannel {
        let task = tokio::spawn(pump_stream(
            self.client.clone(),
            join_url(&self.base_url, CHAT_STREAM_PATH),
            self.recorder.clone(),
            stream,
            message.to_string(),
            self.events.clone(),
        ));
        HttpChannel { task }
    }
}

async fn pump_stream<T>(
    client: Client,
    url: String,
    recorder: CallRecorder,
    stream: StreamId,
    message: String,
    events: mpsc::UnboundedSender<T>,
) where
    T: From<TransportEvent> + Send + 'static,
{
    let emit = |event: TransportEvent| events.send(T::from(event)).is_ok();
    let fail = |reason: String| {
        emit(TransportEvent::Failed { stream, reason });
    };

    let started = Instant::now();
    let response = match client
        .get(&url)
        .query(&[("message", message.as_str())])
        .header(ACCEPT, "text/event-stream")
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            fail(format!("Request failed: {}", e));
            return;
        }
    };

    let status = response.status();
    recorder.record(
        CHAT_STREAM_PATH,
        format!("stream {} ({} chars)", stream.0, message.len()),
        status.as_u16(),
        started,
    );
    if !status.is_success() {
        fail(format!("Server returned {}", status));
        return;
    }

    let mut frames = response.bytes_stream().eventsource();
    while let Some(frame) = frames.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                fail(format!("Stream error: {}", e));
                return;
            }
        };

        // named events never reach an `onmessage` listener
        if frame.event != "message" {
            log::debug!("Skipping '{}' event on stream {}", frame.event, stream.0);
            continue;
        }
        if !emit(TransportEvent::Frame {
            stream,
            data: frame.data,
        }) {
            return;
        }
    }

    emit(TransportEvent::Closed { stream });
}
