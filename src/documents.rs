// src/documents.rs

use crate::api::ReplyOutcome;
use crate::constants::{ALLOWED_UPLOAD_EXTENSIONS, DEFAULT_MAX_DEPTH, MAX_DEPTH_MAX};
use crate::errors::ChatResult;
use crate::models::UrlUploadRequest;
use crate::panel::{status_from_outcome, FailureText, PanelStatus};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentsField {
    Url,
    MaxDepth,
    Files,
    DeleteSource,
}

const FIELD_ORDER: [DocumentsField; 4] = [
    DocumentsField::Url,
    DocumentsField::MaxDepth,
    DocumentsField::Files,
    DocumentsField::DeleteSource,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceList {
    Loading,
    Loaded(Vec<String>),
    Failed,
}

impl SourceList {
    /// Lines for the source list view.
    pub fn lines(&self) -> Vec<String> {
        match self {
            SourceList::Loading => vec!["Loading sources...".to_string()],
            SourceList::Loaded(sources) if sources.is_empty() => {
                vec!["No sources found.".to_string()]
            }
            SourceList::Loaded(sources) => sources.clone(),
            SourceList::Failed => vec!["Error loading sources.".to_string()],
        }
    }
}

/// Document source management: upload by URL or file, delete, list.
#[derive(Debug, Clone)]
pub struct DocumentsPanel {
    pub url_input: String,
    max_depth: u32,
    pub files_input: String,
    pub delete_input: String,
    pub focus: DocumentsField,
    pub upload_status: Option<PanelStatus>,
    pub delete_status: Option<PanelStatus>,
    pub sources: SourceList,
    uploading_url: bool,
    uploading_files: bool,
    deleting: bool,
}

impl Default for DocumentsPanel {
    fn default() -> Self {
        Self {
            url_input: String::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            files_input: String::new(),
            delete_input: String::new(),
            focus: DocumentsField::Url,
            upload_status: None,
            delete_status: None,
            sources: SourceList::Loading,
            uploading_url: false,
            uploading_files: false,
            deleting: false,
        }
    }
}

impl DocumentsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn is_busy(&self, field: DocumentsField) -> bool {
        match field {
            DocumentsField::Url | DocumentsField::MaxDepth => self.uploading_url,
            DocumentsField::Files => self.uploading_files,
            DocumentsField::DeleteSource => self.deleting,
        }
    }

    pub fn focus_next(&mut self) {
        let idx = FIELD_ORDER.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = FIELD_ORDER[(idx + 1) % FIELD_ORDER.len()];
    }

    pub fn focus_previous(&mut self) {
        let idx = FIELD_ORDER.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = FIELD_ORDER[(idx + FIELD_ORDER.len() - 1) % FIELD_ORDER.len()];
    }

    pub fn adjust_depth(&mut self, step: i32) {
        let value = self.max_depth as i32 + step;
        self.max_depth = value.clamp(0, MAX_DEPTH_MAX as i32) as u32;
    }

    fn focused_input(&mut self) -> Option<&mut String> {
        match self.focus {
            DocumentsField::Url => Some(&mut self.url_input),
            DocumentsField::Files => Some(&mut self.files_input),
            DocumentsField::DeleteSource => Some(&mut self.delete_input),
            DocumentsField::MaxDepth => None,
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(input) = self.focused_input() {
            input.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(input) = self.focused_input() {
            input.pop();
        }
    }

    pub fn begin_load_sources(&mut self) {
        self.sources = SourceList::Loading;
    }

    pub fn finish_load_sources(&mut self, result: ChatResult<Vec<String>>) {
        self.sources = match result {
            Ok(sources) => SourceList::Loaded(sources),
            Err(e) => {
                log::error!("Error fetching sources: {}", e);
                SourceList::Failed
            }
        };
    }

    pub fn begin_upload_url(&mut self) -> Option<UrlUploadRequest> {
        if self.uploading_url {
            return None;
        }
        let url = self.url_input.trim();
        if url.is_empty() {
            self.upload_status = Some(PanelStatus::error("Please enter a URL."));
            return None;
        }

        self.upload_status = Some(PanelStatus::info(format!("Loading from {}...", url)));
        self.uploading_url = true;
        Some(UrlUploadRequest {
            url: url.to_string(),
            max_depth: self.max_depth,
        })
    }

    /// Returns true when the source list should be refreshed.
    pub fn finish_upload_url(&mut self, result: &ChatResult<ReplyOutcome>) -> bool {
        self.uploading_url = false;
        let succeeded = matches!(result, Ok(outcome) if outcome.success);
        self.upload_status = Some(status_from_outcome(
            result,
            "URL processed.",
            "Failed to process URL.",
            FailureText::DetailThenStatus,
        ));
        if succeeded {
            self.url_input.clear();
        }
        succeeded
    }

    pub fn begin_upload_files(&mut self) -> Option<Vec<PathBuf>> {
        if self.uploading_files {
            return None;
        }
        match parse_upload_paths(&self.files_input) {
            Ok(paths) => {
                self.upload_status = Some(PanelStatus::info(format!(
                    "Uploading {} file(s)...",
                    paths.len()
                )));
                self.uploading_files = true;
                Some(paths)
            }
            Err(message) => {
                self.upload_status = Some(PanelStatus::error(message));
                None
            }
        }
    }

    pub fn finish_upload_files(&mut self, result: &ChatResult<ReplyOutcome>) -> bool {
        self.uploading_files = false;
        let succeeded = matches!(result, Ok(outcome) if outcome.success);
        let processed = match result {
            Ok(outcome) => outcome.reply.files_processed,
            Err(_) => None,
        };
        let success_fallback = match processed {
            Some(count) => format!("Processed {} file(s).", count),
            None => "Files uploaded successfully.".to_string(),
        };
        self.upload_status = Some(status_from_outcome(
            result,
            &success_fallback,
            "Failed to upload files.",
            FailureText::DetailThenStatus,
        ));
        if succeeded {
            self.files_input.clear();
        }
        succeeded
    }

    pub fn begin_delete(&mut self) -> Option<String> {
        if self.deleting {
            return None;
        }
        let source = self.delete_input.trim();
        if source.is_empty() {
            self.delete_status = Some(PanelStatus::error(
                "Please enter a source name to delete.",
            ));
            return None;
        }

        self.delete_status = Some(PanelStatus::info(format!("Deleting source: {}...", source)));
        self.deleting = true;
        Some(source.to_string())
    }

    pub fn finish_delete(&mut self, source: &str, result: &ChatResult<ReplyOutcome>) -> bool {
        self.deleting = false;
        let succeeded = matches!(result, Ok(outcome) if outcome.success);
        self.delete_status = Some(status_from_outcome(
            result,
            &format!("Source '{}' deleted.", source),
            "Failed to delete source.",
            FailureText::DetailThenStatus,
        ));
        if succeeded {
            self.delete_input.clear();
        }
        succeeded
    }
}

/// Parses the comma-separated file list and checks extensions before
/// anything is read from disk.
pub fn parse_upload_paths(input: &str) -> Result<Vec<PathBuf>, String> {
    let paths: Vec<PathBuf> = input
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect();

    if paths.is_empty() {
        return Err("Please select files to upload.".to_string());
    }

    for path in &paths {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.as_str()) {
            return Err(format!(
                "File type '.{}' not allowed for file '{}'. Allowed types: .pdf, .txt, .md",
                ext,
                path.display()
            ));
        }
    }

    Ok(paths)
}
