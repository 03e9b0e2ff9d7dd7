use crate::app::{App, Command, Tab};
use crate::chat::ChatBackend;
use crate::documents::DocumentsField;
use crate::settings::SettingsField;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub fn handle_key<B: ChatBackend>(app: &mut App<B>, key: KeyEvent) -> Vec<Command> {
    if key.kind == KeyEventKind::Release {
        return Vec::new();
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => {
                app.should_quit = true;
                return Vec::new();
            }
            KeyCode::Char('r') => {
                app.documents.begin_load_sources();
                return vec![Command::LoadSources];
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Tab => {
            app.tab = app.tab.next();
            Vec::new()
        }
        KeyCode::BackTab => {
            app.tab = app.tab.previous();
            Vec::new()
        }
        _ => match app.tab {
            Tab::Chat => {
                handle_chat_input(app, key);
                Vec::new()
            }
            Tab::Settings => handle_settings_input(app, key),
            Tab::Documents => handle_documents_input(app, key),
        },
    }
}

fn handle_chat_input<B: ChatBackend>(app: &mut App<B>, key: KeyEvent) {
    match key.code {
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            app.transcript.input.push('\n');
        }
        KeyCode::Enter if key.modifiers.is_empty() => app.send_input(),
        KeyCode::Enter => {}
        KeyCode::PageUp => app.transcript.scroll_up(),
        KeyCode::PageDown => app.transcript.scroll_down(),
        KeyCode::End => app.transcript.scroll_to_bottom(),
        KeyCode::Backspace => {
            app.transcript.input.pop();
        }
        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => app.clear_chat(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.transcript.input.push(c);
        }
        _ => {}
    }
}

fn handle_settings_input<B: ChatBackend>(app: &mut App<B>, key: KeyEvent) -> Vec<Command> {
    let form = &mut app.settings;
    match key.code {
        KeyCode::Up => form.focus_previous(),
        KeyCode::Down => form.focus_next(),
        KeyCode::Left => form.adjust(-1),
        KeyCode::Right => form.adjust(1),
        KeyCode::Char(' ') if form.focus == SettingsField::Reflect => form.adjust(1),
        KeyCode::Enter if form.focus == SettingsField::Save => {
            return form.begin_save().map(Command::SaveSettings).into_iter().collect();
        }
        KeyCode::Enter => form.focus_next(),
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => form.push_char(c),
        _ => {}
    }
    Vec::new()
}

fn handle_documents_input<B: ChatBackend>(app: &mut App<B>, key: KeyEvent) -> Vec<Command> {
    let panel = &mut app.documents;
    match key.code {
        KeyCode::Up => panel.focus_previous(),
        KeyCode::Down => panel.focus_next(),
        KeyCode::Left if panel.focus == DocumentsField::MaxDepth => panel.adjust_depth(-1),
        KeyCode::Right if panel.focus == DocumentsField::MaxDepth => panel.adjust_depth(1),
        KeyCode::Enter => {
            let command = match panel.focus {
                DocumentsField::Url | DocumentsField::MaxDepth => {
                    panel.begin_upload_url().map(Command::UploadUrl)
                }
                DocumentsField::Files => panel.begin_upload_files().map(Command::UploadFiles),
                DocumentsField::DeleteSource => panel.begin_delete().map(Command::DeleteSource),
            };
            return command.into_iter().collect();
        }
        KeyCode::Backspace => panel.pop_char(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => panel.push_char(c),
        _ => {}
    }
    Vec::new()
}
