// src/render.rs

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

/// A piece of a bot reply as it should be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBlock {
    /// Shown exactly as received.
    Text(String),
    /// A fenced code block, shown preformatted.
    Code {
        language: Option<String>,
        code: String,
    },
}

/// Splits bot text into verbatim text and fenced code blocks.
///
/// Only fences are interpreted; every other construct stays as the backend
/// wrote it. A fence that has not been closed yet (mid-stream) runs to the
/// end of the text.
pub fn render_blocks(text: &str) -> Vec<RenderedBlock> {
    let mut blocks = Vec::new();
    let mut cursor = 0;
    let mut current: Option<(Option<String>, String)> = None;

    for (event, range) in Parser::new(text).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                push_text(&mut blocks, &text[cursor..range.start]);
                let language = info.split_whitespace().next().map(str::to_string);
                current = Some((language, String::new()));
            }
            Event::Text(content) => {
                if let Some((_, code)) = current.as_mut() {
                    code.push_str(&content);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, mut code)) = current.take() {
                    if code.ends_with('\n') {
                        code.pop();
                    }
                    blocks.push(RenderedBlock::Code { language, code });
                    cursor = range.end.max(cursor);
                }
            }
            _ => {}
        }
    }

    push_text(&mut blocks, &text[cursor.min(text.len())..]);
    blocks
}

fn push_text(blocks: &mut Vec<RenderedBlock>, text: &str) {
    let text = text.trim_matches(|c| c == '\n' || c == '\r');
    if !text.trim().is_empty() {
        blocks.push(RenderedBlock::Text(text.to_string()));
    }
}
