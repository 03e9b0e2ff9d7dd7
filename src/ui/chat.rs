use crate::chat_message::render_turn;
use crate::transcript::Transcript;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw_chat(f: &mut Frame, area: Rect, transcript: &mut Transcript) {
    let input_height = (transcript.input.split('\n').count() as u16 + 1).min(6);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(input_height),
        ])
        .split(area);

    draw_messages(f, chunks[0], transcript);
    transcript.status.render(f, chunks[1]);
    draw_input(f, chunks[2], transcript);
}

fn draw_messages(f: &mut Frame, area: Rect, transcript: &mut Transcript) {
    let mut lines = Vec::new();
    for turn in &transcript.turns {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.extend(render_turn(turn, area.width));
    }

    let max_scroll = max_scroll(lines.len(), area.height);
    if transcript.follow || transcript.scroll > max_scroll {
        transcript.scroll = max_scroll;
    }

    let messages = Paragraph::new(lines).block(Block::default());
    f.render_widget(messages.scroll((transcript.scroll, 0)), area);
}

/// Highest scroll offset that still fills the view. Saturates rather than
/// wrapping on very long transcripts.
fn max_scroll(total_lines: usize, height: u16) -> u16 {
    u16::try_from(total_lines)
        .unwrap_or(u16::MAX)
        .saturating_sub(height)
}

fn draw_input(f: &mut Frame, area: Rect, transcript: &Transcript) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = transcript
        .input
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            let prefix = if i == 0 { "→ " } else { "  " };
            Line::from(vec![
                Span::styled(prefix, Style::default().fg(Color::DarkGray)),
                Span::styled(line.to_string(), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    let visible = inner.height.max(1) as usize;
    if lines.len() > visible {
        lines.drain(..lines.len() - visible);
    }
    let cursor_row = lines.len().saturating_sub(1) as u16;
    let last_width = transcript
        .input
        .rsplit('\n')
        .next()
        .map(|l| unicode_width::UnicodeWidthStr::width(l) as u16)
        .unwrap_or(0);

    f.render_widget(Paragraph::new(lines), inner);
    f.set_cursor_position((
        (inner.x + 2 + last_width).min(inner.right().saturating_sub(1)),
        inner.y + cursor_row,
    ));
}
