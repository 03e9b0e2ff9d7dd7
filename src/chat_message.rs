use crate::models::{ChatTurn, Role, TurnStyle};
use crate::render::{render_blocks, RenderedBlock};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use textwrap::wrap;

/// Draws one turn as terminal lines: header, body, footer.
///
/// User text is shown exactly as typed. Bot text goes through
/// `render_blocks`, so fenced code gets the preformatted treatment.
pub fn render_turn(turn: &ChatTurn, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let style = base_style(turn);
    let indent = if turn.role == Role::User { "  " } else { "" };

    render_header(&mut lines, turn, style, indent);

    match turn.role {
        Role::User => flush_text(&mut lines, &turn.text, width, style, indent),
        Role::Bot if turn.style == TurnStyle::Error => {
            flush_text(&mut lines, &turn.text, width, style, indent)
        }
        Role::Bot => {
            for block in render_blocks(&turn.text) {
                match block {
                    RenderedBlock::Text(text) => flush_text(&mut lines, &text, width, style, indent),
                    RenderedBlock::Code { language, code } => {
                        flush_code(&mut lines, language.as_deref(), &code, style, indent)
                    }
                }
            }
        }
    }

    lines.push(Line::from(vec![
        Span::styled(indent.to_string(), style),
        Span::styled("╰─".to_string(), style),
    ]));
    lines
}

fn base_style(turn: &ChatTurn) -> Style {
    let style = Style::default().fg(match turn.role {
        Role::User => Color::Rgb(255, 223, 128),
        Role::Bot => Color::Rgb(144, 238, 144),
    });

    match turn.style {
        TurnStyle::Error => style.fg(Color::Red),
        TurnStyle::Pending => style.add_modifier(Modifier::DIM),
        TurnStyle::Normal => style,
    }
}

fn render_header(lines: &mut Vec<Line<'static>>, turn: &ChatTurn, style: Style, indent: &str) {
    let who = match turn.role {
        Role::User => "You",
        Role::Bot => "Assistant",
    };
    lines.push(Line::from(vec![
        Span::styled(indent.to_string(), style),
        Span::styled("┌─ ".to_string(), style),
        Span::styled(who.to_string(), style.add_modifier(Modifier::BOLD)),
        Span::styled(" ".to_string(), style),
        Span::styled(
            turn.timestamp.format("%H:%M").to_string(),
            style.add_modifier(Modifier::DIM),
        ),
    ]));
}

fn flush_text(lines: &mut Vec<Line<'static>>, text: &str, width: u16, style: Style, indent: &str) {
    let wrap_width = (width as usize).saturating_sub(4 + indent.len()).max(1);

    for source_line in text.lines() {
        if source_line.is_empty() {
            lines.push(Line::from(vec![
                Span::styled(indent.to_string(), style),
                Span::styled("│".to_string(), style),
            ]));
            continue;
        }
        for wrapped in wrap(source_line, wrap_width) {
            lines.push(Line::from(vec![
                Span::styled(indent.to_string(), style),
                Span::styled("│ ".to_string(), style),
                Span::styled(wrapped.into_owned(), style),
            ]));
        }
    }
}

fn flush_code(
    lines: &mut Vec<Line<'static>>,
    language: Option<&str>,
    code: &str,
    style: Style,
    indent: &str,
) {
    let code_style = Style::default()
        .fg(Color::Rgb(209, 154, 102))
        .add_modifier(Modifier::BOLD);
    let gutter = Style::default().fg(Color::DarkGray);

    lines.push(Line::from(vec![
        Span::styled(indent.to_string(), style),
        Span::styled("│ ".to_string(), style),
        Span::styled(format!("▎{}", language.unwrap_or("code")), gutter),
    ]));

    // preformatted: no wrapping, whitespace kept
    for code_line in code.lines() {
        lines.push(Line::from(vec![
            Span::styled(indent.to_string(), style),
            Span::styled("│ ".to_string(), style),
            Span::styled("▎".to_string(), gutter),
            Span::styled(format!(" {}", code_line), code_style),
        ]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_user_text_is_not_interpreted() {
        let turn = ChatTurn::user("```python\nprint(1)\n```");
        let text = plain(&render_turn(&turn, 80));
        assert!(text.iter().any(|l| l.ends_with("```python")));
        assert!(!text.iter().any(|l| l.contains("▎")));
    }

    #[test]
    fn test_bot_code_is_preformatted() {
        let mut turn = ChatTurn::bot_placeholder();
        turn.style = TurnStyle::Normal;
        turn.text = "Try:\n```python\n    x = 1\n```".to_string();

        let text = plain(&render_turn(&turn, 80));
        assert!(text.iter().any(|l| l == "│ Try:"));
        assert!(text.iter().any(|l| l == "│ ▎python"));
        assert!(text.iter().any(|l| l == "│ ▎     x = 1"));
        assert!(!text.iter().any(|l| l.contains("```")));
    }

    #[test]
    fn test_long_text_wraps() {
        let turn = ChatTurn::user("word ".repeat(40));
        let lines = render_turn(&turn, 30);
        // header + several wrapped lines + footer
        assert!(lines.len() > 4);
    }
}
