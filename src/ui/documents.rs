use crate::documents::{DocumentsField, DocumentsPanel};
use crate::ui::{focus_style, status_line};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn draw_documents(f: &mut Frame, area: Rect, panel: &DocumentsPanel) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    draw_forms(f, columns[0], panel);
    draw_sources(f, columns[1], panel);
}

fn input_row(panel: &DocumentsPanel, field: DocumentsField, label: &str, value: &str) -> Line<'static> {
    let focused = panel.focus == field;
    let busy = if panel.is_busy(field) { "  (working...)" } else { "" };
    Line::from(vec![
        Span::styled(if focused { "▸ " } else { "  " }, focus_style(focused)),
        Span::styled(format!("{:<14}", label), Style::default().fg(Color::Gray)),
        Span::styled(
            if focused {
                format!("{}▏", value)
            } else {
                value.to_string()
            },
            focus_style(focused),
        ),
        Span::styled(busy, Style::default().fg(Color::DarkGray)),
    ])
}

fn draw_forms(f: &mut Frame, area: Rect, panel: &DocumentsPanel) {
    let mut lines = vec![
        Line::from(Span::styled("Upload by link", Style::default().fg(Color::LightCyan))),
        input_row(panel, DocumentsField::Url, "URL", &panel.url_input),
        input_row(
            panel,
            DocumentsField::MaxDepth,
            "Max Depth",
            &format!("◂ {} ▸", panel.max_depth()),
        ),
        Line::from(""),
        Line::from(Span::styled(
            "Upload files (.pdf .txt .md, comma separated)",
            Style::default().fg(Color::LightCyan),
        )),
        input_row(panel, DocumentsField::Files, "Paths", &panel.files_input),
    ];
    if let Some(status) = &panel.upload_status {
        lines.push(status_line(status));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Delete source",
        Style::default().fg(Color::LightCyan),
    )));
    lines.push(input_row(
        panel,
        DocumentsField::DeleteSource,
        "Source",
        &panel.delete_input,
    ));
    if let Some(status) = &panel.delete_status {
        lines.push(status_line(status));
    }

    let forms = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Documents"));
    f.render_widget(forms, area);
}

fn draw_sources(f: &mut Frame, area: Rect, panel: &DocumentsPanel) {
    let items: Vec<ListItem> = panel
        .sources
        .lines()
        .into_iter()
        .map(|line| ListItem::new(format!("• {}", line)))
        .collect();

    let list = List::new(items)
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::ALL).title("Sources"));
    f.render_widget(list, area);
}
