use crate::settings::{SettingsField, SettingsForm};
use crate::ui::{focus_style, status_line};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw_settings(f: &mut Frame, area: Rect, form: &SettingsForm) {
    let row = |field: SettingsField, label: &str, value: String| {
        let marker = if form.focus == field { "▸ " } else { "  " };
        Line::from(vec![
            Span::styled(marker, focus_style(form.focus == field)),
            Span::styled(format!("{:<16}", label), Style::default().fg(Color::Gray)),
            Span::styled(value, focus_style(form.focus == field)),
        ])
    };

    let temperature_bar = slider(form.temperature(), 1.0);
    let iterations_bar = slider(form.max_iterations() as f32, 10.0);
    let save_label = if form.is_saving() { "[ Saving... ]" } else { "[ Save ]" };

    let mut lines = vec![
        row(
            SettingsField::Model,
            "Model",
            format!("◂ {} ▸", form.model().unwrap_or("(none configured)")),
        ),
        row(
            SettingsField::Temperature,
            "Temperature",
            format!("{} {}", temperature_bar, form.temperature_label()),
        ),
        row(
            SettingsField::MaxIterations,
            "Max Iterations",
            format!("{} {}", iterations_bar, form.max_iterations()),
        ),
        row(
            SettingsField::Reflect,
            "Reflect",
            if form.reflect { "[x]" } else { "[ ]" }.to_string(),
        ),
        row(
            SettingsField::Framework,
            "Framework",
            if form.framework.is_empty() && form.focus != SettingsField::Framework {
                "(any framework)".to_string()
            } else {
                format!("{}▏", form.framework)
            },
        ),
        Line::from(""),
        row(SettingsField::Save, "", save_label.to_string()),
        Line::from(""),
    ];
    if let Some(status) = &form.status {
        lines.push(status_line(status));
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Code Generation Settings"),
    );
    f.render_widget(panel, area);
}

fn slider(value: f32, max: f32) -> String {
    const WIDTH: usize = 20;
    let filled = ((value / max) * WIDTH as f32).round() as usize;
    let filled = filled.min(WIDTH);
    format!("{}{}", "━".repeat(filled), "─".repeat(WIDTH - filled))
}
