use crate::app::Tab;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Paragraph, Wrap},
    Frame,
};

/// Draws the footer with instructions for the active tab.
pub fn draw_footer(f: &mut Frame<'_>, area: Rect, tab: Tab) {
    let instructions = match tab {
        Tab::Chat => {
            "Enter send · Shift+Enter newline · PgUp/PgDn scroll · Ctrl+L clear · Tab switch · Ctrl+C quit"
        }
        Tab::Settings => {
            "Up/Down select · Left/Right change · Space toggle · Enter on Save to apply · Tab switch"
        }
        Tab::Documents => {
            "Up/Down select · Left/Right depth · Enter submit field · Ctrl+R refresh · Tab switch"
        }
    };

    let footer = Paragraph::new(instructions)
        .style(Style::default().fg(Color::LightCyan))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(footer, area);
}
