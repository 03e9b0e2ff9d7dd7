use crate::chat::FlowStatus;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

#[derive(Debug)]
pub struct StatusIndicator {
    thinking: bool,
    status: FlowStatus,
    spinner_idx: usize,
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self {
            thinking: false,
            status: FlowStatus::Idle,
            spinner_idx: 0,
        }
    }

    pub fn set_thinking(&mut self, thinking: bool) {
        self.thinking = thinking;
    }

    pub fn set_status(&mut self, status: FlowStatus) {
        self.status = status;
    }

    pub fn status(&self) -> &FlowStatus {
        &self.status
    }

    pub fn update_spinner(&mut self) {
        self.spinner_idx = self.spinner_idx.wrapping_add(1);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let spinner_frames = ["◐", "◓", "◑", "◒"];
        let thinking_indicator = if self.thinking {
            spinner_frames[self.spinner_idx % spinner_frames.len()]
        } else {
            " "
        };

        let status_color = match self.status {
            FlowStatus::Error => Color::Red,
            FlowStatus::Working(_) => Color::Yellow,
            FlowStatus::Idle => Color::DarkGray,
        };

        let status = Line::from(vec![
            Span::styled(thinking_indicator, Style::default().fg(Color::Gray)),
            Span::raw(" "),
            Span::styled(self.status.to_string(), Style::default().fg(status_color)),
        ]);

        frame.render_widget(
            Paragraph::new(status).alignment(ratatui::layout::Alignment::Left),
            Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.min(1),
            },
        );
    }
}
