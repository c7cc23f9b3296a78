//! Help popup overlay listing the current key bindings.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::config::{Action, AppConfig};

use super::layout::centered_fixed;

pub struct HelpPopup<'a> {
    pub config: &'a AppConfig,
}

impl<'a> Widget for HelpPopup<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // actions + blank + step line + blank + hint + 2 border
        let height = (Action::ALL.len() as u16) + 7;
        let popup = centered_fixed(52, height, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Controls ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(popup);
        block.render(popup, buf);

        let label_style = Style::default().fg(Color::White);
        let key_style = Style::default().fg(Color::Yellow);
        let dim = Style::default().fg(Color::DarkGray);

        let mut lines = vec![Line::raw("")];
        for &action in Action::ALL {
            // Fixed-width columns: label left-aligned, keys right-aligned.
            let label_col = format!("   {:<24}", action.label());
            let keys_width = (inner.width as usize).saturating_sub(label_col.len()).max(1);
            let keys = self.config.display_bindings(action);
            lines.push(Line::from(vec![
                Span::styled(label_col, label_style),
                Span::styled(format!("{keys:>keys_width$}"), key_style),
            ]));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("   Auto-sort step: {} ms", self.config.auto_sort_step_ms),
            dim,
        )));
        lines.push(Line::from(Span::styled("   Esc/?: close", dim)));

        Paragraph::new(lines).render(inner, buf);
    }
}
