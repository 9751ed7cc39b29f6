use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::data::CountryRecord;
use crate::palette::{self, CategoryStyle};

/// Shown when no cost is listed
pub const FREE: &str = "免费";
/// Rows one card occupies in the grid
pub const CARD_HEIGHT: u16 = 8;

/// Everything a card shows, derived from one record
#[derive(Debug, PartialEq)]
pub struct CardView {
    pub glyph: &'static str,
    pub name: &'static str,
    pub badge_label: &'static str,
    pub region: &'static str,
    pub duration: String,
    pub cost: &'static str,
    pub cost_is_free: bool,
    pub note: Option<&'static str>,
    style: &'static CategoryStyle,
}

impl CardView {
    pub fn of(record: &CountryRecord) -> Self {
        let style = palette::style_for(record.category);
        let cost = record.cost.unwrap_or(FREE);
        Self {
            glyph: record.glyph,
            name: record.name,
            badge_label: style.label,
            region: record.region.label(),
            duration: record.days.replace(" 天", "天"),
            cost,
            cost_is_free: cost == FREE,
            note: record.note,
            style,
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, hovered: bool) {
        let muted = Style::default().fg(palette::MUTED_TEXT.solid());
        let strong = Style::default()
            .fg(palette::LABEL_TEXT.solid())
            .add_modifier(Modifier::BOLD);
        let border = if hovered {
            palette::ACCENT.solid()
        } else {
            self.style.badge_border.over(palette::MUTED_TEXT)
        };

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(palette::PAGE_BACKGROUND.solid()));
        if hovered {
            block = block.title_bottom(Line::from(Span::styled(" › ", strong)).right_aligned());
        }
        let inner = block.inner(area);
        f.render_widget(block, area);
        if inner.height == 0 {
            return;
        }

        let [accent, header, _, fields, note] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .areas(inner);

        // thin line in the category colour across the top
        let accent_line = "▔".repeat(inner.width as usize);
        f.render_widget(
            Paragraph::new(accent_line).style(Style::default().fg(self.style.badge_text.solid())),
            accent,
        );

        let badge = Span::styled(
            format!(" {} ", self.badge_label),
            Style::default()
                .fg(self.style.badge_text.solid())
                .bg(self.style.badge_bg.solid())
                .add_modifier(Modifier::BOLD),
        );
        let badge_width = badge.width() as u16;
        let [title_area, badge_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(badge_width)]).areas(header);
        let name_style = if hovered { strong.fg(palette::ACCENT.solid()) } else { strong };
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw(self.glyph),
                Span::raw(" "),
                Span::styled(self.name, name_style),
            ])),
            title_area,
        );
        f.render_widget(Paragraph::new(Line::from(badge)), badge_area);

        let cost_style = if self.cost_is_free {
            strong.fg(palette::style_for(crate::data::VisaCategory::VisaFree).badge_text.solid())
        } else {
            strong
        };
        let columns = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(fields);
        let cells = [
            ("区域", Span::styled(self.region, strong)),
            ("停留", Span::styled(self.duration.clone(), strong)),
            ("费用", Span::styled(self.cost, cost_style)),
        ];
        for ((label, value), col) in cells.into_iter().zip(columns.iter()) {
            let cell = Paragraph::new(vec![
                Line::from(Span::styled(label, muted)),
                Line::from(value),
            ])
            .alignment(Alignment::Center);
            f.render_widget(cell, *col);
        }

        if let Some(text) = self.note {
            let line = Line::from(vec![
                Span::styled("ⓘ ", Style::default().fg(palette::ACCENT.solid())),
                Span::styled(text, muted),
            ]);
            f.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), note);
        }
    }
}
