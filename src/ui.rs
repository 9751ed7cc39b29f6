use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Tabs, Wrap,
    },
};

use crate::card::{CARD_HEIGHT, CardView};
use crate::data::COUNTRIES;
use crate::filter::{RegionFilter, Stats, filtered};
use crate::map_draw;
use crate::palette;
use crate::state::{AppState, Section};

const SEARCH_PLACEHOLDER: &str = "搜索国家或地区...";

/// Card columns for a terminal `width` cells wide
pub fn grid_columns(width: u16) -> usize {
    match width {
        0..80 => 1,
        80..140 => 2,
        _ => 3,
    }
}

fn text(c: palette::Rgba) -> Style {
    Style::default().fg(c.solid())
}

pub fn draw(f: &mut Frame, state: &mut AppState) {
    f.render_widget(
        Block::default().style(Style::default().bg(palette::PAGE_BACKGROUND.solid())),
        f.area(),
    );
    let [header, body] =
        Layout::vertical([Constraint::Length(4), Constraint::Min(0)]).areas(f.area());
    draw_header(f, header, state.section);
    match state.section {
        Section::Map => draw_map(f, body, state),
        Section::Results => draw_results(f, body, state),
    }
}

fn draw_header(f: &mut Frame, area: Rect, section: Section) {
    let stats = Stats::of(COUNTRIES);
    let strong = text(palette::LABEL_TEXT).add_modifier(Modifier::BOLD);
    let muted = text(palette::MUTED_TEXT);
    let stat = |label: &'static str, value: usize| {
        vec![
            Span::styled(format!("{value} "), strong),
            Span::styled(label, muted),
            Span::raw("   "),
        ]
    };
    let mut counters = Vec::new();
    counters.extend(stat("目的地", stats.total));
    counters.extend(stat("免签/互免", stats.visa_free));
    counters.extend(stat("落地签", stats.voa));

    let tab = |name: &'static str, on: bool| {
        if on {
            let active = strong
                .fg(palette::ACCENT.solid())
                .add_modifier(Modifier::REVERSED);
            Span::styled(format!(" {name} "), active)
        } else {
            Span::styled(format!(" {name} "), muted)
        }
    };
    let lines = vec![
        Line::from(vec![
            Span::raw("🇨🇳 "),
            Span::styled("2025 中国护照通行指南", strong),
            Span::styled("  PASSPORT POWER", muted),
        ]),
        Line::from(counters),
    ];
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(muted)
        .title_top(
            Line::from(vec![
                tab("地图", section == Section::Map),
                tab("列表", section == Section::Results),
            ])
            .right_aligned(),
        );
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_map(f: &mut Frame, area: Rect, state: &mut AppState) {
    let [map_area, hint] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(text(palette::MUTED_TEXT));
    let inner = block.inner(map_area);
    state.map_inner = Some(inner);

    let scene = state.scene();
    map_draw::render(f, map_area, block, scene.as_ref(), state.elapsed());
    map_draw::render_legend(f, inner);

    let keys = "滚轮 / + - 缩放 · 拖动 / 方向键 平移 · 0 复位 · r 随机 · Tab 列表 · q 退出";
    f.render_widget(
        Paragraph::new(keys).style(text(palette::MUTED_TEXT)).alignment(Alignment::Center),
        hint,
    );
}

fn draw_results(f: &mut Frame, area: Rect, state: &mut AppState) {
    let [tabs_area, search_area, notice_area, grid_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(2),
    ])
    .areas(area);

    let labels: Vec<&str> = RegionFilter::tabs().into_iter().map(RegionFilter::label).collect();
    let tabs = Tabs::new(labels)
        .select(state.tab)
        .style(text(palette::MUTED_TEXT))
        .highlight_style(
            Style::default()
                .fg(palette::PAGE_BACKGROUND.solid())
                .bg(palette::LABEL_TEXT.solid())
                .add_modifier(Modifier::BOLD),
        )
        .divider(" ")
        .block(Block::default().borders(Borders::BOTTOM).border_style(text(palette::MUTED_TEXT)));
    f.render_widget(tabs, tabs_area);

    let search = if state.filter.search.is_empty() {
        Line::from(Span::styled(SEARCH_PLACEHOLDER, text(palette::MUTED_TEXT)))
    } else {
        Line::from(vec![
            Span::styled(state.filter.search.as_str(), text(palette::LABEL_TEXT)),
            Span::styled("▏", text(palette::ACCENT)),
        ])
    };
    let mut search_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(text(palette::ACCENT))
        .title(" 🔍 ");
    if !state.filter.search.is_empty() {
        search_block = search_block.title_top(Line::from(" ✕ Esc ").right_aligned());
    }
    f.render_widget(Paragraph::new(search).block(search_block), search_area);

    let warn = text(palette::WARNING);
    let notice = vec![
        Line::from(Span::styled("⚠ 出行前请务必确认", warn.add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(
            "护照有效期需在 6 个月以上。即使免签，也请备好往返机票和酒店订单以供查验。",
            warn,
        )),
    ];
    f.render_widget(
        Paragraph::new(notice)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::LEFT).border_style(warn)),
        notice_area,
    );

    draw_grid(f, grid_area, state);

    let muted = text(palette::MUTED_TEXT);
    let footer = vec![
        Line::from(Span::styled("Data derived from 2025 Policy Projections", muted)),
        Line::from(Span::styled(
            "Always check official government sources before traveling.",
            muted,
        )),
    ];
    f.render_widget(Paragraph::new(footer).alignment(Alignment::Center), footer_area);
}

fn draw_grid(f: &mut Frame, area: Rect, state: &mut AppState) {
    state.card_areas.clear();
    let view = filtered(COUNTRIES, &state.filter);
    if view.is_empty() {
        state.hovered_card = None;
        let empty = vec![
            Line::from(""),
            Line::from("🌏"),
            Line::from(Span::styled(
                "未找到相关结果",
                text(palette::LABEL_TEXT).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("请尝试切换区域或搜索其他关键词", text(palette::MUTED_TEXT))),
        ];
        f.render_widget(Paragraph::new(empty).alignment(Alignment::Center), area);
        return;
    }

    let columns = grid_columns(f.area().width);
    let rows = view.len().div_ceil(columns);
    let page = ((area.height / CARD_HEIGHT) as usize).max(1);
    state.results_page = page;
    state.results_scroll = state.results_scroll.min(rows.saturating_sub(page));

    let [cards, bar] = Layout::horizontal([Constraint::Min(0), Constraint::Length(1)]).areas(area);
    let row_areas = Layout::vertical(vec![Constraint::Length(CARD_HEIGHT); page]).split(cards);
    for (r, row_area) in row_areas.iter().enumerate() {
        let row = state.results_scroll + r;
        if row >= rows {
            break;
        }
        let cells = Layout::horizontal(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row_area);
        for (c, cell) in cells.iter().enumerate() {
            let Some(record) = view.get(row * columns + c) else { break };
            if cell.height < CARD_HEIGHT {
                continue;
            }
            let hovered = state.hovered_card == Some(state.card_areas.len());
            CardView::of(record).render(f, *cell, hovered);
            state.card_areas.push(*cell);
        }
    }

    if rows > page {
        let mut bar_state =
            ScrollbarState::new(rows.saturating_sub(page)).position(state.results_scroll);
        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            bar,
            &mut bar_state,
        );
    }
}
