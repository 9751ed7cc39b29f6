use std::time::Duration;

use geo::Polygon;
use ratatui::layout::{Constraint, Layout, Rect as TuiRect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line, Points};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::palette::{self, Rgba};
use crate::projection::{Viewport, ZoomTransform};
use crate::scene::{self, Scene};

/// Braille dots per terminal cell
pub const DOTS_X: f64 = 2.0;
pub const DOTS_Y: f64 = 4.0;

/// Pixel surface of a map area (inside its border)
pub fn viewport_for(inner: TuiRect) -> Option<Viewport> {
    if inner.width == 0 || inner.height == 0 {
        return None;
    }
    Some(Viewport::new(
        inner.width as f64 * DOTS_X,
        inner.height as f64 * DOTS_Y,
    ))
}

/// Terminal cell → map pixel (cell centre)
pub fn cell_to_pixel(inner: TuiRect, column: u16, row: u16) -> Option<(f64, f64)> {
    if column < inner.x
        || row < inner.y
        || column >= inner.x + inner.width
        || row >= inner.y + inner.height
    {
        return None;
    }
    Some((
        (column - inner.x) as f64 * DOTS_X + DOTS_X / 2.0,
        (row - inner.y) as f64 * DOTS_Y + DOTS_Y / 2.0,
    ))
}

/// Draws the base layer and the markers. `elapsed` only drives the halo.
pub fn render(
    f: &mut Frame,
    area: TuiRect,
    block: Block,
    scene: Option<&Scene>,
    elapsed: Duration,
) {
    let Some(scene) = scene else {
        f.render_widget(block, area);
        return;
    };
    let Viewport { width: w, height: h } = scene.viewport;
    let bg = palette::PAGE_BACKGROUND;

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .background_color(bg.solid())
        .x_bounds([0.0, w])
        .y_bounds([0.0, h])
        .paint(|ctx| {
            // 1) country fills, then their borders
            for shape in &scene.shapes {
                let color = shape.fill.over(bg);
                for poly in &shape.polygons.0 {
                    let pts = scanline_fill(poly, scene.transform, scene.viewport);
                    if !pts.is_empty() {
                        ctx.draw(&Points { coords: &pts, color });
                    }
                }
            }
            let stroke = palette::SHAPE_STROKE.over(bg);
            for shape in &scene.shapes {
                for poly in &shape.polygons.0 {
                    for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
                        for seg in ring.0.windows(2) {
                            let (x1, y1) = scene.transform.apply((seg[0].x, seg[0].y));
                            let (x2, y2) = scene.transform.apply((seg[1].x, seg[1].y));
                            ctx.draw(&Line { x1, y1: h - y1, x2, y2: h - y2, color: stroke });
                        }
                    }
                }
            }

            // 2) markers in screen space, never scaled
            ctx.layer();
            let halo = scene::halo_radius(elapsed);
            for m in &scene.markers {
                let (x, y) = m.screen;
                let halo_color = Rgba { a: scene::HALO_OPACITY, ..m.color }.over(bg);
                ctx.draw(&Circle { x, y: h - y, radius: halo, color: halo_color });
                ctx.draw(&Circle {
                    x,
                    y: h - y,
                    radius: scene::DOT_RADIUS,
                    color: m.color.solid(),
                });
                ctx.draw(&Points { coords: &[(x, h - y)], color: m.color.solid() });
            }
            ctx.layer();
            for m in &scene.markers {
                let (x, y) = m.screen;
                print_centered(ctx, x, h - (y + scene::GLYPH_OFFSET), Span::raw(m.glyph));
                print_centered(
                    ctx,
                    x,
                    h - (y + scene::LABEL_OFFSET),
                    Span::styled(
                        m.name,
                        Style::default()
                            .fg(palette::LABEL_TEXT.solid())
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });
    f.render_widget(canvas, area);
}

fn print_centered<'a>(ctx: &mut Context<'a>, x: f64, y: f64, span: Span<'a>) {
    // one cell is DOTS_X units wide
    let half = span.width() as f64 * DOTS_X / 2.0;
    ctx.print(x - half, y, span);
}

/// Even-odd scanline fill of one polygon, one sample per dot row/column.
/// Returns canvas coordinates (y up).
fn scanline_fill(poly: &Polygon<f64>, t: ZoomTransform, vp: Viewport) -> Vec<(f64, f64)> {
    let edges: Vec<((f64, f64), (f64, f64))> = std::iter::once(poly.exterior())
        .chain(poly.interiors())
        .flat_map(|ring| {
            ring.0
                .windows(2)
                .map(move |s| (t.apply((s[0].x, s[0].y)), t.apply((s[1].x, s[1].y))))
        })
        .collect();
    if edges.is_empty() {
        return Vec::new();
    }

    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for ((_, y1), (_, y2)) in &edges {
        min_y = min_y.min(*y1).min(*y2);
        max_y = max_y.max(*y1).max(*y2);
    }
    let first = min_y.max(0.0).floor() as i64;
    let last = max_y.min(vp.height).ceil() as i64;

    let mut out = Vec::new();
    let mut xs = Vec::new();
    for row in first..last {
        let sy = row as f64 + 0.5;
        xs.clear();
        for &((x1, y1), (x2, y2)) in &edges {
            if (y1 <= sy && y2 > sy) || (y2 <= sy && y1 > sy) {
                xs.push(x1 + (sy - y1) / (y2 - y1) * (x2 - x1));
            }
        }
        xs.sort_by(|a, b| a.total_cmp(b));
        for pair in xs.chunks_exact(2) {
            let from = (pair[0] - 0.5).ceil().max(0.0) as i64;
            let to = (pair[1] - 0.5).floor().min(vp.width - 1.0) as i64;
            for col in from..=to {
                out.push((col as f64 + 0.5, vp.height - sy));
            }
        }
    }
    out
}

/// Bottom-right legend box
pub fn render_legend(f: &mut Frame, inner: TuiRect) {
    let lines: Vec<TextLine> = palette::LEGEND
        .iter()
        .map(|(swatch, text)| {
            TextLine::from(vec![
                Span::styled("● ", Style::default().fg(swatch.solid())),
                Span::styled(*text, Style::default().fg(palette::LABEL_TEXT.solid())),
            ])
        })
        .collect();
    let width = 22u16.min(inner.width);
    let height = (lines.len() as u16 + 2).min(inner.height);
    let [_, col] = Layout::horizontal([Constraint::Min(0), Constraint::Length(width)]).areas(inner);
    let [_, area] = Layout::vertical([Constraint::Min(0), Constraint::Length(height)]).areas(col);

    let legend = Paragraph::new(lines)
        .style(Style::default().bg(palette::PAGE_BACKGROUND.solid()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette::MUTED_TEXT.solid()))
                .title("Legend / 图例"),
        );
    f.render_widget(Clear, area);
    f.render_widget(legend, area);
}
