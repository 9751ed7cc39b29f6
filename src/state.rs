use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use rand::Rng;
use ratatui::layout::{Position, Rect};
use tracing::{debug, info};

use crate::crosswalk::Crosswalk;
use crate::data::COUNTRIES;
use crate::filter::{FilterState, RegionFilter};
use crate::geometry::GeometryDocument;
use crate::map_draw;
use crate::projection::{MercatorProjection, Viewport, ZoomBehavior, ZoomTransform};
use crate::scene::{MapInput, Scene};

/// One mouse-wheel notch
const WHEEL_FACTOR: f64 = std::f64::consts::SQRT_2;
const KEY_ZOOM_FACTOR: f64 = 2.0;
/// Arrow-key pan as a fraction of the viewport
const KEY_PAN_FRACTION: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Map,
    Results,
}

/// Messages from background work
pub enum AppEvent {
    GeometryLoaded(GeometryDocument),
}

impl From<GeometryDocument> for AppEvent {
    fn from(doc: GeometryDocument) -> Self {
        AppEvent::GeometryLoaded(doc)
    }
}

struct Drag {
    last: (u16, u16),
    moved: bool,
}

pub struct AppState {
    pub section: Section,
    pub filter: FilterState,
    /// Index into `RegionFilter::tabs()`
    pub tab: usize,
    /// First visible card row
    pub results_scroll: usize,
    /// Card rows that fit on screen, set while drawing
    pub results_page: usize,
    pub selected: Option<usize>,
    pub geometry: Option<GeometryDocument>,
    pub transform: ZoomTransform,
    zoom: ZoomBehavior,
    crosswalk: Crosswalk,
    /// Map area inside its border, set while drawing
    pub map_inner: Option<Rect>,
    pub hovered_shape: Option<usize>,
    /// Last pointer position over the map, in map pixels
    pointer: Option<(f64, f64)>,
    /// Card rectangles in draw order, set while drawing
    pub card_areas: Vec<Rect>,
    pub hovered_card: Option<usize>,
    drag: Option<Drag>,
    started: Instant,
}

impl AppState {
    pub fn new(crosswalk: Crosswalk) -> Self {
        Self {
            section: Section::Map,
            filter: FilterState::default(),
            tab: 0,
            results_scroll: 0,
            results_page: 1,
            selected: None,
            geometry: None,
            transform: ZoomTransform::IDENTITY,
            zoom: ZoomBehavior::default(),
            crosswalk,
            map_inner: None,
            hovered_shape: None,
            pointer: None,
            card_areas: Vec::new(),
            hovered_card: None,
            drag: None,
            started: Instant::now(),
        }
    }

    /// Time since start; drives the marker pulse
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::GeometryLoaded(doc) => {
                info!(features = doc.feature_count(), "base map ready");
                self.geometry = Some(doc);
                self.hovered_shape = None;
            }
        }
    }

    fn viewport(&self) -> Option<Viewport> {
        self.map_inner.and_then(map_draw::viewport_for)
    }

    pub fn scene(&self) -> Option<Scene> {
        Scene::build(&MapInput {
            records: COUNTRIES,
            geometry: self.geometry.as_ref(),
            lookup: &self.crosswalk,
            viewport: self.viewport(),
            transform: self.transform,
            hovered: self.hovered_shape,
        })
    }

    /// Search for the exact name and jump to the results. A region tab that
    /// would hide the record falls back to all regions.
    pub fn select_country(&mut self, idx: usize) {
        let Some(record) = COUNTRIES.get(idx) else {
            return;
        };
        info!(id = record.id, "destination selected");
        if !self.filter.region.matches(record) {
            self.set_tab(0);
        }
        self.selected = Some(idx);
        self.filter.search = record.name.to_string();
        self.section = Section::Results;
        self.results_scroll = 0;
        self.hovered_card = None;
    }

    pub fn surprise(&mut self) {
        let idx = rand::rng().random_range(0..COUNTRIES.len());
        self.select_country(idx);
    }

    fn set_tab(&mut self, tab: usize) {
        let tabs = RegionFilter::tabs();
        self.tab = tab % tabs.len();
        self.filter.region = tabs[self.tab];
        self.results_scroll = 0;
    }

    fn set_transform(&mut self, t: ZoomTransform) {
        self.transform = t;
        self.refresh_hover();
    }

    /// The map moved under a still pointer
    fn refresh_hover(&mut self) {
        self.hovered_shape = self.pointer.and_then(|p| self.scene().and_then(|s| s.hover_at(p)));
    }

    fn zoom_about(&mut self, factor: f64, anchor: Option<(f64, f64)>) {
        let Some(vp) = self.viewport() else { return };
        let anchor = anchor.unwrap_or_else(|| vp.center());
        self.set_transform(self.zoom.zoom_at(self.transform, factor, anchor, vp));
    }

    fn pan_by(&mut self, dx: f64, dy: f64) {
        let Some(vp) = self.viewport() else { return };
        self.set_transform(self.zoom.pan(self.transform, dx, dy, vp));
    }

    fn pan_step(&mut self, sx: f64, sy: f64) {
        if let Some(vp) = self.viewport() {
            self.pan_by(sx * vp.width * KEY_PAN_FRACTION, sy * vp.height * KEY_PAN_FRACTION);
        }
    }

    fn scroll(&mut self, delta: isize) {
        self.results_scroll = self.results_scroll.saturating_add_signed(delta);
    }

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        use KeyCode::*;
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return key.code == Char('c');
        }
        match self.section {
            Section::Map => match key.code {
                Char('q') => return true,
                Tab | Enter => self.section = Section::Results,
                Char('+') | Char('=') => self.zoom_about(KEY_ZOOM_FACTOR, None),
                Char('-') => self.zoom_about(1.0 / KEY_ZOOM_FACTOR, None),
                Left | Char('h') => self.pan_step(1.0, 0.0),
                Right | Char('l') => self.pan_step(-1.0, 0.0),
                Up | Char('k') => self.pan_step(0.0, 1.0),
                Down | Char('j') => self.pan_step(0.0, -1.0),
                Char('0') => self.set_transform(ZoomTransform::IDENTITY),
                Char('r') => self.surprise(),
                _ => {}
            },
            Section::Results => match key.code {
                Tab => self.section = Section::Map,
                Char(c) => {
                    self.filter.search.push(c);
                    self.results_scroll = 0;
                }
                Backspace => {
                    self.filter.search.pop();
                    self.results_scroll = 0;
                }
                Esc => {
                    self.filter.search.clear();
                    self.results_scroll = 0;
                }
                Left => self.set_tab(self.tab + RegionFilter::tabs().len() - 1),
                Right => self.set_tab(self.tab + 1),
                Up => self.scroll(-1),
                Down => self.scroll(1),
                PageUp => self.scroll(-(self.results_page.max(1) as isize)),
                PageDown => self.scroll(self.results_page.max(1) as isize),
                _ => {}
            },
        }
        false
    }

    pub fn handle_mouse(&mut self, ev: MouseEvent) {
        match self.section {
            Section::Map => self.map_mouse(ev),
            Section::Results => self.results_mouse(ev),
        }
    }

    fn map_mouse(&mut self, ev: MouseEvent) {
        let Some(inner) = self.map_inner else { return };
        let point = map_draw::cell_to_pixel(inner, ev.column, ev.row);
        self.pointer = point;
        match ev.kind {
            MouseEventKind::ScrollUp if point.is_some() => self.zoom_about(WHEEL_FACTOR, point),
            MouseEventKind::ScrollDown if point.is_some() => {
                self.zoom_about(1.0 / WHEEL_FACTOR, point)
            }
            MouseEventKind::Down(MouseButton::Left) if point.is_some() => {
                self.drag = Some(Drag { last: (ev.column, ev.row), moved: false });
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(drag) = self.drag.as_mut() else { return };
                let dx = (ev.column as f64 - drag.last.0 as f64) * map_draw::DOTS_X;
                let dy = (ev.row as f64 - drag.last.1 as f64) * map_draw::DOTS_Y;
                drag.last = (ev.column, ev.row);
                drag.moved = true;
                self.pan_by(dx, dy);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let clicked = self.drag.take().is_some_and(|d| !d.moved);
                if let (true, Some(p)) = (clicked, point) {
                    let hit = self.scene().and_then(|s| s.selection_at(p));
                    if let Some(vp) = self.viewport() {
                        let (wx, wy) = self.transform.invert(p);
                        let (lon, lat) = MercatorProjection::for_viewport(vp).invert(wx, wy);
                        debug!(lon, lat, hit = ?hit, "map click");
                    }
                    if let Some(idx) = hit {
                        self.select_country(idx);
                    }
                }
            }
            MouseEventKind::Moved => self.refresh_hover(),
            _ => {}
        }
    }

    fn results_mouse(&mut self, ev: MouseEvent) {
        match ev.kind {
            MouseEventKind::ScrollUp => self.scroll(-1),
            MouseEventKind::ScrollDown => self.scroll(1),
            MouseEventKind::Moved => {
                let at = Position::new(ev.column, ev.row);
                self.hovered_card = self.card_areas.iter().position(|r| r.contains(at));
            }
            _ => {}
        }
    }
}
