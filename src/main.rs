mod card;
mod cli;
mod crosswalk;
mod data;
mod error;
mod filter;
mod geometry;
mod logging;
mod map_draw;
mod palette;
mod projection;
mod scene;
mod state;
mod svg;
mod ui;

use std::io;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Serialize;
use tracing::{error, info};

use cli::{Cli, Command};
use crosswalk::Crosswalk;
use data::{COUNTRIES, CountryRecord, Region, VisaCategory};
use filter::{FilterState, Stats, filtered};
use geometry::GeometrySource;
use logging::LogTarget;
use projection::{Viewport, ZoomBehavior, ZoomTransform};
use scene::{MapInput, Scene};
use state::{AppEvent, AppState};

const TICK: Duration = Duration::from_millis(100);

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let source = cli.geometry_source();
    match cli.command {
        Some(Command::List { region, category, ref search }) => {
            let _guard = logging::init(&cli.log_level, LogTarget::Stderr)?;
            list(region, category, search)
        }
        Some(Command::ExportSvg { ref out, width, height, zoom, pan_x, pan_y }) => {
            let _guard = logging::init(&cli.log_level, LogTarget::Stderr)?;
            export_svg(&source, out, Viewport::new(width, height), zoom, (pan_x, pan_y))
        }
        None => {
            let path = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
            let _guard = logging::init(&cli.log_level, LogTarget::File(path))?;
            run_tui(source)
        }
    }
}

#[derive(Serialize)]
struct ListEntry<'a> {
    #[serde(flatten)]
    record: &'a CountryRecord,
    /// Numeric code of the matching map shape
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
}

#[derive(Serialize)]
struct ListOutput<'a> {
    stats: Stats,
    count: usize,
    destinations: Vec<ListEntry<'a>>,
}

fn list(
    region: Option<Region>,
    category: Option<VisaCategory>,
    search: &str,
) -> anyhow::Result<()> {
    let walk = Crosswalk::builtin();
    let filter = FilterState::new(region.into(), search);
    let destinations: Vec<ListEntry> = filtered(COUNTRIES, &filter)
        .into_iter()
        .filter(|r| category.is_none_or(|c| r.category == c))
        .map(|record| ListEntry { record, code: walk.code_for(record.id) })
        .collect();
    info!(count = destinations.len(), "listing destinations");
    let out = ListOutput {
        stats: Stats::of(COUNTRIES),
        count: destinations.len(),
        destinations,
    };
    println!("{}", serde_json::to_string_pretty(&out).context("serializing destinations")?);
    Ok(())
}

fn export_svg(
    source: &GeometrySource,
    out: &Path,
    viewport: Viewport,
    zoom: f64,
    pan: (f64, f64),
) -> anyhow::Result<()> {
    let transform = export_transform(viewport, zoom, pan)?;

    // same contract as the UI: no base map, markers only
    let geometry = match geometry::load(source) {
        Ok(doc) => Some(doc),
        Err(err) => {
            error!(source = %source.describe(), error = %err, "map data load failed");
            None
        }
    };

    let walk = Crosswalk::builtin();
    let scene = Scene::build(&MapInput {
        records: COUNTRIES,
        geometry: geometry.as_ref(),
        lookup: &walk,
        viewport: Some(viewport),
        transform,
        hovered: None,
    })
    .context("building map scene")?;
    let doc = svg::render(&scene, &Stats::of(COUNTRIES));
    std::fs::write(out, doc).with_context(|| format!("writing {}", out.display()))?;
    info!(
        out = %out.display(),
        shapes = scene.shapes.len(),
        markers = scene.markers.len(),
        "svg written"
    );
    Ok(())
}

/// Zoom about the centre, then pan, under the same limits as the UI
fn export_transform(
    viewport: Viewport,
    zoom: f64,
    (pan_x, pan_y): (f64, f64),
) -> anyhow::Result<ZoomTransform> {
    let Viewport { width, height } = viewport;
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        bail!("width and height must be positive finite numbers");
    }
    if !(zoom.is_finite() && zoom > 0.0) {
        bail!("zoom must be a positive finite number");
    }
    if !(pan_x.is_finite() && pan_y.is_finite()) {
        bail!("pan offsets must be finite numbers");
    }
    let behavior = ZoomBehavior::default();
    let transform = behavior.zoom_at(ZoomTransform::IDENTITY, zoom, viewport.center(), viewport);
    Ok(behavior.pan(transform, pan_x, pan_y, viewport))
}

fn run_tui(source: GeometrySource) -> anyhow::Result<()> {
    let walk = Crosswalk::builtin();
    info!(records = COUNTRIES.len(), codes = walk.len(), "starting");
    let mut state = AppState::new(walk);

    let (tx, rx) = mpsc::channel::<AppEvent>();
    geometry::spawn_loader(source, tx);

    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut state, &rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    rx: &mpsc::Receiver<AppEvent>,
) -> anyhow::Result<()> {
    loop {
        while let Ok(ev) = rx.try_recv() {
            state.apply(ev);
        }

        terminal.draw(|f| ui::draw(f, state))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if state.handle_key(key) {
                        info!("quit");
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => state.handle_mouse(mouse),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vp() -> Viewport {
        Viewport::new(960.0, 600.0)
    }

    #[test]
    fn export_transform_zooms_about_centre_then_pans() {
        let t = export_transform(vp(), 2.0, (30.0, -20.0)).unwrap();
        assert_eq!(t, ZoomTransform::new(2.0, -480.0 + 30.0, -300.0 - 20.0));
    }

    #[test]
    fn export_transform_clamps_zoom() {
        let t = export_transform(vp(), 100.0, (0.0, 0.0)).unwrap();
        assert_eq!(t.k, 8.0);
    }

    #[test]
    fn export_transform_rejects_non_finite_input() {
        assert!(export_transform(vp(), f64::NAN, (0.0, 0.0)).is_err());
        assert!(export_transform(vp(), f64::INFINITY, (0.0, 0.0)).is_err());
        assert!(export_transform(vp(), 0.0, (0.0, 0.0)).is_err());
        assert!(export_transform(vp(), 1.0, (f64::NAN, 0.0)).is_err());
        assert!(export_transform(vp(), 1.0, (0.0, f64::NEG_INFINITY)).is_err());
        assert!(export_transform(Viewport::new(f64::INFINITY, 600.0), 1.0, (0.0, 0.0)).is_err());
        assert!(export_transform(Viewport::new(960.0, 0.0), 1.0, (0.0, 0.0)).is_err());
        assert!(export_transform(Viewport::new(f64::NAN, 600.0), 1.0, (0.0, 0.0)).is_err());
    }

    #[test]
    fn export_writes_markers_only_when_geometry_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("map.svg");
        let missing = GeometrySource::File(dir.path().join("absent.json"));
        export_svg(&missing, &out, vp(), 1.0, (0.0, 0.0)).unwrap();
        let svg = std::fs::read_to_string(&out).unwrap();
        assert_eq!(svg.matches("<path ").count(), 0);
        assert_eq!(svg.matches(r#"class="marker""#).count(), COUNTRIES.len());
    }

    #[test]
    fn export_refuses_nan_zoom() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("map.svg");
        let missing = GeometrySource::File(dir.path().join("absent.json"));
        assert!(export_svg(&missing, &out, vp(), f64::NAN, (0.0, 0.0)).is_err());
        assert!(!out.exists());
    }
}
