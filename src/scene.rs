//! Declarative description of one map frame.
//!
//! [`Scene::build`] is a pure function of records, geometry, viewport,
//! transform and hover. Painters (`map_draw` for the terminal, `svg` for
//! files) only read the result, and hit testing runs against the same value,
//! so what is drawn and what is clickable can never disagree.

use std::collections::HashMap;
use std::time::Duration;

use geo::{BoundingRect, Contains, Coord, MapCoords, MultiPolygon, Point, Rect};

use crate::crosswalk::CodeLookup;
use crate::data::CountryRecord;
use crate::geometry::GeometryDocument;
use crate::palette::{self, Rgba};
use crate::projection::{MercatorProjection, Viewport, ZoomTransform};

pub const HALO_FROM: f64 = 5.0;
pub const HALO_TO: f64 = 18.0;
pub const HALO_PERIOD: Duration = Duration::from_secs(2);
pub const HALO_OPACITY: f32 = 0.3;
pub const DOT_RADIUS: f64 = 3.0;
pub const GLYPH_SIZE: f64 = 14.0;
pub const GLYPH_OFFSET: f64 = -10.0;
pub const LABEL_SIZE: f64 = 10.0;
pub const LABEL_OFFSET: f64 = 12.0;
/// Markers catch clicks within this many pixels of their centre
pub const MARKER_HIT_RADIUS: f64 = 8.0;

/// Everything a frame depends on
pub struct MapInput<'a> {
    pub records: &'a [CountryRecord],
    pub geometry: Option<&'a GeometryDocument>,
    pub lookup: &'a dyn CodeLookup,
    pub viewport: Option<Viewport>,
    pub transform: ZoomTransform,
    /// Feature index under the pointer
    pub hovered: Option<usize>,
}

/// A country polygon in projected (untransformed) pixels
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeNode {
    pub feature: usize,
    pub code: Option<String>,
    /// Name carried by the geometry document, if any
    pub name: Option<String>,
    /// Index into the record slice when the code resolves
    pub record: Option<usize>,
    pub polygons: MultiPolygon<f64>,
    bbox: Option<Rect<f64>>,
    pub fill: Rgba,
    pub stroke: Rgba,
    pub stroke_width: f64,
}

/// A location marker, already in screen space
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerNode {
    pub record: usize,
    pub id: &'static str,
    /// Projected position before pan/zoom
    pub base: (f64, f64),
    /// Projected position after pan/zoom
    pub screen: (f64, f64),
    pub color: Rgba,
    pub glyph: &'static str,
    pub glyph_size: f64,
    pub name: &'static str,
    pub label_size: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    Marker(usize),
    Shape { feature: usize, record: Option<usize> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub viewport: Viewport,
    pub transform: ZoomTransform,
    /// Base layer, drawn first, scaled by `transform`
    pub shapes: Vec<ShapeNode>,
    /// Marker layer, drawn on top, constant size
    pub markers: Vec<MarkerNode>,
}

impl Scene {
    /// Nothing can be drawn before the viewport size is known.
    pub fn build(input: &MapInput<'_>) -> Option<Scene> {
        let viewport = input.viewport?;
        let projection = MercatorProjection::for_viewport(viewport);

        let by_id: HashMap<&str, usize> = input
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id, i))
            .collect();

        let shapes = input
            .geometry
            .map(|doc| {
                doc.features
                    .iter()
                    .enumerate()
                    .map(|(i, f)| {
                        let record = f
                            .code
                            .as_deref()
                            .and_then(|c| input.lookup.lookup(c))
                            .and_then(|id| by_id.get(id).copied());
                        let category = record.map(|r| input.records[r].category);
                        let hovered = input.hovered == Some(i);
                        let fill = match (category, hovered) {
                            (Some(c), false) => palette::style_for(c).map_fill,
                            (Some(c), true) => palette::style_for(c).map_hover,
                            (None, false) => palette::UNRESOLVED_FILL,
                            (None, true) => palette::UNRESOLVED_HOVER,
                        };
                        let polygons = f.shape.map_coords(|c| {
                            let (x, y) = projection.project(c.x, c.y);
                            Coord { x, y }
                        });
                        ShapeNode {
                            feature: i,
                            code: f.code.clone(),
                            name: f.name.clone(),
                            record,
                            bbox: polygons.bounding_rect(),
                            polygons,
                            fill,
                            stroke: palette::SHAPE_STROKE,
                            stroke_width: palette::SHAPE_STROKE_WIDTH,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let markers = input
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let base = projection.project(r.position.0, r.position.1);
                MarkerNode {
                    record: i,
                    id: r.id,
                    base,
                    screen: input.transform.apply(base),
                    color: palette::style_for(r.category).dot,
                    glyph: r.glyph,
                    glyph_size: GLYPH_SIZE,
                    name: r.name,
                    label_size: LABEL_SIZE,
                }
            })
            .collect();

        Some(Scene {
            viewport,
            transform: input.transform,
            shapes,
            markers,
        })
    }

    /// Markers sit above shapes, so they win; later markers win over earlier.
    pub fn hit_test(&self, point: (f64, f64)) -> Option<Hit> {
        let marker = self.markers.iter().rev().find(|m| {
            let dx = m.screen.0 - point.0;
            let dy = m.screen.1 - point.1;
            dx * dx + dy * dy <= MARKER_HIT_RADIUS * MARKER_HIT_RADIUS
        });
        if let Some(m) = marker {
            return Some(Hit::Marker(m.record));
        }

        let (bx, by) = self.transform.invert(point);
        let p = Point::new(bx, by);
        self.shapes
            .iter()
            .rev()
            .find(|s| s.bbox.is_some_and(|b| b.contains(&p)) && s.polygons.contains(&p))
            .map(|s| Hit::Shape {
                feature: s.feature,
                record: s.record,
            })
    }

    /// Record selected by a click at `point`; unresolved shapes give nothing.
    pub fn selection_at(&self, point: (f64, f64)) -> Option<usize> {
        match self.hit_test(point)? {
            Hit::Marker(r) => Some(r),
            Hit::Shape { record, .. } => record,
        }
    }

    /// Feature that should show its hover colour for a pointer at `point`
    pub fn hover_at(&self, point: (f64, f64)) -> Option<usize> {
        match self.hit_test(point)? {
            Hit::Shape { feature, .. } => Some(feature),
            Hit::Marker(_) => None,
        }
    }
}

/// Halo radius `elapsed` into the pulse animation
pub fn halo_radius(elapsed: Duration) -> f64 {
    let period = HALO_PERIOD.as_secs_f64();
    let phase = (elapsed.as_secs_f64() % period) / period;
    HALO_FROM + (HALO_TO - HALO_FROM) * phase
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crosswalk::Crosswalk;
    use crate::data::COUNTRIES;
    use crate::geometry::GeoFeature;
    use crate::projection::ZoomBehavior;
    use geo::{LineString, Polygon};

    fn square(lon: f64, lat: f64, half: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString::from(vec![
                (lon - half, lat - half),
                (lon + half, lat - half),
                (lon + half, lat + half),
                (lon - half, lat + half),
                (lon - half, lat - half),
            ]),
            vec![],
        )])
    }

    /// Thailand as a resolvable square, plus an unresolvable one over China.
    fn doc() -> GeometryDocument {
        GeometryDocument {
            features: vec![
                GeoFeature {
                    code: Some("764".into()),
                    name: Some("Thailand".into()),
                    shape: square(100.0, 15.0, 4.0),
                },
                GeoFeature {
                    code: Some("156".into()),
                    name: Some("China".into()),
                    shape: square(110.0, 35.0, 5.0),
                },
                GeoFeature {
                    code: None,
                    name: None,
                    shape: square(60.0, 60.0, 2.0),
                },
            ],
        }
    }

    fn input<'a>(
        geometry: Option<&'a GeometryDocument>,
        lookup: &'a Crosswalk,
        transform: ZoomTransform,
        hovered: Option<usize>,
    ) -> MapInput<'a> {
        MapInput {
            records: COUNTRIES,
            geometry,
            lookup,
            viewport: Some(Viewport::new(640.0, 400.0)),
            transform,
            hovered,
        }
    }

    fn screen_of(scene: &Scene, lon: f64, lat: f64) -> (f64, f64) {
        let p = MercatorProjection::for_viewport(scene.viewport).project(lon, lat);
        scene.transform.apply(p)
    }

    #[test]
    fn no_viewport_no_scene() {
        let walk = Crosswalk::builtin();
        let mut i = input(None, &walk, ZoomTransform::IDENTITY, None);
        i.viewport = None;
        assert!(Scene::build(&i).is_none());
    }

    #[test]
    fn markers_render_without_geometry() {
        let walk = Crosswalk::builtin();
        let scene = Scene::build(&input(None, &walk, ZoomTransform::IDENTITY, None)).unwrap();
        assert!(scene.shapes.is_empty());
        assert_eq!(scene.markers.len(), COUNTRIES.len());
    }

    #[test]
    fn build_is_deterministic() {
        let walk = Crosswalk::builtin();
        let d = doc();
        let t = ZoomTransform::new(1.5, -20.0, 10.0);
        let a = Scene::build(&input(Some(&d), &walk, t, Some(1))).unwrap();
        let b = Scene::build(&input(Some(&d), &walk, t, Some(1))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fills_follow_category_and_hover() {
        let walk = Crosswalk::builtin();
        let d = doc();
        let scene = Scene::build(&input(Some(&d), &walk, ZoomTransform::IDENTITY, None)).unwrap();
        let tha = palette::style_for(crate::data::VisaCategory::MutualFree);
        assert_eq!(scene.shapes[0].fill, tha.map_fill);
        assert_eq!(scene.shapes[1].fill, palette::UNRESOLVED_FILL);
        assert_eq!(scene.shapes[2].fill, palette::UNRESOLVED_FILL);

        let hovered =
            Scene::build(&input(Some(&d), &walk, ZoomTransform::IDENTITY, Some(0))).unwrap();
        assert_eq!(hovered.shapes[0].fill, tha.map_hover);
        let hovered =
            Scene::build(&input(Some(&d), &walk, ZoomTransform::IDENTITY, Some(1))).unwrap();
        assert_eq!(hovered.shapes[1].fill, palette::UNRESOLVED_HOVER);
    }

    #[test]
    fn clicking_a_resolved_shape_selects_its_record() {
        let walk = Crosswalk::builtin();
        let d = doc();
        let scene = Scene::build(&input(Some(&d), &walk, ZoomTransform::IDENTITY, None)).unwrap();
        // inside the square but away from the THA marker at (100.99, 15.87)
        let p = screen_of(&scene, 97.0, 12.0);
        let tha = COUNTRIES.iter().position(|c| c.id == "THA").unwrap();
        assert_eq!(scene.hit_test(p), Some(Hit::Shape { feature: 0, record: Some(tha) }));
        assert_eq!(scene.selection_at(p), Some(tha));
        assert_eq!(scene.hover_at(p), Some(0));
    }

    #[test]
    fn clicking_an_unresolved_shape_is_inert() {
        let walk = Crosswalk::builtin();
        let d = doc();
        let scene = Scene::build(&input(Some(&d), &walk, ZoomTransform::IDENTITY, None)).unwrap();
        let china = screen_of(&scene, 112.0, 37.0);
        assert_eq!(scene.hit_test(china), Some(Hit::Shape { feature: 1, record: None }));
        assert_eq!(scene.selection_at(china), None);
        let nameless = screen_of(&scene, 60.0, 60.0);
        assert_eq!(scene.selection_at(nameless), None);
        // open sea
        let sea = screen_of(&scene, 80.0, -40.0);
        assert_eq!(scene.hit_test(sea), None);
    }

    #[test]
    fn marker_wins_over_shape_underneath() {
        let walk = Crosswalk::builtin();
        let d = doc();
        let scene = Scene::build(&input(Some(&d), &walk, ZoomTransform::IDENTITY, None)).unwrap();
        let tha = COUNTRIES.iter().position(|c| c.id == "THA").unwrap();
        let at = scene.markers[tha].screen;
        assert_eq!(scene.hit_test(at), Some(Hit::Marker(tha)));
        assert_eq!(scene.hover_at(at), None);
    }

    #[test]
    fn semantic_zoom_keeps_marker_size_and_tracks_the_map() {
        let walk = Crosswalk::builtin();
        let d = doc();
        let vp = Viewport::new(640.0, 400.0);
        let zoom = ZoomBehavior::default();
        let t = zoom.zoom_at(ZoomTransform::IDENTITY, 2.0, vp.center(), vp);
        let t = zoom.pan(t, 35.0, -20.0, vp);
        assert_eq!(t.k, 2.0);

        let before = Scene::build(&input(Some(&d), &walk, ZoomTransform::IDENTITY, None)).unwrap();
        let after = Scene::build(&input(Some(&d), &walk, t, None)).unwrap();

        for (a, b) in before.markers.iter().zip(&after.markers) {
            assert_eq!(a.glyph_size, b.glyph_size);
            assert_eq!(a.label_size, b.label_size);
            assert_eq!(a.base, b.base);
            let expected = t.apply(a.base);
            assert!((b.screen.0 - expected.0).abs() < 1e-9);
            assert!((b.screen.1 - expected.1).abs() < 1e-9);
        }

        // the shape under a marker's base point is still under it after zooming
        let tha = COUNTRIES.iter().position(|c| c.id == "THA").unwrap();
        let beside = (after.markers[tha].screen.0 - 30.0, after.markers[tha].screen.1);
        assert_eq!(after.selection_at(beside), Some(tha));
        assert_eq!(after.shapes[0].polygons, before.shapes[0].polygons);
    }

    #[test]
    fn halo_pulses_between_bounds() {
        assert_eq!(halo_radius(Duration::ZERO), HALO_FROM);
        assert!((halo_radius(Duration::from_secs(1)) - (HALO_FROM + HALO_TO) / 2.0).abs() < 1e-9);
        assert_eq!(halo_radius(HALO_PERIOD * 3), HALO_FROM);
        assert!(halo_radius(Duration::from_millis(1999)) < HALO_TO);
    }
}
