//! Writes a [`Scene`] as a standalone SVG document.

use std::fmt::Write as _;

use crate::filter::Stats;
use crate::palette;
use crate::scene::{self, Scene};

/// Remote bitmap used in the header; referenced, never fetched.
pub const HEADER_FLAG_URL: &str = "https://flagcdn.com/w80/cn.png";

pub fn render(scene: &Scene, stats: &Stats) -> String {
    let w = scene.viewport.width;
    let h = scene.viewport.height;
    let mut s = String::with_capacity(1 << 20);

    let _ = writeln!(
        s,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    let _ = writeln!(
        s,
        r#"  <rect width="{w}" height="{h}" fill="{}"/>"#,
        palette::PAGE_BACKGROUND.css()
    );

    // base layer: transformed as a whole
    let _ = writeln!(s, r#"  <g class="map-layer" transform="{}">"#, scene.transform.to_svg());
    for shape in &scene.shapes {
        let d = path_data(shape);
        if d.is_empty() {
            continue;
        }
        let code = shape.code.as_deref().unwrap_or("");
        let _ = write!(
            s,
            r#"    <path data-code="{}" d="{d}" fill="{}" stroke="{}" stroke-width="{}""#,
            escape(code),
            shape.fill.css(),
            shape.stroke.css(),
            shape.stroke_width,
        );
        match &shape.name {
            Some(name) => {
                let _ = writeln!(s, "><title>{}</title></path>", escape(name));
            }
            None => s.push_str("/>\n"),
        }
    }
    s.push_str("  </g>\n");

    // markers: positioned individually, never scaled
    s.push_str("  <g class=\"marker-layer\">\n");
    for m in &scene.markers {
        let (x, y) = m.screen;
        let color = m.color.css();
        let _ = writeln!(
            s,
            r#"    <g class="marker" data-id="{}" transform="translate({x},{y})">"#,
            m.id
        );
        let _ = writeln!(
            s,
            r#"      <circle r="{from}" fill="{color}" fill-opacity="{op}"><animate attributeName="r" from="{from}" to="{to}" dur="{dur}s" repeatCount="indefinite"/></circle>"#,
            from = scene::HALO_FROM,
            to = scene::HALO_TO,
            dur = scene::HALO_PERIOD.as_secs_f64(),
            op = scene::HALO_OPACITY,
        );
        let _ = writeln!(
            s,
            r##"      <circle r="{}" fill="{color}" stroke="#fff" stroke-width="1"/>"##,
            scene::DOT_RADIUS
        );
        let _ = writeln!(
            s,
            r#"      <text text-anchor="middle" y="{}" font-size="{}px">{}</text>"#,
            scene::GLYPH_OFFSET,
            m.glyph_size,
            escape(m.glyph)
        );
        let _ = writeln!(
            s,
            r#"      <text text-anchor="middle" y="{}" font-size="{}px" font-weight="bold" fill="{}">{}</text>"#,
            scene::LABEL_OFFSET,
            m.label_size,
            palette::LABEL_TEXT.css(),
            escape(m.name)
        );
        s.push_str("    </g>\n");
    }
    s.push_str("  </g>\n");

    header(&mut s, stats);
    legend(&mut s, w, h);
    s.push_str("</svg>\n");
    s
}

fn path_data(shape: &scene::ShapeNode) -> String {
    let mut d = String::new();
    for poly in &shape.polygons.0 {
        for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
            for (i, c) in ring.0.iter().enumerate() {
                let cmd = if i == 0 { 'M' } else { 'L' };
                let _ = write!(d, "{cmd}{:.2},{:.2}", c.x, c.y);
            }
            if !ring.0.is_empty() {
                d.push('Z');
            }
        }
    }
    d
}

fn header(s: &mut String, stats: &Stats) {
    let text = palette::LABEL_TEXT.css();
    let muted = palette::MUTED_TEXT.css();
    s.push_str("  <g class=\"header\" font-family=\"sans-serif\">\n");
    let _ = writeln!(
        s,
        r#"    <image href="{HEADER_FLAG_URL}" x="16" y="16" width="48" height="32"/>"#
    );
    let _ = writeln!(
        s,
        r#"    <text x="76" y="32" font-size="16" font-weight="bold" fill="{text}">2025 中国护照通行指南</text>"#
    );
    let _ = writeln!(
        s,
        r#"    <text x="76" y="46" font-size="10" fill="{muted}">PASSPORT POWER</text>"#
    );
    let _ = writeln!(
        s,
        r#"    <text x="16" y="70" font-size="12" fill="{text}">目的地 {}  ·  免签/互免 {}  ·  落地签 {}</text>"#,
        stats.total, stats.visa_free, stats.voa
    );
    s.push_str("  </g>\n");
}

fn legend(s: &mut String, w: f64, h: f64) {
    let x = w - 150.0;
    let mut y = h - 80.0;
    s.push_str("  <g class=\"legend\" font-family=\"sans-serif\" font-size=\"10\">\n");
    let _ = writeln!(
        s,
        r#"    <text x="{x}" y="{y}" font-weight="bold" fill="{}">Legend / 图例</text>"#,
        palette::LABEL_TEXT.css()
    );
    for (swatch, label) in palette::LEGEND {
        y += 16.0;
        let _ = writeln!(
            s,
            r#"    <circle cx="{}" cy="{}" r="5" fill="{}"/>"#,
            x + 5.0,
            y - 4.0,
            swatch.css()
        );
        let _ = writeln!(
            s,
            r#"    <text x="{}" y="{y}" fill="{}">{}</text>"#,
            x + 16.0,
            palette::MUTED_TEXT.css(),
            escape(label)
        );
    }
    s.push_str("  </g>\n");
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crosswalk::Crosswalk;
    use crate::data::COUNTRIES;
    use crate::geometry::{GeoFeature, GeometryDocument};
    use crate::projection::{Viewport, ZoomTransform};
    use crate::scene::MapInput;
    use geo::{LineString, MultiPolygon, Polygon};

    fn scene(geometry: Option<&GeometryDocument>, transform: ZoomTransform) -> Scene {
        let walk = Crosswalk::builtin();
        Scene::build(&MapInput {
            records: COUNTRIES,
            geometry,
            lookup: &walk,
            viewport: Some(Viewport::new(800.0, 500.0)),
            transform,
            hovered: None,
        })
        .unwrap()
    }

    fn doc() -> GeometryDocument {
        let ring = LineString::from(vec![(96.0, 6.0), (105.0, 6.0), (105.0, 20.0), (96.0, 6.0)]);
        GeometryDocument {
            features: vec![GeoFeature {
                code: Some("764".into()),
                name: Some("Thailand".into()),
                shape: MultiPolygon(vec![Polygon::new(ring, vec![])]),
            }],
        }
    }

    #[test]
    fn svg_has_both_layers() {
        let d = doc();
        let out = render(&scene(Some(&d), ZoomTransform::IDENTITY), &Stats::of(COUNTRIES));
        assert!(out.starts_with("<svg"));
        assert!(out.trim_end().ends_with("</svg>"));
        assert_eq!(out.matches("<path ").count(), 1);
        assert_eq!(out.matches(r#"class="marker""#).count(), COUNTRIES.len());
        assert!(out.contains(r#"data-code="764""#));
        assert!(out.contains("<title>Thailand</title></path>"));
        assert!(out.contains("rgba(74, 222, 128, 0.6)"));
        assert!(out.contains(r#"repeatCount="indefinite""#));
        assert!(out.contains(HEADER_FLAG_URL));
        assert!(out.contains("目的地 45"));
    }

    #[test]
    fn zoom_moves_markers_but_not_font_sizes() {
        let d = doc();
        let plain = render(&scene(Some(&d), ZoomTransform::IDENTITY), &Stats::default());
        let zoomed = render(
            &scene(Some(&d), ZoomTransform::new(2.0, -100.0, 40.0)),
            &Stats::default(),
        );
        assert!(zoomed.contains(r#"transform="translate(-100,40) scale(2)""#));
        let sizes = |s: &str| {
            s.matches(r#"font-size="14px""#).count() + s.matches(r#"font-size="10px""#).count()
        };
        assert_eq!(sizes(&plain), sizes(&zoomed));
        assert_eq!(sizes(&plain), COUNTRIES.len() * 2);
        assert_ne!(plain, zoomed);
    }

    #[test]
    fn markers_only_without_geometry() {
        let out = render(&scene(None, ZoomTransform::IDENTITY), &Stats::default());
        assert_eq!(out.matches("<path ").count(), 0);
        assert_eq!(out.matches(r#"class="marker""#).count(), COUNTRIES.len());
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
