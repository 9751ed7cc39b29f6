use std::f64::consts::{FRAC_PI_4, PI};

/// Anchor of the map: Kathmandu valley, roughly the middle of the covered area
pub const CENTER: (f64, f64) = (84.1240, 28.3949);
/// Pixels per radian = viewport width / SCALE_DIVISOR
pub const SCALE_DIVISOR: f64 = 3.2;
/// Mercator is unbounded at the poles; clamp like web maps do.
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Pixel size of the map surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Spherical Mercator with a fixed centre; only the scale follows the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MercatorProjection {
    center: (f64, f64),
    scale: f64,
    translate: (f64, f64),
}

impl MercatorProjection {
    pub fn for_viewport(vp: Viewport) -> Self {
        Self {
            center: CENTER,
            scale: vp.width / SCALE_DIVISOR,
            translate: vp.center(),
        }
    }

    /// (lon, lat) degrees → (x, y) pixels, y growing downwards
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (lon0, lat0) = self.center;
        let x = self.translate.0 + self.scale * (lon - lon0).to_radians();
        let y = self.translate.1 - self.scale * (mercator_y(lat) - mercator_y(lat0));
        (x, y)
    }

    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        let (lon0, lat0) = self.center;
        let lon = lon0 + ((x - self.translate.0) / self.scale).to_degrees();
        let my = mercator_y(lat0) - (y - self.translate.1) / self.scale;
        let lat = (2.0 * my.exp().atan() - PI / 2.0).to_degrees();
        (lon, lat)
    }
}

fn mercator_y(lat: f64) -> f64 {
    let phi = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    (FRAC_PI_4 + phi / 2.0).tan().ln()
}

/// Pan/zoom state: screen = k · p + (x, y)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform { k: 1.0, x: 0.0, y: 0.0 };

    pub fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    pub fn apply(&self, (px, py): (f64, f64)) -> (f64, f64) {
        (px * self.k + self.x, py * self.k + self.y)
    }

    pub fn invert(&self, (sx, sy): (f64, f64)) -> (f64, f64) {
        ((sx - self.x) / self.k, (sy - self.y) / self.k)
    }

    fn invert_x(&self, sx: f64) -> f64 {
        (sx - self.x) / self.k
    }

    fn invert_y(&self, sy: f64) -> f64 {
        (sy - self.y) / self.k
    }

    /// Shift by (dx, dy) in untransformed units
    fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.k, self.x + self.k * dx, self.y + self.k * dy)
    }

    /// SVG `transform` attribute value
    pub fn to_svg(&self) -> String {
        format!("translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

/// Limits applied to every pan/zoom gesture
#[derive(Clone, Copy, Debug)]
pub struct ZoomBehavior {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Pan bound as multiples of the viewport: [lo, hi] on both axes
    pub extent_factor: (f64, f64),
}

impl Default for ZoomBehavior {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 8.0,
            extent_factor: (-1.5, 2.5),
        }
    }
}

impl ZoomBehavior {
    pub fn translate_extent(&self, vp: Viewport) -> [(f64, f64); 2] {
        let (lo, hi) = self.extent_factor;
        [(vp.width * lo, vp.height * lo), (vp.width * hi, vp.height * hi)]
    }

    pub fn clamp_scale(&self, k: f64) -> f64 {
        k.clamp(self.min_scale, self.max_scale)
    }

    /// Keep the visible window inside the translate extent, centring it when
    /// the window is larger than the extent.
    pub fn constrain(&self, t: ZoomTransform, vp: Viewport) -> ZoomTransform {
        let [(x0, y0), (x1, y1)] = self.translate_extent(vp);
        let dx0 = t.invert_x(0.0) - x0;
        let dx1 = t.invert_x(vp.width) - x1;
        let dy0 = t.invert_y(0.0) - y0;
        let dy1 = t.invert_y(vp.height) - y1;
        t.translate(settle(dx0, dx1), settle(dy0, dy1))
    }

    /// Scale by `factor` keeping the screen point `anchor` fixed
    pub fn zoom_at(
        &self,
        t: ZoomTransform,
        factor: f64,
        anchor: (f64, f64),
        vp: Viewport,
    ) -> ZoomTransform {
        let k = self.clamp_scale(t.k * factor);
        let (wx, wy) = t.invert(anchor);
        let next = ZoomTransform::new(k, anchor.0 - wx * k, anchor.1 - wy * k);
        self.constrain(next, vp)
    }

    /// Move by a screen-space delta
    pub fn pan(&self, t: ZoomTransform, dx: f64, dy: f64, vp: Viewport) -> ZoomTransform {
        self.constrain(ZoomTransform::new(t.k, t.x + dx, t.y + dy), vp)
    }
}

fn settle(d0: f64, d1: f64) -> f64 {
    if d1 > d0 {
        (d0 + d1) / 2.0
    } else if d0 < 0.0 {
        d0
    } else {
        d1.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn vp() -> Viewport {
        Viewport::new(320.0, 200.0)
    }

    #[test]
    fn center_projects_to_viewport_center() {
        let p = MercatorProjection::for_viewport(vp());
        let (x, y) = p.project(CENTER.0, CENTER.1);
        assert!((x - 160.0).abs() < EPS);
        assert!((y - 100.0).abs() < EPS);
        let (east, _) = p.project(CENTER.0 + 1.0, CENTER.1);
        assert!((east - 160.0 - 100.0 * 1f64.to_radians()).abs() < EPS);
    }

    #[test]
    fn east_is_right_and_north_is_up() {
        let p = MercatorProjection::for_viewport(vp());
        let (cx, cy) = p.project(CENTER.0, CENTER.1);
        let (ex, _) = p.project(CENTER.0 + 10.0, CENTER.1);
        let (_, ny) = p.project(CENTER.0, CENTER.1 + 10.0);
        assert!(ex > cx);
        assert!(ny < cy);
    }

    #[test]
    fn invert_round_trips_a_point() {
        let p = MercatorProjection::for_viewport(vp());
        let (x, y) = p.project(100.9925, 15.87);
        let (lon, lat) = p.invert(x, y);
        assert!((lon - 100.9925).abs() < 1e-6);
        assert!((lat - 15.87).abs() < 1e-6);
    }

    #[test]
    fn poles_stay_finite() {
        let p = MercatorProjection::for_viewport(vp());
        let (_, y) = p.project(0.0, -90.0);
        assert!(y.is_finite());
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let z = ZoomBehavior::default();
        let anchor = (100.0, 80.0);
        let t = z.zoom_at(ZoomTransform::IDENTITY, 2.0, anchor, vp());
        assert!((t.k - 2.0).abs() < EPS);
        // at identity the world point under the anchor is the anchor itself
        let (sx, sy) = t.apply(anchor);
        assert!((sx - anchor.0).abs() < EPS);
        assert!((sy - anchor.1).abs() < EPS);
        assert_eq!(t, ZoomTransform::new(2.0, -100.0, -80.0));
    }

    #[test]
    fn scale_is_clamped() {
        let z = ZoomBehavior::default();
        let t = z.zoom_at(ZoomTransform::IDENTITY, 100.0, (0.0, 0.0), vp());
        assert_eq!(t.k, 8.0);
        let t = z.zoom_at(ZoomTransform::IDENTITY, 0.01, (0.0, 0.0), vp());
        assert_eq!(t.k, 0.5);
    }

    #[test]
    fn pan_is_bounded_by_extent() {
        let z = ZoomBehavior::default();
        let v = vp();
        // Dragging far to the right would reveal world x < -1.5w on the left edge.
        let t = z.pan(ZoomTransform::IDENTITY, 10_000.0, -10_000.0, v);
        assert!((t.invert((0.0, 0.0)).0 - (-1.5 * v.width)).abs() < EPS);
        assert!((t.invert((v.width, v.height)).1 - 2.5 * v.height).abs() < EPS);
        // Small pans are untouched.
        let t = z.pan(ZoomTransform::IDENTITY, 30.0, -20.0, v);
        assert_eq!(t, ZoomTransform::new(1.0, 30.0, -20.0));
    }

    #[test]
    fn svg_transform_string() {
        assert_eq!(
            ZoomTransform::new(2.0, 10.0, -5.5).to_svg(),
            "translate(10,-5.5) scale(2)"
        );
    }
}
