use std::{
    fs,
    path::PathBuf,
    str::FromStr,
    sync::mpsc::Sender,
    thread,
};

use geo::{Geometry, LineString, MultiPolygon, Polygon};
use geojson::{GeoJson, feature::Id};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::crosswalk::normalize_code;
use crate::error::{AtlasError, Result};

/// Versioned 1:110m country topology
pub const GEO_URL: &str = "https://cdn.jsdelivr.net/npm/world-atlas@2/countries-110m.json";
/// Object inside the topology holding country polygons
const COUNTRIES_OBJECT: &str = "countries";

/// One country shape from the external document
#[derive(Clone, Debug, PartialEq)]
pub struct GeoFeature {
    /// ISO numeric code, zero-padded; some disputed areas have none
    pub code: Option<String>,
    pub name: Option<String>,
    pub shape: MultiPolygon<f64>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryDocument {
    pub features: Vec<GeoFeature>,
}

impl GeometryDocument {
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Accepts a TopoJSON topology or a GeoJSON feature collection.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        if value.get("type").and_then(Value::as_str) == Some("Topology") {
            let topo: Topology = serde_json::from_value(value)?;
            topo.decode(COUNTRIES_OBJECT)
        } else {
            from_geojson(GeoJson::from_json_value(value)?)
        }
    }
}

impl FromStr for GeometryDocument {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn from_geojson(raw: GeoJson) -> Result<GeometryDocument> {
    let mut features = Vec::new();
    if let GeoJson::FeatureCollection(fc) = raw {
        for feature in fc.features {
            let code = match &feature.id {
                Some(Id::String(s)) => Some(normalize_code(s)),
                Some(Id::Number(n)) => Some(normalize_code(&n.to_string())),
                None => feature
                    .properties
                    .as_ref()
                    .and_then(|p| p.get("ISO_N3").or_else(|| p.get("id")))
                    .and_then(code_of),
            };
            let name = feature
                .properties
                .as_ref()
                .and_then(|p| p.get("name").or_else(|| p.get("ADMIN")))
                .and_then(Value::as_str)
                .map(str::to_string);

            if let Some(gj) = feature.geometry {
                let geom: Geometry<f64> = gj.value.try_into()?;
                let shape = match geom {
                    Geometry::Polygon(p) => p.into(),
                    Geometry::MultiPolygon(m) => m,
                    _ => continue,
                };
                features.push(GeoFeature { code, name, shape });
            }
        }
    }
    Ok(GeometryDocument { features })
}

fn code_of(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(normalize_code(s)),
        Value::Number(n) => Some(normalize_code(&n.to_string())),
        _ => None,
    }
}

// TopoJSON: shared arcs, optionally quantized and delta-encoded.

#[derive(Deserialize)]
struct Topology {
    arcs: Vec<Vec<Vec<f64>>>,
    transform: Option<TopoTransform>,
    objects: Map<String, Value>,
}

#[derive(Deserialize)]
struct TopoTransform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Deserialize)]
struct TopoGeometry {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    arcs: Value,
    id: Option<Value>,
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometries: Vec<TopoGeometry>,
}

impl Topology {
    fn decode(&self, object: &str) -> Result<GeometryDocument> {
        let root = self
            .objects
            .get(object)
            .ok_or_else(|| AtlasError::Topology(format!("no object named {object:?}")))?;
        let root: TopoGeometry = serde_json::from_value(root.clone())?;
        let arcs = self.absolute_arcs();

        let mut features = Vec::new();
        self.collect(&root, &arcs, &mut features)?;
        Ok(GeometryDocument { features })
    }

    /// Undo quantization: running sums of the deltas, then scale + translate.
    fn absolute_arcs(&self) -> Vec<Vec<(f64, f64)>> {
        self.arcs
            .iter()
            .map(|arc| match &self.transform {
                Some(t) => {
                    let (mut x, mut y) = (0.0, 0.0);
                    arc.iter()
                        .filter(|p| p.len() >= 2)
                        .map(|p| {
                            x += p[0];
                            y += p[1];
                            (x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1])
                        })
                        .collect()
                }
                None => arc
                    .iter()
                    .filter(|p| p.len() >= 2)
                    .map(|p| (p[0], p[1]))
                    .collect(),
            })
            .collect()
    }

    fn collect(
        &self,
        geom: &TopoGeometry,
        arcs: &[Vec<(f64, f64)>],
        out: &mut Vec<GeoFeature>,
    ) -> Result<()> {
        let polygons: Vec<Vec<Vec<i64>>> = match geom.kind.as_deref() {
            Some("GeometryCollection") => {
                for child in &geom.geometries {
                    self.collect(child, arcs, out)?;
                }
                return Ok(());
            }
            Some("Polygon") => vec![serde_json::from_value(geom.arcs.clone())?],
            Some("MultiPolygon") => serde_json::from_value(geom.arcs.clone())?,
            // points, lines and null geometries carry no area
            _ => return Ok(()),
        };

        let mut shape = Vec::with_capacity(polygons.len());
        for rings in &polygons {
            let mut rings = rings.iter().map(|r| stitch_ring(r, arcs));
            let Some(exterior) = rings.next().transpose()? else {
                continue;
            };
            let interiors = rings.collect::<Result<Vec<_>>>()?;
            shape.push(Polygon::new(exterior, interiors));
        }

        out.push(GeoFeature {
            code: geom.id.as_ref().and_then(code_of),
            name: geom
                .properties
                .as_ref()
                .and_then(|p| p.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string),
            shape: MultiPolygon(shape),
        });
        Ok(())
    }
}

/// Join arcs into one ring. Negative index `i` means arc `!i` reversed; the
/// first point of each following arc repeats the last point of the previous.
fn stitch_ring(indices: &[i64], arcs: &[Vec<(f64, f64)>]) -> Result<LineString<f64>> {
    let mut coords: Vec<(f64, f64)> = Vec::new();
    for &i in indices {
        let (idx, reversed) = if i < 0 { (!i as usize, true) } else { (i as usize, false) };
        let arc = arcs
            .get(idx)
            .ok_or_else(|| AtlasError::Topology(format!("arc index {i} out of range")))?;
        let skip = usize::from(!coords.is_empty());
        if reversed {
            coords.extend(arc.iter().rev().skip(skip));
        } else {
            coords.extend(arc.iter().skip(skip));
        }
    }
    Ok(LineString::from(coords))
}

/// Where the base map comes from
#[derive(Clone, Debug)]
pub enum GeometrySource {
    Url(String),
    File(PathBuf),
}

impl GeometrySource {
    pub fn describe(&self) -> String {
        match self {
            GeometrySource::Url(u) => u.clone(),
            GeometrySource::File(p) => p.display().to_string(),
        }
    }
}

/// Blocking load; used directly by `export-svg` and from the loader thread.
pub fn load(source: &GeometrySource) -> Result<GeometryDocument> {
    let text = match source {
        GeometrySource::File(path) => fs::read_to_string(path)?,
        GeometrySource::Url(url) => fetch(url)?,
    };
    let doc = GeometryDocument::parse(&text)?;
    debug!(features = doc.feature_count(), bytes = text.len(), "geometry parsed");
    Ok(doc)
}

fn fetch(url: &str) -> Result<String> {
    let resp = ureq::get(url).call().map_err(|e| AtlasError::Fetch {
        url: url.to_string(),
        source: Box::new(e),
    })?;
    Ok(resp.into_string()?)
}

/// Loads the document once on a background thread and hands the result back
/// over `tx`. Failures are logged here and not retried.
pub fn spawn_loader<T>(source: GeometrySource, tx: Sender<T>)
where
    T: From<GeometryDocument> + Send + 'static,
{
    thread::spawn(move || {
        info!(source = %source.describe(), "loading map geometry");
        match load(&source) {
            Ok(doc) => {
                info!(features = doc.feature_count(), "map geometry loaded");
                // the receiver is gone only when the app already quit
                let _ = tx.send(T::from(doc));
            }
            Err(err) => error!(source = %source.describe(), error = %err, "map data load failed"),
        }
    });
}
