//! The layout configuration. The configuration is a flat set of named
//! options that can come from a JSON document or from a list of `key=value`
//! pairs (as given on the command line). Unknown options are ignored.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::base::Orientation;
use super::error::Result;

/// The placement algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Sugiyama style layered layout.
    #[default]
    Layered,
    /// Multidimensional scaling of the graph distances.
    Mds,
}

/// The way edges are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeRoutingMode {
    /// Edges are not routed at all.
    None,
    StraightLine,
    #[default]
    Spline,
    /// Spline routing where edges prefer corridors used by other edges.
    SplineBundling,
    Rectilinear,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub algorithm: Algorithm,
    pub direction: Orientation,
    pub edge_routing: EdgeRoutingMode,
    /// Minimum gap between nodes in the same layer.
    pub node_separation: f64,
    /// Minimum gap between consecutive layers.
    pub layer_separation: f64,
    /// Clearance between edges and obstacles, and around cluster members.
    pub padding: f64,
    /// The target edge length of the MDS layout.
    pub ideal_edge_length: f64,
    /// Rotation of the MDS layout, in degrees.
    pub rotation: f64,
    pub remove_overlaps: bool,
    /// Number of sweeps of the crossing minimization.
    pub crossing_passes: usize,
    /// Number of iterations of the polyline relaxation.
    pub relaxation_passes: usize,
    /// The cost reduction for reusing a routed corridor, in the range [0, 1).
    pub bundling_strength: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Layered,
            direction: Orientation::TopToBottom,
            edge_routing: EdgeRoutingMode::Spline,
            node_separation: 20.,
            layer_separation: 40.,
            padding: 8.,
            ideal_edge_length: 80.,
            rotation: 0.,
            remove_overlaps: true,
            crossing_passes: 24,
            relaxation_passes: 8,
            bundling_strength: 0.5,
        }
    }
}

const KNOWN_OPTIONS: [&str; 12] = [
    "algorithm",
    "direction",
    "edge_routing",
    "node_separation",
    "layer_separation",
    "padding",
    "ideal_edge_length",
    "rotation",
    "remove_overlaps",
    "crossing_passes",
    "relaxation_passes",
    "bundling_strength",
];

impl LayoutConfig {
    /// Parse the configuration from a JSON object.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Ok(serde_json::from_value(value)?),
        }
    }

    /// Build the configuration from a list of (name, value) pairs. Each value
    /// is read as a JSON literal, or as a plain string if it is not one, so
    /// `padding=4` and `direction=left-to-right` both work. Dashes in names
    /// are accepted in place of underscores.
    pub fn from_options<K, V>(pairs: &[(K, V)]) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = Map::new();
        for (key, value) in pairs {
            let key = key.as_ref().trim().replace('-', "_");
            let raw = value.as_ref().trim();
            let value = serde_json::from_str::<Value>(raw)
                .unwrap_or_else(|_| Value::String(raw.to_string()));
            map.insert(key, value);
        }
        Self::from_map(map)
    }

    fn from_map(map: Map<String, Value>) -> Result<Self> {
        for key in map.keys() {
            if !KNOWN_OPTIONS.contains(&key.as_str()) {
                #[cfg(feature = "log")]
                log::debug!("Ignoring unknown layout option '{}'", key);
            }
        }
        Ok(serde_json::from_value(Value::Object(map))?)
    }
}

#[test]
fn test_default_config() {
    let c = LayoutConfig::from_json("{}").unwrap();
    assert_eq!(c, LayoutConfig::default());
    assert_eq!(c.node_separation, 20.);
    assert_eq!(c.edge_routing, EdgeRoutingMode::Spline);
}

#[test]
fn test_config_options() {
    let c = LayoutConfig::from_options(&[
        ("algorithm", "mds"),
        ("direction", "left-to-right"),
        ("edge-routing", "spline-bundling"),
        ("padding", "4"),
        ("remove_overlaps", "false"),
        ("no_such_option", "1"),
    ])
    .unwrap();
    assert_eq!(c.algorithm, Algorithm::Mds);
    assert_eq!(c.direction, Orientation::LeftToRight);
    assert_eq!(c.edge_routing, EdgeRoutingMode::SplineBundling);
    assert_eq!(c.padding, 4.);
    assert!(!c.remove_overlaps);
    assert_eq!(c.crossing_passes, 24);

    let bad = LayoutConfig::from_options(&[("padding", "wide")]);
    assert!(matches!(bad, Err(crate::core::error::LayoutError::Config(_))));
    let bad = LayoutConfig::from_options(&[("direction", "sideways")]);
    assert!(bad.is_err());
}
