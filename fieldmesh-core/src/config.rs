use serde::{Deserialize, Serialize};

/// Mesh construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeshConfig {
    /// Longest permitted triangle edge. 0 or less disables refinement.
    pub target_edge_length: f64,
    /// Shapes with a sharper angle (radians) are rejected.
    pub sharpest_allowable_angle: f64,
    /// Largest number of points the triangulator may create.
    pub max_points: usize,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self::new(0.)
    }
}

impl MeshConfig {
    pub const DEFAULT_SHARPEST_ALLOWABLE_ANGLE: f64 = 1e-4;
    pub const DEFAULT_MAX_POINTS: usize = 5_000_000;

    pub fn new(target_edge_length: f64) -> Self {
        Self {
            target_edge_length,
            sharpest_allowable_angle: Self::DEFAULT_SHARPEST_ALLOWABLE_ANGLE,
            max_points: Self::DEFAULT_MAX_POINTS,
        }
    }

    pub fn refine(&self) -> bool {
        self.target_edge_length > 0.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn partial_json() {
        let config: MeshConfig = serde_json::from_str(r#"{ "targetEdgeLength": 0.25 }"#).unwrap();
        assert_eq!(config, MeshConfig::new(0.25));
        assert!(config.refine());
        assert!(!MeshConfig::default().refine());
    }
}
