//! Render mode selection and the raster style table

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    /// Value of the vector map `colorScheme` property
    pub fn as_vector_property(&self) -> &'static str {
        match self {
            ColorScheme::Light => "LIGHT",
            ColorScheme::Dark => "DARK",
        }
    }
}

impl std::str::FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(ColorScheme::Light),
            "dark" => Ok(ColorScheme::Dark),
            other => Err(format!("unknown color scheme '{other}'")),
        }
    }
}

/// One entry of a raster style table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_type: Option<&'static str>,
    pub element_type: &'static str,
    pub stylers: [Styler; 1],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Styler {
    pub color: &'static str,
}

/// (featureType, elementType, color)
const DARK_RULES: [(Option<&str>, &str, &str); 17] = [
    (None, "geometry", "#212121"),
    (None, "labels.text.fill", "#757575"),
    (None, "labels.text.stroke", "#212121"),
    (Some("administrative"), "geometry", "#757575"),
    (Some("poi"), "geometry", "#2a2a2a"),
    (Some("poi"), "labels.text.fill", "#9a9a9a"),
    (Some("poi.park"), "geometry", "#1a3d1a"),
    (Some("poi.park"), "labels.text.fill", "#6b9a6b"),
    (Some("road"), "geometry.fill", "#2c2c2c"),
    (Some("road"), "labels.text.fill", "#9a9a9a"),
    (Some("road.arterial"), "geometry", "#373737"),
    (Some("road.highway"), "geometry", "#3c3c3c"),
    (Some("road.highway.controlled_access"), "geometry", "#4e4e4e"),
    (Some("road.local"), "labels.text.fill", "#616161"),
    (Some("transit"), "labels.text.fill", "#757575"),
    (Some("water"), "geometry", "#000000"),
    (Some("water"), "labels.text.fill", "#3d3d3d"),
];

/// Raster style table for a color scheme; light uses the SDK defaults
pub fn raster_styles(scheme: ColorScheme) -> Vec<StyleRule> {
    match scheme {
        ColorScheme::Light => Vec::new(),
        ColorScheme::Dark => DARK_RULES
            .iter()
            .map(|&(feature_type, element_type, color)| StyleRule {
                feature_type,
                element_type,
                stylers: [Styler { color }],
            })
            .collect(),
    }
}

/// How the map is drawn. Chosen once when the controller starts.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderMode {
    /// Cloud-styled vector map; supports heading and tilt
    Vector {
        map_id: String,
        color_scheme: ColorScheme,
    },
    /// Static style table; rotation disabled
    Raster { styles: Vec<StyleRule> },
}

impl RenderMode {
    /// Vector when a map id is configured, raster otherwise
    pub fn select(map_id: Option<&str>, color_scheme: ColorScheme) -> Self {
        match map_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => RenderMode::Vector {
                map_id: id.to_string(),
                color_scheme,
            },
            None => RenderMode::Raster {
                styles: raster_styles(color_scheme),
            },
        }
    }

    pub fn supports_rotation(&self) -> bool {
        matches!(self, RenderMode::Vector { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::Vector { .. } => "vector",
            RenderMode::Raster { .. } => "raster",
        }
    }
}
