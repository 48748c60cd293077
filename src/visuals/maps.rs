use crate::domain::fire_point::FirePoint;
use crate::utils::error::{HazardsError, Result};
use crate::visuals::colors::{map_ordinal_to_color, Palette, Rgba};
use serde::Serialize;
use serde_json::{json, Value};
use std::str::FromStr;

/// Sizes are clipped to this range (hectares) before radius scaling.
const SIZE_CLIP_HA: (f64, f64) = (0.1, 10_000.0);

pub const TOOLTIP_HTML: &str = "<b>{fire_name}</b><br/>Size: {size_ha_fmt} ha<br/>Year: {year}<br/>Long.: {longitude} Lat.: {latitude}";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewPreset {
    #[default]
    Canada,
    Quebec,
}

impl ViewPreset {
    pub fn view_state(&self) -> ViewState {
        match self {
            // near the geographic centre, wide enough for every province
            ViewPreset::Canada => ViewState {
                latitude: 58.0,
                longitude: -98.0,
                zoom: 3.0,
                pitch: 10.0,
                bearing: 5.0,
            },
            ViewPreset::Quebec => ViewState {
                latitude: 52.0,
                longitude: -71.0,
                zoom: 5.0,
                pitch: 0.0,
                bearing: 0.0,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewPreset::Canada => "canada",
            ViewPreset::Quebec => "quebec",
        }
    }
}

impl FromStr for ViewPreset {
    type Err = HazardsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "canada" => Ok(ViewPreset::Canada),
            "quebec" | "québec" => Ok(ViewPreset::Quebec),
            other => Err(HazardsError::UnknownView(other.to_string())),
        }
    }
}

pub fn default_view_state(setting: &str) -> Result<ViewState> {
    Ok(setting.parse::<ViewPreset>()?.view_state())
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub color_by_year: bool,
    pub size_by_area: bool,
    pub max_display_radius: f64,
    pub min_display_radius: f64,
    pub default_radius: f64,
    pub view: ViewPreset,
    pub alpha: u8,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            color_by_year: false,
            size_by_area: false,
            max_display_radius: 5000.0,
            min_display_radius: 300.0,
            default_radius: 2000.0,
            view: ViewPreset::Canada,
            alpha: 140,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub fire_name: Option<String>,
    pub size_ha: Option<f64>,
    pub size_ha_fmt: String,
    pub year: i32,
    pub fill_color: Rgba,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterplotLayer {
    #[serde(rename = "@@type")]
    pub layer_type: &'static str,
    pub id: String,
    pub data: Vec<ScatterPoint>,
    pub get_position: &'static str,
    pub get_radius: &'static str,
    pub get_fill_color: &'static str,
    pub pickable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipStyle {
    pub background_color: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub html: &'static str,
    pub style: TooltipStyle,
}

/// deck.gl JSON description of the fire map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSpec {
    pub initial_view_state: ViewState,
    pub layers: Vec<ScatterplotLayer>,
    pub tooltip: Tooltip,
}

/// Square-root scaled, min-max normalised radii in
/// `[min_radius, max_radius]`. A missing size counts as the clip floor and a
/// constant input maps every point to `min_radius`.
pub fn scale_radii(sizes: &[Option<f64>], min_radius: f64, max_radius: f64) -> Vec<f64> {
    let scaled: Vec<f64> = sizes
        .iter()
        .map(|size| {
            size.unwrap_or(SIZE_CLIP_HA.0)
                .clamp(SIZE_CLIP_HA.0, SIZE_CLIP_HA.1)
                .sqrt()
        })
        .collect();

    let lo = scaled.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;

    scaled
        .iter()
        .map(|value| {
            if span > 0.0 {
                (value - lo) / span * (max_radius - min_radius) + min_radius
            } else {
                min_radius
            }
        })
        .collect()
}

/// Formats with `,` thousands separators, e.g. `1234.5` with 1 decimal
/// becomes `1,234.5`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }

    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    if value.is_sign_negative() && !is_zero {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn format_count(count: usize) -> String {
    format_thousands(count as f64, 0)
}

pub fn make_deck(fires: &[&FirePoint], options: &MapOptions) -> DeckSpec {
    let colors: Vec<Rgba> = if options.color_by_year {
        // -999 (unknown) is an ordinary ordinal and sorts first
        let years: Vec<Option<i32>> = fires.iter().map(|fire| Some(fire.year)).collect();
        map_ordinal_to_color(&years, Palette::Plasma, options.alpha)
    } else {
        vec![[255, 0, 0, options.alpha]; fires.len()]
    };

    let radii: Vec<f64> = if options.size_by_area {
        let sizes: Vec<Option<f64>> = fires.iter().map(|fire| fire.size_ha).collect();
        scale_radii(&sizes, options.min_display_radius, options.max_display_radius)
    } else {
        vec![options.default_radius; fires.len()]
    };

    let data = fires
        .iter()
        .zip(colors)
        .zip(radii)
        .map(|((fire, fill_color), radius)| ScatterPoint {
            longitude: fire.longitude,
            latitude: fire.latitude,
            fire_name: fire.fire_name.clone(),
            size_ha: fire.size_ha,
            size_ha_fmt: fire
                .size_ha
                .map(|size| format_thousands(size, 0))
                .unwrap_or_default(),
            year: fire.year,
            fill_color,
            radius,
        })
        .collect();

    DeckSpec {
        initial_view_state: options.view.view_state(),
        layers: vec![ScatterplotLayer {
            layer_type: "ScatterplotLayer",
            id: "fires".to_string(),
            data,
            get_position: "@@=[longitude, latitude]",
            get_radius: "@@=radius",
            get_fill_color: "@@=fill_color",
            pickable: true,
        }],
        tooltip: Tooltip {
            html: TOOLTIP_HTML,
            style: TooltipStyle {
                background_color: "steelblue",
                color: "white",
            },
        },
    }
}

/// Clustered marker view as GeoJSON: one red circle marker per fire with an
/// HTML popup, centred over Quebec.
pub fn make_fire_popups(fires: &[&FirePoint], zoom_start: f64) -> Value {
    let features: Vec<Value> = fires
        .iter()
        .map(|fire| {
            let popup = format!(
                "🔥 {}<br>Size: {} ha<br>Cause: {}<br>Date: {}",
                fire.fire_name.as_deref().unwrap_or("Unknown"),
                format_thousands(fire.size_ha.unwrap_or(0.0), 1),
                fire.cause_primary.as_deref().unwrap_or("N/A"),
                fire.report_date
                    .map(|date| date.to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
            );

            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [fire.longitude, fire.latitude],
                },
                "properties": {
                    "popup": popup,
                    "max_width": 300,
                    "radius": 4,
                    "fill": true,
                    "color": "red",
                    "fill_opacity": 0.6,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "center": [52.0, -71.0],
        "zoom_start": zoom_start,
        "cluster": true,
        "features": features,
    })
}
