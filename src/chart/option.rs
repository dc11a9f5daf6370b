use crate::chart::merge::merge_options;
use chrono::{DateTime, Utc};
use log::warn;
use scoreboard_api::{TopEntry, TopStandings, UserMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A plotted point: solve time and the running total at that solve.
pub type SeriesPoint = (DateTime<Utc>, i64);

// ---------------------------------------------------------------------------
// Option model — serializes to the same keys an ECharts option uses, so an
// override file written for the web scoreboard applies here unchanged.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartOption {
    pub title: Title,
    pub legend: Legend,
    pub x_axis: Vec<AxisOption>,
    pub y_axis: Vec<AxisOption>,
    pub data_zoom: Vec<DataZoom>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Title {
    pub text: String,
    /// "left", "center" or "right".
    pub left: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Legend {
    #[serde(rename = "type")]
    pub kind: String,
    pub orient: String,
    pub align: String,
    pub data: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    Time,
    #[default]
    Value,
    Category,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AxisOption {
    #[serde(rename = "type")]
    pub kind: AxisType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary_gap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataZoom {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub x_axis_index: Vec<usize>,
    pub filter_mode: String,
    /// Window start, percent of the full x range.
    pub start: f64,
    /// Window end, percent of the full x range.
    pub end: f64,
}

impl Default for DataZoom {
    fn default() -> Self {
        Self {
            id: String::new(),
            kind: "slider".to_string(),
            x_axis_index: vec![0],
            filter_mode: "filter".to_string(),
            start: 0.0,
            end: 100.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Series {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub item_style: ItemStyle,
    pub data: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemStyle {
    pub color: String,
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Build the chart option for `top` and apply `overrides`.
///
/// An override that leaves the option in a shape we cannot read is logged
/// and the base option is returned instead.
pub fn build_chart_option(mode: UserMode, top: &TopStandings, overrides: Option<&Value>) -> ChartOption {
    let base = base_chart_option(mode, top);
    let Some(overrides) = overrides else {
        return base;
    };
    match apply_overrides(&base, overrides) {
        Ok(option) => option,
        Err(e) => {
            warn!("ignoring chart option overrides: {e}");
            base
        }
    }
}

pub fn base_chart_option(mode: UserMode, top: &TopStandings) -> ChartOption {
    let mut option = ChartOption {
        title: Title {
            text: format!("Top 10 {}", mode.noun()),
            left: "center".to_string(),
        },
        legend: Legend {
            kind: "scroll".to_string(),
            orient: "horizontal".to_string(),
            align: "left".to_string(),
            data: Vec::with_capacity(top.len()),
        },
        x_axis: vec![AxisOption {
            kind: AxisType::Time,
            boundary_gap: Some(false),
            ..Default::default()
        }],
        y_axis: vec![AxisOption {
            kind: AxisType::Value,
            ..Default::default()
        }],
        data_zoom: vec![DataZoom {
            id: "dataZoomX".to_string(),
            ..Default::default()
        }],
        series: Vec::with_capacity(top.len()),
    };

    for entry in &top.entries {
        option.legend.data.push(entry.name.clone());
        option.series.push(entry_series(entry));
    }

    option
}

pub fn apply_overrides(base: &ChartOption, overrides: &Value) -> Result<ChartOption, serde_json::Error> {
    let merged = merge_options(serde_json::to_value(base)?, overrides);
    serde_json::from_value(merged)
}

fn entry_series(entry: &TopEntry) -> Series {
    let values: Vec<i64> = entry.solves.iter().map(|s| s.value).collect();
    let totals = cumulative_sum(&values);

    // Undated solves still count toward later totals; they just have no x.
    let data = entry
        .solves
        .iter()
        .zip(totals)
        .filter_map(|(solve, total)| solve.date.map(|date| (date, total)))
        .collect();

    Series {
        name: entry.name.clone(),
        kind: "line".to_string(),
        item_style: ItemStyle {
            color: hsl_color(color_hash(&format!("{}{}", entry.name, entry.id))),
        },
        data,
    }
}

/// Running totals: index `i` holds `values[0] + ... + values[i]`.
pub fn cumulative_sum(values: &[i64]) -> Vec<i64> {
    values
        .iter()
        .scan(0i64, |total, value| {
            *total += value;
            Some(*total)
        })
        .collect()
}

/// Hue in `[0, 360)` derived from `input`.
///
/// Same arithmetic as the web scoreboard (`hash = c + ((hash << 5) - hash)`
/// over UTF-16 units, shift on a 32-bit int, everything else on doubles) so
/// an entry gets the same color in both.
pub fn color_hash(input: &str) -> u32 {
    let mut hash = 0f64;
    for unit in input.encode_utf16() {
        let shifted = to_int32(hash).wrapping_shl(5);
        hash = f64::from(unit) + (f64::from(shifted) - hash);
    }
    (hash.abs() % 360.0) as u32
}

fn to_int32(value: f64) -> i32 {
    // `value` is always integral and well inside i64.
    value as i64 as i32
}

pub fn hsl_color(hue: u32) -> String {
    format!("hsl({hue}, 65%, 55%)")
}
