//! Net worth sparkline
//!
//! Lays out the snapshot history as a small line chart (poly-line, one marker
//! per month, a floating label with the latest value) and renders it to SVG
//! using the configured theme colours.

use crate::storage::NetWorthSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

const PADDING: f64 = 12.0;
const MARKER_RADIUS: f64 = 2.5;
const LABEL_HEIGHT: f64 = 20.0;
const LABEL_FONT_SIZE: f64 = 11.0;
const LABEL_CHAR_WIDTH: f64 = 6.5;
const LABEL_GAP: f64 = 8.0;
const EDGE_MARGIN: f64 = 2.0;

/// Colours and font used when drawing charts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Theme {
    #[serde(default = "default_accent")]
    pub accent: String,
    #[serde(default = "default_muted")]
    pub muted: String,
    #[serde(default = "default_surface")]
    pub surface: String,
    #[serde(default = "default_text")]
    pub text: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

fn default_accent() -> String {
    "#4f7cff".to_string()
}

fn default_muted() -> String {
    "#8a94a6".to_string()
}

fn default_surface() -> String {
    "#ffffff".to_string()
}

fn default_text() -> String {
    "#1f2430".to_string()
}

fn default_font_family() -> String {
    "system-ui, sans-serif".to_string()
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: default_accent(),
            muted: default_muted(),
            surface: default_surface(),
            text: default_text(),
            font_family: default_font_family(),
        }
    }
}

/// One plotted month
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub month: String,
    pub value: f64,
}

/// Floating box showing the latest value
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LabelBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub text: String,
}

/// Geometry of a sparkline on a `width` x `height` canvas
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SparklineLayout {
    pub width: f64,
    pub height: f64,
    pub points: Vec<ChartPoint>,
    pub label: Option<LabelBox>,
}

impl SparklineLayout {
    /// Map snapshots (ascending by month) onto the canvas
    pub fn compute(snapshots: &[NetWorthSnapshot], width: f64, height: f64, currency: &str) -> Self {
        let width = width.max(2.0 * PADDING + 1.0);
        let height = height.max(2.0 * PADDING + 1.0);

        let min = snapshots
            .iter()
            .map(|s| s.net_worth)
            .fold(f64::INFINITY, f64::min);
        let max = snapshots
            .iter()
            .map(|s| s.net_worth)
            .fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        let inner_w = width - 2.0 * PADDING;
        let inner_h = height - 2.0 * PADDING;
        let n = snapshots.len();

        let points: Vec<ChartPoint> = snapshots
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let x = if n == 1 {
                    width / 2.0
                } else {
                    PADDING + inner_w * i as f64 / (n - 1) as f64
                };
                // a flat series sits mid-height
                let y = if range > 0.0 {
                    PADDING + (1.0 - (s.net_worth - min) / range) * inner_h
                } else {
                    height / 2.0
                };
                ChartPoint {
                    x,
                    y,
                    month: s.ym.to_string(),
                    value: s.net_worth,
                }
            })
            .collect();

        let label = points
            .last()
            .map(|last| place_label(last, width, height, currency));

        Self {
            width,
            height,
            points,
            label,
        }
    }

    /// Render as a standalone SVG document
    pub fn render_svg(&self, theme: &Theme) -> String {
        SvgDocument {
            layout: self,
            theme,
        }
        .to_string()
    }
}

/// A laid-out sparkline paired with the theme it is drawn in
struct SvgDocument<'a> {
    layout: &'a SparklineLayout,
    theme: &'a Theme,
}

impl fmt::Display for SvgDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (layout, theme) = (self.layout, self.theme);
        write!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = fmt_num(layout.width),
            h = fmt_num(layout.height),
        )?;
        write!(
            f,
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            fmt_num(layout.width),
            fmt_num(layout.height),
            escape(&theme.surface),
        )?;

        if layout.points.is_empty() {
            write!(
                f,
                r#"<text x="{}" y="{}" fill="{}" font-family="{}" font-size="{}" text-anchor="middle">No history yet</text>"#,
                fmt_num(layout.width / 2.0),
                fmt_num(layout.height / 2.0),
                escape(&theme.muted),
                escape(&theme.font_family),
                fmt_num(LABEL_FONT_SIZE),
            )?;
            return f.write_str("</svg>");
        }

        let polyline: Vec<String> = layout
            .points
            .iter()
            .map(|p| format!("{},{}", fmt_num(p.x), fmt_num(p.y)))
            .collect();
        write!(
            f,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="2" stroke-linejoin="round" stroke-linecap="round"/>"#,
            polyline.join(" "),
            escape(&theme.accent),
        )?;

        for point in &layout.points {
            write!(
                f,
                r#"<circle cx="{}" cy="{}" r="{}" fill="{}"><title>{}</title></circle>"#,
                fmt_num(point.x),
                fmt_num(point.y),
                fmt_num(MARKER_RADIUS),
                escape(&theme.accent),
                escape(&point.month),
            )?;
        }

        if let Some(label) = &layout.label {
            write!(
                f,
                r#"<rect x="{}" y="{}" width="{}" height="{}" rx="4" fill="{}" stroke="{}"/>"#,
                fmt_num(label.x),
                fmt_num(label.y),
                fmt_num(label.width),
                fmt_num(label.height),
                escape(&theme.surface),
                escape(&theme.muted),
            )?;
            write!(
                f,
                r#"<text x="{}" y="{}" fill="{}" font-family="{}" font-size="{}" text-anchor="middle" dominant-baseline="central">{}</text>"#,
                fmt_num(label.x + label.width / 2.0),
                fmt_num(label.y + label.height / 2.0),
                escape(&theme.text),
                escape(&theme.font_family),
                fmt_num(LABEL_FONT_SIZE),
                escape(&label.text),
            )?;
        }

        f.write_str("</svg>")
    }
}

/// Put the label above the point when there is room, otherwise below,
/// then clamp it inside the canvas.
fn place_label(point: &ChartPoint, width: f64, height: f64, currency: &str) -> LabelBox {
    let text = format_money(point.value, currency);
    let box_w = (text.chars().count() as f64 * LABEL_CHAR_WIDTH + 12.0).min(width - 2.0 * EDGE_MARGIN);
    let box_h = LABEL_HEIGHT.min(height - 2.0 * EDGE_MARGIN);

    let x = (point.x - box_w / 2.0).clamp(EDGE_MARGIN, width - box_w - EDGE_MARGIN);
    let above = point.y - box_h - LABEL_GAP;
    let y = if above >= EDGE_MARGIN {
        above
    } else {
        point.y + LABEL_GAP
    };
    let y = y.clamp(EDGE_MARGIN, height - box_h - EDGE_MARGIN);

    LabelBox {
        x,
        y,
        width: box_w,
        height: box_h,
        text,
    }
}

/// Format an amount with the currency's symbol and thousands separators
pub fn format_money(value: f64, currency: &str) -> String {
    let symbol = match currency.to_uppercase().as_str() {
        "USD" | "CAD" | "AUD" | "NZD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "JPY" | "CNY" => "¥".to_string(),
        "INR" => "₹".to_string(),
        other => format!("{} ", other),
    };
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}{}.{:02}", sign, symbol, grouped, cents % 100)
}

fn fmt_num(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.1}", rounded)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
