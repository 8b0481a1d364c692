// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use chrono::{Datelike, NaiveDate, Weekday};
use plotters::prelude::*;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::FmpError;
use crate::models::{ChartKind, Observation, PriceSeries};

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 800;
/// Share of the figure height given to the price panel; volume gets the rest.
const PRICE_PANEL_SHARE: f64 = 0.8;

const COLOR_GAIN: RGBColor = RGBColor(16, 185, 129);
const COLOR_LOSS: RGBColor = RGBColor(244, 63, 94);
const COLOR_BLUE: RGBColor = RGBColor(59, 130, 246);

/// One trading day as plotted.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: f64,
}

/// Everything needed to draw a chart, computed without touching the disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub kind: ChartKind,
    pub instrument: String,
    pub interval: String,
    /// Requested start, or the first date of the series.
    pub start: NaiveDate,
    /// Requested end, or the last date of the series.
    pub end: NaiveDate,
    pub title: String,
    /// Weekday observations of the window, oldest first.
    pub bars: Vec<Bar>,
}

impl ChartFrame {
    fn price_range(&self) -> (f64, f64) {
        let (lo, hi) = self.bars.iter().fold((f64::MAX, f64::MIN), |(lo, hi), b| {
            let low = b.low.unwrap_or(b.close);
            let high = b.high.unwrap_or(b.close);
            (lo.min(low), hi.max(high))
        });
        let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
        (lo - pad, hi + pad)
    }

    fn max_volume(&self) -> f64 {
        self.bars.iter().map(|b| b.volume).fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub path: PathBuf,
    pub frame: ChartFrame,
}

pub fn chart_title(
    kind: ChartKind,
    instrument: &str,
    interval: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> String {
    format!(
        "|CHART TYPE: {} |SYMBOL: {} |INTERVAL: {} |START: {} |END: {}",
        kind, instrument, interval, start, end
    )
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn required(obs: &Observation, field: &'static str) -> Result<f64, FmpError> {
    obs.value(field).ok_or(FmpError::MissingField {
        field,
        date: obs.date,
    })
}

fn to_bar(obs: &Observation, kind: ChartKind) -> Result<Bar, FmpError> {
    for field in kind.required_fields() {
        required(obs, *field)?;
    }
    let ohlc = !matches!(kind, ChartKind::Line);
    Ok(Bar {
        date: obs.date,
        open: if ohlc { obs.value("open") } else { None },
        high: if ohlc { obs.value("high") } else { None },
        low: if ohlc { obs.value("low") } else { None },
        close: required(obs, "close")?,
        volume: required(obs, "volume")?,
    })
}

/// Selects the `[start, end]` window, drops weekend days from the time axis
/// and checks the fields `kind` needs.
pub fn prepare_chart(
    series: &PriceSeries,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    kind: ChartKind,
) -> Result<ChartFrame, FmpError> {
    let window = series.window(start, end);
    let bars = window
        .iter()
        .filter(|o| !is_weekend(o.date))
        .map(|o| to_bar(o, kind))
        .collect::<Result<Vec<_>, _>>()?;
    if bars.is_empty() {
        return Err(FmpError::EmptyWindow);
    }

    let start = start.or(series.first_date()).ok_or(FmpError::EmptyWindow)?;
    let end = end.or(series.last_date()).ok_or(FmpError::EmptyWindow)?;
    let interval = series.interval().to_string();

    Ok(ChartFrame {
        kind,
        instrument: series.instrument().to_string(),
        title: chart_title(kind, series.instrument(), &interval, start, end),
        interval,
        start,
        end,
        bars,
    })
}

/// Default file name for a chart under `output_dir`.
pub fn chart_path(output_dir: &Path, frame: &ChartFrame) -> PathBuf {
    output_dir.join(format!(
        "{}_{}_{}_to_{}.svg",
        frame.instrument, frame.kind, frame.start, frame.end
    ))
}

/// Draws `series` as an SVG figure at `output_path`: price panel on top,
/// volume bars below, both on the same trading-day axis.
pub fn draw_chart(
    series: &PriceSeries,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    kind: ChartKind,
    output_path: &Path,
) -> Result<RenderedChart, FmpError> {
    let frame = prepare_chart(series, start, end, kind)?;
    render_svg(&frame, output_path)?;
    info!(path = %output_path.display(), bars = frame.bars.len(), "chart written");

    Ok(RenderedChart {
        path: output_path.to_path_buf(),
        frame,
    })
}

fn chart_err<E: std::fmt::Display>(e: E) -> FmpError {
    FmpError::Chart(e.to_string())
}

/// Heights of the price and volume panels for a plotting area `height` pixels tall.
fn panel_heights(height: u32) -> (u32, u32) {
    let price = (height as f64 * PRICE_PANEL_SHARE).round() as u32;
    (price, height - price)
}

/// X range shared by both panels. Bar `i` sits on slot `i`, so weekends leave no gaps.
fn slot_range(bars: usize) -> Range<f64> {
    -0.5..(bars as f64 - 0.5)
}

fn ohlc_bar(x: f64, bar: &Bar) -> [PathElement<(f64, f64)>; 3] {
    let open = bar.open.unwrap_or(bar.close);
    let color = if bar.close >= open { COLOR_GAIN } else { COLOR_LOSS };
    let style = color.stroke_width(2);
    [
        PathElement::new(
            vec![(x, bar.low.unwrap_or(bar.close)), (x, bar.high.unwrap_or(bar.close))],
            style,
        ),
        PathElement::new(vec![(x - 0.3, open), (x, open)], style),
        PathElement::new(vec![(x, bar.close), (x + 0.3, bar.close)], style),
    ]
}

fn render_svg(frame: &ChartFrame, output_path: &Path) -> Result<(), FmpError> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let root = SVGBackend::new(output_path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    let root = root
        .titled(&frame.title, ("sans-serif", 18))
        .map_err(chart_err)?;

    let (_, height) = root.dim_in_pixel();
    let (price_height, _) = panel_heights(height);
    let (upper, lower) = root.split_vertically(price_height);

    let n = frame.bars.len() as f64;
    let x_range = slot_range(frame.bars.len());
    let labels: Vec<String> = frame.bars.iter().map(|b| b.date.to_string()).collect();
    let date_label = |x: &f64| -> String {
        let slot = x.round();
        if slot < 0.0 {
            return String::new();
        }
        labels.get(slot as usize).cloned().unwrap_or_default()
    };

    let (y_lo, y_hi) = frame.price_range();
    let mut price = ChartBuilder::on(&upper)
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .build_cartesian_2d(x_range.clone(), y_lo..y_hi)
        .map_err(chart_err)?;

    price
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .y_desc("Price")
        .draw()
        .map_err(chart_err)?;

    let candle_width = ((WIDTH as f64 * 0.8) / n).clamp(1.0, 15.0) as u32;
    let bars = frame.bars.iter().enumerate().map(|(i, b)| (i as f64, b));
    match frame.kind {
        ChartKind::Candle => {
            price
                .draw_series(bars.map(|(x, b)| {
                    CandleStick::new(
                        x,
                        b.open.unwrap_or(b.close),
                        b.high.unwrap_or(b.close),
                        b.low.unwrap_or(b.close),
                        b.close,
                        COLOR_GAIN.filled(),
                        COLOR_LOSS.filled(),
                        candle_width,
                    )
                }))
                .map_err(chart_err)?;
        }
        ChartKind::Line => {
            price
                .draw_series(LineSeries::new(bars.map(|(x, b)| (x, b.close)), &COLOR_BLUE))
                .map_err(chart_err)?;
        }
        ChartKind::Ohlc => {
            price
                .draw_series(bars.flat_map(|(x, b)| ohlc_bar(x, b)))
                .map_err(chart_err)?;
        }
    }

    let max_volume = frame.max_volume();
    let mut volume = ChartBuilder::on(&lower)
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 30)
        .build_cartesian_2d(x_range, 0f64..(max_volume * 1.1).max(1.0))
        .map_err(chart_err)?;

    volume
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(8)
        .x_label_formatter(&date_label)
        .y_labels(3)
        .y_desc("volume")
        .draw()
        .map_err(chart_err)?;

    volume
        .draw_series(frame.bars.iter().enumerate().map(|(i, b)| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, b.volume)], COLOR_BLUE.mix(0.6).filled())
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}
