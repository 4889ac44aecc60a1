//! PNG chart rendering for CapEx, monthly cash flow, break-even and scenarios
//!
//! Charts are plain raster plots: bars, lines and markers on a white canvas.
//! Values arrive as worksheet rows and are converted to f64 only for plotting.

use std::path::Path;

use image::{Rgb, RgbImage};
use log::info;
use rust_decimal::prelude::ToPrimitive;

use super::workbook::{CapexSheetRow, RoiTimelineRow, ScenarioSheetRow};
use crate::assumptions::Money;
use crate::error::{ModelError, ModelResult};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const GREEN: Rgb<u8> = Rgb([46, 139, 87]);
const RED: Rgb<u8> = Rgb([200, 40, 40]);
const NAVY: Rgb<u8> = Rgb([31, 78, 121]);

/// Blue/gray palette for categories and scenarios
const PALETTE: [Rgb<u8>; 6] = [
    Rgb([31, 78, 121]),
    Rgb([46, 117, 182]),
    Rgb([74, 144, 194]),
    Rgb([123, 179, 208]),
    Rgb([166, 208, 228]),
    Rgb([212, 232, 240]),
];

/// Scenario lines: bear, base, bull, then the palette
const SCENARIO_COLORS: [Rgb<u8>; 3] = [RED, NAVY, GREEN];

/// Canvas size and plot margins in pixels
#[derive(Debug, Clone, Copy)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
}

impl Default for ChartSize {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 700,
            margin: 50,
        }
    }
}

/// Maps data coordinates into the plot area
#[derive(Debug, Clone, Copy)]
struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    /// Plot area inside the margins with a unit y range
    fn plot_area(size: ChartSize) -> Self {
        Self {
            left: size.margin as f64,
            top: size.margin as f64,
            width: size.width.saturating_sub(2 * size.margin).max(1) as f64,
            height: size.height.saturating_sub(2 * size.margin).max(1) as f64,
            y_min: -1.0,
            y_max: 1.0,
        }
    }

    /// Plot area scaled to `values`
    fn new(size: ChartSize, values: impl Iterator<Item = f64>) -> Self {
        Self::plot_area(size).scaled_to(values)
    }

    /// Fit the y range to `values`; it always includes zero so the
    /// break-even axis is visible
    fn scaled_to(self, values: impl Iterator<Item = f64>) -> Self {
        let (mut y_min, mut y_max) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if (y_max - y_min).abs() < f64::EPSILON {
            y_max += 1.0;
            y_min -= 1.0;
        }
        Self { y_min, y_max, ..self }
    }

    /// Upper and lower halves, `gap` pixels apart
    fn split(self, gap: f64) -> (Self, Self) {
        let height = ((self.height - gap) / 2.0).max(1.0);
        let upper = Self { height, ..self };
        let lower = Self {
            top: self.top + height + gap,
            height,
            ..self
        };
        (upper, lower)
    }

    fn y(&self, value: f64) -> f64 {
        self.top + (self.y_max - value) / (self.y_max - self.y_min) * self.height
    }

    /// Centre of slot `index` out of `count` equal slots
    fn x(&self, index: usize, count: usize) -> f64 {
        let slot = self.width / count.max(1) as f64;
        self.left + slot * (index as f64 + 0.5)
    }

    fn slot_width(&self, count: usize) -> f64 {
        self.width / count.max(1) as f64
    }

    fn right(&self) -> f64 {
        self.left + self.width
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

fn to_f64(amount: Money) -> f64 {
    amount.to_f64().unwrap_or(0.0)
}

fn blank_canvas(size: ChartSize) -> RgbImage {
    RgbImage::from_pixel(size.width, size.height, WHITE)
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_rect(img: &mut RgbImage, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb<u8>) {
    let (xa, xb) = (x0.min(x1).round() as i64, x0.max(x1).round() as i64);
    let (ya, yb) = (y0.min(y1).round() as i64, y0.max(y1).round() as i64);
    for y in ya..=yb {
        for x in xa..=xb {
            put(img, x, y, color);
        }
    }
}

/// Bresenham line; `dash` > 0 draws `dash` pixels on, `dash` off
fn draw_line(img: &mut RgbImage, from: (f64, f64), to: (f64, f64), color: Rgb<u8>, dash: u32) {
    let (mut x, mut y) = (from.0.round() as i64, from.1.round() as i64);
    let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut step = 0u32;

    loop {
        if dash == 0 || (step / dash) % 2 == 0 {
            put(img, x, y, color);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        step += 1;
    }
}

/// Polyline drawn three pixels thick
fn draw_series(img: &mut RgbImage, points: &[(f64, f64)], color: Rgb<u8>) {
    for pair in points.windows(2) {
        for offset in [-1.0, 0.0, 1.0] {
            draw_line(img, (pair[0].0, pair[0].1 + offset), (pair[1].0, pair[1].1 + offset), color, 0);
        }
    }
}

fn draw_marker(img: &mut RgbImage, x: f64, y: f64, color: Rgb<u8>) {
    let radius = 7.0;
    fill_rect(img, x - radius, y - radius, x + radius, y + radius, color);
}

fn draw_axes(img: &mut RgbImage, frame: &Frame) {
    // Light horizontal grid at quarters
    for i in 1..4 {
        let y = frame.top + frame.height * i as f64 / 4.0;
        draw_line(img, (frame.left, y), (frame.right(), y), GRID, 0);
    }
    draw_line(img, (frame.left, frame.top), (frame.left, frame.bottom()), AXIS, 0);
    let zero = frame.y(0.0);
    draw_line(img, (frame.left, zero), (frame.right(), zero), AXIS, 0);
}

/// Vertical bars from the zero line, one per slot
fn draw_bars(img: &mut RgbImage, frame: &Frame, values: &[f64], color: impl Fn(f64) -> Rgb<u8>) {
    let half = (frame.slot_width(values.len()) * 0.4).max(0.5);
    let zero = frame.y(0.0);
    for (i, value) in values.iter().enumerate() {
        let x = frame.x(i, values.len());
        fill_rect(img, x - half, zero, x + half, frame.y(*value), color(*value));
    }
}

/// Horizontal bars from the left axis, one per row; longest = largest value
fn draw_hbars(img: &mut RgbImage, frame: &Frame, bars: &[(f64, Rgb<u8>)]) {
    let max = bars.iter().map(|(v, _)| *v).fold(0.0_f64, f64::max).max(1.0);
    let slot = frame.height / bars.len().max(1) as f64;

    for (i, (value, color)) in bars.iter().enumerate() {
        let top = frame.top + slot * i as f64 + slot * 0.15;
        let bottom = top + slot * 0.7;
        let length = value / max * frame.width;
        fill_rect(img, frame.left, top, frame.left + length, bottom, *color);
    }
    draw_line(img, (frame.left, frame.top), (frame.left, frame.bottom()), AXIS, 0);
}

fn net_color(value: f64) -> Rgb<u8> {
    if value < 0.0 {
        RED
    } else {
        GREEN
    }
}

fn save(img: &RgbImage, path: &Path) -> ModelResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ModelError::output(parent, e))?;
    }
    img.save(path).map_err(|e| ModelError::output(path, e))?;
    info!("Chart saved to {}", path.display());
    Ok(())
}

/// Horizontal bars, one per CapEx category, longest = largest amount
pub fn render_capex_chart(categories: &[(String, Money)], path: &Path, size: ChartSize) -> ModelResult<()> {
    if categories.is_empty() {
        return Err(ModelError::invalid("capex", "no CapEx categories to chart"));
    }

    let bars: Vec<(f64, Rgb<u8>)> = categories
        .iter()
        .enumerate()
        .map(|(i, (_, amount))| (to_f64(*amount), PALETTE[i % PALETTE.len()]))
        .collect();

    let mut img = blank_canvas(size);
    draw_hbars(&mut img, &Frame::plot_area(size), &bars);
    save(&img, path)
}

/// Horizontal bars, one per CapEx line item, coloured by category
///
/// Items of the same category share a colour, assigned in sheet order.
pub fn render_capex_detail_chart(items: &[CapexSheetRow], path: &Path, size: ChartSize) -> ModelResult<()> {
    if items.is_empty() {
        return Err(ModelError::invalid("capex", "no CapEx items to chart"));
    }

    let mut categories: Vec<&str> = Vec::new();
    let bars: Vec<(f64, Rgb<u8>)> = items
        .iter()
        .map(|item| {
            let index = match categories.iter().position(|c| *c == item.category) {
                Some(index) => index,
                None => {
                    categories.push(&item.category);
                    categories.len() - 1
                }
            };
            (to_f64(item.amount), PALETTE[index % PALETTE.len()])
        })
        .collect();

    let mut img = blank_canvas(size);
    draw_hbars(&mut img, &Frame::plot_area(size), &bars);
    save(&img, path)
}

/// Monthly net cash flow bars around a zero axis (green >= 0, red < 0)
pub fn render_cashflow_chart(rows: &[RoiTimelineRow], path: &Path, size: ChartSize) -> ModelResult<()> {
    if rows.is_empty() {
        return Err(ModelError::invalid("roi_timeline", "no monthly rows to chart"));
    }

    let net: Vec<f64> = rows.iter().map(|r| to_f64(r.net_cash_flow)).collect();
    let frame = Frame::new(size, net.iter().copied());

    let mut img = blank_canvas(size);
    draw_axes(&mut img, &frame);
    draw_bars(&mut img, &frame, &net, net_color);
    save(&img, path)
}

/// Two panels: revenue (up, green) against OpEx (down, red) above the
/// monthly net cash flow bars
pub fn render_detailed_cashflow_chart(rows: &[RoiTimelineRow], path: &Path, size: ChartSize) -> ModelResult<()> {
    if rows.is_empty() {
        return Err(ModelError::invalid("roi_timeline", "no monthly rows to chart"));
    }

    let revenue: Vec<f64> = rows.iter().map(|r| to_f64(r.revenue)).collect();
    let opex: Vec<f64> = rows.iter().map(|r| -to_f64(r.opex)).collect();
    let net: Vec<f64> = rows.iter().map(|r| to_f64(r.net_cash_flow)).collect();

    let (upper, lower) = Frame::plot_area(size).split(size.margin as f64);
    let upper = upper.scaled_to(revenue.iter().chain(&opex).copied());
    let lower = lower.scaled_to(net.iter().copied());

    let mut img = blank_canvas(size);
    draw_axes(&mut img, &upper);
    draw_bars(&mut img, &upper, &revenue, |_| GREEN);
    draw_bars(&mut img, &upper, &opex, |_| RED);
    draw_axes(&mut img, &lower);
    draw_bars(&mut img, &lower, &net, net_color);
    save(&img, path)
}

/// Cumulative net position with a dashed zero line
///
/// Marks the break-even month, or the maximum-loss month when break-even is
/// never reached. Returns the marked row index and whether it is break-even.
pub fn render_roi_chart(rows: &[RoiTimelineRow], path: &Path, size: ChartSize) -> ModelResult<(usize, bool)> {
    if rows.is_empty() {
        return Err(ModelError::invalid("roi_timeline", "no monthly rows to chart"));
    }

    let mut img = blank_canvas(size);
    let values: Vec<f64> = rows.iter().map(|r| to_f64(r.net_position)).collect();
    let frame = Frame::new(size, values.iter().copied());
    draw_axes(&mut img, &frame);

    let zero = frame.y(0.0);
    draw_line(&mut img, (frame.left, zero), (frame.right(), zero), RED, 8);

    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| (frame.x(i, rows.len()), frame.y(*v)))
        .collect();
    draw_series(&mut img, &points, NAVY);

    let marked = match rows.iter().position(|r| r.payback_reached()) {
        Some(i) => (i, true),
        None => {
            let worst = rows
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.net_position.cmp(&b.1.net_position))
                .map(|(i, _)| i)
                .unwrap_or(0);
            (worst, false)
        }
    };
    let (x, y) = points[marked.0];
    draw_marker(&mut img, x, y, if marked.1 { GREEN } else { RED });

    save(&img, path)?;
    Ok(marked)
}

/// One cumulative net-position line per scenario, in sheet order
pub fn render_scenario_chart(rows: &[ScenarioSheetRow], path: &Path, size: ChartSize) -> ModelResult<()> {
    let series = group_scenarios(rows);
    if series.is_empty() {
        return Err(ModelError::invalid("scenarios", "no scenario rows to chart"));
    }

    let mut img = blank_canvas(size);
    let frame = Frame::new(size, rows.iter().map(|r| to_f64(r.net_position)));
    draw_axes(&mut img, &frame);
    let zero = frame.y(0.0);
    draw_line(&mut img, (frame.left, zero), (frame.right(), zero), AXIS, 8);

    let months = series.iter().map(|(_, s)| s.len()).max().unwrap_or(1);
    for (i, (_, points)) in series.iter().enumerate() {
        let color = SCENARIO_COLORS.get(i).copied().unwrap_or(PALETTE[i % PALETTE.len()]);
        let pixels: Vec<(f64, f64)> = points
            .iter()
            .map(|row| (frame.x(row.month as usize, months), frame.y(to_f64(row.net_position))))
            .collect();
        draw_series(&mut img, &pixels, color);

        if let Some(month) = points.first().and_then(|row| row.breakeven_month) {
            if let Some(row) = points.iter().find(|row| row.month == month) {
                draw_marker(&mut img, frame.x(month as usize, months), frame.y(to_f64(row.net_position)), color);
            }
        }
    }

    save(&img, path)
}

/// Group long-format scenario rows by scenario name, keeping first-seen order
fn group_scenarios(rows: &[ScenarioSheetRow]) -> Vec<(String, Vec<&ScenarioSheetRow>)> {
    let mut groups: Vec<(String, Vec<&ScenarioSheetRow>)> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|(name, _)| *name == row.scenario) {
            Some((_, members)) => members.push(row),
            None => groups.push((row.scenario.clone(), vec![row])),
        }
    }
    groups
}
