//! ASCII plotting of the combined history + forecast table.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Each selected series is drawn as a line of its glyph (see `SeriesKind::glyph`):
//! `*` sales, `n` naive, `m` moving average. Earlier series win on overlap.

use chrono::NaiveDate;

use crate::domain::{CombinedRow, SeriesKind};

/// Render the selected `series` of `rows` into a `width` x `height` grid.
pub fn render_sales_chart(
    rows: &[CombinedRow],
    series: &[SeriesKind],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return "Nothing to plot.\n".to_string();
    };

    let lines: Vec<(SeriesKind, Vec<(f64, f64)>)> = series
        .iter()
        .map(|&kind| (kind, series_points(rows, kind, first.date)))
        .filter(|(_, points)| !points.is_empty())
        .collect();

    let Some((y_min, y_max)) = y_range(&lines) else {
        return "Nothing to plot.\n".to_string();
    };
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let x_min = 0.0;
    let x_max = ((last.date - first.date).num_days() as f64).max(1.0);

    let mut grid = vec![vec![' '; width]; height];

    for (kind, points) in &lines {
        draw_series(&mut grid, points, kind.glyph(), x_min, x_max, y_min, y_max);
    }
    // Observed positions overwrite connecting segments of later series.
    for (kind, points) in &lines {
        for &(x, y) in points {
            let (gx, gy) = (map_x(x, x_min, x_max, width), map_y(y, y_min, y_max, height));
            if grid[gy][gx] == ' ' || !is_glyph_of_earlier(grid[gy][gx], *kind, &lines) {
                grid[gy][gx] = kind.glyph();
            }
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: dates=[{}, {}] | sales=[{y_min:.2}, {y_max:.2}]\n",
        first.date, last.date
    ));
    let legend: Vec<String> = lines
        .iter()
        .map(|(kind, _)| format!("{} {}", kind.glyph(), kind.display_name()))
        .collect();
    out.push_str(&format!("Legend: {}\n", legend.join("  ")));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn series_points(rows: &[CombinedRow], kind: SeriesKind, origin: NaiveDate) -> Vec<(f64, f64)> {
    rows.iter()
        .filter_map(|row| {
            let y = row.value(kind)?;
            Some(((row.date - origin).num_days() as f64, y))
        })
        .collect()
}

fn is_glyph_of_earlier(
    ch: char,
    kind: SeriesKind,
    lines: &[(SeriesKind, Vec<(f64, f64)>)],
) -> bool {
    lines
        .iter()
        .take_while(|(k, _)| *k != kind)
        .any(|(k, _)| k.glyph() == ch)
}

fn y_range(lines: &[(SeriesKind, Vec<(f64, f64)>)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for (_, points) in lines {
        for &(_, y) in points {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    // A flat series still needs a visible band.
    let pad = if span > 0.0 { span * frac } else { min.abs().max(1.0) * frac };
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series(
    grid: &mut [Vec<char>],
    points: &[(f64, f64)],
    ch: char,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in points {
        let x = map_x(t, x_min, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, ch);
        } else if grid[yy][x] == ' ' {
            grid[yy][x] = ch;
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
