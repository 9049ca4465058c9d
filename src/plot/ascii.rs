//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - per-year expected return: `o`, joined by `.`
//! - value labels above each marker
//! - 0% reference: dashed `- - -` row

use crate::error::CapmError;
use crate::plot::{ChartLabels, ChartRenderer, format_percent, value_bounds};

/// Prints the chart to stdout.
#[derive(Debug, Clone, Copy)]
pub struct AsciiChartRenderer {
    width: usize,
    height: usize,
}

impl AsciiChartRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

impl ChartRenderer for AsciiChartRenderer {
    fn render(&self, points: &[(i32, f64)], labels: &ChartLabels) -> Result<(), CapmError> {
        let chart = render_ascii_chart(points, labels, self.width, self.height)?;
        println!("{chart}");
        Ok(())
    }
}

/// Render the chart into a string.
pub fn render_ascii_chart(
    points: &[(i32, f64)],
    labels: &ChartLabels,
    width: usize,
    height: usize,
) -> Result<String, CapmError> {
    let width = width.max(10);
    let height = height.max(5);
    let (y_min, y_max) =
        value_bounds(points).ok_or_else(|| CapmError::Render("no finite values to plot".to_string()))?;

    let mut grid = vec![vec![' '; width]; height];

    if (y_min..=y_max).contains(&0.0) {
        let row = map_y(0.0, y_min, y_max, height);
        for (col, cell) in grid[row].iter_mut().enumerate() {
            if col % 2 == 0 {
                *cell = '-';
            }
        }
    }

    let markers: Vec<(usize, usize, f64)> = points
        .iter()
        .enumerate()
        .filter(|(_, (_, v))| v.is_finite())
        .map(|(i, &(_, v))| (map_x(i, points.len(), width), map_y(v, y_min, y_max, height), v))
        .collect();

    for pair in markers.windows(2) {
        let (x0, y0, _) = pair[0];
        let (x1, y1, _) = pair[1];
        draw_line(&mut grid, x0, y0, x1, y1, '.');
    }
    for &(x, y, _) in &markers {
        grid[y][x] = 'o';
    }
    for &(x, y, v) in &markers {
        let row = if y > 0 { y - 1 } else { (y + 1).min(height - 1) };
        write_centered(&mut grid[row], x, &format_percent(v));
    }

    let mut axis = vec![' '; width];
    for (i, &(year, _)) in points.iter().enumerate() {
        write_centered(&mut axis, map_x(i, points.len(), width), &year.to_string());
    }

    let mut out = String::new();
    out.push_str(&format!("{}\n", labels.title));
    out.push_str(&format!("{}: [{y_min:.2}, {y_max:.2}]\n", labels.y_label));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str(&axis.into_iter().collect::<String>());
    out.push('\n');
    out.push_str(&labels.x_label);
    out.push('\n');

    Ok(out)
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n <= 1 {
        return width / 2;
    }
    (i as f64 * (width as f64 - 1.0) / (n as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Write `text` centered on `col`, clamped to the row and never covering a marker.
fn write_centered(row: &mut [char], col: usize, text: &str) {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len().min(row.len());
    let start = col.saturating_sub(len / 2).min(row.len() - len);
    for (cell, ch) in row[start..start + len].iter_mut().zip(chars) {
        if *cell != 'o' {
            *cell = ch;
        }
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
