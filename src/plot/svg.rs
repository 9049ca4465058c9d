//! Plotters-powered SVG chart of the per-year expected returns.

use std::path::PathBuf;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::CapmError;
use crate::plot::{ChartLabels, ChartRenderer, format_percent, value_bounds};

/// Writes the chart to an SVG file.
#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    path: PathBuf,
    size: (u32, u32),
}

impl SvgChartRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            size: (1000, 600),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    fn draw(&self, points: &[(i32, f64)], labels: &ChartLabels) -> Result<(), Box<dyn std::error::Error>> {
        let (y0, y1) = value_bounds(points).ok_or("no finite values to plot")?;
        let first = points.iter().map(|&(year, _)| year).min().ok_or("no years to plot")?;
        let last = points.iter().map(|&(year, _)| year).max().ok_or("no years to plot")?;
        // Half a year of air on each side keeps the end labels inside the plot.
        let (x0, x1) = (first as f64 - 0.5, last as f64 + 0.5);

        let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&labels.title, ("sans-serif", 22))
            .margin(20)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(x0..x1, y0..y1)?;

        // No grid, matching the terminal rendering.
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_desc(&labels.x_label)
            .y_desc(&labels.y_label)
            .x_labels(points.len() + 2)
            .x_label_formatter(&|v| {
                if v.fract().abs() < 1e-9 {
                    format!("{v:.0}")
                } else {
                    String::new()
                }
            })
            .y_label_formatter(&|v| format!("{v:.1}"))
            .draw()?;

        // 0% reference line.
        chart.draw_series(DashedLineSeries::new(
            [(x0, 0.0), (x1, 0.0)],
            6,
            4,
            BLACK.stroke_width(1),
        ))?;

        let data: Vec<(f64, f64)> = points
            .iter()
            .filter(|(_, v)| v.is_finite())
            .map(|&(year, v)| (year as f64, v))
            .collect();

        chart.draw_series(LineSeries::new(data.iter().copied(), BLUE.stroke_width(2)))?;

        let label_style = ("sans-serif", 14)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        chart.draw_series(PointSeries::of_element(
            data.iter().copied(),
            5,
            BLUE.filled(),
            &|coord, size, style| {
                EmptyElement::at(coord)
                    + Circle::new((0, 0), size, style)
                    + Text::new(format_percent(coord.1), (0, -8), label_style.clone())
            },
        ))?;

        root.present()?;
        Ok(())
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, points: &[(i32, f64)], labels: &ChartLabels) -> Result<(), CapmError> {
        self.draw(points, labels)
            .map_err(|e| CapmError::Render(format!("{}: {e}", self.path.display())))?;
        tracing::info!(path = %self.path.display(), "wrote chart");
        Ok(())
    }
}
