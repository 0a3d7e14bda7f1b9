#![cfg(feature = "web")]
use crate::aggregate::{AggregateRow, ChartSpec};
use crate::error::DashboardError;
use plotters::prelude::*;
use std::io::Cursor;

/// Configuration options for chart images
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Width of the image in pixels
    pub width: u32,

    /// Height of the image in pixels
    pub height: u32,

    /// Whether each bar is labelled with its revenue
    pub show_values: bool,
}

impl Default for GraphOptions {
    /// 800x450 pixels with value labels, close to the in-page chart size
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            show_values: true,
        }
    }
}

/// Renders an aggregate chart to a PNG image
///
/// One bar per category in the order the chart lists them, heights scaled to the
/// largest revenue. An empty chart still produces an image with its caption and axes.
///
/// # Arguments
/// * `chart` - The chart to draw
/// * `options` - Image size and labelling
///
/// # Returns
/// * `Result<Vec<u8>, DashboardError>` - PNG bytes, or `Render` if drawing fails
pub fn render_png(chart: &ChartSpec, options: &GraphOptions) -> Result<Vec<u8>, DashboardError> {
    let (width, height) = (options.width, options.height);
    let mut pixels = vec![0u8; width as usize * height as usize * 3];

    draw_bars(chart, options, &mut pixels).map_err(|e| DashboardError::Render(e.to_string()))?;

    let image = image::RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| DashboardError::Render("pixel buffer size mismatch".to_string()))?;

    let mut png = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut png, image::ImageOutputFormat::Png)
        .map_err(|e| DashboardError::Render(e.to_string()))?;

    Ok(png.into_inner())
}

fn draw_bars(
    chart: &ChartSpec,
    options: &GraphOptions,
    pixels: &mut [u8],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::with_buffer(pixels, (options.width, options.height))
        .into_drawing_area();
    root.fill(&WHITE)?;

    let rows = &chart.rows;
    let count = rows.len().max(1) as u32;
    let y_max = value_axis_max(rows);

    let mut context = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..count).into_segmented(), 0f64..y_max)?;

    context
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(rows.len().max(1))
        .x_label_formatter(&|segment| match segment {
            SegmentValue::CenterOf(index) => rows
                .get(*index as usize)
                .map(|row| row.category.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .y_desc(&chart.y_label)
        .draw()?;

    context.draw_series(
        Histogram::vertical(&context)
            .style(RGBColor(99, 110, 250).filled())
            .margin(12)
            .data(
                rows.iter()
                    .enumerate()
                    .map(|(index, row)| (index as u32, row.revenue)),
            ),
    )?;

    if options.show_values {
        context.draw_series(rows.iter().enumerate().map(|(index, row)| {
            Text::new(
                format_revenue(row.revenue),
                (SegmentValue::CenterOf(index as u32), row.revenue),
                ("sans-serif", 14).into_font(),
            )
        }))?;
    }

    root.present()?;
    Ok(())
}

/// Top of the value axis: the largest bar plus headroom for its label
fn value_axis_max(rows: &[AggregateRow]) -> f64 {
    let max = rows.iter().map(|row| row.revenue).fold(0.0, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

/// Bar label text; whole numbers print without a fraction.
pub fn format_revenue(revenue: f64) -> String {
    if revenue.fract() == 0.0 {
        format!("{:.0}", revenue)
    } else {
        format!("{:.2}", revenue)
    }
}
