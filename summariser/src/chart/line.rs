use super::{segment_label, y_upper_bound, CHART_SIZE, FONT};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Cross,
}

/// One value per load level, drawn as a line with annotated markers.
pub struct LineChart {
    pub title: String,
    pub legend: String,
    pub x_desc: String,
    pub y_desc: String,
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub marker: Marker,
    pub color: RGBColor,
}

pub fn draw_line_chart(path: &Path, chart: &LineChart) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let labels = &chart.labels;
    let points = chart
        .values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (SegmentValue::CenterOf(i), v)))
        .collect::<Vec<_>>();
    let y_max = y_upper_bound(points.iter().map(|(_, v)| *v));

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT, 24))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d((0..labels.len()).into_segmented(), 0f64..y_max)?;

    ctx.configure_mesh()
        .x_desc(chart.x_desc.as_str())
        .y_desc(chart.y_desc.as_str())
        .x_labels(labels.len())
        .x_label_formatter(&|v| segment_label(v, labels))
        .draw()?;

    let color = chart.color;
    ctx.draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
        .label(chart.legend.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

    // Mean values sit above their marker, P99 values below it
    let anchor = match chart.marker {
        Marker::Circle => {
            ctx.draw_series(
                points
                    .iter()
                    .map(|p| Circle::new(p.clone(), 5, color.filled())),
            )?;
            VPos::Bottom
        }
        Marker::Cross => {
            ctx.draw_series(
                points
                    .iter()
                    .map(|p| Cross::new(p.clone(), 6, color.stroke_width(2))),
            )?;
            VPos::Top
        }
    };

    let value_style = TextStyle::from((FONT, 14).into_font()).pos(Pos::new(HPos::Center, anchor));
    ctx.draw_series(
        points
            .iter()
            .map(|(x, y)| Text::new(format!("{y:.2}"), (x.clone(), *y), value_style.clone())),
    )?;

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}
