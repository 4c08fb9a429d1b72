use super::{segment_label, y_upper_bound, CHART_SIZE, FONT};
use plotters::prelude::*;
use std::path::Path;

/// Every raw latency sample of a partition, one column of points per load level.
pub struct ScatterChart {
    pub title: String,
    pub x_desc: String,
    pub labels: Vec<String>,
    /// Samples for each label, aligned with `labels`
    pub samples: Vec<Vec<f64>>,
}

impl ScatterChart {
    pub fn is_empty(&self) -> bool {
        self.samples.iter().all(Vec::is_empty)
    }
}

pub fn draw_scatter_chart(path: &Path, chart: &ScatterChart) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let labels = &chart.labels;
    let y_max = y_upper_bound(chart.samples.iter().flatten().copied());

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT, 24))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d((0..labels.len()).into_segmented(), 0f64..y_max)?;

    ctx.configure_mesh()
        .x_desc(chart.x_desc.as_str())
        .y_desc("Response Time in ms")
        .x_labels(labels.len())
        .x_label_formatter(&|v| segment_label(v, labels))
        .draw()?;

    for (index, (label, samples)) in labels.iter().zip(&chart.samples).enumerate() {
        if samples.is_empty() {
            continue;
        }

        let color = Palette99::pick(index).mix(0.6);
        ctx.draw_series(
            samples
                .iter()
                .map(|v| Circle::new((SegmentValue::CenterOf(index), *v), 3, color.filled())),
        )?
        .label(format!("{} ({label})", chart.title))
        .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
    }

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}
