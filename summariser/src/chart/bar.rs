use super::{CHART_SIZE, FONT};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

/// Averaged values for each architecture at one load level.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGroup {
    pub load_label: String,
    /// Aligned with [ComparisonChart::architectures]
    pub values: Vec<Option<f64>>,
}

/// Grouped horizontal bars, one group per load level and one bar per architecture.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonChart {
    pub title: String,
    pub x_desc: String,
    pub architectures: Vec<String>,
    pub groups: Vec<BarGroup>,
}

impl ComparisonChart {
    /// Bar slots from top to bottom, with an empty slot between groups.
    fn slots(&self) -> Vec<Option<(usize, usize)>> {
        let mut slots = Vec::new();
        for (group_index, _) in self.groups.iter().enumerate() {
            if group_index > 0 {
                slots.push(None);
            }
            for arch_index in 0..self.architectures.len() {
                slots.push(Some((group_index, arch_index)));
            }
        }
        slots
    }

    fn slot_label(&self, slot: Option<(usize, usize)>) -> String {
        match slot {
            Some((group, arch)) => format!(
                "{} / {}",
                self.groups[group].load_label, self.architectures[arch]
            ),
            None => String::new(),
        }
    }
}

pub fn draw_comparison_chart(path: &Path, chart: &ComparisonChart) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let slots = chart.slots();
    let x_max = super::y_upper_bound(
        chart
            .groups
            .iter()
            .flat_map(|g| g.values.iter().flatten().copied()),
    );

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT, 24))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(200)
        .build_cartesian_2d(0f64..x_max, (0..slots.len()).into_segmented())?;

    ctx.configure_mesh()
        .x_desc(chart.x_desc.as_str())
        .y_labels(slots.len())
        .y_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => slots
                .get(*i)
                .map(|slot| chart.slot_label(*slot))
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        })
        .draw()?;

    let value_style =
        TextStyle::from((FONT, 13).into_font()).pos(Pos::new(HPos::Left, VPos::Center));

    for (arch_index, architecture) in chart.architectures.iter().enumerate() {
        let color = Palette99::pick(arch_index).to_rgba();
        let bars = slots
            .iter()
            .enumerate()
            .filter_map(|(slot_index, slot)| match slot {
                Some((group, arch)) if *arch == arch_index => chart.groups[*group].values[*arch]
                    .map(|value| (slot_index, value)),
                _ => None,
            })
            .collect::<Vec<_>>();

        ctx.draw_series(bars.iter().map(|(slot_index, value)| {
            let mut bar = Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(*slot_index)),
                    (*value, SegmentValue::Exact(slot_index + 1)),
                ],
                color.filled(),
            );
            bar.set_margin(2, 2, 0, 0);
            bar
        }))?
        .label(architecture.as_str())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));

        ctx.draw_series(bars.iter().map(|(slot_index, value)| {
            Text::new(
                format!(" {value:.2}"),
                (*value, SegmentValue::CenterOf(*slot_index)),
                value_style.clone(),
            )
        }))?;
    }

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::LowerRight)
        .draw()?;

    root.present()?;
    Ok(())
}
