use crate::model::CostModel;
use crate::solver::BreakevenReport;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

const CHART_SIZE: (u32, u32) = (1600, 800);
const FONT: &str = "sans-serif";

/// A monthly cost curve sampled over the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct CostCurve {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// The serverless curve followed by one curve per deployment.
pub fn cost_curves(model: &CostModel) -> Vec<CostCurve> {
    let points = model.sweep.points();

    let mut curves = vec![CostCurve {
        label: model.serverless.label.clone(),
        points: points
            .iter()
            .map(|rps| (*rps, model.serverless_cost(*rps)))
            .collect(),
    }];
    curves.extend(model.deployments.iter().map(|deployment| CostCurve {
        label: deployment.label.clone(),
        points: points
            .iter()
            .map(|rps| (*rps, model.deployment_cost(deployment, *rps)))
            .collect(),
    }));

    curves
}

pub fn draw_cost_chart(
    path: &Path,
    model: &CostModel,
    curves: &[CostCurve],
    report: &BreakevenReport,
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = curves
        .iter()
        .flat_map(|c| c.points.iter().map(|(_, cost)| *cost))
        .fold(0f64, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut ctx = ChartBuilder::on(&root)
        .caption(&model.title, (FONT, 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(model.sweep.start..model.sweep.end, 0f64..y_max)?;

    ctx.configure_mesh()
        .x_desc("Requests per Second (RPS)")
        .y_desc("Monthly Cost (USD)")
        .draw()?;

    for (index, curve) in curves.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();
        ctx.draw_series(LineSeries::new(curve.points.clone(), color.stroke_width(2)))?
            .label(curve.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    let annotation_style =
        TextStyle::from((FONT, 15).into_font()).pos(Pos::new(HPos::Left, VPos::Bottom));
    for breakeven in &report.breakevens {
        let (Some(rps), Some(cost), Some(text)) = (
            breakeven.rps,
            breakeven.serverless_monthly_cost,
            breakeven.annotation(),
        ) else {
            continue;
        };

        ctx.draw_series(std::iter::once(Circle::new((rps, cost), 5, BLACK.filled())))?;
        ctx.draw_series(std::iter::once(Text::new(
            format!(" {text}"),
            (rps, cost),
            annotation_style.clone(),
        )))?;
    }

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}
