use crate::model::{CostModel, Sweep};
use serde::Serialize;

const TOLERANCE: f64 = 1e-6;
const MAX_BISECTIONS: usize = 200;

/// Find the first request rate in the sweep where the two cost curves cross.
///
/// The sweep points are scanned for a change of sign in `a - b` and the bracketing interval is
/// bisected down to a width of `1e-6`. Returns `None` when the curves do not cross in the range.
pub fn find_breakeven(
    a: impl Fn(f64) -> f64,
    b: impl Fn(f64) -> f64,
    sweep: &Sweep,
) -> Option<f64> {
    let diff = |x: f64| a(x) - b(x);
    let points = sweep.points();

    let mut previous = None;
    for x in points {
        let d = diff(x);
        if d == 0.0 {
            return Some(x);
        }

        if let Some((px, pd)) = previous {
            if (pd < 0.0) != (d < 0.0) {
                return Some(bisect(&diff, px, x, pd));
            }
        }
        previous = Some((x, d));
    }

    None
}

fn bisect(diff: &impl Fn(f64) -> f64, mut low: f64, mut high: f64, mut low_diff: f64) -> f64 {
    for _ in 0..MAX_BISECTIONS {
        if high - low <= TOLERANCE {
            break;
        }

        let mid = (low + high) / 2.0;
        let mid_diff = diff(mid);
        if mid_diff == 0.0 {
            return mid;
        }
        if (low_diff < 0.0) == (mid_diff < 0.0) {
            low = mid;
            low_diff = mid_diff;
        } else {
            high = mid;
        }
    }

    (low + high) / 2.0
}

/// Where the serverless cost meets one virtual machine deployment.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Breakeven {
    pub deployment: String,
    /// Request rate at which both cost the same, absent when the curves do not cross
    pub rps: Option<f64>,
    /// Monthly serverless cost at that rate
    pub serverless_monthly_cost: Option<f64>,
}

impl Breakeven {
    /// Chart annotation, e.g. `EC2 Basic Break-even: 123 RPS / Serverless cost: $45.67`.
    pub fn annotation(&self) -> Option<String> {
        let (rps, cost) = self.rps.zip(self.serverless_monthly_cost)?;
        Some(format!(
            "{} Break-even: {} RPS / Serverless cost: ${cost:.2}",
            self.deployment,
            rps.trunc() as i64
        ))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BreakevenReport {
    pub name: String,
    pub title: String,
    pub breakevens: Vec<Breakeven>,
}

/// Solve the breakeven point of every deployment against the serverless pricing.
pub fn solve(model: &CostModel) -> BreakevenReport {
    let breakevens = model
        .deployments
        .iter()
        .map(|deployment| {
            let rps = find_breakeven(
                |rps| model.serverless_cost(rps),
                |rps| model.deployment_cost(deployment, rps),
                &model.sweep,
            );
            match rps {
                Some(rps) => log::info!("{}: break-even at {rps:.2} RPS", deployment.label),
                None => log::warn!(
                    "{}: no break-even between {} and {} RPS",
                    deployment.label,
                    model.sweep.start,
                    model.sweep.end
                ),
            }

            Breakeven {
                deployment: deployment.label.clone(),
                rps,
                serverless_monthly_cost: rps.map(|rps| model.serverless_cost(rps)),
            }
        })
        .collect();

    BreakevenReport {
        name: model.name.clone(),
        title: model.title.clone(),
        breakevens,
    }
}
