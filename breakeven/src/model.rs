use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const SECONDS_PER_HOUR: f64 = 3600.0;
/// Average hours in a month, as used by the AWS pricing calculator
pub const DEFAULT_HOURS_PER_MONTH: f64 = 730.0;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unknown cost model `{0}`, expected one of: encode, constant-rps, io, bursty")]
    UnknownPreset(String),
    #[error("Failed to read cost model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse cost model: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Cost model `{model}` is invalid: {reason}")]
    Invalid { model: String, reason: String },
}

/// One band of per GB-second compute pricing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComputeTier {
    /// Cumulative GB-seconds this tier covers, unbounded when absent
    #[serde(default)]
    pub up_to_gb_seconds: Option<f64>,
    pub cost_per_gb_second: f64,
}

/// Pay per request pricing for a function service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerlessPricing {
    pub label: String,
    pub request_cost_per_million: f64,
    pub memory_mb: f64,
    pub execution_time_ms: f64,
    pub compute_tiers: Vec<ComputeTier>,
}

impl ServerlessPricing {
    pub fn monthly_cost(&self, rps: f64, hours_per_month: f64) -> f64 {
        let requests = rps * hours_per_month * SECONDS_PER_HOUR;
        let gb_seconds = requests * (self.execution_time_ms / 1000.0) * (self.memory_mb / 1024.0);

        self.compute_cost(gb_seconds) + requests * self.request_cost_per_million / 1_000_000.0
    }

    fn compute_cost(&self, gb_seconds: f64) -> f64 {
        let mut cost = 0.0;
        let mut billed = 0.0;

        for tier in &self.compute_tiers {
            let limit = tier.up_to_gb_seconds.unwrap_or(f64::INFINITY);
            let in_tier = gb_seconds.min(limit) - billed;
            if in_tier <= 0.0 {
                break;
            }
            cost += in_tier * tier.cost_per_gb_second;
            billed += in_tier;
        }

        cost
    }
}

/// How many virtual machines a deployment runs at a given request rate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceCount {
    Fixed(u32),
    /// Add `per_step` instances for every `rps_per_step` of load, never fewer than `minimum`
    Scaled {
        minimum: u32,
        rps_per_step: f64,
        per_step: u32,
    },
}

impl InstanceCount {
    pub fn at(&self, rps: f64) -> f64 {
        match self {
            InstanceCount::Fixed(count) => f64::from(*count),
            InstanceCount::Scaled {
                minimum,
                rps_per_step,
                per_step,
            } => {
                let steps = ((rps - 0.01) / rps_per_step).floor() + 1.0;
                f64::max(f64::from(*minimum), steps * f64::from(*per_step))
            }
        }
    }
}

fn default_lcu_cost_per_hour() -> f64 {
    0.008
}

fn default_one() -> f64 {
    1.0
}

/// Application load balancer pricing, a fixed monthly charge plus capacity units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadBalancerPricing {
    pub fixed_monthly_cost: f64,
    /// Set to zero to only charge the fixed cost
    #[serde(default = "default_lcu_cost_per_hour")]
    pub lcu_cost_per_hour: f64,
    #[serde(default = "default_one")]
    pub processed_gb_per_hour: f64,
    /// New connections per second, follows the request rate when absent
    #[serde(default)]
    pub new_connections_per_second: Option<f64>,
    #[serde(default = "default_one")]
    pub connection_duration_seconds: f64,
}

impl LoadBalancerPricing {
    pub fn monthly_cost(&self, rps: f64, hours_per_month: f64) -> f64 {
        let new_connections = self.new_connections_per_second.unwrap_or(rps);
        let active_connections = new_connections * self.connection_duration_seconds;

        let lcus = [
            self.processed_gb_per_hour,
            new_connections / 25.0,
            active_connections / 3000.0,
        ]
        .into_iter()
        .fold(0.0, f64::max);

        self.fixed_monthly_cost + lcus * self.lcu_cost_per_hour * hours_per_month
    }
}

/// An always-on deployment of virtual machines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VmDeployment {
    pub label: String,
    pub instance_monthly_cost: f64,
    pub instances: InstanceCount,
    #[serde(default)]
    pub load_balancer: Option<LoadBalancerPricing>,
    #[serde(default)]
    pub logging_cost_per_million_requests: Option<f64>,
}

impl VmDeployment {
    pub fn monthly_cost(&self, rps: f64, hours_per_month: f64) -> f64 {
        let instances = self.instances.at(rps) * self.instance_monthly_cost;
        let load_balancer = self
            .load_balancer
            .as_ref()
            .map(|lb| lb.monthly_cost(rps, hours_per_month))
            .unwrap_or_default();
        let logging = self
            .logging_cost_per_million_requests
            .map(|cost| cost * rps * hours_per_month * SECONDS_PER_HOUR / 1_000_000.0)
            .unwrap_or_default();

        instances + load_balancer + logging
    }
}

/// The request rates a cost model is evaluated at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Sweep {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl Sweep {
    /// Every point from `start` to `end` inclusive.
    pub fn points(&self) -> Vec<f64> {
        let count = ((self.end - self.start) / self.step + 1e-9).floor() as usize;
        (0..=count)
            .map(|i| self.start + i as f64 * self.step)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostModel {
    pub name: String,
    pub title: String,
    #[serde(default = "default_hours_per_month")]
    pub hours_per_month: f64,
    pub sweep: Sweep,
    pub serverless: ServerlessPricing,
    pub deployments: Vec<VmDeployment>,
}

fn default_hours_per_month() -> f64 {
    DEFAULT_HOURS_PER_MONTH
}

impl CostModel {
    pub fn from_toml_file(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ModelError> {
        let model: CostModel = toml::from_str(content)?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |reason: &str| ModelError::Invalid {
            model: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.sweep.step <= 0.0 || self.sweep.end <= self.sweep.start {
            return Err(invalid("sweep needs a positive step and an end after its start"));
        }
        if self.hours_per_month <= 0.0 {
            return Err(invalid("hours_per_month must be positive"));
        }
        if self.deployments.is_empty() {
            return Err(invalid("at least one deployment is required"));
        }

        let tiers = &self.serverless.compute_tiers;
        match tiers.last() {
            None => return Err(invalid("at least one compute tier is required")),
            Some(last) if last.up_to_gb_seconds.is_some() => {
                return Err(invalid("the last compute tier must be unbounded"))
            }
            _ => {}
        }
        let limits = tiers
            .iter()
            .filter_map(|t| t.up_to_gb_seconds)
            .collect::<Vec<_>>();
        if limits.len() != tiers.len() - 1 || limits.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid(
                "compute tier limits must be increasing, only the last may be unbounded",
            ));
        }

        for deployment in &self.deployments {
            if let InstanceCount::Scaled {
                rps_per_step,
                per_step,
                ..
            } = deployment.instances
            {
                if rps_per_step <= 0.0 || per_step == 0 {
                    return Err(invalid(&format!(
                        "deployment `{}` must scale by a positive step",
                        deployment.label
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn serverless_cost(&self, rps: f64) -> f64 {
        self.serverless.monthly_cost(rps, self.hours_per_month)
    }

    pub fn deployment_cost(&self, deployment: &VmDeployment, rps: f64) -> f64 {
        deployment.monthly_cost(rps, self.hours_per_month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tiered() -> ServerlessPricing {
        ServerlessPricing {
            label: "AWS Lambda".to_string(),
            request_cost_per_million: 0.2,
            memory_mb: 1024.0,
            execution_time_ms: 1000.0,
            compute_tiers: vec![
                ComputeTier {
                    up_to_gb_seconds: Some(10.0),
                    cost_per_gb_second: 1.0,
                },
                ComputeTier {
                    up_to_gb_seconds: None,
                    cost_per_gb_second: 0.5,
                },
            ],
        }
    }

    fn close(expected: f64, actual: f64) {
        assert!(
            (expected - actual).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn tiers_are_cumulative() {
        let pricing = tiered();
        close(4.0, pricing.compute_cost(4.0));
        close(10.0, pricing.compute_cost(10.0));
        close(15.0, pricing.compute_cost(20.0));
        close(0.0, pricing.compute_cost(0.0));
    }

    #[test]
    fn serverless_cost_includes_requests() {
        // 1 rps over a one hour month at 1 GB for 1 second is 3600 GB-seconds
        let pricing = tiered();
        let expected = 10.0 + 3590.0 * 0.5 + 3600.0 * 0.2 / 1_000_000.0;
        close(expected, pricing.monthly_cost(1.0, 1.0));
        close(0.0, pricing.monthly_cost(0.0, 730.0));
    }

    #[test]
    fn scaled_instances() {
        let scaled = InstanceCount::Scaled {
            minimum: 2,
            rps_per_step: 10.0,
            per_step: 2,
        };
        assert_eq!(2.0, scaled.at(0.0));
        assert_eq!(2.0, scaled.at(10.0));
        assert_eq!(4.0, scaled.at(10.5));
        assert_eq!(4.0, scaled.at(20.0));
        assert_eq!(6.0, scaled.at(20.5));
        assert_eq!(3.0, InstanceCount::Fixed(3).at(1000.0));
    }

    #[test]
    fn load_balancer_capacity_units() {
        let lb = LoadBalancerPricing {
            fixed_monthly_cost: 16.43,
            lcu_cost_per_hour: 0.008,
            processed_gb_per_hour: 1.0,
            new_connections_per_second: None,
            connection_duration_seconds: 1.0,
        };
        // Processed bytes dominate below 25 new connections per second
        close(16.43 + 0.008 * 730.0, lb.monthly_cost(10.0, 730.0));
        close(16.43 + 4.0 * 0.008 * 730.0, lb.monthly_cost(100.0, 730.0));
    }

    #[test]
    fn deployment_adds_logging() {
        let deployment = VmDeployment {
            label: "EC2 Basic + CloudWatch".to_string(),
            instance_monthly_cost: 19.05,
            instances: InstanceCount::Fixed(1),
            load_balancer: None,
            logging_cost_per_million_requests: Some(0.00075),
        };
        let seconds = 720.0 * 3600.0;
        close(
            19.05 + 0.00075 * 100.0 * seconds / 1_000_000.0,
            deployment.monthly_cost(100.0, 720.0),
        );
    }

    #[test]
    fn sweep_is_inclusive() {
        let sweep = Sweep {
            start: 0.0,
            end: 1.0,
            step: 0.1,
        };
        let points = sweep.points();
        assert_eq!(11, points.len());
        close(1.0, points[10]);
    }

    #[test]
    fn rejects_bounded_last_tier() {
        let toml = r#"
            name = "broken"
            title = "Broken"

            [sweep]
            start = 0
            end = 10
            step = 1

            [serverless]
            label = "AWS Lambda"
            request_cost_per_million = 0.2
            memory_mb = 128
            execution_time_ms = 10
            compute_tiers = [{ up_to_gb_seconds = 100, cost_per_gb_second = 0.1 }]

            [[deployments]]
            label = "EC2"
            instance_monthly_cost = 10
            instances = { fixed = 1 }
        "#;

        let err = CostModel::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ModelError::Invalid { .. }), "{err}");
    }
}
