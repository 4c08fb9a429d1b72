use crate::model::{CostModel, ModelError};

const PRESETS: [(&str, &str); 4] = [
    ("encode", include_str!("../models/encode.toml")),
    ("constant-rps", include_str!("../models/constant-rps.toml")),
    ("io", include_str!("../models/io.toml")),
    ("bursty", include_str!("../models/bursty.toml")),
];

pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|(name, _)| *name)
}

/// Load one of the bundled cost models by name.
pub fn preset(name: &str) -> Result<CostModel, ModelError> {
    let (_, content) = PRESETS
        .iter()
        .find(|(preset, _)| *preset == name)
        .ok_or_else(|| ModelError::UnknownPreset(name.to_string()))?;

    CostModel::from_toml_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::solve;

    fn breakeven(model: &str, deployment: &str) -> anyhow::Result<f64> {
        let report = solve(&preset(model)?);
        report
            .breakevens
            .iter()
            .find(|b| b.deployment == deployment)
            .and_then(|b| b.rps)
            .ok_or_else(|| anyhow::anyhow!("No break-even for {deployment} in {model}"))
    }

    fn close(expected: f64, actual: f64) {
        assert!(
            (expected - actual).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn all_presets_load() -> anyhow::Result<()> {
        for name in preset_names() {
            let model = preset(name)?;
            assert_eq!(name, model.name);
        }
        Ok(())
    }

    #[test]
    fn unknown_preset() {
        assert!(matches!(preset("gpu"), Err(ModelError::UnknownPreset(_))));
    }

    #[test]
    fn encode_breakevens() -> anyhow::Result<()> {
        close(31.497, breakeven("encode", "EC2 Basic")?);
        close(31.599, breakeven("encode", "EC2 Basic + CloudWatch")?);
        close(90.450, breakeven("encode", "EC2 High Availability")?);
        Ok(())
    }

    #[test]
    fn constant_rps_breakevens() -> anyhow::Result<()> {
        close(16.508, breakeven("constant-rps", "EC2 Basic - Reserved")?);
        close(26.406, breakeven("constant-rps", "EC2 Basic - On-Demand")?);
        close(
            75.980,
            breakeven("constant-rps", "EC2 High Availability (HA) - Reserved")?,
        );
        close(
            92.623,
            breakeven("constant-rps", "EC2 High Availability (HA) - On-Demand")?,
        );
        Ok(())
    }

    #[test]
    fn io_breakevens() -> anyhow::Result<()> {
        close(329.162, breakeven("io", "EC2 High Availability (HA) - Reserved")?);
        close(509.726, breakeven("io", "EC2 High Availability (HA) - On-Demand")?);
        Ok(())
    }

    #[test]
    fn bursty_breakeven() -> anyhow::Result<()> {
        close(
            3.966,
            breakeven("bursty", "EC2 High Availability (HA) - On-Demand")?,
        );
        Ok(())
    }
}
