use crate::config::CaptureConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A named sequence of captures, run in order against one browser session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturePlan {
    pub steps: Vec<CaptureStep>,
}

/// One entry in a plan. Fields not present in the JSON fall back to the
/// `CaptureConfig` defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureStep {
    pub name: String,
    #[serde(flatten)]
    pub config: CaptureConfig,
}

impl CapturePlan {
    /// Load and validate a plan from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading capture plan from: {}", path.display());
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse and validate a plan from a JSON string
    pub fn from_json(raw: &str) -> Result<Self> {
        let plan: CapturePlan = serde_json::from_str(raw)?;
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(Error::InvalidPlan(
                "a plan needs at least one step".to_string(),
            ));
        }

        let mut names = HashSet::new();
        let mut outputs = HashSet::new();
        for step in &self.steps {
            if step.name.trim().is_empty() {
                return Err(Error::InvalidPlan("every step needs a name".to_string()));
            }
            if !names.insert(step.name.as_str()) {
                return Err(Error::InvalidPlan(format!(
                    "duplicate step name: {}",
                    step.name
                )));
            }
            if !outputs.insert(step.config.output.as_path()) {
                return Err(Error::InvalidPlan(format!(
                    "steps {} write to the same output: {}",
                    step.name,
                    step.config.output.display()
                )));
            }
            step.config.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaitStrategy;
    use std::io::Write;

    const TWO_STEP_PLAN: &str = r#"{
        "steps": [
            {
                "name": "home",
                "url": "http://localhost:5173/",
                "output": "shots/01-home.png"
            },
            {
                "name": "about",
                "url": "http://localhost:5173/about",
                "output": "shots/02-about.png",
                "wait": "fixed",
                "settle_ms": 2000
            }
        ]
    }"#;

    #[test]
    fn test_plan_parses_steps_with_overrides() {
        let plan = CapturePlan::from_json(TWO_STEP_PLAN).unwrap();

        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].name, "home");
        assert_eq!(plan.steps[0].config.wait, WaitStrategy::Stable);
        assert_eq!(plan.steps[1].config.wait, WaitStrategy::Fixed);
        assert_eq!(plan.steps[1].config.settle_ms, 2_000);
    }

    #[test]
    fn test_empty_plan_is_rejected() {
        let err = CapturePlan::from_json(r#"{"steps": []}"#).unwrap_err();
        assert!(err.to_string().contains("at least one step"));
    }

    #[test]
    fn test_duplicate_outputs_are_rejected() {
        let raw = r#"{
            "steps": [
                {"name": "a", "output": "same.png"},
                {"name": "b", "output": "same.png"}
            ]
        }"#;
        let err = CapturePlan::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("same output"));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let raw = r#"{
            "steps": [
                {"name": "a", "output": "one.png"},
                {"name": "a", "output": "two.png"}
            ]
        }"#;
        let err = CapturePlan::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate step name"));
    }

    #[test]
    fn test_step_config_is_validated() {
        let raw = r#"{
            "steps": [
                {"name": "bad", "url": "ftp://example.com/", "output": "bad.png"}
            ]
        }"#;
        assert!(CapturePlan::from_json(raw).is_err());
    }

    #[test]
    fn test_plan_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TWO_STEP_PLAN.as_bytes()).unwrap();

        let plan = CapturePlan::from_file(file.path()).unwrap();
        assert_eq!(plan.steps.len(), 2);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = CapturePlan::from_file(Path::new("/nonexistent/plan.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
