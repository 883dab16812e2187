//! Scheduler configuration file.
//!
//! ```toml
//! [[tiers]]
//! [[tiers.plugins]]
//! name = "usage"
//! arguments = { "usage.weight" = 10, type = "average", period = "10m", thresholds = { cpu = 70, mem = 70 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use gridsched_api::Arguments;

use crate::error::{FrameworkError, FrameworkResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerConf {
    /// Comma-separated action names. Informational here.
    #[serde(default)]
    pub actions: Option<String>,
    #[serde(default)]
    pub tiers: Vec<Tier>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tier {
    #[serde(default)]
    pub plugins: Vec<PluginOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginOption {
    pub name: String,
    #[serde(default)]
    pub arguments: Arguments,
}

impl SchedulerConf {
    pub fn from_file(path: &Path) -> FrameworkResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| FrameworkError::ConfRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> FrameworkResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// All configured plugins, tier by tier.
    pub fn plugins(&self) -> impl Iterator<Item = &PluginOption> {
        self.tiers.iter().flat_map(|tier| tier.plugins.iter())
    }

    /// Arguments of the first plugin configured under `name`.
    pub fn plugin_arguments(&self, name: &str) -> Option<&Arguments> {
        self.plugins()
            .find(|p| p.name == name)
            .map(|p| &p.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const SAMPLE: &str = r#"
actions = "enqueue, allocate, backfill"

[[tiers]]
[[tiers.plugins]]
name = "priority"

[[tiers]]
[[tiers.plugins]]
name = "usage"
[tiers.plugins.arguments]
"usage.weight" = 10
type = "average"
period = "10m"
thresholds = { cpu = 70, mem = 70 }
"#;

    #[test]
    fn parses_tiers_and_arguments() {
        let conf = SchedulerConf::from_toml(SAMPLE).unwrap();
        assert_eq!(conf.tiers.len(), 2);
        assert_eq!(conf.plugins().count(), 2);

        let args = conf.plugin_arguments("usage").unwrap();
        assert_eq!(args.get("usage.weight"), Some(&json!(10)));
        assert_eq!(args.get("thresholds"), Some(&json!({"cpu": 70, "mem": 70})));
        assert!(conf.plugin_arguments("priority").unwrap().is_empty());
    }

    #[test]
    fn missing_plugin_has_no_arguments() {
        let conf = SchedulerConf::from_toml(SAMPLE).unwrap();
        assert!(conf.plugin_arguments("binpack").is_none());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let conf = SchedulerConf::from_file(file.path()).unwrap();
        assert_eq!(conf.actions.as_deref(), Some("enqueue, allocate, backfill"));
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = SchedulerConf::from_file(Path::new("/nonexistent/sched.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/sched.toml"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = SchedulerConf::from_toml("[[tiers]\n").unwrap_err();
        assert!(matches!(err, FrameworkError::ConfParse(_)));
    }
}
