//! `gridsched config` — show how the usage plugin reads its arguments.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use gridsched_api::Arguments;
use gridsched_framework::SchedulerConf;
use gridsched_usage::{PLUGIN_NAME, Resolved, resolve};

pub fn show(path: &Path, format: &str) -> Result<()> {
    let resolved = load(path)?;

    match format {
        "json" => {
            let warnings: Vec<String> = resolved.warnings.iter().map(ToString::to_string).collect();
            let out = json!({ "config": resolved.config, "warnings": warnings });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        _ => println!("{}", render(&resolved)),
    }
    Ok(())
}

/// Resolve the usage plugin's arguments from a scheduler configuration.
///
/// A configuration without a usage plugin resolves to the defaults.
pub fn load(path: &Path) -> Result<Resolved> {
    let conf = SchedulerConf::from_file(path)
        .with_context(|| format!("loading {}", path.display()))?;
    let args = conf
        .plugin_arguments(PLUGIN_NAME)
        .cloned()
        .unwrap_or_else(Arguments::new);
    Ok(resolve(&args))
}

fn render(resolved: &Resolved) -> String {
    let c = &resolved.config;
    let mut out = format!(
        "weight:        {}\n\
         type:          {}\n\
         period:        {}\n\
         cpu threshold: {}\n\
         mem threshold: {}\n\
         thresholds:    {}",
        c.weight,
        c.usage_mode,
        if c.sample_period.is_empty() { "(disabled)" } else { c.sample_period.as_str() },
        c.cpu_threshold_pct,
        c.mem_threshold_pct,
        if c.thresholds_configured { "configured" } else { "defaults" },
    );
    for warning in &resolved.warnings {
        out.push_str(&format!("\nwarning: {warning}"));
    }
    out
}
