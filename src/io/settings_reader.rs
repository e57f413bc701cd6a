use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::utils::TimeLimit;

/// Timeouts granted by the surrounding simulation, in milliseconds.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub timeout: Timeout,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Timeout {
    pub setup: Option<u64>,
    pub plan: Option<u64>,
}

impl Settings {
    pub fn plan_time_limit(&self) -> TimeLimit {
        self.timeout
            .plan
            .map_or(TimeLimit::None, TimeLimit::Milliseconds)
    }
}

pub fn parse_settings(content: &str) -> anyhow::Result<Settings> {
    Ok(toml::from_str(content)?)
}

pub fn load_settings(path: impl AsRef<Path>) -> anyhow::Result<Settings> {
    let path = path.as_ref();
    let mut s = String::new();
    File::open(path)
        .and_then(|mut file| file.read_to_string(&mut s))
        .with_context(|| format!("failed to read settings {}", path.display()))?;
    parse_settings(s.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_timeouts() -> anyhow::Result<()> {
        let settings = parse_settings(
            r#"
[timeout]
setup = 5000
plan = 300000
"#,
        )?;
        assert_eq!(settings.timeout.setup, Some(5000));
        assert_eq!(
            settings.plan_time_limit(),
            TimeLimit::Milliseconds(300000)
        );
        Ok(())
    }

    #[test]
    fn missing_timeouts_mean_no_limit() -> anyhow::Result<()> {
        let settings = parse_settings("")?;
        assert_eq!(settings, Settings::default());
        assert!(settings.plan_time_limit().is_none());
        Ok(())
    }
}
