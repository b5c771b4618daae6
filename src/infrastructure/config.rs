use crate::application::csv_parser::MalformedPolicy;
use crate::domain::chart::{ChartOptions, CurveType, LegendPosition};
use serde::Deserialize;
use std::time::Duration;

const CONFIG_FILE: &str = "config/power_graph";
const ENV_PREFIX: &str = "POWER_GRAPH";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PowerGraphConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub loader: LoaderSettings,
    #[serde(default)]
    pub parser: ParserSettings,
    #[serde(default)]
    pub chart: ChartSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    pub data_dir: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            data_dir: "data".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoaderSettings {
    /// URL of the page the log is resolved against.
    pub page_url: String,
    pub log_path: String,
    pub timeout_secs: Option<u64>,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            page_url: "http://127.0.0.1:8080/index.html".to_string(),
            log_path: "log.csv".to_string(),
            timeout_secs: None,
        }
    }
}

impl LoaderSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ParserSettings {
    pub malformed: MalformedPolicy,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,
    pub legend: LegendPosition,
    pub v_axis_title: String,
    pub smooth: bool,
    pub load_timeout_ms: Option<u64>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        let options = ChartOptions::default();
        Self {
            width: options.width,
            height: options.height,
            legend: options.legend,
            v_axis_title: options.v_axis_title,
            smooth: options.curve_type == CurveType::Function,
            load_timeout_ms: None,
        }
    }
}

impl ChartSettings {
    pub fn to_options(&self) -> ChartOptions {
        ChartOptions {
            curve_type: if self.smooth {
                CurveType::Function
            } else {
                CurveType::None
            },
            width: self.width,
            height: self.height,
            legend: self.legend,
            v_axis_title: self.v_axis_title.clone(),
        }
    }

    pub fn load_timeout(&self) -> Option<Duration> {
        self.load_timeout_ms.map(Duration::from_millis)
    }
}

/// `config/power_graph.{toml,...}` if present, overridden by
/// `POWER_GRAPH__<TABLE>__<KEY>` environment variables.
pub fn load_config() -> anyhow::Result<PowerGraphConfig> {
    load_config_from(CONFIG_FILE)
}

pub fn load_config_from(path: &str) -> anyhow::Result<PowerGraphConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_missing() {
        let config = load_config_from("config/does_not_exist").unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.loader.log_path, "log.csv");
        assert_eq!(config.loader.timeout(), None);
        assert_eq!(config.parser.malformed, MalformedPolicy::Skip);
        assert_eq!(config.chart.to_options(), ChartOptions::default());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("power_graph_test_{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[loader]
page_url = "http://meter.local/index.html"
timeout_secs = 3

[parser]
malformed = "pass_through"

[chart]
legend = "none"
smooth = false
height = 300
"#,
        )
        .unwrap();

        let config = load_config_from(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.loader.page_url, "http://meter.local/index.html");
        assert_eq!(config.loader.log_path, "log.csv");
        assert_eq!(config.loader.timeout(), Some(Duration::from_secs(3)));
        assert_eq!(config.parser.malformed, MalformedPolicy::PassThrough);

        let options = config.chart.to_options();
        assert_eq!(options.legend, LegendPosition::None);
        assert_eq!(options.curve_type, CurveType::None);
        assert_eq!(options.height, 300);
        assert_eq!(options.width, 900);
        assert_eq!(options.v_axis_title, "Power (Watts)");
    }
}
