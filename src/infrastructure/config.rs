use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub selection: SelectionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub endpoints: EndpointTemplates,
}

/// Bounds on per-plant view state kept by the selection endpoints.
#[derive(Debug, Deserialize, Clone)]
pub struct SelectionSettings {
    pub max_sessions: usize,
    pub idle_ttl_secs: u64,
}

/// Upstream paths relative to `base_url`. `${plant}` and `${resolution}`
/// are substituted per request.
#[derive(Debug, Deserialize, Clone)]
pub struct EndpointTemplates {
    pub plants: String,
    pub telemetry: String,
    pub summary: String,
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .set_default("backend.timeout_secs", 10)?
        .set_default("backend.endpoints.plants", "/plants")?
        .set_default("backend.endpoints.telemetry", "/plants/${plant}/telemetry/${resolution}")?
        .set_default("backend.endpoints.summary", "/plants/${plant}/dashboard")?
        .set_default("selection.max_sessions", 256)?
        .set_default("selection.idle_ttl_secs", 1800)?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("SOLAR").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in an endpoint path
pub fn prepare_path(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_path() {
        let mut vars = HashMap::new();
        vars.insert("plant", "north%20roof".to_string());
        vars.insert("resolution", "month".to_string());

        let path = prepare_path("/plants/${plant}/telemetry/${resolution}", &vars);

        assert_eq!(path, "/plants/north%20roof/telemetry/month");
    }

    #[test]
    fn test_prepare_path_leaves_unknown_placeholders() {
        let vars = HashMap::new();
        assert_eq!(prepare_path("/plants/${plant}", &vars), "/plants/${plant}");
    }
}
