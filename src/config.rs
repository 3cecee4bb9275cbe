use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::analysis::landmarks::NOMINAL_LANDMARK_COUNT;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub analysis_log_level: Option<String>,
    pub sled_path: String,
    pub cors_origin: String,
    pub analysis: AnalysisEnvConfig,
}

#[derive(Debug, Clone)]
pub struct AnalysisEnvConfig {
    /// 允许少于索引表所需数量的关键点（缺失项按默认值降级）
    pub allow_partial_landmarks: bool,
    /// 单次请求的关键点上限
    pub max_landmarks: usize,
    /// 是否把分析结果写入 sled
    pub persist_results: bool,
}

impl Default for AnalysisEnvConfig {
    fn default() -> Self {
        Self {
            allow_partial_landmarks: false,
            max_landmarks: 1000,
            persist_results: true,
        }
    }
}

impl AnalysisEnvConfig {
    /// 上限不得低于标准关键点数量，否则合法输入会被全部拒绝
    pub fn validate(mut self) -> Self {
        if self.max_landmarks < NOMINAL_LANDMARK_COUNT {
            tracing::warn!(
                configured = self.max_landmarks,
                minimum = NOMINAL_LANDMARK_COUNT,
                "ANALYSIS_MAX_LANDMARKS below nominal landmark count, raising"
            );
            self.max_landmarks = NOMINAL_LANDMARK_COUNT;
        }
        self
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = AnalysisEnvConfig::default();
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            analysis_log_level: env::var("ANALYSIS_LOG_LEVEL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            sled_path: env_or("SLED_PATH", "./data/analysis.sled"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            analysis: AnalysisEnvConfig {
                allow_partial_landmarks: env_or_bool(
                    "ANALYSIS_ALLOW_PARTIAL_LANDMARKS",
                    defaults.allow_partial_landmarks,
                ),
                max_landmarks: env_or_parse("ANALYSIS_MAX_LANDMARKS", defaults.max_landmarks),
                persist_results: env_or_bool("ANALYSIS_PERSIST_RESULTS", defaults.persist_results),
            }
            .validate(),
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn managed_keys() -> &'static [&'static str] {
        &[
            "HOST",
            "PORT",
            "RUST_LOG",
            "ANALYSIS_LOG_LEVEL",
            "ANALYSIS_ALLOW_PARTIAL_LANDMARKS",
            "ANALYSIS_MAX_LANDMARKS",
            "ANALYSIS_PERSIST_RESULTS",
        ]
    }

    fn clear_keys(keys: &[&str]) {
        for key in keys {
            env::remove_var(key);
        }
    }

    #[test]
    fn loads_defaults_when_missing() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.analysis_log_level.is_none());
        assert!(!cfg.analysis.allow_partial_landmarks);
        assert_eq!(cfg.analysis.max_landmarks, 1000);
        assert!(cfg.analysis.persist_results);
    }

    #[test]
    fn parses_numeric_values() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "4000");
        env::set_var("ANALYSIS_MAX_LANDMARKS", "600");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.analysis.max_landmarks, 600);
    }

    #[test]
    fn invalid_values_fall_back() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "bad");
        env::set_var("ANALYSIS_MAX_LANDMARKS", "lots");
        env::set_var("ANALYSIS_PERSIST_RESULTS", "maybe");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.analysis.max_landmarks, 1000);
        assert!(cfg.analysis.persist_results);
    }

    #[test]
    fn max_landmarks_is_raised_to_nominal_count() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("ANALYSIS_MAX_LANDMARKS", "10");

        let cfg = Config::from_env();
        assert_eq!(cfg.analysis.max_landmarks, NOMINAL_LANDMARK_COUNT);
    }

    #[test]
    fn feature_flags_isolation() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("ANALYSIS_ALLOW_PARTIAL_LANDMARKS", "yes");
        env::set_var("ANALYSIS_PERSIST_RESULTS", "off");
        env::set_var("ANALYSIS_LOG_LEVEL", " debug ");

        let cfg = Config::from_env();
        assert!(cfg.analysis.allow_partial_landmarks);
        assert!(!cfg.analysis.persist_results);
        assert_eq!(cfg.analysis_log_level.as_deref(), Some("debug"));
    }
}
