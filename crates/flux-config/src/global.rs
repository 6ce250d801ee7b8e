use serde::{Deserialize, Serialize};

use crate::session::SessionConfig;

/// 全局配置
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 监听地址配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    /// RTP 媒体端口
    #[serde(default = "default_media_addr")]
    pub media: String,
    /// RTCP 控制端口
    #[serde(default = "default_control_addr")]
    pub control: String,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            media: default_media_addr(),
            control: default_control_addr(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

fn default_media_addr() -> String {
    "0.0.0.0:5004".to_string()
}

fn default_control_addr() -> String {
    "0.0.0.0:5005".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_global_config() {
        let config = GlobalConfig::default();
        assert_eq!(config.listen.media, "0.0.0.0:5004");
        assert_eq!(config.listen.control, "0.0.0.0:5005");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.session, SessionConfig::default());
    }
}
