use anyhow::{anyhow, Result};
use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};

use crate::GlobalConfig;

/// 环境变量前缀，例如 `FLUX_RTP__SESSION__QUEUE_CAPACITY=32`
const ENV_PREFIX: &str = "FLUX_RTP";

/// 配置加载器
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// 创建配置加载器
    pub fn new<P: AsRef<Path>>(config_dir: P) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
        }
    }

    /// 配置文件路径
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("rtp.toml")
    }

    /// 加载配置：`rtp.toml`（可选）叠加环境变量
    pub fn load(&self) -> Result<GlobalConfig> {
        let config_path = self.config_path();

        let config = Config::builder()
            .add_source(
                File::new(
                    config_path.to_str().ok_or_else(|| anyhow!("Invalid config path"))?,
                    FileFormat::Toml,
                )
                .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let global: GlobalConfig = config.try_deserialize()?;
        global.session.validate()?;

        Ok(global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigLoader::new(dir.path()).load().unwrap();

        assert_eq!(config.session.chunk_size, 4096);
        assert_eq!(config.session.queue_capacity, 10);
        assert_eq!(config.listen.media, "0.0.0.0:5004");
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("rtp.toml"),
            r#"
[listen]
media = "127.0.0.1:6000"
control = "127.0.0.1:6001"

[session]
queue_capacity = 32
dispatch_workers = 2

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = ConfigLoader::new(dir.path()).load().unwrap();

        assert_eq!(config.listen.media, "127.0.0.1:6000");
        assert_eq!(config.session.queue_capacity, 32);
        assert_eq!(config.session.dispatch_workers, 2);
        // 未配置的字段使用默认值
        assert_eq!(config.session.chunk_size, 4096);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, crate::LogFormat::Json);
    }

    #[test]
    fn test_load_rejects_invalid_session() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("rtp.toml"),
            "[session]\nqueue_capacity = 0\n",
        )
        .unwrap();

        assert!(ConfigLoader::new(dir.path()).load().is_err());
    }
}
