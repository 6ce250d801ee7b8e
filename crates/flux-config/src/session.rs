use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// RTP 固定头部长度
const MIN_CHUNK_SIZE: usize = 12;

/// 会话管线配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// 单次读取的最大字节数
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// 每个输出队列的容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 每个传输通道的分发 worker 数量
    #[serde(default = "default_dispatch_workers")]
    pub dispatch_workers: usize,

    /// 读循环与 worker 之间的工作队列容量
    #[serde(default = "default_work_queue_capacity")]
    pub work_queue_capacity: usize,
}

impl SessionConfig {
    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size < MIN_CHUNK_SIZE {
            return Err(anyhow!(
                "chunk_size must be at least {} bytes, got {}",
                MIN_CHUNK_SIZE,
                self.chunk_size
            ));
        }
        if self.queue_capacity == 0 {
            return Err(anyhow!("queue_capacity must be greater than zero"));
        }
        if self.dispatch_workers == 0 {
            return Err(anyhow!("dispatch_workers must be greater than zero"));
        }
        if self.work_queue_capacity == 0 {
            return Err(anyhow!("work_queue_capacity must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            queue_capacity: default_queue_capacity(),
            dispatch_workers: default_dispatch_workers(),
            work_queue_capacity: default_work_queue_capacity(),
        }
    }
}

// 默认值函数
fn default_chunk_size() -> usize {
    4096
}

fn default_queue_capacity() -> usize {
    10
}

fn default_dispatch_workers() -> usize {
    4
}

fn default_work_queue_capacity() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_config() {
        let config = SessionConfig::default();
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(config.queue_capacity, 10);
        assert_eq!(config.dispatch_workers, 4);
        assert_eq!(config.work_queue_capacity, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_small_chunk() {
        let config = SessionConfig {
            chunk_size: 8,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = SessionConfig {
            queue_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SessionConfig {
            dispatch_workers: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
