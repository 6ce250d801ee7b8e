use std::io;
use thiserror::Error;

use crate::transport::Channel;

/// 单个数据块的解码错误，只影响当前数据块
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unsupported RTP version: {0}")]
    UnsupportedVersion(u8),

    #[error("Malformed packet: {field} needs {needed} bytes, {available} available")]
    MalformedPacket {
        field: &'static str,
        needed: usize,
        available: usize,
    },
}

/// 会话级错误
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{channel} transport read failed: {source}")]
    TransportRead {
        channel: Channel,
        #[source]
        source: io::Error,
    },

    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
