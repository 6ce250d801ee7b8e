use bytes::Bytes;

use crate::error::Result;
use crate::packet::RtpPacket;

/// 把一个原始数据块转换成输出值
///
/// `Ok(None)` 表示数据块被接受但没有产生任何值。
pub trait ChunkDecoder: Send + Sync + 'static {
    type Output: Send + 'static;

    fn decode(&self, chunk: Bytes) -> Result<Option<Self::Output>>;
}

/// RTP 媒体通道解码器
#[derive(Debug, Clone, Copy, Default)]
pub struct RtpDecoder;

impl ChunkDecoder for RtpDecoder {
    type Output = RtpPacket;

    fn decode(&self, chunk: Bytes) -> Result<Option<RtpPacket>> {
        RtpPacket::decode(chunk).map(Some)
    }
}

/// RTCP 复合包（尚未解析）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcpPacket {
    pub raw: Bytes,
}

/// RTCP 控制通道占位解码器，丢弃输入，不产生任何值
#[derive(Debug, Clone, Copy, Default)]
pub struct RtcpPlaceholder;

impl ChunkDecoder for RtcpPlaceholder {
    type Output = RtcpPacket;

    fn decode(&self, _chunk: Bytes) -> Result<Option<RtcpPacket>> {
        Ok(None)
    }
}
