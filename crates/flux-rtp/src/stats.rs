use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::DecodeError;
use crate::transport::Channel;

/// 单个通道的计数器
#[derive(Debug, Default)]
pub struct ChannelStats {
    chunks: AtomicU64,
    published: AtomicU64,
    unsupported_version: AtomicU64,
    malformed: AtomicU64,
}

impl ChannelStats {
    pub(crate) fn record_chunk(&self) {
        self.chunks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decode_error(&self, err: &DecodeError) {
        let counter = match err {
            DecodeError::UnsupportedVersion(_) => &self.unsupported_version,
            DecodeError::MalformedPacket { .. } => &self.malformed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ChannelStatsSnapshot {
        ChannelStatsSnapshot {
            chunks: self.chunks.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            unsupported_version: self.unsupported_version.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}

/// 会话统计
#[derive(Debug, Default)]
pub struct SessionStats {
    media: ChannelStats,
    control: ChannelStats,
}

impl SessionStats {
    pub fn channel(&self, channel: Channel) -> &ChannelStats {
        match channel {
            Channel::Media => &self.media,
            Channel::Control => &self.control,
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            media: self.media.snapshot(),
            control: self.control.snapshot(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelStatsSnapshot {
    /// 从连接读到的数据块
    pub chunks: u64,
    /// 已发布到输出队列的值
    pub published: u64,
    pub unsupported_version: u64,
    pub malformed: u64,
}

impl ChannelStatsSnapshot {
    pub fn dropped(&self) -> u64 {
        self.unsupported_version + self.malformed
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub media: ChannelStatsSnapshot,
    pub control: ChannelStatsSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_per_channel() {
        let stats = SessionStats::default();

        stats.channel(Channel::Media).record_chunk();
        stats.channel(Channel::Media).record_chunk();
        stats.channel(Channel::Media).record_published();
        stats
            .channel(Channel::Media)
            .record_decode_error(&DecodeError::UnsupportedVersion(1));
        stats.channel(Channel::Control).record_chunk();
        stats
            .channel(Channel::Control)
            .record_decode_error(&DecodeError::MalformedPacket {
                field: "fixed header",
                needed: 12,
                available: 3,
            });

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.media.chunks, 2);
        assert_eq!(snapshot.media.published, 1);
        assert_eq!(snapshot.media.unsupported_version, 1);
        assert_eq!(snapshot.media.dropped(), 1);
        assert_eq!(snapshot.control.chunks, 1);
        assert_eq!(snapshot.control.malformed, 1);
        assert_eq!(snapshot.control.published, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(SessionStats::default().snapshot()).unwrap();
        assert_eq!(json["media"]["chunks"], 0);
        assert_eq!(json["control"]["malformed"], 0);
    }
}
