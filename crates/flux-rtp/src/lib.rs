pub mod decoder;
pub mod error;
pub mod packet;
pub mod session;
pub mod stats;
pub mod transport;

pub use decoder::{ChunkDecoder, RtcpPacket, RtcpPlaceholder, RtpDecoder};
pub use error::{DecodeError, SessionError};
pub use packet::{HeaderExtension, RtpPacket, FIXED_HEADER_LEN, RTP_VERSION};
pub use session::RtpSession;
pub use stats::{ChannelStatsSnapshot, SessionStats, StatsSnapshot};
pub use transport::{Channel, FramedTransport, StreamTransport, Transport};

pub use flux_config::SessionConfig;
