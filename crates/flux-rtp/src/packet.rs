//! RTP 固定头部解码（RFC 3550 §5.1）
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |V=2|P|X|  CC   |M|     PT      |       sequence number         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           timestamp                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           synchronization source (SSRC) identifier            |
//! +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
//! |            contributing source (CSRC) identifiers             |
//! |                             ....                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;

use crate::error::{DecodeError, Result};

pub const RTP_VERSION: u8 = 2;

/// 固定头部长度
pub const FIXED_HEADER_LEN: usize = 12;

const PADDING_BIT: u8 = 0x20;
const EXTENSION_BIT: u8 = 0x10;
const CSRC_COUNT_MASK: u8 = 0x0F;
const MARKER_BIT: u8 = 0x80;
const PAYLOAD_TYPE_MASK: u8 = 0x7F;

/// 头部扩展
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderExtension {
    /// profile 定义的扩展标识
    pub id: u16,
    /// 扩展数据，长度总是 4 的倍数
    pub data: Bytes,
}

/// RTP 包
///
/// 由 [`RtpPacket::decode`] 从单个数据块构造，之后按所有权移交给消费者。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpPacket {
    pub version: u8,
    pub padding: bool,
    pub marker: bool,
    pub payload_type: u8,
    pub sequence_number: u32,
    pub timestamp: u32,
    pub ssrc: u32,
    pub csrc: Vec<u32>,
    /// 仅当 X 位置位时存在
    pub extension: Option<HeaderExtension>,
    /// 剩余全部字节（包含 padding，如有）
    pub payload: Bytes,
}

/// 带边界检查的读取
fn ensure(data: &Bytes, field: &'static str, needed: usize) -> Result<()> {
    if data.remaining() < needed {
        return Err(DecodeError::MalformedPacket {
            field,
            needed,
            available: data.remaining(),
        });
    }
    Ok(())
}

impl RtpPacket {
    /// 解码 RTP 包，扩展数据与负载与 `data` 共享内存
    pub fn decode(mut data: Bytes) -> Result<Self> {
        ensure(&data, "fixed header", FIXED_HEADER_LEN)?;

        // Byte 0: V(2), P(1), X(1), CC(4)
        let byte0 = data.get_u8();
        let version = byte0 >> 6;
        if version != RTP_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }
        let padding = byte0 & PADDING_BIT != 0;
        let has_extension = byte0 & EXTENSION_BIT != 0;
        let csrc_count = (byte0 & CSRC_COUNT_MASK) as usize;

        // Byte 1: M(1), PT(7)
        let byte1 = data.get_u8();
        let marker = byte1 & MARKER_BIT != 0;
        let payload_type = byte1 & PAYLOAD_TYPE_MASK;

        let sequence_number = data.get_u16() as u32;
        let timestamp = data.get_u32();
        let ssrc = data.get_u32();

        ensure(&data, "csrc list", csrc_count * 4)?;
        let csrc = (0..csrc_count).map(|_| data.get_u32()).collect();

        let extension = if has_extension {
            ensure(&data, "extension header", 4)?;
            let id = data.get_u16();
            let len = data.get_u16() as usize * 4;
            ensure(&data, "extension data", len)?;
            Some(HeaderExtension {
                id,
                data: data.split_to(len),
            })
        } else {
            None
        };

        Ok(Self {
            version,
            padding,
            marker,
            payload_type,
            sequence_number,
            timestamp,
            ssrc,
            csrc,
            extension,
            payload: data,
        })
    }

    /// 从借用的切片解码（会复制一次）
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::decode(Bytes::copy_from_slice(data))
    }

    pub fn has_extension(&self) -> bool {
        self.extension.is_some()
    }

    /// 去掉尾部 padding 后的负载
    ///
    /// padding 长度由负载最后一个字节给出；长度非法时返回 `None`。
    pub fn unpadded_payload(&self) -> Option<Bytes> {
        if !self.padding {
            return Some(self.payload.clone());
        }
        let padding_len = *self.payload.last()? as usize;
        if padding_len == 0 || padding_len > self.payload.len() {
            return None;
        }
        Some(self.payload.slice(..self.payload.len() - padding_len))
    }

    /// 编码后的字节长度
    pub fn encoded_len(&self) -> usize {
        FIXED_HEADER_LEN
            + self.csrc.len().min(CSRC_COUNT_MASK as usize) * 4
            + self.extension.as_ref().map_or(0, |ext| 4 + ext.data.len())
            + self.payload.len()
    }

    /// 序列化为线上格式
    ///
    /// CSRC 超过 15 个或扩展数据不是 4 字节对齐时，多余/不完整的部分无法表示，
    /// 调用方需要保证这些值来自 [`RtpPacket::decode`] 或满足同样的约束。
    pub fn serialize(&self, buf: &mut BytesMut) {
        buf.reserve(self.encoded_len());

        let csrc_count = self.csrc.len().min(CSRC_COUNT_MASK as usize);
        let mut byte0 = ((self.version & 0x03) << 6) | csrc_count as u8;
        if self.padding {
            byte0 |= PADDING_BIT;
        }
        if self.extension.is_some() {
            byte0 |= EXTENSION_BIT;
        }
        buf.put_u8(byte0);

        let mut byte1 = self.payload_type & PAYLOAD_TYPE_MASK;
        if self.marker {
            byte1 |= MARKER_BIT;
        }
        buf.put_u8(byte1);

        buf.put_u16(self.sequence_number as u16);
        buf.put_u32(self.timestamp);
        buf.put_u32(self.ssrc);

        for csrc in &self.csrc[..csrc_count] {
            buf.put_u32(*csrc);
        }

        if let Some(ext) = &self.extension {
            buf.put_u16(ext.id);
            buf.put_u16((ext.data.len() / 4) as u16);
            buf.put_slice(&ext.data);
        }

        buf.put_slice(&self.payload);
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.serialize(&mut buf);
        buf.freeze()
    }
}

impl fmt::Display for RtpPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RTP v{} pt={} seq={} ts={} ssrc={:#010x} marker={} padding={} csrc={:?}",
            self.version,
            self.payload_type,
            self.sequence_number,
            self.timestamp,
            self.ssrc,
            self.marker,
            self.padding,
            self.csrc,
        )?;
        if let Some(ext) = &self.extension {
            write!(f, " ext={:#06x}/{}B", ext.id, ext.data.len())?;
        }
        write!(f, " payload={}B", self.payload.len())
    }
}
