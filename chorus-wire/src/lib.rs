use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// The size of an encoded [`Packet`] on the wire: three big-endian `i32`s.
pub const PACKET_SIZE: usize = 12;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0:?}")]
    Io(#[from] std::io::Error),
    #[error("Invalid datagram length: {0}, expected {PACKET_SIZE}")]
    Length(usize),
}

/// A single traffic packet. Immutable once built; every packet occupies
/// exactly one datagram on the wire, so no framing or length prefix exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    /// The identity of the emitting node.
    source: i32,
    /// Per-source sequence number, strictly increasing from 0.
    seq: i32,
    /// Opaque payload value. Not interpreted by any node.
    payload: i32,
}

impl Packet {
    /// Creates a new packet with the given source, sequence number, and payload.
    #[inline]
    pub const fn new(source: i32, seq: i32, payload: i32) -> Self {
        Self { source, seq, payload }
    }

    #[inline]
    pub const fn source(&self) -> i32 {
        self.source
    }

    #[inline]
    pub const fn seq(&self) -> i32 {
        self.seq
    }

    #[inline]
    pub const fn payload(&self) -> i32 {
        self.payload
    }
}

/// Codec for [`Packet`]s. Stateless: a packet either fits in the buffer or
/// it doesn't, there is no partial-header state to track.
#[derive(Debug, Default)]
pub struct Codec;

impl Codec {
    pub const fn new() -> Self {
        Self
    }
}

impl Decoder for Codec {
    type Item = Packet;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < PACKET_SIZE {
            return Ok(None);
        }

        let packet = Packet {
            source: src.get_i32(),
            seq: src.get_i32(),
            payload: src.get_i32(),
        };

        Ok(Some(packet))
    }
}

impl Encoder<Packet> for Codec {
    type Error = Error;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(PACKET_SIZE);

        dst.put_i32(item.source);
        dst.put_i32(item.seq);
        dst.put_i32(item.payload);

        Ok(())
    }
}

impl Packet {
    /// Decodes a packet from a whole datagram. Datagram transports hand us
    /// one complete record per receive, so anything other than exactly
    /// [`PACKET_SIZE`] bytes is malformed.
    pub fn from_datagram(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() != PACKET_SIZE {
            return Err(Error::Length(buf.len()));
        }

        let mut src = BytesMut::from(buf);
        // Length was checked above, decode cannot return None.
        Ok(Codec::new().decode(&mut src)?.unwrap())
    }

    /// Encodes this packet into a fresh datagram buffer.
    pub fn to_datagram(self) -> BytesMut {
        let mut dst = BytesMut::with_capacity(PACKET_SIZE);
        // Encoding into an owned buffer cannot fail.
        Codec::new().encode(self, &mut dst).unwrap();
        dst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let packet = Packet::new(3, 41, -7);

        let bytes = packet.to_datagram();
        assert_eq!(bytes.len(), PACKET_SIZE);

        let decoded = Packet::from_datagram(&bytes).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn layout_is_big_endian() {
        let bytes = Packet::new(1, 2, 3).to_datagram();

        assert_eq!(
            &bytes[..],
            &[0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3],
            "fields must be network byte order, in declaration order"
        );
    }

    #[test]
    fn short_datagram_is_rejected() {
        let err = Packet::from_datagram(&[0u8; 7]).unwrap_err();
        assert!(matches!(err, Error::Length(7)));
    }

    #[test]
    fn oversized_datagram_is_rejected() {
        let err = Packet::from_datagram(&[0u8; 24]).unwrap_err();
        assert!(matches!(err, Error::Length(24)));
    }

    #[test]
    fn decoder_waits_for_a_full_record() {
        let mut codec = Codec::new();
        let mut buf = BytesMut::from(&[0u8; PACKET_SIZE - 1][..]);

        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn negative_values_survive_the_wire() {
        let packet = Packet::new(-1, i32::MAX, i32::MIN);
        let decoded = Packet::from_datagram(&packet.to_datagram()).unwrap();
        assert_eq!(decoded, packet);
    }
}
