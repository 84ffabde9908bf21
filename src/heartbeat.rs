//! Heartbeat wire codec (spec §4.E).
//!
//! ```text
//! offset  size  field
//! 0       4     uptime seconds
//! 4       3     opaque user word
//! 7       1     version (=1)
//! 8       8     UID
//! 16      8     topic_hash
//! 24      8     (flags8 << 56) | age56
//! 32      8     (name_len8 << 56) | reserved16 | evictions40
//! 40      <=96  topic_name bytes
//! ```

use crate::name::MAX_NAME_LEN;

pub const WIRE_VERSION: u8 = 1;
pub const HEADER_LEN: usize = 40;

pub const FLAG_PUBLISHING: u8 = 1 << 0;
pub const FLAG_SUBSCRIBED: u8 = 1 << 1;

/// A decoded heartbeat, describing one local topic's current allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heartbeat {
    pub uptime_seconds: u32,
    pub user_word: [u8; 3],
    pub uid: u64,
    pub topic_hash: u64,
    pub age: u64,
    pub publishing: bool,
    pub subscribed: bool,
    pub evictions: u64,
    pub topic_name: String,
}

impl Heartbeat {
    pub fn encode(&self) -> Vec<u8> {
        let name_bytes = self.topic_name.as_bytes();
        debug_assert!(name_bytes.len() <= MAX_NAME_LEN);

        let mut buf = Vec::with_capacity(HEADER_LEN + name_bytes.len());
        buf.extend_from_slice(&self.uptime_seconds.to_be_bytes());
        buf.extend_from_slice(&self.user_word);
        buf.push(WIRE_VERSION);
        buf.extend_from_slice(&self.uid.to_be_bytes());
        buf.extend_from_slice(&self.topic_hash.to_be_bytes());

        let mut flags: u8 = 0;
        if self.publishing {
            flags |= FLAG_PUBLISHING;
        }
        if self.subscribed {
            flags |= FLAG_SUBSCRIBED;
        }
        let age_word = ((flags as u64) << 56) | (self.age & 0x00FF_FFFF_FFFF_FFFF);
        buf.extend_from_slice(&age_word.to_be_bytes());

        let name_len = name_bytes.len() as u8;
        let evict_word = ((name_len as u64) << 56) | (self.evictions & 0x0000_00FF_FFFF_FFFF);
        buf.extend_from_slice(&evict_word.to_be_bytes());

        buf.extend_from_slice(name_bytes);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Option<Heartbeat> {
        if bytes.len() < HEADER_LEN {
            return None;
        }
        let version = bytes[7];
        if version != WIRE_VERSION {
            return None;
        }

        let uptime_seconds = u32::from_be_bytes(bytes[0..4].try_into().ok()?);
        let user_word = [bytes[4], bytes[5], bytes[6]];
        let uid = u64::from_be_bytes(bytes[8..16].try_into().ok()?);
        let topic_hash = u64::from_be_bytes(bytes[16..24].try_into().ok()?);

        let age_word = u64::from_be_bytes(bytes[24..32].try_into().ok()?);
        let flags = (age_word >> 56) as u8;
        let age = age_word & 0x00FF_FFFF_FFFF_FFFF;

        let evict_word = u64::from_be_bytes(bytes[32..40].try_into().ok()?);
        let name_len = (evict_word >> 56) as usize;
        let evictions = evict_word & 0x0000_00FF_FFFF_FFFF;

        if bytes.len() < HEADER_LEN + name_len || name_len > MAX_NAME_LEN {
            return None;
        }
        let topic_name = std::str::from_utf8(&bytes[HEADER_LEN..HEADER_LEN + name_len])
            .ok()?
            .to_string();

        Some(Heartbeat {
            uptime_seconds,
            user_word,
            uid,
            topic_hash,
            age,
            publishing: flags & FLAG_PUBLISHING != 0,
            subscribed: flags & FLAG_SUBSCRIBED != 0,
            evictions,
            topic_name,
        })
    }
}
