//! HFS+ write-ahead journal: Journal Info Block, Journal Header, and the
//! block-list transaction format the journal replay engine walks on mount.
//!
//! The checksum here is a big-endian 32-bit word sum over a structure with
//! its own checksum field cleared — the same "zero the field, sum the
//! rest" shape the volume codec uses elsewhere for its checksums, just
//! over words instead of CRC32 over bytes.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::{HfsError, Result};

pub const JOURNAL_HEADER_MAGIC: u32 = 0x4A4E4C78; // "JNLx"
pub const JOURNAL_HEADER_ENDIAN: u32 = 0x12345678;

/// Journal Info Block: lives at the allocation-block offset
/// `VolumeHeader::journal_info_block` names, describing where the journal
/// body itself is and whether it's usable.
///
/// On-disk layout: `{ flags:4, deviceSignature[8]:4 each, offset:8, size:8,
/// reserved[432] }`.
#[derive(Debug, Clone)]
pub struct JournalInfoBlock {
    pub flags: u32,
    pub device_signature: [u32; 8],
    pub offset: u64,
    pub size: u64,
}

pub const JOURNAL_INFO_BLOCK_SIZE: usize = 4 + 32 + 8 + 8 + 432;

/// The journal lives on a device other than this volume; this core cannot
/// locate or replay it.
pub const JOURNAL_ON_OTHER_DEVICE: u32 = 1 << 0;
/// The journal is present but uninitialized; nothing to replay, but it is
/// not safely usable until re-initialized.
pub const JOURNAL_NEED_INIT: u32 = 1 << 1;

impl JournalInfoBlock {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < 4 + 32 + 8 + 8 {
            return Err(HfsError::JournalCorrupt("journal info block too short".into()));
        }
        let flags = u32::from_be_bytes(buf[0..4].try_into().unwrap());
        let mut device_signature = [0u32; 8];
        for (i, chunk) in buf[4..36].chunks_exact(4).enumerate() {
            device_signature[i] = u32::from_be_bytes(chunk.try_into().unwrap());
        }
        let offset = u64::from_be_bytes(buf[36..44].try_into().unwrap());
        let size = u64::from_be_bytes(buf[44..52].try_into().unwrap());
        Ok(JournalInfoBlock { flags, device_signature, offset, size })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; JOURNAL_INFO_BLOCK_SIZE];
        buf[0..4].copy_from_slice(&self.flags.to_be_bytes());
        for (i, w) in self.device_signature.iter().enumerate() {
            buf[4 + i * 4..8 + i * 4].copy_from_slice(&w.to_be_bytes());
        }
        buf[36..44].copy_from_slice(&self.offset.to_be_bytes());
        buf[44..52].copy_from_slice(&self.size.to_be_bytes());
        buf
    }
}

/// Journal Header: the first bytes of the journal body itself, tracking
/// the active transaction range as `[start, end)` within a `size`-byte
/// circular buffer.
///
/// On-disk layout: `{ magic:4, endian:4, start:8, end:8, size:8,
/// blhdrSize:4, checksum:4, jhdrSize:4 }` = 44 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalHeader {
    pub magic: u32,
    pub endian: u32,
    pub start: u64,
    pub end: u64,
    pub size: u64,
    pub block_list_header_size: u32,
    pub checksum: u32,
    pub journal_header_size: u32,
}

pub const JOURNAL_HEADER_SIZE: usize = 44;

impl JournalHeader {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < JOURNAL_HEADER_SIZE {
            return Err(HfsError::JournalCorrupt("journal header too short".into()));
        }
        Ok(JournalHeader {
            magic: be32(buf, 0),
            endian: be32(buf, 4),
            start: be64(buf, 8),
            end: be64(buf, 16),
            size: be64(buf, 24),
            block_list_header_size: be32(buf, 32),
            checksum: be32(buf, 36),
            journal_header_size: be32(buf, 40),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; JOURNAL_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.magic.to_be_bytes());
        buf[4..8].copy_from_slice(&self.endian.to_be_bytes());
        buf[8..16].copy_from_slice(&self.start.to_be_bytes());
        buf[16..24].copy_from_slice(&self.end.to_be_bytes());
        buf[24..32].copy_from_slice(&self.size.to_be_bytes());
        buf[32..36].copy_from_slice(&self.block_list_header_size.to_be_bytes());
        buf[36..40].copy_from_slice(&self.checksum.to_be_bytes());
        buf[40..44].copy_from_slice(&self.journal_header_size.to_be_bytes());
        buf
    }

    /// Recompute and install this header's checksum: clear the checksum
    /// field, sum the header as big-endian 32-bit words, store the sum.
    pub fn recompute_checksum(&mut self) {
        self.checksum = 0;
        self.checksum = word_sum(&self.encode());
    }

    pub fn verify_checksum(&self) -> bool {
        let mut copy = self.clone();
        let stored = copy.checksum;
        copy.checksum = 0;
        word_sum(&copy.encode()) == stored
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

fn word_sum(buf: &[u8]) -> u32 {
    let mut sum = 0u32;
    for chunk in buf.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum = sum.wrapping_add(u32::from_be_bytes(word));
    }
    sum
}

fn be32(buf: &[u8], off: usize) -> u32 {
    u32::from_be_bytes(buf[off..off + 4].try_into().unwrap())
}

fn be64(buf: &[u8], off: usize) -> u64 {
    u64::from_be_bytes(buf[off..off + 8].try_into().unwrap())
}

/// A transaction's Block List Header: `{ bsize:2, numBlocks:2, checksum:4,
/// reserved[32] }` = 40 bytes, followed by `numBlocks - 1` `BlockInfo`
/// entries, each immediately followed by that entry's payload.
#[derive(Debug, Clone)]
pub struct BlockListHeader {
    pub block_size: u16,
    pub num_blocks: u16,
    pub checksum: u32,
}

pub const BLOCK_LIST_HEADER_SIZE: usize = 2 + 2 + 4 + 32;

/// `{ bnum:8, bsize:4, next:8 }` = 20 bytes.
#[derive(Debug, Clone, Copy)]
pub struct BlockInfo {
    pub bnum: u64,
    pub bsize: u32,
    pub next: u64,
}

pub const BLOCK_INFO_SIZE: usize = 8 + 4 + 8;

impl BlockListHeader {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < BLOCK_LIST_HEADER_SIZE {
            return Err(HfsError::JournalCorrupt("block list header too short".into()));
        }
        Ok(BlockListHeader {
            block_size: u16::from_be_bytes(buf[0..2].try_into().unwrap()),
            num_blocks: u16::from_be_bytes(buf[2..4].try_into().unwrap()),
            checksum: be32(buf, 4),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; BLOCK_LIST_HEADER_SIZE];
        buf[0..2].copy_from_slice(&self.block_size.to_be_bytes());
        buf[2..4].copy_from_slice(&self.num_blocks.to_be_bytes());
        buf[4..8].copy_from_slice(&self.checksum.to_be_bytes());
        buf
    }

    /// Recompute this header's checksum over its own 40 bytes with the
    /// checksum field cleared.
    pub fn recompute_checksum(&mut self) {
        self.checksum = 0;
        self.checksum = word_sum(&self.encode());
    }

    fn verify_checksum(&self) -> bool {
        let mut copy = self.clone();
        let stored = copy.checksum;
        copy.checksum = 0;
        word_sum(&copy.encode()) == stored
    }
}

impl BlockInfo {
    pub fn decode(buf: &[u8]) -> Self {
        BlockInfo { bnum: be64(buf, 0), bsize: be32(buf, 8), next: be64(buf, 12) }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; BLOCK_INFO_SIZE];
        buf[0..8].copy_from_slice(&self.bnum.to_be_bytes());
        buf[8..12].copy_from_slice(&self.bsize.to_be_bytes());
        buf[12..20].copy_from_slice(&self.next.to_be_bytes());
        buf
    }
}

/// Upper bound on transactions walked per replay, guarding against a
/// corrupt `next` chain that never reaches `end`.
const MAX_TRANSACTIONS: u32 = 1_000_000;

/// Replay every committed transaction in the journal onto the volume,
/// writing each block-list's payload blocks to their recorded disk
/// offsets. The caller decides whether payload writes actually happen
/// (`write_back`); a dry run walks the same structures purely to surface
/// `JournalCorrupt` without mutating the volume.
///
/// `block_size` is the volume's allocation block size: a `BlockInfo.bnum`
/// is a block number, not a byte offset, on that grid.
pub fn replay<D: Read + Write + Seek>(
    device: &mut D,
    info: &JournalInfoBlock,
    header: &mut JournalHeader,
    block_size: u32,
    write_back: bool,
) -> Result<u32> {
    if header.is_empty() {
        return Ok(0);
    }

    let mut replayed = 0u32;
    let mut pos = header.start;
    let mut steps = 0u32;
    while pos != header.end {
        steps += 1;
        if steps > MAX_TRANSACTIONS {
            return Err(HfsError::JournalCorrupt("journal replay cursor never reached end".into()));
        }

        device.seek(SeekFrom::Start(info.offset + pos))?;
        let mut block_header_buf = vec![0u8; BLOCK_LIST_HEADER_SIZE];
        device.read_exact(&mut block_header_buf)?;
        let block_list = BlockListHeader::decode(&block_header_buf)?;
        if !block_list.verify_checksum() {
            return Err(HfsError::JournalCorrupt("block list header checksum mismatch".into()));
        }
        if block_list.num_blocks == 0 {
            break;
        }

        let mut entry_off = pos + BLOCK_LIST_HEADER_SIZE as u64;
        let mut next_pos = pos;
        for _ in 1..block_list.num_blocks {
            device.seek(SeekFrom::Start(info.offset + entry_off))?;
            let mut entry_buf = vec![0u8; BLOCK_INFO_SIZE];
            device.read_exact(&mut entry_buf)?;
            let entry = BlockInfo::decode(&entry_buf);
            entry_off += BLOCK_INFO_SIZE as u64;

            let mut payload = vec![0u8; entry.bsize as usize];
            device.seek(SeekFrom::Start(info.offset + entry_off))?;
            device.read_exact(&mut payload)?;
            entry_off += entry.bsize as u64;

            if write_back {
                device.seek(SeekFrom::Start(entry.bnum * block_size as u64))?;
                device.write_all(&payload)?;
            }
            next_pos = entry.next;
        }

        if next_pos == pos {
            // A transaction with no entries (or one that doesn't advance
            // the cursor) can't be distinguished from a cycle; stop here
            // rather than spin.
            break;
        }
        pos = next_pos;
        replayed += 1;
    }

    if write_back {
        header.start = header.end;
    }
    Ok(replayed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn fresh_header(start: u64, end: u64, size: u64) -> JournalHeader {
        let mut h = JournalHeader {
            magic: JOURNAL_HEADER_MAGIC,
            endian: JOURNAL_HEADER_ENDIAN,
            start,
            end,
            size,
            block_list_header_size: BLOCK_LIST_HEADER_SIZE as u32,
            checksum: 0,
            journal_header_size: JOURNAL_HEADER_SIZE as u32,
        };
        h.recompute_checksum();
        h
    }

    #[test]
    fn header_checksum_roundtrip() {
        let h = fresh_header(100, 100, 4096 * 16);
        assert!(h.verify_checksum());
    }

    #[test]
    fn corrupted_header_fails_checksum() {
        let mut h = fresh_header(0, 0, 4096);
        h.start = 50;
        assert!(!h.verify_checksum());
    }

    #[test]
    fn empty_journal_replays_nothing() {
        let mut h = fresh_header(0, 0, 4096);
        let info = JournalInfoBlock { flags: 0, device_signature: [0; 8], offset: 0, size: 4096 };
        let mut dev = Cursor::new(vec![0u8; 8192]);
        assert_eq!(replay(&mut dev, &info, &mut h, 512, true).unwrap(), 0);
    }

    /// Builds and replays a single-transaction journal per the spec's
    /// worked example: one block info entry whose `next` equals `end`,
    /// carrying a 4096-byte payload destined for block `bnum`.
    #[test]
    fn single_transaction_replay_writes_payload_and_commits() {
        let block_size = 4096u32;
        let bnum = 10u64;
        let payload: Vec<u8> = (0..4096).map(|i| (i % 251) as u8).collect();

        let journal_offset = 8192u64;
        let entry_off = BLOCK_LIST_HEADER_SIZE as u64 + BLOCK_INFO_SIZE as u64;
        let end = entry_off + payload.len() as u64;

        let mut block_list = BlockListHeader { block_size: block_size as u16, num_blocks: 2, checksum: 0 };
        block_list.recompute_checksum();

        let entry = BlockInfo { bnum, bsize: payload.len() as u32, next: end };

        let device_len = journal_offset + end + 4096;
        let mut dev = Cursor::new(vec![0u8; device_len as usize]);
        let body_start = (journal_offset + 0) as usize;
        let buf = dev.get_mut();
        buf[body_start..body_start + BLOCK_LIST_HEADER_SIZE].copy_from_slice(&block_list.encode());
        let info_off = body_start + BLOCK_LIST_HEADER_SIZE;
        buf[info_off..info_off + BLOCK_INFO_SIZE].copy_from_slice(&entry.encode());
        let payload_off = info_off + BLOCK_INFO_SIZE;
        buf[payload_off..payload_off + payload.len()].copy_from_slice(&payload);

        let info = JournalInfoBlock { flags: 0, device_signature: [0; 8], offset: journal_offset, size: end * 4 };
        let mut header = fresh_header(0, end, info.size);

        let replayed = replay(&mut dev, &info, &mut header, block_size, true).unwrap();
        assert_eq!(replayed, 1);
        assert_eq!(header.start, header.end);

        let written = &dev.get_ref()[(bnum * block_size as u64) as usize..][..payload.len()];
        assert_eq!(written, &payload[..]);

        // Re-running on the now-committed journal is a no-op.
        let replayed_again = replay(&mut dev, &info, &mut header, block_size, true).unwrap();
        assert_eq!(replayed_again, 0);
    }

    #[test]
    fn dry_run_does_not_write_payload() {
        let block_size = 4096u32;
        let bnum = 3u64;
        let payload = vec![0xAAu8; 4096];
        let entry_off = BLOCK_LIST_HEADER_SIZE as u64 + BLOCK_INFO_SIZE as u64;
        let end = entry_off + payload.len() as u64;

        let mut block_list = BlockListHeader { block_size: block_size as u16, num_blocks: 2, checksum: 0 };
        block_list.recompute_checksum();
        let entry = BlockInfo { bnum, bsize: payload.len() as u32, next: end };

        let device_len = end + 4096 * 8;
        let mut dev = Cursor::new(vec![0u8; device_len as usize]);
        let buf = dev.get_mut();
        buf[0..BLOCK_LIST_HEADER_SIZE].copy_from_slice(&block_list.encode());
        buf[BLOCK_LIST_HEADER_SIZE..BLOCK_LIST_HEADER_SIZE + BLOCK_INFO_SIZE].copy_from_slice(&entry.encode());
        buf[BLOCK_LIST_HEADER_SIZE + BLOCK_INFO_SIZE..BLOCK_LIST_HEADER_SIZE + BLOCK_INFO_SIZE + payload.len()]
            .copy_from_slice(&payload);

        let info = JournalInfoBlock { flags: 0, device_signature: [0; 8], offset: 0, size: end * 4 };
        let mut header = fresh_header(0, end, info.size);

        let replayed = replay(&mut dev, &info, &mut header, block_size, false).unwrap();
        assert_eq!(replayed, 1);
        // start is left alone on a dry run: nothing was actually committed.
        assert_eq!(header.start, 0);
        let region = &dev.get_ref()[(bnum * block_size as u64) as usize..][..4096];
        assert!(region.iter().all(|&b| b == 0));
    }

    #[test]
    fn corrupt_block_list_checksum_is_rejected() {
        let mut header = fresh_header(0, 4096, 4096 * 8);
        let info = JournalInfoBlock { flags: 0, device_signature: [0; 8], offset: 0, size: 4096 * 8 };
        let mut dev = Cursor::new(vec![0u8; 16384]);
        // Leave the block-list header as all zeros: checksum field 0 but
        // block_size/num_blocks are also 0, so word_sum over zeroed bytes
        // is 0 and would *pass*; corrupt one byte to force a mismatch.
        dev.get_mut()[3] = 0xFF;
        let err = replay(&mut dev, &info, &mut header, 512, true).unwrap_err();
        assert!(matches!(err, HfsError::JournalCorrupt(_)));
    }
}
