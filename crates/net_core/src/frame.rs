//! Versioned length framing with the opcode in the header.
//!
//! Format (little-endian):
//! - u8 `FRAME_VERSION` (1)
//! - u16 opcode
//! - u32 LEN (bytes of payload)
//! - [u8; LEN] payload
//!
//! Carrying the opcode in the header lets the dispatch table route and
//! size-gate a message without decoding its payload.

const FRAME_VERSION: u8 = 1;
const HEADER_LEN: usize = 7;
const MAX_FRAME_LEN: usize = 65_536; // 64 KiB cap; nothing in the schema comes close

/// Write a framed message into `out`, appending to any existing bytes.
///
/// Panics on a payload over `MAX_FRAME_LEN`; every message in the schema is
/// a few dozen bytes, so an oversize payload is a caller bug, not a runtime
/// condition.
pub fn write_msg(out: &mut Vec<u8>, opcode: u16, payload: &[u8]) {
    assert!(
        payload.len() <= MAX_FRAME_LEN,
        "frame payload {} exceeds {MAX_FRAME_LEN}",
        payload.len()
    );
    out.push(FRAME_VERSION);
    out.extend_from_slice(&opcode.to_le_bytes());
    #[allow(clippy::cast_possible_truncation)]
    let len = payload.len() as u32;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(payload);
}

/// Read a single framed message. Returns `(opcode, payload)` on success; the
/// payload slice borrows from `inp`.
pub fn read_msg(inp: &[u8]) -> anyhow::Result<(u16, &[u8])> {
    use anyhow::bail;
    if inp.len() < HEADER_LEN {
        bail!("short frame header");
    }
    let ver = inp[0];
    if ver != FRAME_VERSION {
        bail!("unsupported frame version: {ver}");
    }
    let mut opb = [0u8; 2];
    opb.copy_from_slice(&inp[1..3]);
    let opcode = u16::from_le_bytes(opb);
    let mut lenb = [0u8; 4];
    lenb.copy_from_slice(&inp[3..7]);
    let len = u32::from_le_bytes(lenb) as usize;
    if len > MAX_FRAME_LEN {
        bail!("frame too large: {len} > {MAX_FRAME_LEN}");
    }
    if inp.len() < HEADER_LEN + len {
        bail!("short frame payload");
    }
    Ok((opcode, &inp[HEADER_LEN..HEADER_LEN + len]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_frame() {
        let payload = b"hello";
        let mut buf = Vec::new();
        write_msg(&mut buf, 0x03, payload);
        let (op, got) = read_msg(&buf).expect("read");
        assert_eq!(op, 0x03);
        assert_eq!(got, payload);
    }

    #[test]
    fn rejects_wrong_version_and_oversize() {
        let mut buf = vec![2u8, 0, 0, 0, 0, 0, 0];
        assert!(read_msg(&buf).is_err());
        buf[0] = FRAME_VERSION;
        buf[3..7].copy_from_slice(&(u32::MAX).to_le_bytes());
        assert!(read_msg(&buf).is_err());
    }

    #[test]
    #[should_panic(expected = "exceeds")]
    fn oversize_payload_is_a_write_side_bug() {
        let mut buf = Vec::new();
        write_msg(&mut buf, 0x01, &vec![0u8; MAX_FRAME_LEN + 1]);
    }

    #[test]
    fn rejects_truncated_payload() {
        let mut buf = Vec::new();
        write_msg(&mut buf, 0x01, &[9u8; 16]);
        buf.truncate(buf.len() - 1);
        assert!(read_msg(&buf).is_err());
    }
}
