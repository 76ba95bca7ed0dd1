//! Wire encode/decode traits and cursor helpers.
//!
//! All integers are little-endian. Decoders consume from a `&mut &[u8]`
//! cursor and fail with an error on short reads; they never panic.

/// Types implementing wire encoding write themselves into a byte buffer.
pub trait WireEncode {
    fn encode(&self, out: &mut Vec<u8>);
}

/// Types implementing wire decoding reconstruct themselves from a byte slice.
pub trait WireDecode: Sized {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self>;
}

/// Take `N` bytes off the front of the cursor.
pub fn take<const N: usize>(inp: &mut &[u8]) -> anyhow::Result<[u8; N]> {
    if inp.len() < N {
        anyhow::bail!("short read: need {N}, have {}", inp.len());
    }
    let (a, b) = inp.split_at(N);
    *inp = b;
    let mut buf = [0u8; N];
    buf.copy_from_slice(a);
    Ok(buf)
}

pub fn read_u8(inp: &mut &[u8]) -> anyhow::Result<u8> {
    Ok(take::<1>(inp)?[0])
}

pub fn read_u16(inp: &mut &[u8]) -> anyhow::Result<u16> {
    Ok(u16::from_le_bytes(take::<2>(inp)?))
}

pub fn read_u32(inp: &mut &[u8]) -> anyhow::Result<u32> {
    Ok(u32::from_le_bytes(take::<4>(inp)?))
}

pub fn read_i32(inp: &mut &[u8]) -> anyhow::Result<i32> {
    Ok(i32::from_le_bytes(take::<4>(inp)?))
}

pub fn read_f32(inp: &mut &[u8]) -> anyhow::Result<f32> {
    Ok(f32::from_le_bytes(take::<4>(inp)?))
}

pub fn read_vec3(inp: &mut &[u8]) -> anyhow::Result<[f32; 3]> {
    Ok([read_f32(inp)?, read_f32(inp)?, read_f32(inp)?])
}

pub fn write_u8(out: &mut Vec<u8>, v: u8) {
    out.push(v);
}

pub fn write_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn write_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn write_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn write_f32(out: &mut Vec<u8>, v: f32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn write_vec3(out: &mut Vec<u8>, v: [f32; 3]) {
    for c in v {
        write_f32(out, c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_reads_fail_without_consuming_past_end() {
        let buf = [1u8, 2, 3];
        let mut cur: &[u8] = &buf;
        assert!(read_u32(&mut cur).is_err());
    }

    #[test]
    fn take_consumes_exactly_n() {
        let buf = [1u8, 2, 3, 4, 5];
        let mut cur: &[u8] = &buf;
        assert_eq!(take::<2>(&mut cur).unwrap(), [1, 2]);
        assert_eq!(cur, &[3, 4, 5]);
    }
}
