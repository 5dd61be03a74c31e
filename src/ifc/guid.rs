use uuid::Uuid;

const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$";

pub const GUID_LENGTH: usize = 22;

/// A fresh IfcGloballyUniqueId.
pub fn new_guid() -> String {
    compress(Uuid::new_v4())
}

/// Packs 128 bits into 22 base-64 characters: the first byte takes two
/// characters, then five 3-byte groups take four each.
pub fn compress(uuid: Uuid) -> String {
    let bytes = uuid.as_bytes();
    let mut out = String::with_capacity(GUID_LENGTH);
    push_digits(&mut out, bytes[0] as u32, 2);
    for chunk in bytes[1..].chunks(3) {
        let n = (chunk[0] as u32) << 16 | (chunk[1] as u32) << 8 | chunk[2] as u32;
        push_digits(&mut out, n, 4);
    }
    out
}

fn push_digits(out: &mut String, value: u32, width: u32) {
    for i in (0..width).rev() {
        let digit = (value / 64u32.pow(i)) % 64;
        out.push(ALPHABET[digit as usize] as char);
    }
}
