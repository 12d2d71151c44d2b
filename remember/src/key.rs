use xxhash_rust::xxh3::xxh3_128;

/// Keys longer than this many bytes are shortened
pub const MAX_KEY_LEN: usize = 32;

/// Hex digits in a key digest (128 bits)
pub const DIGEST_LEN: usize = 32;

const FILLER: char = '_';

/// Turn a caller-supplied key into a backend-safe one.
///
/// Whitespace becomes `_`. Keys over [`MAX_KEY_LEN`] bytes keep their first
/// 32 bytes (cut back to a char boundary) and replace the rest with
/// `_<xxh3-128 hex>` of the rest, so long keys sharing a prefix stay distinct.
/// Normalizing an already normalized key returns it unchanged.
pub fn normalize(raw: &str) -> String {
    let key: String = raw
        .chars()
        .map(|c| if c.is_whitespace() { FILLER } else { c })
        .collect();

    if key.len() <= MAX_KEY_LEN || is_digest_form(&key) {
        return key;
    }

    let mut cut = MAX_KEY_LEN;
    while !key.is_char_boundary(cut) {
        cut -= 1;
    }
    let (prefix, suffix) = key.split_at(cut);
    format!("{}{}{}", prefix, FILLER, digest_hex(suffix))
}

/// Lowercase hex xxh3-128 digest of `input`
pub fn digest_hex(input: &str) -> String {
    format!("{:032x}", xxh3_128(input.as_bytes()))
}

// prefix (29..=32 bytes) + '_' + 32 lowercase hex digits
fn is_digest_form(key: &str) -> bool {
    let tail_len = DIGEST_LEN + 1;
    if key.len() <= tail_len || key.len() > MAX_KEY_LEN + tail_len {
        return false;
    }
    let split = key.len() - tail_len;
    if split + 3 < MAX_KEY_LEN || !key.is_char_boundary(split) {
        return false;
    }
    let (_, tail) = key.split_at(split);
    let mut tail = tail.bytes();
    tail.next() == Some(FILLER as u8) && tail.all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_key_unchanged() {
        assert_eq!(normalize("user:42"), "user:42");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_whitespace_replaced() {
        assert_eq!(normalize("select * from users"), "select_*_from_users");
        assert_eq!(normalize("a\tb\nc d"), "a_b_c_d");
    }

    #[test]
    fn test_long_key_hashed() {
        let raw = "x".repeat(40);
        let key = normalize(&raw);
        assert_eq!(key.len(), MAX_KEY_LEN + 1 + DIGEST_LEN);
        assert!(key.starts_with(&"x".repeat(32)));
        assert_eq!(&key[32..33], "_");
        assert_eq!(&key[33..], digest_hex(&"x".repeat(8)));
    }

    #[test]
    fn test_exactly_max_len_is_kept() {
        let raw = "k".repeat(MAX_KEY_LEN);
        assert_eq!(normalize(&raw), raw);
    }

    #[test]
    fn test_shared_prefix_keys_stay_distinct() {
        let prefix = "report:2024:customers:region:eu:";
        assert_eq!(prefix.len(), 32);
        let a = normalize(&format!("{}page=1", prefix));
        let b = normalize(&format!("{}page=2", prefix));
        assert_ne!(a, b);
        assert!(a.starts_with(prefix) && b.starts_with(prefix));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "user:42".to_string(),
            "a key with spaces".to_string(),
            "y".repeat(33),
            "z".repeat(200),
            "long key with plenty of whitespace in it, far beyond the bound".to_string(),
            format!("{}é{}", "a".repeat(31), "b".repeat(20)),
            "日本語のキーはマルチバイトなので境界に注意する必要があります".to_string(),
        ];
        for raw in samples {
            let once = normalize(&raw);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", raw);
            assert!(!once.chars().any(char::is_whitespace));
        }
    }

    #[test]
    fn test_multibyte_cut_on_char_boundary() {
        // 'é' occupies bytes 31..33, so the prefix backs off to 31 bytes
        let raw = format!("{}é{}", "a".repeat(31), "b".repeat(20));
        let key = normalize(&raw);
        assert!(key.starts_with(&"a".repeat(31)));
        assert_eq!(&key[31..32], "_");
        assert_eq!(&key[32..], digest_hex(&format!("é{}", "b".repeat(20))));
    }

    #[test]
    fn test_digest_is_lowercase_hex() {
        let digest = digest_hex("anything");
        assert_eq!(digest.len(), DIGEST_LEN);
        assert!(digest.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }
}
