// Encoding utilities

use encoding_rs::UTF_8;

/// Decode UTF-8 text, replacing invalid sequences
pub fn decode_utf8(data: &[u8]) -> String {
    UTF_8.decode_without_bom_handling(data).0.into_owned()
}
