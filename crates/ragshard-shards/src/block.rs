//! Serialized record blocks

/// Serialize one record: optional header, trimmed text, newline, separator.
pub fn serialize_block(index: usize, text: &str, separator: &str, include_headers: bool) -> String {
    let text = text.trim();
    let mut block = String::with_capacity(text.len() + separator.len() + 16);
    if include_headers {
        block.push_str(&format!("### DOC {:06}\n", index));
    }
    block.push_str(text);
    block.push('\n');
    block.push_str(separator);
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_without_header() {
        assert_eq!(serialize_block(3, "  Doc B \n", "---", false), "Doc B\n---");
    }

    #[test]
    fn test_block_with_header() {
        assert_eq!(
            serialize_block(7, "Alpha", "\n\n---\n\n", true),
            "### DOC 000007\nAlpha\n\n\n---\n\n"
        );
    }

    #[test]
    fn test_empty_payload_still_serialized() {
        assert_eq!(serialize_block(0, "   ", "--", true), "### DOC 000000\n\n--");
    }

    #[test]
    fn test_byte_length_is_utf8() {
        let block = serialize_block(0, "héllo", "", false);
        assert_eq!(block.chars().count(), 6);
        assert_eq!(block.len(), 7);
    }
}
