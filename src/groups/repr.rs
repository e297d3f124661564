//! Canonical `TypeName(b0, b1, ...)` text form.

use super::GroupBitSetError;

pub(crate) fn format_bit_tuple(type_name: &str, bits: impl Iterator<Item = u32>) -> String {
    let joined = bits.map(|bit| bit.to_string()).collect::<Vec<_>>().join(", ");
    format!("{type_name}({joined})")
}

/// Parse `TypeName(...)` into its bit indices (not range-checked).
///
/// Accepts `()`, a single bare element `(5)`, and a tuple-style trailing
/// comma `(5,)`. Anything else is a format error.
pub(crate) fn parse_bit_tuple(
    text: &str,
    type_name: &str,
) -> Result<Vec<u32>, GroupBitSetError> {
    let format_error = || GroupBitSetError::Format {
        type_name: type_name.to_string(),
        text: text.to_string(),
    };

    let inner = text
        .strip_prefix(type_name)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(format_error)?;

    if !inner
        .chars()
        .all(|c| c.is_ascii_digit() || c == ',' || c == ' ')
    {
        return Err(format_error());
    }
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut items: Vec<&str> = inner.split(',').map(str::trim).collect();
    if items.len() > 1 && items.last() == Some(&"") {
        items.pop();
    }

    items
        .into_iter()
        .map(|item| {
            if item.is_empty() {
                return Err(format_error());
            }
            item.parse::<u32>().map_err(|_| format_error())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "GroupBitSet128";

    #[test]
    fn test_parse_forms() {
        assert_eq!(parse_bit_tuple("GroupBitSet128()", NAME).unwrap(), Vec::<u32>::new());
        assert_eq!(parse_bit_tuple("GroupBitSet128(5)", NAME).unwrap(), vec![5]);
        assert_eq!(parse_bit_tuple("GroupBitSet128(5,)", NAME).unwrap(), vec![5]);
        assert_eq!(
            parse_bit_tuple("GroupBitSet128(1, 2, 3)", NAME).unwrap(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "GroupBitSet128",
            "GroupBitSet128(",
            "GroupBitSet256(1)",
            " GroupBitSet128(1)",
            "GroupBitSet128(1)x",
            "GroupBitSet128(,)",
            "GroupBitSet128(1,,2)",
            "GroupBitSet128(1 2)",
            "GroupBitSet128(-1)",
            "GroupBitSet128(a)",
            "GroupBitSet128(99999999999)",
            "GroupBitSet128[1]",
        ] {
            assert!(
                matches!(parse_bit_tuple(bad, NAME), Err(GroupBitSetError::Format { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_format() {
        assert_eq!(format_bit_tuple(NAME, [4, 9].into_iter()), "GroupBitSet128(4, 9)");
        assert_eq!(format_bit_tuple(NAME, [4].into_iter()), "GroupBitSet128(4)");
    }
}
