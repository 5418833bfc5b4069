//! CJK numerals used as level-2 heading enumerators.

/// Glyph at index `i` denotes the value `i + 1`.
pub const NUMERALS: [char; 9] = ['一', '二', '三', '四', '五', '六', '七', '八', '九'];

/// Enumeration mark that follows a numeral enumerator, as in `三、Overview`.
pub const ENUMERATION_MARK: char = '、';

/// Glyph for `value`, or `None` outside `1..=9`.
pub fn encode(value: u32) -> Option<char> {
    let index = usize::try_from(value).ok()?.checked_sub(1)?;
    NUMERALS.get(index).copied()
}

/// Value denoted by `glyph`, or `None` if it is not a known numeral.
pub fn decode(glyph: char) -> Option<u32> {
    NUMERALS
        .iter()
        .position(|candidate| *candidate == glyph)
        .and_then(|index| u32::try_from(index + 1).ok())
}
