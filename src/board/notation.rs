//! Chess-like field names for player-facing text
//!
//! A field is named by its column letter followed by its 1-based row:
//! column 0 is `A`, so `(x=1, y=2)` reads `B3`. The letter is the base-36
//! digit of `x + 10`, which keeps the leftmost column at `A`.

use crate::core::types::Position;

/// Base-36 value of the leftmost column letter (`a`)
const COLUMN_OFFSET: u32 = 10;

/// Render a board position as a field name
///
/// Returns `None` for positions no letter can name.
pub fn field_name(pos: Position) -> Option<String> {
    if pos.x < 0 || pos.y < 0 {
        return None;
    }
    let column = char::from_digit(pos.x as u32 + COLUMN_OFFSET, 36)?;
    Some(format!("{}{}", column.to_ascii_uppercase(), pos.y + 1))
}

/// Like [`field_name`] but falls back to raw coordinates
pub fn describe(pos: Position) -> String {
    field_name(pos).unwrap_or_else(|| pos.to_string())
}

/// Parse a field name on a `width` x `height` board
///
/// Case-insensitive; surrounding whitespace and trailing punctuation are ignored.
pub fn parse_field(text: &str, width: u32, height: u32) -> Option<Position> {
    let text = text.trim().trim_end_matches(['.', ',', '!', '?']);
    let mut chars = text.chars();
    let column = chars.next()?;
    if !column.is_ascii_alphabetic() {
        return None;
    }
    let x = column.to_digit(36)?.checked_sub(COLUMN_OFFSET)?;

    let row_text = chars.as_str();
    if row_text.is_empty() || !row_text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let row: u32 = row_text.parse().ok()?;
    if row == 0 || x >= width || row > height {
        return None;
    }
    Some(Position::new(x as i32, row as i32 - 1))
}
