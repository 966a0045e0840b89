//! Minimal text editing over a `String` owned by a view-model.
//!
//! The cursor is a byte offset that always sits on a grapheme boundary.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Applies an editing key. Returns true if the key was consumed.
pub fn handle_key(text: &mut String, cursor: &mut usize, key: KeyEvent, multiline: bool) -> bool {
    *cursor = clamp(text, *cursor);
    let plain = !key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

    match key.code {
        KeyCode::Char(c) if plain => {
            text.insert(*cursor, c);
            *cursor += c.len_utf8();
        }
        KeyCode::Enter if multiline => {
            text.insert(*cursor, '\n');
            *cursor += 1;
        }
        KeyCode::Backspace => {
            let start = prev_boundary(text, *cursor);
            text.replace_range(start..*cursor, "");
            *cursor = start;
        }
        KeyCode::Delete => {
            let end = next_boundary(text, *cursor);
            text.replace_range(*cursor..end, "");
        }
        KeyCode::Left => *cursor = prev_boundary(text, *cursor),
        KeyCode::Right => *cursor = next_boundary(text, *cursor),
        KeyCode::Home => *cursor = line_start(text, *cursor),
        KeyCode::End => *cursor = line_end(text, *cursor),
        KeyCode::Up if multiline => *cursor = vertical(text, *cursor, -1),
        KeyCode::Down if multiline => *cursor = vertical(text, *cursor, 1),
        _ => return false,
    }
    true
}

/// Inserts pasted text. Single-line fields flatten newlines to spaces.
pub fn insert_str(text: &mut String, cursor: &mut usize, pasted: &str, multiline: bool) {
    *cursor = clamp(text, *cursor);
    let normalized = pasted.replace("\r\n", "\n").replace('\r', "\n");
    let insert = if multiline {
        normalized
    } else {
        normalized.replace('\n', " ")
    };
    text.insert_str(*cursor, &insert);
    *cursor += insert.len();
}

/// Row and display column of the cursor, counting explicit newlines only.
pub fn cursor_row_col(text: &str, cursor: usize) -> (usize, usize) {
    let cursor = clamp(text, cursor);
    let before = &text[..cursor];
    let row = before.matches('\n').count();
    let line = before.rsplit('\n').next().unwrap_or_default();
    (row, line.width())
}

/// One bullet per grapheme, for password fields.
pub fn masked(text: &str) -> String {
    "•".repeat(text.graphemes(true).count())
}

fn clamp(text: &str, cursor: usize) -> usize {
    if cursor >= text.len() {
        return text.len();
    }
    let mut cursor = cursor;
    while !text.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}

fn prev_boundary(text: &str, cursor: usize) -> usize {
    text[..cursor]
        .grapheme_indices(true)
        .next_back()
        .map_or(0, |(idx, _)| idx)
}

fn next_boundary(text: &str, cursor: usize) -> usize {
    text[cursor..]
        .graphemes(true)
        .next()
        .map_or(cursor, |g| cursor + g.len())
}

fn line_start(text: &str, cursor: usize) -> usize {
    text[..cursor].rfind('\n').map_or(0, |idx| idx + 1)
}

fn line_end(text: &str, cursor: usize) -> usize {
    text[cursor..].find('\n').map_or(text.len(), |idx| cursor + idx)
}

/// Moves one line up or down, keeping the grapheme column where possible.
fn vertical(text: &str, cursor: usize, direction: i8) -> usize {
    let start = line_start(text, cursor);
    let column = text[start..cursor].graphemes(true).count();

    let target_start = if direction < 0 {
        if start == 0 {
            return cursor;
        }
        line_start(text, start - 1)
    } else {
        let end = line_end(text, cursor);
        if end == text.len() {
            return cursor;
        }
        end + 1
    };

    let target_end = line_end(text, target_start);
    text[target_start..target_end]
        .grapheme_indices(true)
        .nth(column)
        .map_or(target_end, |(idx, _)| target_start + idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_cursor_inside_a_character_is_pulled_back() {
        let text = "aé";
        assert_eq!(clamp(text, 2), 1);
        assert_eq!(cursor_row_col(text, 2), (0, 1));

        let mut text = text.to_string();
        let mut cursor = 2;
        assert!(handle_key(&mut text, &mut cursor, key(KeyCode::Char('x')), false));
        assert_eq!(text, "axé");
        assert_eq!(cursor, 2);
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut text = String::new();
        let mut cursor = 0;
        for c in "héllo".chars() {
            handle_key(&mut text, &mut cursor, key(KeyCode::Char(c)), false);
        }
        assert_eq!(text, "héllo");

        handle_key(&mut text, &mut cursor, key(KeyCode::Left), false);
        handle_key(&mut text, &mut cursor, key(KeyCode::Backspace), false);
        assert_eq!(text, "hélo");
        assert_eq!(cursor, "hél".len());
    }

    #[test]
    fn test_enter_only_breaks_lines_in_multiline() {
        let mut text = "ab".to_string();
        let mut cursor = 1;
        assert!(!handle_key(&mut text, &mut cursor, key(KeyCode::Enter), false));
        assert!(handle_key(&mut text, &mut cursor, key(KeyCode::Enter), true));
        assert_eq!(text, "a\nb");
        assert_eq!(cursor_row_col(&text, cursor), (1, 0));
    }

    #[test]
    fn test_vertical_movement_keeps_column() {
        let text = "abcd\nxy\n12345".to_string();
        let mut cursor = 3;
        let mut owned = text.clone();
        handle_key(&mut owned, &mut cursor, key(KeyCode::Down), true);
        assert_eq!(cursor, "abcd\nxy".len());
        handle_key(&mut owned, &mut cursor, key(KeyCode::Down), true);
        assert_eq!(cursor, "abcd\nxy\n12".len());
        handle_key(&mut owned, &mut cursor, key(KeyCode::Up), true);
        handle_key(&mut owned, &mut cursor, key(KeyCode::Up), true);
        assert_eq!(cursor, 2);
        assert_eq!(owned, text);
    }

    #[test]
    fn test_paste_flattens_single_line() {
        let mut text = String::new();
        let mut cursor = 0;
        insert_str(&mut text, &mut cursor, "a\r\nb", false);
        assert_eq!(text, "a b");
        assert_eq!(cursor, 3);
    }

    #[test]
    fn test_control_chords_are_not_typed() {
        let mut text = String::new();
        let mut cursor = 0;
        let chord = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(!handle_key(&mut text, &mut cursor, chord, true));
        assert!(text.is_empty());
    }

    #[test]
    fn test_masked_counts_graphemes() {
        assert_eq!(masked("pässwörd"), "••••••••");
    }
}
