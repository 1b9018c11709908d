//! Layout helpers shared by the screens.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// A rectangle of `percent_x` by `percent_y` centred in `r`.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Cursor position for `column` inside a bordered single-line box, kept on
/// the last inner cell when the text is wider than the box.
pub fn cursor_in_box(area: Rect, column: usize) -> (u16, u16) {
    let offset = column.saturating_add(1).min(area.width.saturating_sub(2) as usize) as u16;
    (area.x + offset, area.y + 1)
}

/// Word-wrap `text` into at most `max_lines` lines of `width` characters.
pub fn wrap_words(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
            if lines.len() >= max_lines {
                return lines;
            }
        }
    }
    if !current.is_empty() && lines.len() < max_lines {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_words_caps_lines() {
        let lines = wrap_words("Implement authentication flow for mobile", 14, 2);
        assert_eq!(lines, vec!["Implement", "authentication"]);
        assert_eq!(wrap_words("Fix login", 20, 2), vec!["Fix login"]);
    }

    #[test]
    fn test_cursor_stays_inside_box() {
        let area = Rect::new(10, 4, 12, 3);
        assert_eq!(cursor_in_box(area, 0), (11, 5));
        assert_eq!(cursor_in_box(area, 5), (16, 5));
        assert_eq!(cursor_in_box(area, 40), (20, 5));
        assert_eq!(cursor_in_box(Rect::new(0, 0, 1, 3), 3), (0, 1));
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(50, 40, outer);
        assert_eq!(inner.width, 50);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 25);
    }
}
