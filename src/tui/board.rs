//! Kanban board screen.
//!
//! Tasks of the active project are organised into one column per status.
//! Cards move between neighbouring columns with Ctrl+Left/Right or `<`/`>`.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::fields::Status;
use crate::store::{format_priority, format_status, format_task_type, TaskStore};
use crate::task::{Task, TaskId};
use crate::tui::colors::{status_color, text_on, type_color};
use crate::tui::utils::wrap_words;
use crate::views::{board_columns, shift_card};

const COLUMN_COUNT: usize = Status::ALL.len();

/// Selection and scroll state of the board.
#[derive(Debug, Default)]
pub struct BoardState {
    pub selected_column: usize,
    pub selected_card: usize,
    column_scroll_offsets: [usize; COLUMN_COUNT],
}

/// Card ids per column; done cards are left out when hidden.
pub fn column_ids(store: &TaskStore, show_done: bool) -> Vec<Vec<TaskId>> {
    board_columns(store)
        .into_iter()
        .map(|col| {
            if col.status == Status::Done && !show_done {
                Vec::new()
            } else {
                col.tasks.iter().map(|t| t.id).collect()
            }
        })
        .collect()
}

impl BoardState {
    pub fn selected_status(&self) -> Status {
        Status::ALL[self.selected_column.min(COLUMN_COUNT - 1)]
    }

    pub fn selected_task(&self, store: &TaskStore, show_done: bool) -> Option<TaskId> {
        column_ids(store, show_done)
            .get(self.selected_column)
            .and_then(|col| col.get(self.selected_card))
            .copied()
    }

    /// Keep the selection inside the current column.
    pub fn clamp_selection(&mut self, store: &TaskStore, show_done: bool) {
        if self.selected_column >= COLUMN_COUNT {
            self.selected_column = 0;
        }
        let column_len = column_ids(store, show_done)[self.selected_column].len();
        if column_len == 0 {
            self.selected_card = 0;
            self.column_scroll_offsets[self.selected_column] = 0;
        } else if self.selected_card >= column_len {
            self.selected_card = column_len - 1;
        }
    }

    pub fn select_column(&mut self, forward: bool, store: &TaskStore, show_done: bool) {
        if forward && self.selected_column + 1 < COLUMN_COUNT {
            self.selected_column += 1;
        } else if !forward && self.selected_column > 0 {
            self.selected_column -= 1;
        }
        self.clamp_selection(store, show_done);
    }

    pub fn select_card(&mut self, down: bool, store: &TaskStore, show_done: bool) {
        let column_len = column_ids(store, show_done)[self.selected_column].len();
        if down && self.selected_card + 1 < column_len {
            self.selected_card += 1;
        } else if !down && self.selected_card > 0 {
            self.selected_card -= 1;
        }
    }

    /// Select `id` wherever it now sits on the board.
    pub fn follow(&mut self, id: TaskId, store: &TaskStore, show_done: bool) {
        for (c, col) in column_ids(store, show_done).iter().enumerate() {
            if let Some(pos) = col.iter().position(|&t| t == id) {
                self.selected_column = c;
                self.selected_card = pos;
                return;
            }
        }
        self.clamp_selection(store, show_done);
    }

    /// Move the selected card to the neighbouring column and keep it selected.
    pub fn move_selected(&mut self, forward: bool, store: &mut TaskStore, show_done: bool) -> Option<(TaskId, Status)> {
        let id = self.selected_task(store, show_done)?;
        let status = shift_card(store, id, forward)?;
        self.follow(id, store, show_done);
        Some((id, status))
    }

    /// Render the kanban board
    pub fn render(&mut self, f: &mut Frame, area: Rect, store: &TaskStore, show_done: bool) {
        let constraints: Vec<Constraint> = (0..COLUMN_COUNT)
            .map(|_| Constraint::Ratio(1, COLUMN_COUNT as u32))
            .collect();

        let columns_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        let columns = column_ids(store, show_done);
        for (i, &column_area) in columns_layout.iter().enumerate() {
            self.render_column(f, column_area, i, &columns[i], store, show_done);
        }
    }

    /// Render a single column
    fn render_column(
        &mut self,
        f: &mut Frame,
        area: Rect,
        column_index: usize,
        cards: &[TaskId],
        store: &TaskStore,
        show_done: bool,
    ) {
        let status = Status::ALL[column_index];
        let is_selected = column_index == self.selected_column;
        let color = status_color(status);

        let border_style = if is_selected {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let title = if status == Status::Done && !show_done {
            format!("{} (hidden)", format_status(status))
        } else {
            format!("{} ({})", format_status(status), cards.len())
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style);

        let inner = block.inner(area);
        f.render_widget(block, area);

        if cards.is_empty() {
            return;
        }

        let card_height = 5;
        let available_height = inner.height as usize;
        let visible_cards = available_height / card_height;

        let scroll_offset = if is_selected {
            let start_visible = self.column_scroll_offsets[column_index];
            let end_visible = start_visible + visible_cards;

            if self.selected_card < start_visible {
                self.column_scroll_offsets[column_index] = self.selected_card;
                self.selected_card
            } else if self.selected_card >= end_visible && visible_cards > 0 {
                let new_offset = self.selected_card + 1 - visible_cards;
                self.column_scroll_offsets[column_index] = new_offset;
                new_offset
            } else {
                start_visible
            }
        } else {
            self.column_scroll_offsets[column_index]
        };

        let mut current_y = 0;
        let mut rendered_cards = 0;

        for (card_index, &task_id) in cards.iter().enumerate().skip(scroll_offset) {
            if let Some(task) = store.get(task_id) {
                if current_y + card_height > available_height {
                    break;
                }

                let card_area = Rect {
                    x: inner.x,
                    y: inner.y + current_y as u16,
                    width: inner.width,
                    height: card_height as u16,
                };

                render_card(f, card_area, task, is_selected && card_index == self.selected_card);

                current_y += card_height;
                rendered_cards += 1;
            }
        }

        if scroll_offset > 0 {
            let indicator = Paragraph::new(format!("▲ +{} above", scroll_offset))
                .style(Style::default().fg(Color::Cyan));
            f.render_widget(indicator, Rect { height: 1, ..inner });
        }

        let remaining = cards.len().saturating_sub(scroll_offset + rendered_cards);
        if remaining > 0 && inner.height > 0 {
            let indicator = Paragraph::new(format!("▼ +{} below", remaining))
                .style(Style::default().fg(Color::Cyan));
            f.render_widget(
                indicator,
                Rect {
                    y: inner.y + inner.height - 1,
                    height: 1,
                    ..inner
                },
            );
        }
    }
}

/// Render a single task card
fn render_card(f: &mut Frame, area: Rect, task: &Task, is_selected: bool) {
    let color = type_color(task.task_type);

    let style = if is_selected {
        Style::default().bg(color).fg(text_on(color)).add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(Color::DarkGray)
    };

    let mut card_text = vec![Line::from(format!("#{} {}", task.id, format_task_type(task.task_type)))];

    let available_width = area.width.saturating_sub(2) as usize;
    for line in wrap_words(&task.title, available_width, 2) {
        card_text.push(Line::from(line));
    }

    let owner = task
        .assignee
        .as_ref()
        .map(|u| format!("({}) {}", u.initial(), u.name))
        .unwrap_or_else(|| "Unassigned".to_string());
    card_text.push(Line::from(format!("{} | {}", format_priority(task.priority), owner)));

    let card_block = Paragraph::new(card_text)
        .block(Block::default().borders(Borders::ALL))
        .style(style)
        .wrap(Wrap { trim: true });

    f.render_widget(card_block, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::demo_store;

    #[test]
    fn test_navigation_and_move() {
        let mut store = demo_store();
        let mut board = BoardState::default();
        board.clamp_selection(&store, true);

        // Backlog holds 3 and 10
        assert_eq!(board.selected_task(&store, true), Some(3));
        board.select_card(true, &store, true);
        assert_eq!(board.selected_task(&store, true), Some(10));
        board.select_card(true, &store, true);
        assert_eq!(board.selected_task(&store, true), Some(10));

        board.select_column(true, &store, true);
        assert_eq!(board.selected_status(), Status::Todo);
        assert_eq!(board.selected_card, 1);
        assert_eq!(board.selected_task(&store, true), Some(8));

        let moved = board.move_selected(true, &mut store, true);
        assert_eq!(moved, Some((8, Status::InProgress)));
        assert_eq!(board.selected_status(), Status::InProgress);
        assert_eq!(board.selected_task(&store, true), Some(8));
    }

    #[test]
    fn test_move_stops_at_edges() {
        let mut store = demo_store();
        let mut board = BoardState::default();
        assert_eq!(board.move_selected(false, &mut store, true), None);
        assert_eq!(store.get(3).unwrap().status, Status::Backlog);
    }

    #[test]
    fn test_hidden_done_column_is_empty() {
        let mut store = demo_store();
        store.set_current_project(Some("2"));
        let cols = column_ids(&store, false);
        assert!(cols[Status::Done.column_index()].is_empty());
        let cols = column_ids(&store, true);
        assert_eq!(cols[Status::Done.column_index()], vec![5]);
    }
}
