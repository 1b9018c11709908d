//! Hierarchy table screen: epics of the active project with their stories,
//! tasks and subtasks as collapsible rows.

use std::collections::HashSet;

use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::store::{format_due_short, format_priority, format_status, format_task_type, TaskStore};
use crate::task::TaskId;
use crate::tui::colors::{priority_color, text_on, type_color};
use crate::views::{flatten_hierarchy, HierarchyRow};

#[derive(Debug, Default)]
pub struct HierarchyState {
    pub expanded: HashSet<TaskId>,
    pub table_state: TableState,
}

impl HierarchyState {
    pub fn rows(&self, store: &TaskStore) -> Vec<HierarchyRow> {
        flatten_hierarchy(store, &self.expanded)
    }

    pub fn selected_row(&self, store: &TaskStore) -> Option<HierarchyRow> {
        let rows = self.rows(store);
        self.table_state.selected().and_then(|i| rows.get(i).cloned())
    }

    pub fn selected_task(&self, store: &TaskStore) -> Option<TaskId> {
        self.selected_row(store).map(|r| r.id)
    }

    fn select_id(&mut self, store: &TaskStore, id: TaskId) {
        if let Some(i) = self.rows(store).iter().position(|r| r.id == id) {
            self.table_state.select(Some(i));
        }
    }

    pub fn clamp_selection(&mut self, store: &TaskStore) {
        let len = self.rows(store).len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn select_next(&mut self, down: bool, store: &TaskStore) {
        let len = self.rows(store).len();
        if len == 0 {
            return;
        }
        let i = self.table_state.selected().unwrap_or(0);
        let next = if down { (i + 1).min(len - 1) } else { i.saturating_sub(1) };
        self.table_state.select(Some(next));
    }

    /// Expand the selected row. Returns false when it has no children.
    pub fn expand_selected(&mut self, store: &TaskStore) -> bool {
        match self.selected_row(store) {
            Some(row) if row.has_children => {
                self.expanded.insert(row.id);
                true
            }
            _ => false,
        }
    }

    /// Collapse the selected row, or jump to its parent row when already collapsed.
    pub fn collapse_selected(&mut self, store: &TaskStore) {
        let Some(row) = self.selected_row(store) else {
            return;
        };
        if row.expanded {
            self.expanded.remove(&row.id);
        } else if let Some(parent) = store.get(row.id).and_then(|t| t.parent_id) {
            self.select_id(store, parent);
        }
    }

    /// Make `id` visible by expanding its ancestors, then select it.
    pub fn reveal(&mut self, store: &TaskStore, id: TaskId) {
        self.expanded.extend(store.collect_ancestors(id));
        self.select_id(store, id);
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, store: &TaskStore, today: NaiveDate) {
        let rows_model = self.rows(store);

        let header_cells = ["Title", "Status", "Priority", "Points", "Assignee", "Due"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells).height(1);

        let rows: Vec<Row> = rows_model
            .iter()
            .filter_map(|r| store.get(r.id).map(|t| (r, t)))
            .map(|(r, task)| {
                let marker = match (r.has_children, r.expanded) {
                    (false, _) => "  ",
                    (true, false) => "▸ ",
                    (true, true) => "▾ ",
                };
                let badge_color = type_color(task.task_type);
                let title = Line::from(vec![
                    Span::raw("  ".repeat(r.depth)),
                    Span::raw(marker),
                    Span::styled(
                        format!(" {} ", format_task_type(task.task_type)),
                        Style::default().bg(badge_color).fg(text_on(badge_color)),
                    ),
                    Span::raw(" "),
                    Span::raw(task.title.clone()),
                ]);
                let due_style = match task.due_date {
                    Some(d) if d < today => Style::default().fg(Color::Red),
                    _ => Style::default(),
                };
                Row::new(vec![
                    Cell::from(title),
                    Cell::from(format_status(task.status)),
                    Cell::from(format_priority(task.priority))
                        .style(Style::default().fg(priority_color(task.priority))),
                    Cell::from(task.story_points.map(|p| p.to_string()).unwrap_or_else(|| "-".into())),
                    Cell::from(
                        task.assignee
                            .as_ref()
                            .map(|u| u.name.clone())
                            .unwrap_or_else(|| "Unassigned".into()),
                    ),
                    Cell::from(task.due_date.map(format_due_short).unwrap_or_else(|| "-".into()))
                        .style(due_style),
                ])
            })
            .collect();

        let widths = [
            Constraint::Min(30),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(14),
            Constraint::Length(8),
        ];

        let title = if rows.is_empty() {
            "Hierarchy - no epics in this project, press 'a' to create one".to_string()
        } else {
            "Hierarchy - →/Space expand, ← collapse, a new epic, + add child".to_string()
        };

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::demo_store;

    #[test]
    fn test_expand_and_collapse() {
        let store = demo_store();
        let mut h = HierarchyState::default();
        h.clamp_selection(&store);
        assert_eq!(h.selected_task(&store), Some(7));

        assert!(h.expand_selected(&store));
        h.select_next(true, &store);
        assert_eq!(h.selected_task(&store), Some(8));

        // 8 is collapsed, so collapsing jumps to its parent
        h.collapse_selected(&store);
        assert_eq!(h.selected_task(&store), Some(7));
        h.collapse_selected(&store);
        assert_eq!(h.rows(&store).len(), 1);
    }

    #[test]
    fn test_reveal_expands_ancestors() {
        let store = demo_store();
        let mut h = HierarchyState::default();
        h.reveal(&store, 10);
        assert_eq!(h.selected_task(&store), Some(10));
        assert_eq!(h.rows(&store).len(), 4);
    }

    #[test]
    fn test_leaf_does_not_expand() {
        let store = demo_store();
        let mut h = HierarchyState::default();
        h.reveal(&store, 10);
        assert!(!h.expand_selected(&store));
    }
}
