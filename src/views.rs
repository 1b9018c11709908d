//! View models derived from the store.
//!
//! Each screen of the TUI and each printing command of the CLI reads one of
//! these. They borrow from the store and hold no state of their own.

use std::collections::HashSet;

use chrono::{Days, NaiveDate};

use crate::fields::{Status, TaskType};
use crate::store::TaskStore;
use crate::task::{Task, TaskId};

/// Counts and highlighted lists for the dashboard.
#[derive(Debug)]
pub struct DashboardSummary<'a> {
    pub title: String,
    pub todo: Vec<&'a Task>,
    pub in_progress: Vec<&'a Task>,
    pub review: usize,
    pub done: usize,
}

impl DashboardSummary<'_> {
    /// Tasks on the board proper; the backlog is not counted.
    pub fn total(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.review + self.done
    }
}

pub fn dashboard(store: &TaskStore) -> DashboardSummary<'_> {
    DashboardSummary {
        title: store
            .current_project()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "All Tasks".to_string()),
        todo: store.get_tasks_by_status(Status::Todo),
        in_progress: store.get_tasks_by_status(Status::InProgress),
        review: store.get_tasks_by_status(Status::Review).len(),
        done: store.get_tasks_by_status(Status::Done).len(),
    }
}

#[derive(Debug)]
pub struct KanbanColumn<'a> {
    pub status: Status,
    pub tasks: Vec<&'a Task>,
}

/// One column per status in board order.
pub fn board_columns(store: &TaskStore) -> Vec<KanbanColumn<'_>> {
    Status::ALL
        .iter()
        .map(|&status| KanbanColumn {
            status,
            tasks: store.get_tasks_by_status(status),
        })
        .collect()
}

/// Move a card to `target`. Dropping onto the card's own column does nothing.
pub fn move_card(store: &mut TaskStore, id: TaskId, target: Status) -> bool {
    match store.get(id) {
        Some(t) if t.status != target => store.update_task_status(id, target),
        _ => false,
    }
}

/// Move a card one column left or right. Returns the new status when it moved.
pub fn shift_card(store: &mut TaskStore, id: TaskId, forward: bool) -> Option<Status> {
    let target = store.get(id)?.status.neighbour(forward)?;
    move_card(store, id, target).then_some(target)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueBucket {
    Overdue,
    Today,
    Tomorrow,
    ThisWeek,
    Later,
}

impl DueBucket {
    pub const ALL: [DueBucket; 5] = [
        DueBucket::Overdue,
        DueBucket::Today,
        DueBucket::Tomorrow,
        DueBucket::ThisWeek,
        DueBucket::Later,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DueBucket::Overdue => "Overdue",
            DueBucket::Today => "Today",
            DueBucket::Tomorrow => "Tomorrow",
            DueBucket::ThisWeek => "This Week",
            DueBucket::Later => "Later",
        }
    }

    /// Text shown when the bucket is empty. Overdue is hidden instead.
    pub fn empty_text(self) -> Option<&'static str> {
        match self {
            DueBucket::Overdue => None,
            DueBucket::Today => Some("No tasks for today"),
            DueBucket::Tomorrow => Some("No tasks for tomorrow"),
            DueBucket::ThisWeek => Some("No tasks for this week"),
            DueBucket::Later => Some("No upcoming tasks"),
        }
    }

    /// Whether `task` falls into this bucket. A done task with a past due
    /// date is in no bucket.
    fn contains(self, task: &Task, bounds: &BucketBounds) -> bool {
        let BucketBounds { today, tomorrow, next_week } = *bounds;
        match (self, task.due_date) {
            (DueBucket::Overdue, Some(d)) => d < today && task.status != Status::Done,
            (DueBucket::Today, Some(d)) => d == today,
            (DueBucket::Tomorrow, Some(d)) => Some(d) == tomorrow,
            (DueBucket::ThisWeek, None) => true,
            (DueBucket::ThisWeek, Some(d)) => {
                tomorrow.is_some_and(|t| d > t) && next_week.map_or(true, |w| d < w)
            }
            (DueBucket::Later, Some(d)) => next_week.is_some_and(|w| d >= w),
            _ => false,
        }
    }
}

/// Bucket boundaries for one reference date. A boundary past the last
/// representable date is None and its bucket stays empty.
#[derive(Debug, Clone, Copy)]
struct BucketBounds {
    today: NaiveDate,
    tomorrow: Option<NaiveDate>,
    next_week: Option<NaiveDate>,
}

impl BucketBounds {
    fn new(today: NaiveDate) -> Self {
        BucketBounds {
            today,
            tomorrow: today.checked_add_days(Days::new(1)),
            next_week: today.checked_add_days(Days::new(7)),
        }
    }
}

#[derive(Debug)]
pub struct MyTasks<'a> {
    pub buckets: Vec<(DueBucket, Vec<&'a Task>)>,
}

impl<'a> MyTasks<'a> {
    pub fn bucket(&self, which: DueBucket) -> &[&'a Task] {
        self.buckets
            .iter()
            .find(|(b, _)| *b == which)
            .map(|(_, tasks)| tasks.as_slice())
            .unwrap_or(&[])
    }

    /// Buckets worth rendering: all but an empty Overdue.
    pub fn visible(&self) -> impl Iterator<Item = &(DueBucket, Vec<&'a Task>)> {
        self.buckets
            .iter()
            .filter(|(b, tasks)| *b != DueBucket::Overdue || !tasks.is_empty())
    }
}

/// Tasks in every project assigned to `user_id`, grouped by due date.
pub fn my_tasks<'a>(store: &'a TaskStore, user_id: &str, today: NaiveDate) -> MyTasks<'a> {
    let mine: Vec<&Task> = store.tasks.iter().filter(|t| t.is_assigned_to(user_id)).collect();
    let bounds = BucketBounds::new(today);
    let buckets = DueBucket::ALL
        .iter()
        .map(|&b| {
            let tasks = mine.iter().copied().filter(|t| b.contains(t, &bounds)).collect();
            (b, tasks)
        })
        .collect();
    MyTasks { buckets }
}

/// One visible row of the hierarchy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyRow {
    pub id: TaskId,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
}

/// Epics of the active project that have no parent.
pub fn root_epics(store: &TaskStore) -> Vec<&Task> {
    store
        .project_tasks()
        .into_iter()
        .filter(|t| t.task_type == TaskType::Epic && t.parent_id.is_none())
        .collect()
}

/// Children of `id` that belong to the active project.
fn project_children<'a>(store: &'a TaskStore, id: TaskId) -> Vec<&'a Task> {
    let Some(project) = store.current_project() else {
        return Vec::new();
    };
    store
        .children_of(id)
        .into_iter()
        .filter(|c| project.contains(c.id))
        .collect()
}

/// Flatten the tree below the root epics, descending only into expanded rows.
pub fn flatten_hierarchy(store: &TaskStore, expanded: &HashSet<TaskId>) -> Vec<HierarchyRow> {
    let mut rows = Vec::new();
    let mut visited = HashSet::new();
    for root in root_epics(store) {
        push_rows(store, root.id, 0, expanded, &mut visited, &mut rows);
    }
    rows
}

fn push_rows(
    store: &TaskStore,
    id: TaskId,
    depth: usize,
    expanded: &HashSet<TaskId>,
    visited: &mut HashSet<TaskId>,
    rows: &mut Vec<HierarchyRow>,
) {
    if !visited.insert(id) {
        return;
    }
    let children = project_children(store, id);
    let is_expanded = expanded.contains(&id);
    rows.push(HierarchyRow {
        id,
        depth,
        has_children: !children.is_empty(),
        expanded: is_expanded,
    });
    if is_expanded {
        for child in children {
            push_rows(store, child.id, depth + 1, expanded, visited, rows);
        }
    }
}

/// Every task of the active project that has children, for "expand all".
pub fn expandable_ids(store: &TaskStore) -> HashSet<TaskId> {
    store
        .project_tasks()
        .into_iter()
        .filter(|t| !project_children(store, t.id).is_empty())
        .map(|t| t.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::demo_store;
    use crate::task::NewTask;

    fn ids(tasks: &[&Task]) -> Vec<TaskId> {
        tasks.iter().map(|t| t.id).collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_dashboard_excludes_backlog_from_total() {
        let store = demo_store();
        let summary = dashboard(&store);
        assert_eq!(summary.title, "Website Redesign");
        // project 1: todo 1, 8, 9; in-progress 2, 7; backlog 3, 10
        assert_eq!(ids(&summary.todo), vec![1, 8, 9]);
        assert_eq!(ids(&summary.in_progress), vec![2, 7]);
        assert_eq!(summary.review, 0);
        assert_eq!(summary.done, 0);
        assert_eq!(summary.total(), 5);
    }

    #[test]
    fn test_dashboard_without_project() {
        let mut store = demo_store();
        store.set_current_project(None);
        let summary = dashboard(&store);
        assert_eq!(summary.title, "All Tasks");
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn test_board_columns_in_order() {
        let mut store = demo_store();
        store.set_current_project(Some("2"));
        let cols = board_columns(&store);
        let statuses: Vec<Status> = cols.iter().map(|c| c.status).collect();
        assert_eq!(statuses, Status::ALL.to_vec());
        assert_eq!(ids(&cols[Status::Review.column_index()].tasks), vec![4]);
        assert_eq!(ids(&cols[Status::Done.column_index()].tasks), vec![5]);
        assert_eq!(ids(&cols[Status::Todo.column_index()].tasks), vec![6]);
    }

    #[test]
    fn test_move_card() {
        let mut store = demo_store();
        let before = store.get(1).unwrap().updated_at;
        assert!(!move_card(&mut store, 1, Status::Todo));
        assert_eq!(store.get(1).unwrap().updated_at, before);

        assert!(move_card(&mut store, 1, Status::Review));
        assert_eq!(store.get(1).unwrap().status, Status::Review);
        assert!(!move_card(&mut store, 404, Status::Done));
    }

    #[test]
    fn test_shift_card_stops_at_edges() {
        let mut store = demo_store();
        assert_eq!(shift_card(&mut store, 3, false), None);
        assert_eq!(shift_card(&mut store, 3, true), Some(Status::Todo));
        assert_eq!(shift_card(&mut store, 2, true), Some(Status::Review));
    }

    #[test]
    fn test_my_tasks_buckets() {
        let mut store = demo_store();
        let today = ymd(2023, 4, 20);
        let mine = |t: NewTask| {
            let mut t = t;
            t.assignee = store.user("1").cloned();
            t
        };
        let mut overdue_done = mine(NewTask::new("Shipped late").with_status(Status::Done));
        overdue_done.due_date = Some(ymd(2023, 4, 1));
        let mut tomorrow = mine(NewTask::new("Due tomorrow"));
        tomorrow.due_date = Some(ymd(2023, 4, 21));
        let mut later = mine(NewTask::new("Due next week"));
        later.due_date = Some(ymd(2023, 4, 27));
        let mut overdue = mine(NewTask::new("Late"));
        overdue.due_date = Some(ymd(2023, 4, 19));
        let a = store.add_task(overdue_done);
        let b = store.add_task(tomorrow);
        let c = store.add_task(later);
        let d = store.add_task(overdue);

        let view = my_tasks(&store, "1", today);
        assert_eq!(ids(view.bucket(DueBucket::Overdue)), vec![d]);
        assert_eq!(ids(view.bucket(DueBucket::Today)), Vec::<TaskId>::new());
        // task 9 is due 2023-04-21
        assert_eq!(ids(view.bucket(DueBucket::Tomorrow)), vec![9, b]);
        // no due date: 1, 5; 8 is due 2023-04-28 which is later
        assert_eq!(ids(view.bucket(DueBucket::ThisWeek)), vec![1, 5]);
        assert_eq!(ids(view.bucket(DueBucket::Later)), vec![8, c]);
        assert!(view.buckets.iter().all(|(_, ts)| !ts.iter().any(|t| t.id == a)));
    }

    #[test]
    fn test_my_tasks_today_includes_done() {
        let store = demo_store();
        // task 10 (Alex) is due 2023-04-20
        let view = my_tasks(&store, "3", ymd(2023, 4, 20));
        assert_eq!(ids(view.bucket(DueBucket::Today)), vec![10]);
        assert_eq!(ids(view.bucket(DueBucket::ThisWeek)), vec![4]);
        assert_eq!(view.visible().count(), 4);
    }

    #[test]
    fn test_my_tasks_near_last_representable_date() {
        let mut store = demo_store();
        let today = NaiveDate::MAX.pred_opt().unwrap();
        let mut t = NewTask::new("End of time");
        t.assignee = store.user("1").cloned();
        t.due_date = Some(NaiveDate::MAX);
        let id = store.add_task(t);

        let view = my_tasks(&store, "1", today);
        assert_eq!(ids(view.bucket(DueBucket::Tomorrow)), vec![id]);
        assert!(view.bucket(DueBucket::Later).is_empty());
        assert!(view.bucket(DueBucket::Today).is_empty());
        // April 2023 demo tasks are all overdue by then
        assert!(!view.bucket(DueBucket::Overdue).is_empty());

        let view = my_tasks(&store, "1", NaiveDate::MAX);
        assert_eq!(ids(view.bucket(DueBucket::Today)), vec![id]);
        assert!(view.bucket(DueBucket::Tomorrow).is_empty());
    }

    #[test]
    fn test_hierarchy_respects_expanded_set() {
        let store = demo_store();
        let collapsed = flatten_hierarchy(&store, &HashSet::new());
        assert_eq!(
            collapsed,
            vec![HierarchyRow { id: 7, depth: 0, has_children: true, expanded: false }]
        );

        let expanded: HashSet<TaskId> = [7, 8].into_iter().collect();
        let rows = flatten_hierarchy(&store, &expanded);
        let shape: Vec<(TaskId, usize)> = rows.iter().map(|r| (r.id, r.depth)).collect();
        assert_eq!(shape, vec![(7, 0), (8, 1), (9, 2)]);
        assert!(rows[2].has_children);
        assert!(!rows[2].expanded);

        let all = flatten_hierarchy(&store, &expandable_ids(&store));
        assert_eq!(all.len(), 4);
        assert_eq!(all[3].depth, 3);
    }

    #[test]
    fn test_hierarchy_empty_for_project_without_epics() {
        let mut store = demo_store();
        store.set_current_project(Some("2"));
        assert!(root_epics(&store).is_empty());
        assert!(flatten_hierarchy(&store, &HashSet::new()).is_empty());
    }
}
