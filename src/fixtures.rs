//! Demo data the store is seeded with at startup.
//!
//! Three users, two projects and ten tasks. Tasks 7 to 10 form an
//! epic > story > task > subtask chain so the hierarchy view has content.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::fields::*;
use crate::project::{Project, Sprint};
use crate::store::TaskStore;
use crate::task::{Task, TaskId, TimeTracking, User};

pub fn demo_users() -> Vec<User> {
    vec![
        User::new("1", "John Doe", "https://i.pravatar.cc/150?img=1"),
        User::new("2", "Jane Smith", "https://i.pravatar.cc/150?img=2"),
        User::new("3", "Alex Johnson", "https://i.pravatar.cc/150?img=3"),
    ]
}

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn task(
    id: TaskId,
    title: &str,
    description: &str,
    status: Status,
    priority: Priority,
    task_type: TaskType,
    assignee: Option<&User>,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    tag_list: &[&str],
) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: description.to_string(),
        status,
        priority,
        task_type,
        assignee: assignee.cloned(),
        reporter: None,
        due_date: None,
        created_at: created,
        updated_at: updated,
        tags: tags(tag_list),
        story_points: None,
        parent_id: None,
        children_ids: Vec::new(),
        time_tracking: None,
        branch: None,
        components: Vec::new(),
        labels: Vec::new(),
        watchers: Vec::new(),
        comments: Vec::new(),
        attachments: Vec::new(),
        history: Vec::new(),
        sprints: Vec::new(),
    }
}

/// The demo tasks, linked parent to child where applicable.
pub fn demo_tasks(users: &[User]) -> Vec<Task> {
    let john = users.first();
    let jane = users.get(1);
    let alex = users.get(2);

    let mut tasks = vec![
        task(
            1,
            "Redesign dashboard UI",
            "Update the dashboard with the new design system",
            Status::Todo,
            Priority::High,
            TaskType::Task,
            john,
            day(2023, 4, 15),
            day(2023, 4, 15),
            &["design", "ui"],
        ),
        task(
            2,
            "Fix login page bug",
            "Users unable to login on mobile devices",
            Status::InProgress,
            Priority::Urgent,
            TaskType::Bug,
            jane,
            day(2023, 4, 14),
            day(2023, 4, 16),
            &["bug", "frontend"],
        ),
        task(
            3,
            "Create API documentation",
            "Document all API endpoints for the frontend team",
            Status::Backlog,
            Priority::Medium,
            TaskType::Task,
            None,
            day(2023, 4, 10),
            day(2023, 4, 10),
            &["documentation", "api"],
        ),
        task(
            4,
            "Implement authentication flow",
            "Add OAuth integration with Google and GitHub",
            Status::Review,
            Priority::High,
            TaskType::Feature,
            alex,
            day(2023, 4, 8),
            day(2023, 4, 18),
            &["auth", "security"],
        ),
        task(
            5,
            "Optimize image loading",
            "Improve performance of image loading on the product page",
            Status::Done,
            Priority::Medium,
            TaskType::Task,
            john,
            day(2023, 4, 5),
            day(2023, 4, 15),
            &["performance", "frontend"],
        ),
        task(
            6,
            "Setup CI/CD pipeline",
            "Configure GitHub Actions for automated testing and deployment",
            Status::Todo,
            Priority::High,
            TaskType::Task,
            None,
            day(2023, 4, 17),
            day(2023, 4, 17),
            &["devops", "automation"],
        ),
        task(
            7,
            "Customer onboarding revamp",
            "Rework the first-run experience from signup to first project",
            Status::InProgress,
            Priority::High,
            TaskType::Epic,
            jane,
            day(2023, 4, 3),
            day(2023, 4, 12),
            &["onboarding"],
        ),
        task(
            8,
            "Self-service signup",
            "New visitors can create an account without contacting sales",
            Status::Todo,
            Priority::High,
            TaskType::Story,
            john,
            day(2023, 4, 4),
            day(2023, 4, 12),
            &["onboarding", "frontend"],
        ),
        task(
            9,
            "Email verification",
            "Send a verification link and block login until it is confirmed",
            Status::Todo,
            Priority::Medium,
            TaskType::Task,
            john,
            day(2023, 4, 6),
            day(2023, 4, 6),
            &["auth", "email"],
        ),
        task(
            10,
            "Verification email template",
            "HTML and plain-text versions of the verification email",
            Status::Backlog,
            Priority::Low,
            TaskType::Subtask,
            alex,
            day(2023, 4, 6),
            day(2023, 4, 6),
            &["email", "design"],
        ),
    ];

    let reporter = jane.cloned();
    for t in tasks.iter_mut().filter(|t| t.id >= 7) {
        t.reporter = reporter.clone();
        t.sprints = vec!["s1".to_string()];
    }

    link(&mut tasks, 7, 8);
    link(&mut tasks, 8, 9);
    link(&mut tasks, 9, 10);

    if let Some(t) = tasks.iter_mut().find(|t| t.id == 7) {
        t.due_date = date(2023, 5, 31);
        t.components = tags(&["web"]);
    }
    if let Some(t) = tasks.iter_mut().find(|t| t.id == 8) {
        t.story_points = Some(8);
        t.due_date = date(2023, 4, 28);
        t.watchers = users.iter().take(2).cloned().collect();
    }
    if let Some(t) = tasks.iter_mut().find(|t| t.id == 9) {
        t.story_points = Some(3);
        t.due_date = date(2023, 4, 21);
        t.branch = Some("feature/email-verification".to_string());
        t.time_tracking = Some(TimeTracking {
            original_estimate: Some(480),
            remaining_estimate: Some(300),
            time_spent: Some(180),
        });
        t.labels = tags(&["needs-review"]);
    }
    if let Some(t) = tasks.iter_mut().find(|t| t.id == 10) {
        t.story_points = Some(1);
        t.due_date = date(2023, 4, 20);
    }

    tasks
}

fn link(tasks: &mut [Task], parent: TaskId, child: TaskId) {
    if let Some(c) = tasks.iter_mut().find(|t| t.id == child) {
        c.parent_id = Some(parent);
    }
    if let Some(p) = tasks.iter_mut().find(|t| t.id == parent) {
        p.children_ids.push(child);
    }
}

pub fn demo_projects(users: &[User]) -> Vec<Project> {
    let mut web = Project::new("1", "Website Redesign", "Complete overhaul of the company website");
    web.task_ids = vec![1, 2, 3, 7, 8, 9, 10];
    web.lead = users.get(1).cloned();
    web.components = tags(&["web", "api"]);
    web.sprints = vec![Sprint {
        id: "s1".to_string(),
        name: "Sprint 1".to_string(),
        goal: Some("Ship self-service signup".to_string()),
        start_date: date(2023, 4, 10),
        end_date: date(2023, 4, 24),
        status: SprintStatus::Active,
    }];

    let mut mobile = Project::new("2", "Mobile App Development", "New mobile app for iOS and Android");
    mobile.task_ids = vec![4, 5, 6];

    vec![web, mobile]
}

/// A store seeded with the demo data; the first project is active.
pub fn demo_store() -> TaskStore {
    let users = demo_users();
    let tasks = demo_tasks(&users);
    let projects = demo_projects(&users);
    TaskStore::new(users, tasks, projects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_demo_store_shape() {
        let store = demo_store();
        assert_eq!(store.users.len(), 3);
        assert_eq!(store.tasks.len(), 10);
        assert_eq!(store.projects.len(), 2);
        assert_eq!(store.current_project().unwrap().name, "Website Redesign");
        assert_eq!(store.next_id(), 11);
    }

    #[test]
    fn test_every_task_belongs_to_one_project() {
        let store = demo_store();
        let mut seen = HashSet::new();
        for p in &store.projects {
            for id in &p.task_ids {
                assert!(store.get(*id).is_some());
                assert!(seen.insert(*id), "task {} in two projects", id);
            }
        }
        assert_eq!(seen.len(), store.tasks.len());
    }

    #[test]
    fn test_links_are_consistent() {
        let store = demo_store();
        for t in &store.tasks {
            for c in &t.children_ids {
                assert_eq!(store.get(*c).unwrap().parent_id, Some(t.id));
            }
            if let Some(p) = t.parent_id {
                assert!(store.get(p).unwrap().children_ids.contains(&t.id));
            }
        }
        assert_eq!(store.descendants_of(7), vec![8, 9, 10]);
    }
}
