//! Kind-tagged items for the two cross-entity listings: the trash view and
//! keyword search. Both return projects and tasks in a single list, each
//! row tagged with its entity kind and sorted by creation time ascending.
//! (Creation time, not deletion time, is the contract for the trash view
//! as well.)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Project, Task};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Project,
    Task,
}

/// A project or task flattened into the common shape shared by the trash
/// listing and search results.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaggedItem {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Status in its wire form ("active", "in-progress", ...). The two
    /// entity kinds have different status enums, so the tag is a string.
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

fn status_tag<S: Serialize>(status: &S) -> String {
    // Enum serialization to a bare string cannot fail.
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

impl From<Project> for TaggedItem {
    fn from(project: Project) -> Self {
        Self {
            kind: EntityKind::Project,
            id: project.id,
            title: project.title,
            description: project.description,
            status: status_tag(&project.status),
            created_at: project.created_at,
            deleted_at: project.deleted_at,
        }
    }
}

impl From<Task> for TaggedItem {
    fn from(task: Task) -> Self {
        Self {
            kind: EntityKind::Task,
            id: task.id,
            title: task.title,
            description: task.description,
            status: status_tag(&task.status),
            created_at: task.created_at,
            deleted_at: task.deleted_at,
        }
    }
}

/// Merges two lists already sorted by `created_at` ascending into one,
/// preserving that order. The per-kind queries each return rows sorted by
/// creation time, so a single linear merge keeps the combined list sorted.
pub fn merge_by_created_at(projects: Vec<TaggedItem>, tasks: Vec<TaggedItem>) -> Vec<TaggedItem> {
    let mut merged = Vec::with_capacity(projects.len() + tasks.len());
    let mut projects = projects.into_iter().peekable();
    let mut tasks = tasks.into_iter().peekable();

    loop {
        let take_project = match (projects.peek(), tasks.peek()) {
            (Some(p), Some(t)) => p.created_at <= t.created_at,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_project {
            projects.next()
        } else {
            tasks.next()
        };
        if let Some(item) = next {
            merged.push(item);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn item(kind: EntityKind, title: &str, created_at: DateTime<Utc>) -> TaggedItem {
        TaggedItem {
            kind,
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            status: String::new(),
            created_at,
            deleted_at: None,
        }
    }

    #[test]
    fn test_merge_orders_by_creation_time_ascending() {
        let base = Utc::now();
        let projects = vec![
            item(EntityKind::Project, "p1", base),
            item(EntityKind::Project, "p2", base + Duration::seconds(30)),
        ];
        let tasks = vec![
            item(EntityKind::Task, "t1", base + Duration::seconds(10)),
            item(EntityKind::Task, "t2", base + Duration::seconds(20)),
            item(EntityKind::Task, "t3", base + Duration::seconds(40)),
        ];

        let merged = merge_by_created_at(projects, tasks);
        let titles: Vec<&str> = merged.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["p1", "t1", "t2", "p2", "t3"]);
        assert!(merged.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[test]
    fn test_merge_with_one_side_empty() {
        let base = Utc::now();
        let tasks = vec![item(EntityKind::Task, "t1", base)];
        let merged = merge_by_created_at(Vec::new(), tasks);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].kind, EntityKind::Task);

        assert!(merge_by_created_at(Vec::new(), Vec::new()).is_empty());
    }

    #[test]
    fn test_tagged_item_from_project() {
        let project = Project::new(
            crate::models::ProjectInput {
                title: "Alpha".to_string(),
                description: "desc1".to_string(),
            },
            1,
        );
        let created_at = project.created_at;
        let tagged = TaggedItem::from(project);
        assert_eq!(tagged.kind, EntityKind::Project);
        assert_eq!(tagged.status, "active");
        assert_eq!(tagged.created_at, created_at);

        let json = serde_json::to_value(&tagged).unwrap();
        assert_eq!(json["type"], "project");
        // Not deleted, so the trash timestamp is omitted entirely.
        assert!(json.get("deletedAt").is_none());
    }

    #[test]
    fn test_tagged_item_from_task_keeps_kebab_status() {
        let mut task = Task::new(
            crate::models::TaskInput {
                title: "t".to_string(),
                description: "d".to_string(),
                due_date: Utc::now(),
            },
            Uuid::new_v4(),
            1,
        );
        task.status = crate::models::TaskStatus::InProgress;
        let tagged = TaggedItem::from(task);
        assert_eq!(tagged.status, "in-progress");
    }
}
