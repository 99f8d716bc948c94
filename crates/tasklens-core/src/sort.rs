use std::cmp::Ordering;

use tracing::trace;

use crate::task::{Task, priority_rank};

/// One total order is active at a time; ties keep input order (the
/// sort is stable), so there is no secondary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    DueDate,
    Priority,
    CreatedDate,
    Title,
}

impl SortKey {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "due_date" | "due" => Some(Self::DueDate),
            "priority" | "pri" => Some(Self::Priority),
            "created_date" | "created" => Some(Self::CreatedDate),
            "title" | "alphabetical" => Some(Self::Title),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DueDate => "due_date",
            Self::Priority => "priority",
            Self::CreatedDate => "created_date",
            Self::Title => "title",
        }
    }
}

#[tracing::instrument(skip(tasks))]
pub fn sort_tasks(tasks: &mut [&Task], key: SortKey) {
    tasks.sort_by(|a, b| compare_tasks(a, b, key));
    trace!(count = tasks.len(), "sorted view");
}

fn compare_tasks(a: &Task, b: &Task, key: SortKey) -> Ordering {
    match key {
        SortKey::DueDate => cmp_optional(a.due_date.as_ref(), b.due_date.as_ref()),
        SortKey::Priority => {
            priority_rank(a.priority.as_deref()).cmp(&priority_rank(b.priority.as_deref()))
        }
        // Most recently created first.
        SortKey::CreatedDate => b.created_date.cmp(&a.created_date),
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
    }
}

/// `None` sorts after every `Some`; two `None`s compare equal so the
/// stable sort preserves their relative input order.
fn cmp_optional<T: Ord>(left: Option<&T>, right: Option<&T>) -> Ordering {
    match (left, right) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{SortKey, sort_tasks};
    use crate::task::Task;

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|task| task.id.clone()).collect()
    }

    #[test]
    fn due_date_sorts_missing_last_and_stable() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single().expect("valid now");

        let mut soon = Task::new("soon", "a", now);
        soon.due_date = Some(now + Duration::hours(1));
        let mut later = Task::new("later", "b", now);
        later.due_date = Some(now + Duration::days(2));
        let loose_one = Task::new("loose-1", "c", now);
        let loose_two = Task::new("loose-2", "d", now);

        let owned = vec![loose_one, later, loose_two, soon];
        let mut refs: Vec<&Task> = owned.iter().collect();
        sort_tasks(&mut refs, SortKey::DueDate);

        assert_eq!(ids(&refs), vec!["soon", "later", "loose-1", "loose-2"]);
    }

    #[test]
    fn priority_ranks_missing_as_medium() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single().expect("valid now");

        let mut low = Task::new("low", "a", now);
        low.priority = Some("low".to_string());
        let mut urgent = Task::new("urgent", "b", now);
        urgent.priority = Some("urgent".to_string());
        let unranked = Task::new("unranked", "c", now);

        let owned = vec![low, urgent, unranked];
        let mut refs: Vec<&Task> = owned.iter().collect();
        sort_tasks(&mut refs, SortKey::Priority);

        assert_eq!(ids(&refs), vec!["urgent", "unranked", "low"]);
    }

    #[test]
    fn created_date_is_most_recent_first() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single().expect("valid now");

        let old = Task::new("old", "a", now - Duration::days(3));
        let fresh = Task::new("fresh", "b", now);

        let owned = vec![old, fresh];
        let mut refs: Vec<&Task> = owned.iter().collect();
        sort_tasks(&mut refs, SortKey::CreatedDate);

        assert_eq!(ids(&refs), vec!["fresh", "old"]);
    }

    #[test]
    fn title_order_ignores_case() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single().expect("valid now");

        let owned = vec![
            Task::new("b", "banana bread", now),
            Task::new("a", "Apple pie", now),
        ];
        let mut refs: Vec<&Task> = owned.iter().collect();
        sort_tasks(&mut refs, SortKey::Title);

        assert_eq!(ids(&refs), vec!["a", "b"]);
    }

    #[test]
    fn sorting_twice_is_idempotent() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single().expect("valid now");

        let mut one = Task::new("1", "a", now);
        one.priority = Some("high".to_string());
        let two = Task::new("2", "b", now);
        let mut three = Task::new("3", "c", now);
        three.priority = Some("high".to_string());

        let owned = vec![one, two, three];
        for key in [
            SortKey::DueDate,
            SortKey::Priority,
            SortKey::CreatedDate,
            SortKey::Title,
        ] {
            let mut refs: Vec<&Task> = owned.iter().collect();
            sort_tasks(&mut refs, key);
            let once = ids(&refs);
            sort_tasks(&mut refs, key);
            assert_eq!(once, ids(&refs));
        }
    }
}
