use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::filter::FilterState;
use crate::sort::{SortKey, sort_tasks};
use crate::stats::{SidebarCounts, sidebar_counts};
use crate::task::{Task, TaskList};
use crate::view::{ViewSelector, scope_view};

/// Everything a presentation layer holds that shapes the visible task
/// set. The engine is a pure function of this plus the collections;
/// the caller re-invokes it after any input change.
#[derive(Debug, Clone)]
pub struct ViewRequest {
    pub selector: ViewSelector,
    pub filters: FilterState,
    pub sort: SortKey,
}

impl Default for ViewRequest {
    fn default() -> Self {
        Self {
            selector: ViewSelector::Inbox,
            filters: FilterState::default(),
            sort: SortKey::default(),
        }
    }
}

/// Derived, owned output: the scoped/filtered/sorted task set plus the
/// view-independent sidebar counts. Inputs are never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub visible: Vec<Task>,
    pub counts: SidebarCounts,
}

/// Scope, filter, and order in that fixed sequence.
#[tracing::instrument(skip(tasks, now))]
pub fn visible_tasks(tasks: &[Task], request: &ViewRequest, now: DateTime<Utc>) -> Vec<Task> {
    let scoped = scope_view(tasks, &request.selector, now);
    let mut filtered = request.filters.apply(scoped);
    sort_tasks(&mut filtered, request.sort);

    debug!(
        total = tasks.len(),
        visible = filtered.len(),
        "derived visible task set"
    );
    filtered.into_iter().cloned().collect()
}

#[tracing::instrument(skip(tasks, lists, now))]
pub fn derive_view(
    tasks: &[Task],
    lists: &[TaskList],
    request: &ViewRequest,
    now: DateTime<Utc>,
) -> ViewSnapshot {
    ViewSnapshot {
        visible: visible_tasks(tasks, request, now),
        counts: sidebar_counts(tasks, lists, now),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{ViewRequest, derive_view};
    use crate::filter::FilterState;
    use crate::sort::SortKey;
    use crate::task::{Status, Task};
    use crate::view::ViewSelector;

    #[test]
    fn today_view_excludes_completed_and_future_due() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).single().expect("valid now");

        let mut done = Task::new("1", "shipped", now);
        done.status = Status::Completed;
        done.completed_at = Some(now);
        done.actual_time_spent = 30;

        let mut tomorrow = Task::new("2", "later", now);
        tomorrow.due_date = Some(now + Duration::days(1));

        let tasks = vec![done, tomorrow];
        let request = ViewRequest {
            selector: ViewSelector::Today,
            ..ViewRequest::default()
        };

        let snapshot = derive_view(&tasks, &[], &request, now);
        assert!(snapshot.visible.is_empty());
        // Counts are global, not view-scoped.
        assert_eq!(snapshot.counts.completed, 1);
        assert_eq!(snapshot.counts.upcoming, 1);
    }

    #[test]
    fn counts_ignore_active_filters() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).single().expect("valid now");

        let mut urgent = Task::new("u", "pay rent", now);
        urgent.priority = Some("urgent".to_string());
        let calm = Task::new("c", "water plants", now);

        let tasks = vec![urgent, calm];
        let filtered = ViewRequest {
            filters: FilterState {
                priority: "urgent".to_string(),
                ..FilterState::default()
            },
            ..ViewRequest::default()
        };
        let unfiltered = ViewRequest::default();

        let a = derive_view(&tasks, &[], &filtered, now);
        let b = derive_view(&tasks, &[], &unfiltered, now);

        assert_eq!(a.visible.len(), 1);
        assert_eq!(b.visible.len(), 2);
        assert_eq!(a.counts.inbox, b.counts.inbox);
    }

    #[test]
    fn ordering_runs_after_filtering() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).single().expect("valid now");

        let mut low = Task::new("low", "sweep", now);
        low.priority = Some("low".to_string());
        low.tags = vec!["home".to_string()];
        let mut urgent = Task::new("urgent", "fix leak", now);
        urgent.priority = Some("urgent".to_string());
        urgent.tags = vec!["home".to_string()];

        let tasks = vec![low, urgent];
        let request = ViewRequest {
            filters: FilterState {
                search: "home".to_string(),
                ..FilterState::default()
            },
            sort: SortKey::Priority,
            ..ViewRequest::default()
        };

        let snapshot = derive_view(&tasks, &[], &request, now);
        let ids: Vec<&str> = snapshot.visible.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["urgent", "low"]);
    }

    #[test]
    fn inputs_are_left_untouched() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).single().expect("valid now");
        let tasks = vec![Task::new("t", "immutable", now)];
        let before = serde_json::to_string(&tasks).expect("serialize");

        let _ = derive_view(&tasks, &[], &ViewRequest::default(), now);

        let after = serde_json::to_string(&tasks).expect("serialize");
        assert_eq!(before, after);
    }
}
