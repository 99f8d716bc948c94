use chrono::{
  DateTime,
  Utc
};
use tracing::trace;

use crate::datetime::to_project_date;
use crate::task::{
  Status,
  Task,
  TaskList
};

/// Names the base subset of tasks a
/// presentation layer is looking at:
/// one of the system views, or a
/// specific list by id. Any token
/// that is not a system view name is
/// treated as a list id; an id that
/// matches no task yields an empty
/// view, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSelector {
  Inbox,
  Today,
  Upcoming,
  Completed,
  Archived,
  List(String)
}

impl ViewSelector {
  pub fn parse(token: &str) -> Self {
    match token {
      | "inbox" => Self::Inbox,
      | "today" => Self::Today,
      | "upcoming" => Self::Upcoming,
      | "completed" => Self::Completed,
      | "archived" => Self::Archived,
      | other => {
        Self::List(other.to_string())
      }
    }
  }

  pub fn label(
    &self,
    lists: &[TaskList]
  ) -> String {
    match self {
      | Self::Inbox => {
        "Inbox".to_string()
      }
      | Self::Today => {
        "Today's Tasks".to_string()
      }
      | Self::Upcoming => {
        "Upcoming".to_string()
      }
      | Self::Completed => {
        "Completed".to_string()
      }
      | Self::Archived => {
        "Archived".to_string()
      }
      | Self::List(id) => lists
        .iter()
        .find(|list| list.id == *id)
        .map(|list| list.name.clone())
        .unwrap_or_else(|| id.clone())
    }
  }
}

/// Membership-only scoping: no
/// ordering or filtering guarantee
/// beyond the view predicate.
#[tracing::instrument(skip(
  tasks, now
))]
pub fn scope_view<'a>(
  tasks: &'a [Task],
  selector: &ViewSelector,
  now: DateTime<Utc>
) -> Vec<&'a Task> {
  let today = to_project_date(now);
  let scoped: Vec<&Task> = tasks
    .iter()
    .filter(|task| {
      in_view(task, selector, now, today)
    })
    .collect();
  trace!(
    total = tasks.len(),
    scoped = scoped.len(),
    "scoped view"
  );
  scoped
}

fn in_view(
  task: &Task,
  selector: &ViewSelector,
  now: DateTime<Utc>,
  today: chrono::NaiveDate
) -> bool {
  match selector {
    | ViewSelector::Inbox => {
      task.status != Status::Archived
    }
    // The due-date views exclude only
    // completed tasks.
    | ViewSelector::Today => {
      task
        .due_date
        .map(|due| {
          to_project_date(due) == today
        })
        .unwrap_or(false)
        && task.status
          != Status::Completed
    }
    | ViewSelector::Upcoming => {
      task
        .due_date
        .map(|due| due > now)
        .unwrap_or(false)
        && task.status
          != Status::Completed
    }
    | ViewSelector::Completed => {
      task.status == Status::Completed
    }
    | ViewSelector::Archived => {
      task.status == Status::Archived
    }
    // List views are a pure partition
    // by list_id; completed tasks stay
    // visible.
    | ViewSelector::List(id) => {
      task.list_id.as_deref()
        == Some(id.as_str())
    }
  }
}
