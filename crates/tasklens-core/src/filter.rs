use serde::{
  Deserialize,
  Serialize
};
use tracing::trace;

use crate::task::Task;

/// Sentinel meaning "no constraint"
/// for the categorical filters. It is
/// never matched against a task
/// field.
pub const ALL: &str = "all";

fn all_value() -> String {
  ALL.to_string()
}

/// The categorical and free-text
/// filters a presentation layer
/// holds. Applying an inactive state
/// is the identity function on its
/// input.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize
)]
pub struct FilterState {
  #[serde(default)]
  pub search:   String,
  #[serde(default = "all_value")]
  pub priority: String,
  #[serde(default = "all_value")]
  pub category: String,
  #[serde(default = "all_value")]
  pub status:   String
}

impl Default for FilterState {
  fn default() -> Self {
    Self {
      search:   String::new(),
      priority: all_value(),
      category: all_value(),
      status:   all_value()
    }
  }
}

impl FilterState {
  /// Number of active categorical
  /// filters. Search does not count
  /// toward the badge.
  pub fn active_count(
    &self
  ) -> usize {
    [
      &self.priority,
      &self.category,
      &self.status
    ]
    .iter()
    .filter(|value| {
      value.as_str() != ALL
    })
    .count()
  }

  pub fn is_identity(&self) -> bool {
    self.search.trim().is_empty()
      && self.active_count() == 0
  }

  /// Logical AND of the active
  /// predicates; a pure subset
  /// operation that never reorders
  /// its input.
  #[tracing::instrument(skip(
    self, scoped
  ))]
  pub fn apply<'a>(
    &self,
    scoped: Vec<&'a Task>
  ) -> Vec<&'a Task> {
    if self.is_identity() {
      return scoped;
    }

    let before = scoped.len();
    let kept: Vec<&Task> = scoped
      .into_iter()
      .filter(|task| {
        self.matches(task)
      })
      .collect();
    trace!(
      before,
      after = kept.len(),
      "applied filters"
    );
    kept
  }

  pub fn matches(
    &self,
    task: &Task
  ) -> bool {
    if !self.search.trim().is_empty()
      && !search_matches(
        task,
        &self.search
      )
    {
      return false;
    }

    if self.priority != ALL
      && task.priority.as_deref()
        != Some(self.priority.as_str())
    {
      return false;
    }

    if self.category != ALL
      && task.category.as_deref()
        != Some(self.category.as_str())
    {
      return false;
    }

    if self.status != ALL
      && task.status.as_str()
        != self.status
    {
      return false;
    }

    true
  }
}

fn search_matches(
  task: &Task,
  term: &str
) -> bool {
  let needle = term.to_lowercase();

  if task
    .title
    .to_lowercase()
    .contains(&needle)
  {
    return true;
  }

  if task
    .description
    .as_deref()
    .map(|text| {
      text
        .to_lowercase()
        .contains(&needle)
    })
    .unwrap_or(false)
  {
    return true;
  }

  task.tags.iter().any(|tag| {
    tag
      .to_lowercase()
      .contains(&needle)
  })
}
