use std::collections::{
  HashMap,
  HashSet
};

use chrono::{
  DateTime,
  Days,
  NaiveDate,
  Utc
};
use serde::Serialize;
use tracing::debug;

use crate::datetime::{
  WeekStart,
  to_project_date,
  week_of
};
use crate::task::{
  PomodoroSession,
  Status,
  Task,
  TaskList
};

/// Badge counts for the sidebar.
/// Always computed over the entire
/// unscoped collection so badges
/// reflect global state while the
/// user looks at a filtered subset.
#[derive(Debug, Clone, Serialize)]
pub struct SidebarCounts {
  pub inbox:     usize,
  pub today:     usize,
  pub upcoming:  usize,
  pub completed: usize,
  pub archived:  usize,
  pub per_list:  HashMap<String, usize>
}

#[tracing::instrument(skip(
  tasks, lists, now
))]
pub fn sidebar_counts(
  tasks: &[Task],
  lists: &[TaskList],
  now: DateTime<Utc>
) -> SidebarCounts {
  let today = to_project_date(now);

  let inbox = tasks
    .iter()
    .filter(|task| task.is_open())
    .count();
  // The due-date badges share the
  // view predicates: only completed
  // tasks are excluded.
  let today_count = tasks
    .iter()
    .filter(|task| {
      task
        .due_date
        .map(|due| {
          to_project_date(due) == today
        })
        .unwrap_or(false)
        && task.status
          != Status::Completed
    })
    .count();
  let upcoming = tasks
    .iter()
    .filter(|task| {
      task
        .due_date
        .map(|due| due > now)
        .unwrap_or(false)
        && task.status
          != Status::Completed
    })
    .count();
  let completed = tasks
    .iter()
    .filter(|task| {
      task.status == Status::Completed
    })
    .count();
  let archived = tasks
    .iter()
    .filter(|task| {
      task.status == Status::Archived
    })
    .count();

  let per_list = lists
    .iter()
    .map(|list| {
      let count = tasks
        .iter()
        .filter(|task| {
          task.list_id.as_deref()
            == Some(list.id.as_str())
            && task.status
              != Status::Completed
        })
        .count();
      (list.id.clone(), count)
    })
    .collect();

  debug!(
    inbox,
    today = today_count,
    upcoming,
    completed,
    archived,
    lists = lists.len(),
    "computed sidebar counts"
  );

  SidebarCounts {
    inbox,
    today: today_count,
    upcoming,
    completed,
    archived,
    per_list
  }
}

/// Consecutive project-local days
/// with at least one completion,
/// ending at today. Today itself must
/// count or the streak is 0. The walk
/// is over the finite set of observed
/// completion days, so it terminates
/// at the first gap without an
/// artificial lookback floor.
#[tracing::instrument(skip(
  tasks, now
))]
pub fn current_streak(
  tasks: &[Task],
  now: DateTime<Utc>
) -> u32 {
  let completion_days: HashSet<
    NaiveDate
  > = tasks
    .iter()
    .filter(|task| {
      task.status == Status::Completed
    })
    .filter_map(|task| {
      task.completed_at
    })
    .map(to_project_date)
    .collect();

  let mut streak = 0;
  let mut day = to_project_date(now);
  while completion_days
    .contains(&day)
  {
    streak += 1;
    let Some(previous) = day
      .checked_sub_days(Days::new(1))
    else {
      break;
    };
    day = previous;
  }

  debug!(streak, "computed streak");
  streak
}

/// One bucket per day of the current
/// week, in week order.
#[derive(Debug, Clone, Serialize)]
pub struct DayBucket {
  pub date:      NaiveDate,
  pub label:     String,
  pub completed: usize
}

#[tracing::instrument(skip(
  tasks, now
))]
pub fn weekly_completions(
  tasks: &[Task],
  now: DateTime<Utc>,
  week_start: WeekStart
) -> Vec<DayBucket> {
  week_of(
    to_project_date(now),
    week_start
  )
  .iter()
  .map(|day| DayBucket {
    date:      *day,
    label:     day
      .format("%a")
      .to_string(),
    completed: tasks
      .iter()
      .filter(|task| {
        task.completed_on(*day)
      })
      .count()
  })
  .collect()
}

/// Category bucket; bucket order is
/// first-occurrence order, not
/// sorted.
#[derive(
  Debug,
  Clone,
  Serialize,
  PartialEq,
  Eq
)]
pub struct CategoryCount {
  pub name:  String,
  pub count: usize
}

pub fn category_rollup(
  tasks: &[Task]
) -> Vec<CategoryCount> {
  let mut buckets: Vec<
    CategoryCount
  > = Vec::new();

  for task in tasks {
    let name = task
      .category
      .as_deref()
      .unwrap_or("other");
    match buckets
      .iter_mut()
      .find(|bucket| {
        bucket.name == name
      }) {
      | Some(bucket) => {
        bucket.count += 1;
      }
      | None => {
        buckets.push(CategoryCount {
          name:  name.to_string(),
          count: 1
        });
      }
    }
  }

  buckets
}

/// Analytics snapshot over the whole
/// collection plus the pomodoro
/// session log.
#[derive(Debug, Clone, Serialize)]
pub struct ProductivityStats {
  pub completed_today:     usize,
  pub completed_this_week: usize,
  pub total_completed:     usize,
  pub total_pending:       usize,
  pub overdue:             usize,
  pub streak:              u32,
  pub weekly:              Vec<DayBucket>,
  pub categories:          Vec<CategoryCount>,
  pub total_time_spent:    u64,
  pub avg_time_per_task:   u64,
  pub pomodoro_count:      usize
}

#[tracing::instrument(skip(
  tasks, sessions, now
))]
pub fn productivity_stats(
  tasks: &[Task],
  sessions: &[PomodoroSession],
  now: DateTime<Utc>,
  week_start: WeekStart
) -> ProductivityStats {
  let today = to_project_date(now);
  let week =
    week_of(today, week_start);

  let completed_today = tasks
    .iter()
    .filter(|task| {
      task.completed_on(today)
    })
    .count();
  let completed_this_week = tasks
    .iter()
    .filter(|task| {
      task.status == Status::Completed
        && task
          .completed_at
          .map(|at| {
            to_project_date(at)
              >= week[0]
          })
          .unwrap_or(false)
    })
    .count();
  let total_completed = tasks
    .iter()
    .filter(|task| {
      task.status == Status::Completed
    })
    .count();
  let total_pending = tasks
    .iter()
    .filter(|task| {
      task.status == Status::Pending
    })
    .count();
  let overdue = tasks
    .iter()
    .filter(|task| {
      task.status != Status::Completed
        && task
          .due_date
          .map(|due| due < now)
          .unwrap_or(false)
    })
    .count();

  let total_time_spent: u64 = tasks
    .iter()
    .map(|task| task.actual_time_spent)
    .sum();
  // Defined as 0 with no completions,
  // never a division by zero.
  let avg_time_per_task =
    if total_completed == 0 {
      0
    } else {
      (total_time_spent as f64
        / total_completed as f64)
        .round() as u64
    };

  ProductivityStats {
    completed_today,
    completed_this_week,
    total_completed,
    total_pending,
    overdue,
    streak: current_streak(
      tasks, now
    ),
    weekly: weekly_completions(
      tasks, now, week_start
    ),
    categories: category_rollup(
      tasks
    ),
    total_time_spent,
    avg_time_per_task,
    pomodoro_count: sessions.len()
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    Duration,
    TimeZone,
    Utc
  };

  use super::{
    category_rollup,
    current_streak,
    productivity_stats,
    sidebar_counts,
    weekly_completions
  };
  use crate::datetime::WeekStart;
  use crate::task::{
    Status,
    Task,
    TaskList
  };

  fn now() -> chrono::DateTime<Utc> {
    Utc
      .with_ymd_and_hms(
        2026, 3, 4, 12, 0, 0
      )
      .single()
      .expect("valid now")
  }

  fn completed_at(
    id: &str,
    at: chrono::DateTime<Utc>
  ) -> Task {
    let mut task =
      Task::new(id, id, at);
    task.status = Status::Completed;
    task.completed_at = Some(at);
    task
  }

  fn list(id: &str) -> TaskList {
    TaskList {
      id:           id.to_string(),
      name:         id.to_string(),
      color:        None,
      created_by:   None,
      is_shared:    false,
      team_members: vec![]
    }
  }

  #[test]
  fn sidebar_counts_follow_status_rules()
   {
    let now = now();

    let mut pending = Task::new(
      "p", "open", now
    );
    pending.list_id =
      Some("work".to_string());
    pending.due_date =
      Some(now + Duration::hours(2));

    let mut done =
      completed_at("d", now);
    done.list_id =
      Some("work".to_string());

    let mut archived = Task::new(
      "a", "gone", now
    );
    archived.status =
      Status::Archived;

    let tasks =
      vec![pending, done, archived];
    let counts = sidebar_counts(
      &tasks,
      &[list("work")],
      now
    );

    assert_eq!(counts.inbox, 1);
    assert_eq!(counts.today, 1);
    assert_eq!(counts.upcoming, 1);
    assert_eq!(counts.completed, 1);
    assert_eq!(counts.archived, 1);
    // Per-list badges exclude
    // completed tasks.
    assert_eq!(
      counts.per_list.get("work"),
      Some(&1)
    );
  }

  #[test]
  fn streak_requires_today() {
    let now = now();
    let yesterday =
      now - Duration::days(1);

    let tasks = vec![completed_at(
      "y", yesterday
    )];
    assert_eq!(
      current_streak(&tasks, now),
      0
    );
  }

  #[test]
  fn streak_counts_back_to_first_gap()
  {
    let now = now();
    let tasks = vec![
      completed_at("t0", now),
      completed_at(
        "t1",
        now - Duration::days(1)
      ),
      completed_at(
        "t2",
        now - Duration::days(2)
      ),
      // Day 3 is the gap; day 4 must
      // not extend the streak.
      completed_at(
        "t4",
        now - Duration::days(4)
      ),
    ];
    assert_eq!(
      current_streak(&tasks, now),
      3
    );
  }

  #[test]
  fn reopened_tasks_do_not_feed_streak()
  {
    let now = now();
    let mut reopened =
      completed_at("r", now);
    reopened.status = Status::Pending;
    // A stale completed_at without
    // completed status never counts.
    assert_eq!(
      current_streak(
        &[reopened],
        now
      ),
      0
    );
  }

  #[test]
  fn weekly_rollup_has_seven_buckets()
  {
    let now = now();
    let tasks = vec![
      completed_at("a", now),
      completed_at(
        "b",
        now - Duration::days(1)
      ),
    ];

    for start in [
      WeekStart::Sunday,
      WeekStart::Monday
    ] {
      let buckets =
        weekly_completions(
          &tasks, now, start
        );
      assert_eq!(buckets.len(), 7);
      let total: usize = buckets
        .iter()
        .map(|b| b.completed)
        .sum();
      assert_eq!(total, 2);
    }
  }

  #[test]
  fn category_rollup_insertion_order()
  {
    let now = now();
    let mut work1 =
      Task::new("1", "a", now);
    work1.category =
      Some("work".to_string());
    let uncategorized =
      Task::new("2", "b", now);
    let mut work2 =
      Task::new("3", "c", now);
    work2.category =
      Some("work".to_string());

    let buckets = category_rollup(
      &[work1, uncategorized, work2]
    );
    assert_eq!(buckets.len(), 2);
    assert_eq!(
      buckets[0].name,
      "work"
    );
    assert_eq!(buckets[0].count, 2);
    assert_eq!(
      buckets[1].name,
      "other"
    );
    assert_eq!(buckets[1].count, 1);
  }

  #[test]
  fn avg_time_is_zero_without_completions()
   {
    let now = now();
    let mut busy =
      Task::new("b", "x", now);
    busy.actual_time_spent = 90;

    let stats = productivity_stats(
      &[busy],
      &[],
      now,
      WeekStart::Sunday
    );
    assert_eq!(
      stats.total_time_spent,
      90
    );
    assert_eq!(
      stats.avg_time_per_task,
      0
    );
  }

  #[test]
  fn avg_time_rounds_to_nearest() {
    let now = now();
    let mut a = completed_at("a", now);
    a.actual_time_spent = 10;
    let mut b = completed_at("b", now);
    b.actual_time_spent = 15;

    let stats = productivity_stats(
      &[a, b],
      &[],
      now,
      WeekStart::Sunday
    );
    // 25 / 2 rounds up to 13.
    assert_eq!(
      stats.avg_time_per_task,
      13
    );
  }

  #[test]
  fn overdue_ignores_completed_only()
  {
    let now = now();
    let mut late =
      Task::new("late", "x", now);
    late.due_date =
      Some(now - Duration::hours(4));

    let mut archived_late = Task::new(
      "arch", "y", now
    );
    archived_late.status =
      Status::Archived;
    archived_late.due_date =
      Some(now - Duration::hours(4));

    let mut done_late =
      completed_at("done", now);
    done_late.due_date =
      Some(now - Duration::hours(4));

    let stats = productivity_stats(
      &[
        late,
        archived_late,
        done_late
      ],
      &[],
      now,
      WeekStart::Sunday
    );
    assert_eq!(stats.overdue, 2);
  }
}
