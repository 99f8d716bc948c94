use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::datetime::format_project_date;
use crate::stats::{ProductivityStats, SidebarCounts};
use crate::task::{Status, Task, TaskList};

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, tasks, now))]
    pub fn print_task_table(
        &mut self,
        label: &str,
        tasks: &[Task],
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let plural = if tasks.len() == 1 { "task" } else { "tasks" };
        writeln!(out, "{label} - {} {plural}", tasks.len())?;

        if tasks.is_empty() {
            return Ok(());
        }
        writeln!(out)?;

        let headers = vec![
            "Title".to_string(),
            "Status".to_string(),
            "Pri".to_string(),
            "Due".to_string(),
            "Category".to_string(),
            "Tags".to_string(),
        ];

        let mut rows = Vec::with_capacity(tasks.len());
        for task in tasks {
            let due = task.due_date.map(format_project_date).unwrap_or_default();
            let due = match task.due_date {
                Some(task_due) if task_due < now && task.status != Status::Completed => {
                    self.paint(&due, "31")
                }
                _ => due,
            };

            let priority = task.priority.clone().unwrap_or_default();
            let priority = if priority == "urgent" {
                self.paint(&priority, "31")
            } else {
                priority
            };

            rows.push(vec![
                task.title.clone(),
                task.status.as_str().to_string(),
                priority,
                due,
                task.category.clone().unwrap_or_default(),
                task.tags.join(", "),
            ]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, counts, lists))]
    pub fn print_counts(
        &mut self,
        counts: &SidebarCounts,
        lists: &[TaskList],
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec!["View".to_string(), "Tasks".to_string()];
        let mut rows = vec![
            vec!["inbox".to_string(), counts.inbox.to_string()],
            vec!["today".to_string(), counts.today.to_string()],
            vec!["upcoming".to_string(), counts.upcoming.to_string()],
            vec!["completed".to_string(), counts.completed.to_string()],
            vec!["archived".to_string(), counts.archived.to_string()],
        ];

        for list in lists {
            let count = counts.per_list.get(&list.id).copied().unwrap_or(0);
            rows.push(vec![list.name.clone(), count.to_string()]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, stats))]
    pub fn print_stats(&mut self, stats: &ProductivityStats) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "completed today  {}", stats.completed_today)?;
        writeln!(out, "completed week   {}", stats.completed_this_week)?;
        writeln!(out, "total completed  {}", stats.total_completed)?;
        writeln!(out, "total pending    {}", stats.total_pending)?;
        writeln!(out, "overdue          {}", stats.overdue)?;
        writeln!(out, "streak           {} days", stats.streak)?;
        writeln!(out, "time spent       {} min", stats.total_time_spent)?;
        writeln!(out, "avg per task     {} min", stats.avg_time_per_task)?;
        writeln!(out, "pomodoros        {}", stats.pomodoro_count)?;

        writeln!(out)?;
        let weekly: Vec<String> = stats
            .weekly
            .iter()
            .map(|bucket| format!("{} {}", bucket.label, bucket.completed))
            .collect();
        writeln!(out, "week             {}", weekly.join("  "))?;

        if !stats.categories.is_empty() {
            let categories: Vec<String> = stats
                .categories
                .iter()
                .map(|bucket| format!("{}: {}", bucket.name, bucket.count))
                .collect();
            writeln!(out, "categories       {}", categories.join("  "))?;
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, lists, counts))]
    pub fn print_lists(
        &mut self,
        lists: &[TaskList],
        counts: &SidebarCounts,
    ) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "Name".to_string(),
            "Id".to_string(),
            "Shared".to_string(),
            "Members".to_string(),
            "Open".to_string(),
        ];

        let rows = lists
            .iter()
            .map(|list| {
                let open = counts.per_list.get(&list.id).copied().unwrap_or(0);
                vec![
                    list.name.clone(),
                    list.id.clone(),
                    if list.is_shared { "yes" } else { "no" }.to_string(),
                    list.team_members.len().to_string(),
                    open.to_string(),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
