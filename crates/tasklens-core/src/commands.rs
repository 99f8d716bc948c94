use std::io::{self, Write};

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::cli::Invocation;
use crate::config::Config;
use crate::engine::{ViewRequest, derive_view};
use crate::filter::FilterState;
use crate::render::Renderer;
use crate::sort::SortKey;
use crate::source::Snapshot;
use crate::stats::{productivity_stats, sidebar_counts};
use crate::view::ViewSelector;

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "view", "counts", "stats", "lists", "export", "help", "version",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(snapshot, cfg, renderer, inv))]
pub fn dispatch(
    snapshot: &Snapshot,
    cfg: &Config,
    renderer: &mut Renderer,
    inv: Invocation,
) -> anyhow::Result<()> {
    let now = Utc::now();
    info!(command = %inv.command, "dispatching command");

    match inv.command.as_str() {
        "view" => cmd_view(snapshot, renderer, &inv.command_args, now),
        "counts" => cmd_counts(snapshot, renderer, now),
        "stats" => cmd_stats(snapshot, cfg, renderer, now),
        "lists" => cmd_lists(snapshot, renderer, now),
        "export" => cmd_export(snapshot, &inv.command_args, now),
        "help" => cmd_help(),
        "version" => {
            println!("tasklens {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            warn!(command = %other, "unknown command");
            Err(anyhow::anyhow!(
                "unknown command: {other} (see 'tasklens help')"
            ))
        }
    }
}

/// Splits command arguments into a view request. The first argument
/// selects the view when it carries no `key:` prefix; `search:`,
/// `priority:`, `category:`, `status:`, and `sort:` terms set the
/// corresponding state, and remaining bare terms accumulate into the
/// search text.
fn parse_view_args(args: &[String]) -> anyhow::Result<ViewRequest> {
    let mut selector = ViewSelector::Inbox;
    let mut filters = FilterState::default();
    let mut sort = SortKey::default();
    let mut search_words: Vec<String> = Vec::new();

    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix("search:") {
            search_words.push(value.to_string());
        } else if let Some(value) = arg.strip_prefix("priority:") {
            filters.priority = value.to_string();
        } else if let Some(value) = arg.strip_prefix("category:") {
            filters.category = value.to_string();
        } else if let Some(value) = arg.strip_prefix("status:") {
            filters.status = value.to_string();
        } else if let Some(value) = arg.strip_prefix("sort:") {
            sort = SortKey::parse(value)
                .with_context(|| format!("unknown sort key: {value}"))?;
        } else if idx == 0 {
            selector = ViewSelector::parse(arg);
        } else {
            search_words.push(arg.clone());
        }
    }

    if !search_words.is_empty() {
        filters.search = search_words.join(" ");
    }

    debug!(?selector, ?sort, "parsed view arguments");
    Ok(ViewRequest {
        selector,
        filters,
        sort,
    })
}

#[instrument(skip(snapshot, renderer, now))]
fn cmd_view(
    snapshot: &Snapshot,
    renderer: &mut Renderer,
    args: &[String],
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let request = parse_view_args(args)?;
    let derived = derive_view(&snapshot.tasks, &snapshot.lists, &request, now);
    let label = request.selector.label(&snapshot.lists);

    renderer.print_task_table(&label, &derived.visible, now)
}

#[instrument(skip(snapshot, renderer, now))]
fn cmd_counts(
    snapshot: &Snapshot,
    renderer: &mut Renderer,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let counts = sidebar_counts(&snapshot.tasks, &snapshot.lists, now);
    renderer.print_counts(&counts, &snapshot.lists)
}

#[instrument(skip(snapshot, cfg, renderer, now))]
fn cmd_stats(
    snapshot: &Snapshot,
    cfg: &Config,
    renderer: &mut Renderer,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let stats = productivity_stats(
        &snapshot.tasks,
        &snapshot.pomodoro_sessions,
        now,
        cfg.week_start(),
    );
    renderer.print_stats(&stats)
}

#[instrument(skip(snapshot, renderer, now))]
fn cmd_lists(
    snapshot: &Snapshot,
    renderer: &mut Renderer,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let counts = sidebar_counts(&snapshot.tasks, &snapshot.lists, now);
    renderer.print_lists(&snapshot.lists, &counts)
}

#[instrument(skip(snapshot, now))]
fn cmd_export(snapshot: &Snapshot, args: &[String], now: DateTime<Utc>) -> anyhow::Result<()> {
    let request = parse_view_args(args)?;
    let derived = derive_view(&snapshot.tasks, &snapshot.lists, &request, now);

    let mut out = io::stdout().lock();
    let payload =
        serde_json::to_string_pretty(&derived).context("failed to serialize view snapshot")?;
    writeln!(out, "{payload}")?;
    Ok(())
}

fn cmd_help() -> anyhow::Result<()> {
    println!(
        "usage: tasklens [--data FILE] [--rcfile FILE] [rc.key=value] [command] [args]\n\
         \n\
         commands:\n\
         \x20 view [selector] [terms]    show a view (default command)\n\
         \x20 counts                     sidebar badge counts\n\
         \x20 stats                      productivity statistics\n\
         \x20 lists                      known lists with open counts\n\
         \x20 export [selector] [terms]  view snapshot as JSON\n\
         \x20 help                       this text\n\
         \n\
         selectors: inbox today upcoming completed archived <list-id>\n\
         terms: search:TEXT priority:P category:C status:S sort:KEY\n\
         \x20      (bare terms search; sort keys: due_date priority\n\
         \x20      created_date title)"
    );
    Ok(())
}
