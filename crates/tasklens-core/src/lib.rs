pub mod cli;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod engine;
pub mod filter;
pub mod quickadd;
pub mod render;
pub mod sort;
pub mod source;
pub mod stats;
pub mod task;
pub mod view;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting tasklens CLI"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.rcfile.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let data_path =
    config::resolve_data_path(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve snapshot \
       path"
    )?;

  let snapshot =
    source::Snapshot::load(&data_path)
      .with_context(|| {
        format!(
          "failed to load snapshot \
           from {}",
          data_path.display()
        )
      })?;

  let mut renderer =
    render::Renderer::new(&cfg)?;
  let inv = cli::Invocation::parse(
    &cfg, cli.rest
  )?;

  commands::dispatch(
    &snapshot,
    &cfg,
    &mut renderer,
    inv
  )?;

  info!("done");
  Ok(())
}
