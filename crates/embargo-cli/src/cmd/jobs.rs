use crate::output::{fmt_ts, print_json, print_table};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use embargo_core::{
    jobs::{JobDb, JobQueue, ScheduledJob},
    paths,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum JobsSubcommand {
    /// List every scheduled job, soonest first
    List,
    /// List jobs whose run time has passed
    Due,
}

pub fn run(
    root: &Path,
    subcmd: JobsSubcommand,
    now: DateTime<Utc>,
    json: bool,
) -> anyhow::Result<()> {
    let jobs = JobDb::open(&paths::jobs_db_path(root)).context("failed to open job queue")?;
    let (listed, empty) = match subcmd {
        JobsSubcommand::List => (jobs.list()?, "No scheduled jobs."),
        JobsSubcommand::Due => (jobs.due(now)?, "No jobs due."),
    };

    if json {
        print_json(&listed)?;
        return Ok(());
    }

    if listed.is_empty() {
        println!("{empty}");
        return Ok(());
    }

    print_table(
        &["ID", "TARGET", "DIRECTION", "RUN AT"],
        listed.iter().map(row).collect(),
    );
    Ok(())
}

fn row(job: &ScheduledJob) -> Vec<String> {
    vec![
        job.id.to_string(),
        job.target.clone(),
        job.direction.to_string(),
        fmt_ts(Some(job.run_at)),
    ]
}
