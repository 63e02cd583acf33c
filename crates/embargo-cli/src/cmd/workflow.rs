use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use embargo_core::{
    config::Config,
    engine::PublicationAction,
    item::{ContentItem, ItemRecord},
    jobs::JobDb,
    paths,
    record::TargetRecord,
    types::{Decision, Direction},
    workflow::{self, StepContext, WorkflowStep},
    EmbargoError,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum WorkflowSubcommand {
    /// List workflow definitions
    List,
    /// Complete the workflow bound to an item, running its publication actions
    Complete { slug: String },
    /// Run a single publication action against an item
    Run {
        slug: String,
        /// Action direction: publish or unpublish
        #[arg(long)]
        action: Direction,
        /// Fallback delay in days when the item has no desired date
        #[arg(long, default_value_t = 0)]
        delay_days: u32,
    },
}

pub fn run(
    root: &Path,
    subcmd: WorkflowSubcommand,
    now: DateTime<Utc>,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        WorkflowSubcommand::List => list(root, json),
        WorkflowSubcommand::Complete { slug } => complete(root, &slug, now, json),
        WorkflowSubcommand::Run {
            slug,
            action,
            delay_days,
        } => run_action(
            root,
            &slug,
            PublicationAction::new(action, delay_days),
            now,
            json,
        ),
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    if json {
        print_json(&config.workflows)?;
        return Ok(());
    }

    if config.workflows.is_empty() {
        println!("No workflow definitions.");
        return Ok(());
    }

    let rows = config
        .workflows
        .iter()
        .map(|(name, def)| {
            let actions = def
                .actions
                .iter()
                .map(|a| match a.delay_days() {
                    0 => a.direction().to_string(),
                    days => format!("{} (+{days}d)", a.direction()),
                })
                .collect::<Vec<_>>()
                .join(", ");
            vec![
                name.clone(),
                actions,
                def.description.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["NAME", "ACTIONS", "DESCRIPTION"], rows);
    Ok(())
}

fn report(slug: &str, decisions: &[Decision], json: bool) -> anyhow::Result<()> {
    if json {
        print_json(&serde_json::json!({ "item": slug, "decisions": decisions }))?;
    } else {
        for decision in decisions {
            println!("{slug}: {}", decision.summary());
        }
    }
    Ok(())
}

fn complete(root: &Path, slug: &str, now: DateTime<Utc>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut record =
        ItemRecord::load(root, slug).with_context(|| format!("item '{slug}' not found"))?;

    let name = record
        .item
        .workflow
        .as_ref()
        .and_then(|b| b.definition.clone())
        .ok_or_else(|| EmbargoError::NotGoverned(slug.to_string()))?;
    let definition = config.workflow(&name)?;

    let jobs = JobDb::open(&paths::jobs_db_path(root)).context("failed to open job queue")?;
    let target: &mut dyn TargetRecord = &mut record;
    let decisions = workflow::complete(definition, Some(target), &jobs, now)
        .with_context(|| format!("workflow '{name}' failed for item '{slug}'"))?;

    report(slug, &decisions, json)
}

fn run_action(
    root: &Path,
    slug: &str,
    action: PublicationAction,
    now: DateTime<Utc>,
    json: bool,
) -> anyhow::Result<()> {
    let jobs = JobDb::open(&paths::jobs_db_path(root)).context("failed to open job queue")?;
    let mut record = ContentItem::find(root, slug)?.map(|item| ItemRecord::new(root, item));

    let target = record.as_mut().map(|r| r as &mut dyn TargetRecord);
    let mut ctx = StepContext::new(target, &jobs, now);
    action
        .execute(&mut ctx)
        .with_context(|| format!("{} action failed for item '{slug}'", action.direction))?;

    report(slug, &ctx.decisions, json)
}
