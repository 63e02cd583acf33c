use crate::output::{fmt_ts, print_json, print_table};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use embargo_core::{
    config::{Config, ItemDefaults},
    embargo,
    gate::SuppressionGate,
    item::{ContentItem, ItemRecord},
    jobs::JobDb,
    paths,
    record::WorkflowBinding,
    types::{parse_timestamp, Direction},
};
use std::path::Path;

#[derive(Subcommand)]
pub enum ItemSubcommand {
    /// Create a new content item (unpublished)
    Create {
        slug: String,
        #[arg(long)]
        title: Option<String>,
        /// Initial draft content
        #[arg(long)]
        content: Option<String>,
        /// Create without embargo/expiry support
        #[arg(long)]
        plain: bool,
        /// Create without workflow support
        #[arg(long)]
        ungoverned: bool,
        /// Bind a workflow definition
        #[arg(long, conflicts_with = "ungoverned")]
        workflow: Option<String>,
    },
    /// List all items
    List,
    /// Show item details
    Show { slug: String },
    /// Edit an item and save it (queues embargo/expiry jobs unless governed)
    Edit {
        slug: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Desired publish date (RFC 3339), or "clear"
        #[arg(long, value_name = "WHEN")]
        publish_at: Option<String>,
        /// Desired unpublish date (RFC 3339), or "clear"
        #[arg(long, value_name = "WHEN")]
        unpublish_at: Option<String>,
        /// Bind a workflow definition
        #[arg(long)]
        workflow: Option<String>,
        /// Remove the workflow binding
        #[arg(long, conflicts_with = "workflow")]
        unbind: bool,
    },
}

pub fn run(root: &Path, subcmd: ItemSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ItemSubcommand::Create {
            slug,
            title,
            content,
            plain,
            ungoverned,
            workflow,
        } => create(
            root,
            &slug,
            title,
            content,
            ItemDefaultsOverride { plain, ungoverned },
            workflow.as_deref(),
            json,
        ),
        ItemSubcommand::List => list(root, json),
        ItemSubcommand::Show { slug } => show(root, &slug, json),
        ItemSubcommand::Edit {
            slug,
            title,
            content,
            publish_at,
            unpublish_at,
            workflow,
            unbind,
        } => edit(
            root,
            &slug,
            Edits {
                title,
                content,
                publish_at,
                unpublish_at,
                workflow,
                unbind,
            },
            json,
        ),
    }
}

struct ItemDefaultsOverride {
    plain: bool,
    ungoverned: bool,
}

impl ItemDefaultsOverride {
    fn apply(&self, defaults: &ItemDefaults) -> ItemDefaults {
        ItemDefaults {
            timing: defaults.timing && !self.plain,
            workflow: defaults.workflow && !self.ungoverned,
        }
    }
}

struct Edits {
    title: Option<String>,
    content: Option<String>,
    publish_at: Option<String>,
    unpublish_at: Option<String>,
    workflow: Option<String>,
    unbind: bool,
}

/// Parse a desired-date flag: `"clear"` unsets, anything else is RFC 3339.
fn parse_desired(raw: &str) -> anyhow::Result<Option<DateTime<Utc>>> {
    if raw == "clear" {
        return Ok(None);
    }
    Ok(Some(parse_timestamp(raw)?))
}

fn bind(item: &mut ContentItem, config: &Config, workflow: &str) -> anyhow::Result<()> {
    config.workflow(workflow)?;
    let Some(binding) = item.workflow.as_mut() else {
        anyhow::bail!("item '{}' does not support workflows", item.slug);
    };
    *binding = WorkflowBinding::bound(workflow);
    Ok(())
}

fn create(
    root: &Path,
    slug: &str,
    title: Option<String>,
    content: Option<String>,
    overrides: ItemDefaultsOverride,
    workflow: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let defaults = overrides.apply(&config.defaults);
    if let Some(name) = workflow {
        config.workflow(name)?;
    }

    let title = title.unwrap_or_else(|| slug.replace('-', " "));
    let mut item = ContentItem::create(root, slug, &title, &defaults)
        .with_context(|| format!("failed to create item '{slug}'"))?;

    if content.is_some() || workflow.is_some() {
        if let Some(content) = content {
            item.content = content;
        }
        if let Some(name) = workflow {
            bind(&mut item, &config, name)?;
        }
        item.save(root).context("failed to save item")?;
    }

    if json {
        print_json(&item)?;
    } else {
        println!("Created item '{slug}': {title}");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let items = ContentItem::list(root).context("failed to list items")?;

    if json {
        print_json(&items)?;
        return Ok(());
    }

    if items.is_empty() {
        println!("No items.");
        return Ok(());
    }

    let rows = items
        .iter()
        .map(|item| {
            let timing = item.timing.clone().unwrap_or_default();
            vec![
                item.slug.clone(),
                item.title.clone(),
                status(item).to_string(),
                fmt_ts(timing.publish_on_at.or(timing.desired_publish_at)),
                fmt_ts(timing.unpublish_on_at.or(timing.desired_unpublish_at)),
                workflow_label(item),
            ]
        })
        .collect();
    print_table(
        &["SLUG", "TITLE", "STATUS", "PUBLISH", "UNPUBLISH", "WORKFLOW"],
        rows,
    );
    Ok(())
}

fn status(item: &ContentItem) -> &'static str {
    if item.is_published() {
        "published"
    } else {
        "draft"
    }
}

fn workflow_label(item: &ContentItem) -> String {
    match &item.workflow {
        None => "n/a".to_string(),
        Some(WorkflowBinding { definition: None }) => "-".to_string(),
        Some(WorkflowBinding {
            definition: Some(name),
        }) => name.clone(),
    }
}

fn show(root: &Path, slug: &str, json: bool) -> anyhow::Result<()> {
    let item = ContentItem::load(root, slug).with_context(|| format!("item '{slug}' not found"))?;

    if json {
        print_json(&item)?;
        return Ok(());
    }

    println!("Item: {} ({})", item.title, item.slug);
    println!("Status: {}", status(&item));
    if let Some(live) = &item.live {
        println!("Live since: {}", live.published_at.to_rfc3339());
    }
    println!("Workflow: {}", workflow_label(&item));

    match &item.timing {
        None => println!("Embargo/expiry: not supported"),
        Some(timing) => {
            println!("\nSchedule:");
            for &direction in Direction::all() {
                let job = timing
                    .job(direction)
                    .map(|j| j.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {direction:<10} desired {}  on {}  job {job}",
                    fmt_ts(timing.desired(direction)),
                    fmt_ts(timing.on_at(direction)),
                );
            }
        }
    }
    Ok(())
}

fn edit(root: &Path, slug: &str, edits: Edits, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut item = ContentItem::load(root, slug).with_context(|| format!("item '{slug}' not found"))?;

    if let Some(title) = edits.title {
        item.title = title;
    }
    if let Some(content) = edits.content {
        item.content = content;
    }

    for (direction, raw) in [
        (Direction::Publish, edits.publish_at.as_deref()),
        (Direction::Unpublish, edits.unpublish_at.as_deref()),
    ] {
        let Some(raw) = raw else { continue };
        let at = parse_desired(raw)?;
        let Some(timing) = item.timing.as_mut() else {
            anyhow::bail!("item '{slug}' does not support embargo/expiry dates");
        };
        timing.set_desired(direction, at);
    }

    if let Some(name) = edits.workflow.as_deref() {
        bind(&mut item, &config, name)?;
    }
    if edits.unbind {
        if let Some(binding) = item.workflow.as_mut() {
            binding.definition = None;
        }
    }

    let jobs = JobDb::open(&paths::jobs_db_path(root)).context("failed to open job queue")?;
    let gate = SuppressionGate::new(&config);
    let mut record = ItemRecord::new(root, item);
    let queued = embargo::write(&mut record, &jobs, &gate)
        .with_context(|| format!("failed to save item '{slug}'"))?;

    if json {
        let queued: Vec<_> = queued
            .iter()
            .map(|(direction, job)| serde_json::json!({ "direction": direction, "job": job }))
            .collect();
        print_json(&serde_json::json!({
            "item": record.item,
            "queued": queued,
        }))?;
    } else {
        println!("Saved item '{slug}'");
        for (direction, job) in &queued {
            println!("  queued {direction} job {job}");
        }
    }
    Ok(())
}
