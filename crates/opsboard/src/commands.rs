//! Command handlers wiring config, store, and service together.

use anyhow::{anyhow, bail, Context, Result};
use opsboard_app::{
    find_template, report_startup, AppConfig, Notifier, Severity, TaskPatch, TaskService,
};
use opsboard_core::{Period, Priority, SortMode, Status, TaskDraft, TaskId, ViewQuery};
use opsboard_store::{FileMedium, SnapshotStore};
use std::collections::BTreeSet;
use std::io::{self, Write as _};
use std::path::PathBuf;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::{Cli, Command};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Notifier that prints to the terminal. Warnings and errors go to stderr so
/// piped output stays clean.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Warning | Severity::Error => {
                eprintln!("[{}] {message}", severity.as_str());
            }
            Severity::Info | Severity::Success => {
                println!("[{}] {message}", severity.as_str());
            }
        }
    }
}

struct AddArgs {
    title: Option<String>,
    description: Option<String>,
    due: Option<String>,
    center: Option<String>,
    priority: Option<String>,
    tags: Vec<String>,
    template: Option<String>,
}

struct EditArgs {
    id: String,
    title: Option<String>,
    description: Option<String>,
    due: Option<String>,
    center: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    tags: Vec<String>,
}

/// Dispatch the parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(scope) = cli.scope {
        config.storage.scope = scope;
    }
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }

    let data_dir = config
        .storage
        .resolve_data_dir()
        .ok_or_else(|| anyhow!("no data directory available; set storage.data_dir"))?;
    let store = SnapshotStore::new(FileMedium::new(&data_dir), config.storage.scope.clone());
    let notifier = ConsoleNotifier;

    let storage_available = store.check_availability();
    let mut service = TaskService::open(store);
    report_startup(&service, storage_available, today(), &notifier);

    match cli.cmd {
        Command::Add {
            title,
            description,
            due,
            center,
            priority,
            tags,
            template,
        } => add(
            &mut service,
            &config,
            &notifier,
            AddArgs {
                title,
                description,
                due,
                center,
                priority,
                tags,
                template,
            },
        ),
        Command::List {
            search,
            center,
            status,
            period,
            sort,
        } => list(&service, search, center, status, period, sort),
        Command::Edit {
            id,
            title,
            description,
            due,
            center,
            status,
            priority,
            tags,
        } => edit(
            &mut service,
            &config,
            &notifier,
            EditArgs {
                id,
                title,
                description,
                due,
                center,
                status,
                priority,
                tags,
            },
        ),
        Command::Rm { id, force } => rm(&mut service, &notifier, &id, force),
        Command::Cycle { id } => cycle(&mut service, &notifier, &id),
        Command::Export { out } => export(&service, &notifier, out),
        Command::Import { path } => import(&mut service, &notifier, &path),
        Command::Stats => stats(&service),
        Command::Archive => archive(&service, &notifier),
        Command::Doctor => doctor(&service, &data_dir),
    }
}

fn add(
    service: &mut TaskService<FileMedium>,
    config: &AppConfig,
    notifier: &ConsoleNotifier,
    args: AddArgs,
) -> Result<()> {
    let mut title = args.title.unwrap_or_default();
    let mut description = args.description.unwrap_or_default();
    let mut priority = args.priority.as_deref().map(parse_priority).transpose()?;
    let mut due = args.due.as_deref().map(parse_due).transpose()?;

    if let Some(name) = args.template {
        let template =
            find_template(&name).ok_or_else(|| anyhow!("unknown template '{name}'"))?;
        if title.is_empty() {
            title = template.title.to_owned();
        }
        if description.is_empty() {
            description = template.description.to_owned();
        }
        if priority.is_none() {
            priority = Some(template.priority);
        }
        if due.is_none() {
            // Templated tasks default to tomorrow.
            due = today().next_day();
        }
        notifier.notify("Template loaded", Severity::Info);
    }

    let center = args
        .center
        .or_else(|| config.centers.default_center().map(str::to_owned))
        .ok_or_else(|| anyhow!("no center given; pass --center or configure default_center"))?;
    config.centers.validate_center(&center)?;

    let draft = TaskDraft {
        title,
        description,
        date: due,
        center,
        priority,
        tags: args.tags.into_iter().collect::<BTreeSet<_>>(),
    };

    let outcome = service.add(draft).context("task was not added")?;
    if outcome.persisted {
        notifier.notify("Task added successfully", Severity::Success);
    } else {
        notifier.notify("Failed to save tasks", Severity::Error);
    }
    println!("{}", outcome.task.id);
    Ok(())
}

fn list(
    service: &TaskService<FileMedium>,
    search: Option<String>,
    center: Option<String>,
    status: Option<String>,
    period: Option<String>,
    sort: Option<String>,
) -> Result<()> {
    let status = match status.as_deref() {
        None | Some("all") => None,
        Some(token) => Some(parse_status(token)?),
    };
    let query = ViewQuery {
        search,
        center: center.filter(|value| value.as_str() != "all"),
        status,
        period: period.as_deref().map(Period::parse).unwrap_or_default(),
        sort: sort
            .as_deref()
            .map_or(Some(SortMode::DateDesc), SortMode::parse),
    };

    let today = today();
    let view = service.view(&query, today);
    if view.is_empty() {
        println!("No tasks match the current filters.");
        return Ok(());
    }

    for task in &view {
        let overdue = if task.is_overdue(today) { "  [overdue]" } else { "" };
        let tags = if task.tags.is_empty() {
            String::new()
        } else {
            format!(
                "  #{}",
                task.tags.iter().cloned().collect::<Vec<_>>().join(" #")
            )
        };
        println!(
            "{}  {}  {:<11}  {:<6}  {:<8}  {}{overdue}{tags}",
            task.id, task.date, task.status, task.priority, task.center, task.title
        );
    }
    Ok(())
}

fn edit(
    service: &mut TaskService<FileMedium>,
    config: &AppConfig,
    notifier: &ConsoleNotifier,
    args: EditArgs,
) -> Result<()> {
    let id = parse_id(&args.id)?;
    if let Some(center) = args.center.as_deref() {
        config.centers.validate_center(center)?;
    }

    let patch = TaskPatch {
        title: args.title,
        description: args.description,
        date: args.due.as_deref().map(parse_due).transpose()?,
        center: args.center,
        status: args.status.as_deref().map(parse_status).transpose()?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        tags: if args.tags.is_empty() {
            None
        } else {
            Some(args.tags.into_iter().collect())
        },
    };
    if patch.is_empty() {
        bail!("nothing to change; pass at least one field");
    }

    let outcome = service.update(id, patch).context("task was not updated")?;
    if outcome.persisted {
        notifier.notify("Task updated successfully", Severity::Success);
    } else {
        notifier.notify("Failed to save tasks", Severity::Error);
    }
    Ok(())
}

fn rm(
    service: &mut TaskService<FileMedium>,
    notifier: &ConsoleNotifier,
    id: &str,
    force: bool,
) -> Result<()> {
    let id = parse_id(id)?;
    if !force {
        let Some(task) = service.tasks().iter().find(|task| task.id == id) else {
            println!("No task with that id.");
            return Ok(());
        };
        if !confirm(&format!("Delete '{}'?", task.title))? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let outcome = service.delete(id);
    if !outcome.removed {
        println!("No task with that id.");
        return Ok(());
    }
    if outcome.persisted {
        notifier.notify("Task deleted", Severity::Info);
    } else {
        notifier.notify("Failed to save tasks", Severity::Error);
    }
    Ok(())
}

fn cycle(
    service: &mut TaskService<FileMedium>,
    notifier: &ConsoleNotifier,
    id: &str,
) -> Result<()> {
    let id = parse_id(id)?;
    let Some(outcome) = service.cycle_status(id) else {
        println!("No task with that id.");
        return Ok(());
    };
    if outcome.persisted {
        notifier.notify(
            &format!("Status changed to {}", outcome.task.status),
            Severity::Success,
        );
    } else {
        notifier.notify("Failed to save tasks", Severity::Error);
    }
    Ok(())
}

fn export(
    service: &TaskService<FileMedium>,
    notifier: &ConsoleNotifier,
    out: Option<PathBuf>,
) -> Result<()> {
    let document = service.export();
    let path = out.unwrap_or_else(|| PathBuf::from(format!("opsboard-tasks-{}.json", today())));
    let serialized =
        serde_json::to_string_pretty(&document).context("failed to serialize export")?;
    std::fs::write(&path, serialized)
        .with_context(|| format!("failed to write {}", path.display()))?;
    notifier.notify(
        &format!("Tasks exported successfully to {}", path.display()),
        Severity::Success,
    );
    Ok(())
}

fn import(
    service: &mut TaskService<FileMedium>,
    notifier: &ConsoleNotifier,
    path: &std::path::Path,
) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let report = service.import_raw(&raw).context("failed to import tasks")?;
    notifier.notify(
        &format!(
            "Tasks imported successfully: {} tasks from {}",
            report.imported, report.domain
        ),
        Severity::Success,
    );
    Ok(())
}

fn stats(service: &TaskService<FileMedium>) -> Result<()> {
    let stats = service.stats();
    println!("Total Tasks: {}", stats.total);
    println!("Pending Tasks: {}", stats.pending);
    println!("Tasks in Progress: {}", stats.in_progress);
    println!("Completed Tasks: {}", stats.completed);
    println!("Overdue Tasks: {}", service.overdue_count(today()));
    Ok(())
}

fn archive(service: &TaskService<FileMedium>, notifier: &ConsoleNotifier) -> Result<()> {
    if service.store().archive_snapshot() {
        notifier.notify("Backup created successfully", Severity::Success);
        Ok(())
    } else {
        bail!("failed to create backup");
    }
}

fn doctor(service: &TaskService<FileMedium>, data_dir: &std::path::Path) -> Result<()> {
    let store = service.store();
    println!("Scope: {}", store.scope());
    println!("Data directory: {}", data_dir.display());
    println!(
        "Storage available: {}",
        if store.check_availability() { "yes" } else { "no" }
    );
    match store.last_sync() {
        Some(last_sync) => println!("Last sync: {last_sync}"),
        None => println!("Last sync: never"),
    }
    println!("Tasks on record: {}", service.tasks().len());
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

fn parse_due(raw: &str) -> Result<Date> {
    Date::parse(raw.trim(), DATE_FORMAT)
        .with_context(|| format!("invalid due date '{raw}', expected YYYY-MM-DD"))
}

fn parse_id(raw: &str) -> Result<TaskId> {
    raw.trim()
        .parse()
        .with_context(|| format!("invalid task id '{raw}'"))
}

fn parse_status(raw: &str) -> Result<Status> {
    Status::parse(raw)
        .ok_or_else(|| anyhow!("invalid status '{raw}', expected pending, in_progress, or completed"))
}

fn parse_priority(raw: &str) -> Result<Priority> {
    Priority::parse(raw)
        .ok_or_else(|| anyhow!("invalid priority '{raw}', expected low, medium, or high"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_dates_parse_day_granularity() {
        let parsed = parse_due(" 2024-06-01 ")
            .unwrap_or_else(|err| panic!("date must parse: {err}"));
        assert_eq!(parsed, time::macros::date!(2024 - 06 - 01));
        assert!(parse_due("06/01/2024").is_err());
    }

    #[test]
    fn filter_tokens_reject_unknown_values() {
        assert!(parse_status("pending").is_ok());
        assert!(parse_status("archived").is_err());
        assert!(parse_priority("high").is_ok());
        assert!(parse_priority("urgent").is_err());
    }
}
