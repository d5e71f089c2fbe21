//! Store-backed subcommands.
//!
//! Each command is generic over [`DataStore`] and writes plain text to the
//! given writer.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use planner_store::{
    is_completed, tasks_for_day, DataStore, DeletionReconciler, ReconcileOutcome, TaskFilter,
    Week,
};
use swipe_core::{ItemId, ItemKind, PendingDeletion};
use uuid::Uuid;

/// Dutch weekday labels, Monday first.
pub const DAY_NAMES: [&str; 7] = [
    "Maandag", "Dinsdag", "Woensdag", "Donderdag", "Vrijdag", "Zaterdag", "Zondag",
];

/// Print the tasks of one week, optionally a single weekday.
///
/// # Errors
///
/// Returns an error if the week is out of range or the store fails.
pub async fn print_tasks<S, W>(
    store: &S,
    today: NaiveDate,
    week_offset: i32,
    day: Option<u8>,
    filter: &TaskFilter,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: DataStore + ?Sized,
    W: Write,
{
    let week = Week::from_offset(today, week_offset).context("week offset out of range")?;
    if let Some(day) = day {
        anyhow::ensure!(day <= 6, "day must be 0 (Monday) to 6 (Sunday), got {day}");
    }

    let users = store.list_users().await?;
    let tasks = store.list_tasks().await?;
    let completions = store.list_completions(week.key()).await?;

    writeln!(out, "{} ({} - {})", week.key(), week.monday(), week.sunday())?;
    for index in 0..7u8 {
        if day.is_some_and(|d| d != index) {
            continue;
        }
        writeln!(out, "{} {}", DAY_NAMES[usize::from(index)], week.day(index))?;
        let shown = tasks_for_day(&tasks, index, &week, filter, &users);
        if shown.is_empty() {
            writeln!(out, "  -")?;
        }
        for task in shown {
            let mark = if is_completed(task.id, &completions) {
                "x"
            } else {
                " "
            };
            writeln!(
                out,
                "  [{mark}] {} ({}) {}",
                task.title,
                task.assignee_label(&users),
                task.id
            )?;
        }
    }
    Ok(())
}

/// Print open wishes grouped by category, then fulfilled ones.
///
/// # Errors
///
/// Returns an error if the store fails.
pub async fn print_wishes<S, W>(store: &S, out: &mut W) -> anyhow::Result<()>
where
    S: DataStore + ?Sized,
    W: Write,
{
    let wishes = store.list_wishes().await?;
    for (category, items) in planner_store::group_active_by_category(&wishes) {
        writeln!(out, "{category}")?;
        for wish in items {
            match wish.price_label() {
                Some(price) => writeln!(out, "  {} {price} {}", wish.title, wish.id)?,
                None => writeln!(out, "  {} {}", wish.title, wish.id)?,
            }
        }
    }

    let completed: Vec<_> = wishes.iter().filter(|w| w.is_completed).collect();
    if !completed.is_empty() {
        writeln!(out, "Vervuld ({})", completed.len())?;
        for wish in completed {
            writeln!(out, "  {} {}", wish.title, wish.id)?;
        }
    }
    Ok(())
}

/// Delete a task or wish through the reconciler, reporting a reload if
/// the delete did not persist.
///
/// # Errors
///
/// Returns an error if the reload after a failed delete also fails.
pub async fn delete_item<S, W>(
    store: Arc<S>,
    kind: ItemKind,
    id: Uuid,
    out: &mut W,
) -> anyhow::Result<ReconcileOutcome>
where
    S: DataStore + ?Sized,
    W: Write,
{
    let reconciler = DeletionReconciler::new(store);
    let outcome = reconciler
        .apply(PendingDeletion {
            item: ItemId::from_uuid(id),
            kind,
        })
        .await?;

    match &outcome {
        ReconcileOutcome::Deleted(_) => writeln!(out, "deleted {kind} {id}")?,
        ReconcileOutcome::Reloaded { error, items, .. } => {
            writeln!(out, "delete of {kind} {id} failed: {error}")?;
            writeln!(out, "reloaded {} {kind}(s)", items.item_ids().len())?;
        }
    }
    Ok(outcome)
}
