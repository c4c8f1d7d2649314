// Disposition state machine
//
//   NoMatch            -> report only
//   MatchedNoCollision -> Move | Copy | Skip   (log entry written first)
//   MatchedCollision   -> offer open, offer delete (no log, no archive)
//
// A failed move loops on the operator's Retry / Ignore answer.

use crate::audit::AuditLog;
use crate::decisions::DecisionProvider;
use crate::fs::FileSystem;
use crate::types::{Action, DispositionPlan, DocumentOutcome, LogEntry, RetryDecision};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub enum DispositionState<'p> {
    NoMatch,
    MatchedNoCollision(&'p DispositionPlan),
    MatchedCollision(&'p DispositionPlan),
}

impl<'p> DispositionState<'p> {
    pub fn from_plan(plan: Option<&'p DispositionPlan>) -> Self {
        match plan {
            None => DispositionState::NoMatch,
            Some(plan) if plan.collision => DispositionState::MatchedCollision(plan),
            Some(plan) => DispositionState::MatchedNoCollision(plan),
        }
    }
}

pub struct DispositionExecutor<'a> {
    fs: &'a dyn FileSystem,
    audit_log: &'a mut dyn AuditLog,
    decisions: &'a mut dyn DecisionProvider,
    dry_run: bool,
}

impl<'a> DispositionExecutor<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        audit_log: &'a mut dyn AuditLog,
        decisions: &'a mut dyn DecisionProvider,
        dry_run: bool,
    ) -> Self {
        Self {
            fs,
            audit_log,
            decisions,
            dry_run,
        }
    }

    pub fn execute(&mut self, state: DispositionState<'_>) -> Result<DocumentOutcome> {
        match state {
            DispositionState::NoMatch => {
                println!("❌ no matched keywords found");
                Ok(DocumentOutcome::Unclassified)
            }
            DispositionState::MatchedNoCollision(plan) => self.dispose(plan),
            DispositionState::MatchedCollision(plan) => self.resolve_collision(plan),
        }
    }

    fn dispose(&mut self, plan: &DispositionPlan) -> Result<DocumentOutcome> {
        println!(
            "📦 copy or move {} to {}",
            plan.source.display(),
            plan.destination.display()
        );

        if self.dry_run {
            return Ok(DocumentOutcome::DryRun);
        }

        let action = self.decisions.choose_action(plan);
        self.audit_log
            .append(LogEntry::new(plan, action))
            .context("Failed to write audit log entry")?;
        info!(rule = %plan.rule_name, %action, "disposition logged");

        match action {
            Action::Skip => {
                println!("⏭️  skipped");
                Ok(DocumentOutcome::Skipped)
            }
            Action::Copy => {
                self.archive(plan)?;
                self.fs
                    .copy(&plan.source, &plan.destination)
                    .with_context(|| format!("Failed to copy to '{}'", plan.destination.display()))?;
                println!("✅ copied to {}", plan.destination.display());
                Ok(DocumentOutcome::Copied)
            }
            Action::Move => {
                self.archive(plan)?;
                Ok(self.move_with_retry(plan))
            }
        }
    }

    /// The archive keeps a pre-move snapshot whatever happens to the move
    fn archive(&self, plan: &DispositionPlan) -> Result<()> {
        if let Some(parent) = plan.archive.parent() {
            self.fs
                .create_dir_all(parent)
                .with_context(|| format!("Failed to create archive folder '{}'", parent.display()))?;
        }
        self.fs
            .copy(&plan.source, &plan.archive)
            .with_context(|| format!("Failed to archive to '{}'", plan.archive.display()))?;
        Ok(())
    }

    fn move_with_retry(&mut self, plan: &DispositionPlan) -> DocumentOutcome {
        let mut attempt = 1;
        loop {
            match self.fs.move_file(&plan.source, &plan.destination) {
                Ok(()) => {
                    println!("✅ moved to {}", plan.destination.display());
                    return DocumentOutcome::Moved;
                }
                Err(e) => {
                    let error = anyhow::Error::new(e)
                        .context(format!("Failed to move to '{}'", plan.destination.display()));
                    eprintln!("❌ {error:#}");
                    warn!(attempt, "move failed: {error:#}");

                    match self.decisions.after_move_failure(plan, &error) {
                        RetryDecision::Retry => attempt += 1,
                        RetryDecision::Ignore => {
                            println!("⏭️  move abandoned, source left in place");
                            return DocumentOutcome::MoveAbandoned;
                        }
                    }
                }
            }
        }
    }

    fn resolve_collision(&mut self, plan: &DispositionPlan) -> Result<DocumentOutcome> {
        println!(
            "⚠️  Destination file '{}' already exists",
            plan.destination.display()
        );

        if self.dry_run {
            return Ok(DocumentOutcome::Collision {
                opened: false,
                source_deleted: false,
            });
        }

        let mut opened = false;
        if self.decisions.open_existing(&plan.destination) {
            match self.fs.open_in_file_browser(&plan.destination) {
                Ok(()) => opened = true,
                Err(e) => eprintln!("⚠️  Could not open file browser: {e}"),
            }
        }

        let mut source_deleted = false;
        if self.decisions.delete_source(&plan.source) {
            self.remove_source(&plan.source)?;
            source_deleted = true;
        }

        Ok(DocumentOutcome::Collision {
            opened,
            source_deleted,
        })
    }

    fn remove_source(&self, source: &Path) -> Result<()> {
        self.fs
            .remove_file(source)
            .with_context(|| format!("Failed to delete '{}'", source.display()))?;
        println!("🗑️  deleted {}", source.display());
        Ok(())
    }
}
