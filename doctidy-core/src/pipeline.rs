use crate::audit::AuditLog;
use crate::classifier::RuleMatcher;
use crate::config::Settings;
use crate::dates::{DateResolver, ReplacementTable};
use crate::decisions::DecisionProvider;
use crate::executor::{DispositionExecutor, DispositionState};
use crate::extractors::TextExtractor;
use crate::fs::FileSystem;
use crate::planner::DispositionPlanner;
use crate::rules::RuleSet;
use crate::types::*;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything one run needs, built once at startup
pub struct PipelineContext {
    pub settings: Settings,
    pub rules: RuleSet,
    pub replacements: ReplacementTable,
    pub extractor: Box<dyn TextExtractor>,
    pub fs: Box<dyn FileSystem>,
    pub audit_log: Box<dyn AuditLog>,
    pub decisions: Box<dyn DecisionProvider>,
    pub dry_run: bool,
    /// Fixed "today" for date fallbacks; the local date when unset
    pub today: Option<NaiveDate>,
}

/// extract -> match -> resolve date -> plan -> execute, one document at a time
pub struct ClassificationPipeline {
    ctx: PipelineContext,
    matcher: RuleMatcher,
}

impl ClassificationPipeline {
    pub fn new(ctx: PipelineContext) -> Self {
        Self {
            ctx,
            matcher: RuleMatcher::new(),
        }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    pub fn audit_log(&self) -> &dyn AuditLog {
        self.ctx.audit_log.as_ref()
    }

    fn today(&self) -> NaiveDate {
        self.ctx.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Files in the input folder the extractor can read, by file name
    pub fn input_files(&self) -> Result<Vec<PathBuf>> {
        let folder = &self.ctx.settings.pdf_input_folder;
        let entries = std::fs::read_dir(folder)
            .with_context(|| format!("Failed to read input folder '{}'", folder.display()))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && self.ctx.extractor.supports_file_type(path))
            .collect();
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Process every file in the input folder
    pub fn run_input_folder(&mut self) -> Result<BatchReport> {
        let files = self.input_files()?;
        println!(
            "📂 {} document(s) in {}",
            files.len(),
            self.ctx.settings.pdf_input_folder.display()
        );
        Ok(self.process_batch(&files))
    }

    /// Process each document in turn. A failing document never stops the batch.
    pub fn process_batch(&mut self, paths: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::default();
        for path in paths {
            let outcome = match self.process_document(path) {
                Ok(outcome) => outcome,
                Err(e) => {
                    eprintln!("❌ {}: {e:#}", path.display());
                    warn!(path = %path.display(), "disposition failed: {e:#}");
                    DocumentOutcome::Failed(format!("{e:#}"))
                }
            };
            debug!(path = %path.display(), ?outcome, "document done");
            report.record(&outcome);
        }
        report
    }

    pub fn process_document(&mut self, path: &Path) -> Result<DocumentOutcome> {
        println!("\n📄 {}", path.display());
        info!(path = %path.display(), "processing");

        let text = match self.ctx.extractor.extract_text(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(DocumentOutcome::ExtractionFailed(e.to_string()));
            }
        };
        self.write_transcript(path, &text);

        let result = self.matcher.evaluate(&text, &self.ctx.rules);
        for partial in result.partial_matches() {
            debug!(
                "partial match {}: [{}] of {}",
                partial.rule.name,
                partial.found_keywords.join(", "),
                partial.rule.keywords.len()
            );
        }

        let plan = match result.rule() {
            None => None,
            Some(rule) => {
                println!("\t{} : [{}]", rule.name, result.found_keywords().join(", "));

                let resolution = DateResolver::new(&self.ctx.replacements).resolve(
                    &text,
                    rule.date.as_ref(),
                    self.today(),
                );
                if resolution.used_today_fallback() {
                    if let Some(spec) = &rule.date {
                        eprintln!(
                            "⚠️  No date found in document with format {}, using today",
                            spec.pattern.as_str()
                        );
                    }
                }
                println!("📅 {}", resolution.resolved);

                let planner =
                    DispositionPlanner::new(&self.ctx.settings.archives_folder, self.ctx.fs.as_ref());
                Some(planner.plan(path, rule, result.found_keywords(), &resolution))
            }
        };

        let mut executor = DispositionExecutor::new(
            self.ctx.fs.as_ref(),
            self.ctx.audit_log.as_mut(),
            self.ctx.decisions.as_mut(),
            self.ctx.dry_run,
        );
        executor.execute(DispositionState::from_plan(plan.as_ref()))
    }

    /// `<transcriptions>/<file name>.txt`; failures are reported and ignored
    fn write_transcript(&self, path: &Path, text: &str) {
        let Some(folder) = &self.ctx.settings.transcriptions_folder else {
            return;
        };
        let Some(name) = path.file_name() else {
            return;
        };

        let transcript = folder.join(format!("{}.txt", name.to_string_lossy()));
        let written = self
            .ctx
            .fs
            .create_dir_all(folder)
            .and_then(|_| self.ctx.fs.write_string(&transcript, text));
        if let Err(e) = written {
            eprintln!("⚠️  Could not write transcript '{}': {e}", transcript.display());
        }
    }
}
