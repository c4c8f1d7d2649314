//! End-to-end pipeline tests.
//!
//! Each test builds a scratch workspace (inbox, destinations, archives,
//! transcripts, audit log) in a temporary directory and drives the pipeline
//! with scripted operator answers. Document text comes from an in-memory
//! extractor so no PDF parsing is involved.

use chrono::NaiveDate;
use doctidy_core::dates::Culture;
use doctidy_core::error::ExtractionError;
use doctidy_core::rules::RuleLoader;
use doctidy_core::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Fixture helpers
// ============================================================================

/// Returns canned text per file name; unknown names fail like a corrupt PDF
struct CannedExtractor {
    texts: HashMap<String, String>,
}

impl TextExtractor for CannedExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractionError> {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        self.texts.get(&name).cloned().ok_or(ExtractionError::Pdf {
            path: path.to_path_buf(),
            reason: "not a PDF".to_string(),
        })
    }

    fn name(&self) -> &str {
        "CannedExtractor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        path.extension().map(|e| e == "pdf").unwrap_or(false)
    }
}

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        for sub in ["inbox", "bills", "bank", "archives"] {
            fs::create_dir_all(ws.path(sub)).unwrap();
        }
        ws
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn scan(&self, name: &str) -> PathBuf {
        let path = self.path("inbox").join(name);
        fs::write(&path, format!("%PDF {name}")).unwrap();
        path
    }

    fn settings(&self) -> Settings {
        Settings {
            logs_file: self.path("logs.json"),
            pdf_input_folder: self.path("inbox"),
            transcriptions_folder: Some(self.path("transcriptions")),
            archives_folder: self.path("archives"),
            rules_folder: self.path("rules"),
            ..Settings::default()
        }
    }

    fn rules(&self) -> RuleSet {
        let yaml = r#"
bills:
  destination_path: "{bills}"
  filename_pattern: "Invoice #{date}"
  keywords: ["invoice", "amount due"]
  date_format: '\d{2}/\d{2}/\d{4}'
  date_format_tryparse: "dd/MM/yyyy"
  date_skip: 1
bank:
  destination_path: "{bank}"
  filename_pattern: "Statement {date}"
  keywords: ["statement", "iban"]
  date_format: '\d{1,2} \w+ \d{4}'
  date_format_tryparse: "dd MM yyyy"
  culture_info: fr-FR
"#
        .replace("{bills}", &self.path("bills").display().to_string().replace('\\', "/"))
        .replace("{bank}", &self.path("bank").display().to_string().replace('\\', "/"));

        let mut loader = RuleLoader::new(Culture::from_id("fr-FR").unwrap());
        loader.add_source(Path::new("rules.yaml"), &yaml).unwrap();
        loader.finish()
    }

    fn pipeline(
        &self,
        texts: &[(&str, &str)],
        decisions: ScriptedDecisions,
        dry_run: bool,
    ) -> ClassificationPipeline {
        let settings = self.settings();
        let replacements = doctidy_core::dates::ReplacementTable::compile(&[
            ("mars".to_string(), "03".to_string()),
            ("avril".to_string(), "04".to_string()),
        ])
        .unwrap();
        let audit_log = JsonAuditLog::open(&settings.logs_file).unwrap();

        ClassificationPipeline::new(PipelineContext {
            rules: self.rules(),
            replacements,
            extractor: Box::new(CannedExtractor {
                texts: texts
                    .iter()
                    .map(|(n, t)| (n.to_string(), t.to_string()))
                    .collect(),
            }),
            fs: Box::new(StdFileSystem::new()),
            audit_log: Box::new(audit_log),
            decisions: Box::new(decisions),
            dry_run,
            today: Some(ymd(2026, 1, 15)),
            settings,
        })
    }

    fn archive_count(&self) -> usize {
        fs::read_dir(self.path("archives")).unwrap().count()
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const INVOICE: &str = "ACME Corp\nInvoice 4711\nPrinted 02/05/2024\nInvoice date 10/03/2024\nAmount due: 120.00 EUR";
const STATEMENT: &str = "Banque Populaire\nRelevé / Statement\nIBAN FR76 0000\nParis, le 12 mars 2024";

// ============================================================================
// Batch behaviour
// ============================================================================

#[test]
fn batch_moves_reports_and_continues_past_failures() {
    let ws = Workspace::new();
    ws.scan("a_invoice.pdf");
    ws.scan("b_unknown.pdf");
    ws.scan("c_corrupt.pdf");
    ws.scan("d_statement.pdf");
    fs::write(ws.path("inbox").join("notes.txt"), "ignored").unwrap();

    let decisions = ScriptedDecisions::new().with_actions([Action::Move, Action::Copy]);
    let mut pipeline = ws.pipeline(
        &[
            ("a_invoice.pdf", INVOICE),
            ("b_unknown.pdf", "Dear customer, nothing to see"),
            ("d_statement.pdf", STATEMENT),
        ],
        decisions.clone(),
        false,
    );

    let report = pipeline.run_input_folder().unwrap();

    assert_eq!(report.processed, 4);
    assert_eq!(report.moved, 1);
    assert_eq!(report.copied, 1);
    assert_eq!(report.unclassified, 1);
    assert_eq!(report.extraction_failed, 1);

    // date_skip = 1 drops the print date and keeps the invoice date
    assert!(ws.path("bills").join("Invoice #20240310.pdf").exists());
    assert!(!ws.path("inbox").join("a_invoice.pdf").exists());

    // "12 mars 2024" -> "12 03 2024" -> 2024-03-12; copy leaves the source
    assert!(ws.path("bank").join("Statement 20240312.pdf").exists());
    assert!(ws.path("inbox").join("d_statement.pdf").exists());

    assert_eq!(ws.archive_count(), 2);
    assert!(ws.path("transcriptions").join("a_invoice.pdf.txt").exists());

    let entries = pipeline.audit_log().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].rule_name, "bills");
    assert_eq!(entries[0].dates, vec![ymd(2024, 5, 2), ymd(2024, 3, 10)]);
    assert_eq!(entries[0].keywords, vec!["invoice", "amount due"]);
    assert_eq!(entries[1].action, Action::Copy);

    // Only classified, non-colliding documents are prompted
    assert_eq!(decisions.asked(), vec!["action", "action"]);
}

#[test]
fn audit_log_survives_restart() {
    let ws = Workspace::new();
    let first = ws.scan("a_invoice.pdf");
    let mut pipeline = ws.pipeline(
        &[("a_invoice.pdf", INVOICE), ("b_invoice.pdf", INVOICE)],
        ScriptedDecisions::new().with_actions([Action::Skip]),
        false,
    );
    pipeline.process_batch(&[first]);
    drop(pipeline);

    // A second run appends to what the first one wrote
    let second = ws.scan("b_invoice.pdf");
    let mut pipeline = ws.pipeline(
        &[("b_invoice.pdf", INVOICE)],
        ScriptedDecisions::new().with_actions([Action::Skip]),
        false,
    );
    pipeline.process_batch(&[second]);

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(ws.path("logs.json")).unwrap()).unwrap();
    let logs = raw["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[1]["original"], ws.path("inbox").join("b_invoice.pdf").display().to_string());
    assert_eq!(logs[1]["action"], "Skip");
}

#[test]
fn disposition_error_does_not_stop_the_batch() {
    let ws = Workspace::new();
    // Text is available but the source file was removed before disposition
    let ghost = ws.path("inbox").join("ghost.pdf");
    let real = ws.scan("real.pdf");

    let mut pipeline = ws.pipeline(
        &[("ghost.pdf", INVOICE), ("real.pdf", STATEMENT)],
        ScriptedDecisions::new().with_actions([Action::Move, Action::Move]),
        false,
    );
    let report = pipeline.process_batch(&[ghost, real]);

    assert_eq!(report.failed, 1);
    assert_eq!(report.moved, 1);
    assert!(ws.path("bank").join("Statement 20240312.pdf").exists());
    // The failed document's intent was still logged before the archive copy failed
    assert_eq!(pipeline.audit_log().entries().len(), 2);
}

// ============================================================================
// Collisions, dry runs, unclassified documents
// ============================================================================

#[test]
fn collision_writes_nothing_in_either_mode() {
    for dry_run in [false, true] {
        let ws = Workspace::new();
        let source = ws.scan("invoice.pdf");
        fs::write(ws.path("bills").join("Invoice #20240310.pdf"), b"filed earlier").unwrap();

        let decisions = ScriptedDecisions::new().with_delete_answers([false]);
        let mut pipeline = ws.pipeline(&[("invoice.pdf", INVOICE)], decisions.clone(), dry_run);
        let outcome = pipeline.process_document(&source).unwrap();

        assert!(matches!(outcome, DocumentOutcome::Collision { source_deleted: false, .. }));
        assert!(pipeline.audit_log().entries().is_empty());
        assert_eq!(ws.archive_count(), 0);
        assert!(!ws.path("logs.json").exists());
        assert!(source.exists());
        if dry_run {
            assert!(decisions.asked().is_empty());
        } else {
            assert_eq!(decisions.asked(), vec!["open", "delete"]);
        }
    }
}

#[test]
fn dry_run_classifies_without_touching_anything() {
    let ws = Workspace::new();
    let source = ws.scan("invoice.pdf");
    let decisions = ScriptedDecisions::new().with_actions([Action::Move]);
    let mut pipeline = ws.pipeline(&[("invoice.pdf", INVOICE)], decisions.clone(), true);

    let outcome = pipeline.process_document(&source).unwrap();

    assert_eq!(outcome, DocumentOutcome::DryRun);
    assert!(source.exists());
    assert!(!ws.path("bills").join("Invoice #20240310.pdf").exists());
    assert_eq!(ws.archive_count(), 0);
    assert!(pipeline.audit_log().entries().is_empty());
    assert!(decisions.asked().is_empty());
}

#[test]
fn unclassified_leaves_log_and_files_alone() {
    let ws = Workspace::new();
    let source = ws.scan("letter.pdf");
    // "invoice" alone is a partial match for the bills rule
    let mut pipeline = ws.pipeline(
        &[("letter.pdf", "About your invoice")],
        ScriptedDecisions::new().with_actions([Action::Move]),
        false,
    );

    let outcome = pipeline.process_document(&source).unwrap();

    assert_eq!(outcome, DocumentOutcome::Unclassified);
    assert!(source.exists());
    assert!(pipeline.audit_log().entries().is_empty());
    assert_eq!(ws.archive_count(), 0);
}

#[test]
fn missing_date_falls_back_to_today() {
    let ws = Workspace::new();
    let source = ws.scan("invoice.pdf");
    let mut pipeline = ws.pipeline(
        &[("invoice.pdf", "Invoice without dates. Amount due: 3.00")],
        ScriptedDecisions::new().with_actions([Action::Copy]),
        false,
    );

    pipeline.process_document(&source).unwrap();

    assert!(ws.path("bills").join("Invoice #20260115.pdf").exists());
    assert!(pipeline.audit_log().entries()[0].dates.is_empty());
}
