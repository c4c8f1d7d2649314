//! Interactive prompts on the terminal.
//!
//! One line per answer. An empty line takes the prompt's default; end of input
//! or a read error takes the answer that leaves files where they are.

use colored::*;
use doctidy_core::{Action, DecisionProvider, DispositionPlan, RetryDecision};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::warn;

/// `copy/MOVE/skip [c/M/s]`: empty means move, anything unrecognised skips
pub fn parse_action(answer: &str) -> Action {
    match answer.trim().to_lowercase().as_str() {
        "" | "m" | "move" => Action::Move,
        "c" | "copy" => Action::Copy,
        _ => Action::Skip,
    }
}

/// `[R/i]`: only an explicit `i` gives up
pub fn parse_retry(answer: &str) -> RetryDecision {
    match answer.trim().to_lowercase().as_str() {
        "i" | "ignore" => RetryDecision::Ignore,
        _ => RetryDecision::Retry,
    }
}

/// `[y/N]` / `[Y/n]` style answer; empty takes `default`
pub fn parse_yes_no(answer: &str, default: bool) -> bool {
    match answer.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}

/// Answers the executor's questions from a reader, usually stdin
pub struct ConsoleDecisions<R, W> {
    input: R,
    output: W,
}

impl ConsoleDecisions<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleDecisions<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Asked once per run when neither `--dry-run` nor `--apply` is given
    pub fn ask_dry_run(&mut self) -> bool {
        match self.ask(&format!("{} [Y/n]", "dry run?".bold())) {
            Some(answer) => parse_yes_no(&answer, true),
            None => true,
        }
    }

    /// Print the prompt and read one line; `None` on end of input
    fn ask(&mut self, prompt: &str) -> Option<String> {
        if let Err(e) = write!(self.output, "{prompt} ").and_then(|_| self.output.flush()) {
            warn!("could not write prompt: {e}");
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(e) => {
                warn!("could not read answer: {e}");
                None
            }
        }
    }
}

impl<R: BufRead, W: Write> DecisionProvider for ConsoleDecisions<R, W> {
    fn choose_action(&mut self, _plan: &DispositionPlan) -> Action {
        match self.ask(&format!("{} [c/M/s]", "copy/MOVE/skip".cyan())) {
            Some(answer) => parse_action(&answer),
            None => Action::Skip,
        }
    }

    fn after_move_failure(&mut self, plan: &DispositionPlan, _error: &anyhow::Error) -> RetryDecision {
        let prompt = format!(
            "{} '{}' [R/i]",
            "retry moving".yellow(),
            plan.source.display()
        );
        match self.ask(&prompt) {
            Some(answer) => parse_retry(&answer),
            None => RetryDecision::Ignore,
        }
    }

    fn open_existing(&mut self, _destination: &Path) -> bool {
        match self.ask(&format!("{} [y/N]", "Open file?".yellow())) {
            Some(answer) => parse_yes_no(&answer, false),
            None => false,
        }
    }

    fn delete_source(&mut self, source: &Path) -> bool {
        let prompt = format!("{} [y/N] ({})", "delete source file?".red(), source.display());
        match self.ask(&prompt) {
            Some(answer) => parse_yes_no(&answer, false),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn plan() -> DispositionPlan {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        DispositionPlan {
            source: PathBuf::from("inbox/scan.pdf"),
            rule_name: "bills".to_string(),
            destination: PathBuf::from("bills/Bill 20240310.pdf"),
            archive: PathBuf::from("archives/x_scan.pdf_Bill 20240310.pdf"),
            document_date: date,
            dates: vec![date],
            found_keywords: vec!["bill".to_string()],
            collision: false,
        }
    }

    fn console(input: &str) -> ConsoleDecisions<Cursor<Vec<u8>>, Vec<u8>> {
        ConsoleDecisions::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_action_answers() {
        assert_eq!(parse_action("\n"), Action::Move);
        assert_eq!(parse_action("M\n"), Action::Move);
        assert_eq!(parse_action("c"), Action::Copy);
        assert_eq!(parse_action(" C \r\n"), Action::Copy);
        assert_eq!(parse_action("s"), Action::Skip);
        assert_eq!(parse_action("whatever"), Action::Skip);
    }

    #[test]
    fn test_retry_defaults_to_retry() {
        assert_eq!(parse_retry(""), RetryDecision::Retry);
        assert_eq!(parse_retry("r"), RetryDecision::Retry);
        assert_eq!(parse_retry("I"), RetryDecision::Ignore);
    }

    #[test]
    fn test_yes_no_defaults() {
        assert!(!parse_yes_no("", false));
        assert!(parse_yes_no("", true));
        assert!(parse_yes_no("Y", false));
        assert!(!parse_yes_no("n", true));
        assert!(!parse_yes_no("maybe", false));
    }

    #[test]
    fn test_answers_read_in_order() {
        let mut decisions = console("c\n\ny\n");
        let plan = plan();
        assert_eq!(decisions.choose_action(&plan), Action::Copy);
        assert_eq!(decisions.choose_action(&plan), Action::Move);
        assert!(decisions.delete_source(&plan.source));

        let prompts = String::from_utf8(decisions.output).unwrap();
        assert!(prompts.contains("[c/M/s]"));
        assert!(prompts.contains("scan.pdf"));
    }

    #[test]
    fn test_end_of_input_leaves_files_alone() {
        let mut decisions = console("");
        let plan = plan();
        let error = anyhow::anyhow!("locked");
        assert_eq!(decisions.choose_action(&plan), Action::Skip);
        assert_eq!(decisions.after_move_failure(&plan, &error), RetryDecision::Ignore);
        assert!(!decisions.open_existing(&plan.destination));
        assert!(!decisions.delete_source(&plan.source));
        assert!(decisions.ask_dry_run());
    }

    #[test]
    fn test_dry_run_prompt() {
        assert!(console("\n").ask_dry_run());
        assert!(!console("n\n").ask_dry_run());
    }
}
