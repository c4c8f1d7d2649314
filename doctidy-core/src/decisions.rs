//! Operator decisions
//!
//! Every interactive question the executor asks goes through
//! [`DecisionProvider`]. The CLI answers from the console; tests replay a
//! script with [`ScriptedDecisions`].

use crate::types::{Action, DispositionPlan, RetryDecision};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;

pub trait DecisionProvider {
    /// Move, copy or skip a classified document
    fn choose_action(&mut self, plan: &DispositionPlan) -> Action;

    /// The move failed; try again or leave the source where it is
    fn after_move_failure(&mut self, plan: &DispositionPlan, error: &anyhow::Error) -> RetryDecision;

    /// The destination already exists; show it in the file browser?
    fn open_existing(&mut self, destination: &Path) -> bool;

    /// The destination already exists; delete the source?
    fn delete_source(&mut self, source: &Path) -> bool;
}

#[derive(Debug, Default)]
struct Script {
    actions: VecDeque<Action>,
    retries: VecDeque<RetryDecision>,
    open_answers: VecDeque<bool>,
    delete_answers: VecDeque<bool>,
    asked: Vec<String>,
}

/// Replays fixed answers. Once a queue runs dry the answer is the safe one:
/// skip, ignore, no, no.
///
/// Clones share the same script, so a test can keep a handle after boxing
/// one into the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecisions {
    script: Rc<RefCell<Script>>,
}

impl ScriptedDecisions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actions(self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.script.borrow_mut().actions.extend(actions);
        self
    }

    pub fn with_retries(self, retries: impl IntoIterator<Item = RetryDecision>) -> Self {
        self.script.borrow_mut().retries.extend(retries);
        self
    }

    pub fn with_open_answers(self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.script.borrow_mut().open_answers.extend(answers);
        self
    }

    pub fn with_delete_answers(self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.script.borrow_mut().delete_answers.extend(answers);
        self
    }

    /// Questions asked so far, in order
    pub fn asked(&self) -> Vec<String> {
        self.script.borrow().asked.clone()
    }
}

impl DecisionProvider for ScriptedDecisions {
    fn choose_action(&mut self, _plan: &DispositionPlan) -> Action {
        let mut script = self.script.borrow_mut();
        script.asked.push("action".to_string());
        script.actions.pop_front().unwrap_or(Action::Skip)
    }

    fn after_move_failure(&mut self, _plan: &DispositionPlan, _error: &anyhow::Error) -> RetryDecision {
        let mut script = self.script.borrow_mut();
        script.asked.push("retry".to_string());
        script.retries.pop_front().unwrap_or(RetryDecision::Ignore)
    }

    fn open_existing(&mut self, _destination: &Path) -> bool {
        let mut script = self.script.borrow_mut();
        script.asked.push("open".to_string());
        script.open_answers.pop_front().unwrap_or(false)
    }

    fn delete_source(&mut self, _source: &Path) -> bool {
        let mut script = self.script.borrow_mut();
        script.asked.push("delete".to_string());
        script.delete_answers.pop_front().unwrap_or(false)
    }
}
