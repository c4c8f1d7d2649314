use crate::rules::RuleSet;
use crate::types::Rule;
use tracing::debug;

/// Keyword evidence for one rule against one document
#[derive(Debug, Clone)]
pub struct RuleEvaluation<'r> {
    pub rule: &'r Rule,
    /// Subset of the rule's keywords found in the text, in rule order
    pub found_keywords: Vec<String>,
}

impl RuleEvaluation<'_> {
    /// Every keyword of the rule was found
    pub fn qualifies(&self) -> bool {
        self.found_keywords.len() == self.rule.keywords.len()
    }

    pub fn is_partial(&self) -> bool {
        !self.found_keywords.is_empty() && !self.qualifies()
    }
}

/// Outcome of matching one document against the rule set.
///
/// Built fresh for every document; nothing is stored on the rules.
#[derive(Debug, Clone)]
pub struct MatchResult<'r> {
    pub evaluations: Vec<RuleEvaluation<'r>>,
    winner: Option<usize>,
}

impl<'r> MatchResult<'r> {
    pub fn winner(&self) -> Option<&RuleEvaluation<'r>> {
        self.winner.map(|i| &self.evaluations[i])
    }

    pub fn rule(&self) -> Option<&'r Rule> {
        self.winner().map(|e| e.rule)
    }

    pub fn found_keywords(&self) -> &[String] {
        self.winner()
            .map(|e| e.found_keywords.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_unclassified(&self) -> bool {
        self.winner.is_none()
    }

    /// Rules that matched some but not all of their keywords
    pub fn partial_matches(&self) -> impl Iterator<Item = &RuleEvaluation<'r>> {
        self.evaluations.iter().filter(|e| e.is_partial())
    }
}

/// Selects the rule a document belongs to by keyword presence.
#[derive(Debug, Default)]
pub struct RuleMatcher;

impl RuleMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate every rule, then pick the qualifying rule with the most
    /// keywords. Ties go to the rule loaded first.
    pub fn evaluate<'r>(&self, text: &str, rules: &'r RuleSet) -> MatchResult<'r> {
        let evaluations: Vec<RuleEvaluation<'r>> = rules
            .iter()
            .map(|rule| RuleEvaluation {
                rule,
                found_keywords: rule
                    .keywords
                    .iter()
                    .filter(|k| k.is_found_in(text))
                    .map(|k| k.pattern.clone())
                    .collect(),
            })
            .collect();

        let mut winner: Option<usize> = None;
        for (i, evaluation) in evaluations.iter().enumerate() {
            if !evaluation.qualifies() {
                continue;
            }
            let better = match winner {
                None => true,
                Some(w) => evaluation.found_keywords.len() > evaluations[w].found_keywords.len(),
            };
            if better {
                winner = Some(i);
            }
        }

        for evaluation in &evaluations {
            if !evaluation.found_keywords.is_empty() {
                debug!(
                    rule = %evaluation.rule.name,
                    found = evaluation.found_keywords.len(),
                    total = evaluation.rule.keywords.len(),
                    "keyword evidence"
                );
            }
        }

        MatchResult {
            evaluations,
            winner,
        }
    }
}
