use super::RuleSet;
use crate::dates::{Culture, DateFormat};
use crate::error::RuleLoadError;
use crate::types::{DateSpec, Keyword, Rule};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const RULE_FILE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// A rule as written in a rule file. The rule name is the mapping key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub destination_path: PathBuf,
    pub filename_pattern: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub date_format: Option<String>,
    #[serde(default, alias = "date_format_parse")]
    pub date_format_tryparse: Option<String>,
    #[serde(default)]
    pub date_skip: u32,
    #[serde(default)]
    pub culture_info: Option<String>,
}

/// Accumulates rules from one or more rule files, preserving order.
pub struct RuleLoader {
    default_culture: Culture,
    rules: Vec<Rule>,
    /// Every declared name and the file it came from, dropped rules included
    declared: HashMap<String, PathBuf>,
    dropped: Vec<String>,
}

impl RuleLoader {
    pub fn new(default_culture: Culture) -> Self {
        Self {
            default_culture,
            rules: Vec::new(),
            declared: HashMap::new(),
            dropped: Vec::new(),
        }
    }

    pub fn load_file(&mut self, path: &Path) -> Result<(), RuleLoadError> {
        let content = fs::read_to_string(path).map_err(|source| RuleLoadError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_source(path, &content)
    }

    /// Add every rule declared in `content`, in declaration order
    pub fn add_source(&mut self, path: &Path, content: &str) -> Result<(), RuleLoadError> {
        let parse_error = |source: serde_yaml::Error| RuleLoadError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let mapping: serde_yaml::Mapping = serde_yaml::from_str(content).map_err(parse_error)?;

        for (key, value) in mapping {
            let name = match key.as_str() {
                Some(name) => name.to_string(),
                None => {
                    return Err(RuleLoadError::InvalidRule {
                        name: format!("{key:?}"),
                        path: path.to_path_buf(),
                        reason: "rule names must be strings".to_string(),
                    })
                }
            };
            let definition: RuleDefinition = serde_yaml::from_value(value).map_err(parse_error)?;
            self.add_rule(path, name, definition)?;
        }

        Ok(())
    }

    pub fn add_rule(
        &mut self,
        path: &Path,
        name: String,
        definition: RuleDefinition,
    ) -> Result<(), RuleLoadError> {
        if self.declared.contains_key(&name) {
            return Err(RuleLoadError::DuplicateName {
                name,
                path: path.to_path_buf(),
            });
        }
        self.declared.insert(name.clone(), path.to_path_buf());

        let rule = self.compile(path, name, definition)?;

        if !rule.destination_path.is_dir() {
            println!(
                "⚠️  Rule '{}' ignored: destination path does not exist '{}'",
                rule.name,
                rule.destination_path.display()
            );
            warn!(rule = %rule.name, "destination path missing, rule dropped");
            self.dropped.push(rule.name);
            return Ok(());
        }

        info!(rule = %rule.name, keywords = rule.keywords.len(), "rule loaded");
        self.rules.push(rule);
        Ok(())
    }

    /// Names of rules dropped because their destination does not exist
    pub fn dropped(&self) -> &[String] {
        &self.dropped
    }

    pub fn finish(self) -> RuleSet {
        RuleSet::new(self.rules)
    }

    fn compile(
        &self,
        path: &Path,
        name: String,
        definition: RuleDefinition,
    ) -> Result<Rule, RuleLoadError> {
        let invalid = |name: &str, reason: String| RuleLoadError::InvalidRule {
            name: name.to_string(),
            path: path.to_path_buf(),
            reason,
        };

        if definition.keywords.is_empty() {
            return Err(invalid(&name, "at least one keyword is required".to_string()));
        }

        let keywords = definition
            .keywords
            .iter()
            .map(|pattern| {
                case_insensitive(pattern)
                    .map(|regex| Keyword {
                        pattern: pattern.clone(),
                        regex,
                    })
                    .map_err(|e| invalid(&name, format!("invalid keyword '{pattern}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let date = match &definition.date_format {
            None => None,
            Some(date_format) => {
                let pattern = case_insensitive(date_format).map_err(|e| {
                    invalid(&name, format!("invalid date_format '{date_format}': {e}"))
                })?;
                let parse_format = definition.date_format_tryparse.as_deref().ok_or_else(|| {
                    invalid(
                        &name,
                        "date_format_tryparse is required when date_format is set".to_string(),
                    )
                })?;

                Some(DateSpec {
                    pattern,
                    parse_format: DateFormat::parse(parse_format),
                    skip: definition.date_skip as usize,
                    culture: self.culture_for(&name, definition.culture_info.as_deref()),
                })
            }
        };

        Ok(Rule {
            name,
            destination_path: definition.destination_path,
            filename_pattern: definition.filename_pattern,
            keywords,
            date,
        })
    }

    fn culture_for(&self, rule_name: &str, culture_info: Option<&str>) -> Culture {
        match culture_info {
            None => self.default_culture.clone(),
            Some(id) => Culture::from_id(id).unwrap_or_else(|| {
                println!(
                    "⚠️  Rule '{}': unknown culture '{}', using '{}'",
                    rule_name,
                    id,
                    self.default_culture.id()
                );
                self.default_culture.clone()
            }),
        }
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Rule files in `dir`, sorted by file name
pub fn rule_files(dir: &Path) -> Result<Vec<PathBuf>, RuleLoadError> {
    let entries = fs::read_dir(dir).map_err(|source| RuleLoadError::ReadFolder {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| RULE_FILE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Load every rule file in `dir`
pub fn load_rules_folder(dir: &Path, default_culture: Culture) -> Result<RuleSet, RuleLoadError> {
    let mut loader = RuleLoader::new(default_culture);
    for file in rule_files(dir)? {
        println!("📁 Loading rules from: {}", file.display());
        loader.load_file(&file)?;
    }
    if !loader.dropped().is_empty() {
        println!(
            "⚠️  {} rule(s) ignored: {}",
            loader.dropped().len(),
            loader.dropped().join(", ")
        );
    }
    Ok(loader.finish())
}
