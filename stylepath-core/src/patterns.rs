//! Reference pattern table (made by FontLab https://www.fontlab.com/)

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::prefix::TargetPrefix;

/// One way a source file may spell its path to the shared styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceForm {
    Alias,
    SameDir,
    ParentDir,
    GrandparentDir,
}

impl ReferenceForm {
    pub const ALL: [ReferenceForm; 4] = [
        ReferenceForm::Alias,
        ReferenceForm::SameDir,
        ReferenceForm::ParentDir,
        ReferenceForm::GrandparentDir,
    ];

    pub fn literal(self) -> &'static str {
        match self {
            ReferenceForm::Alias => "@/components/styles/",
            ReferenceForm::SameDir => "./styles/",
            ReferenceForm::ParentDir => "../styles/",
            ReferenceForm::GrandparentDir => "../../styles/",
        }
    }
}

/// Keyword that introduces the quoted reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keyword {
    Import,
    From,
}

impl Keyword {
    pub const ALL: [Keyword; 2] = [Keyword::Import, Keyword::From];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Import => "import",
            Keyword::From => "from",
        }
    }
}

#[derive(Debug, Clone)]
struct Rule {
    keyword: Keyword,
    form: ReferenceForm,
    matcher: Regex,
}

/// Result of running the table over one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    pub text: String,
    pub replacements: usize,
}

/// Compiled table of the eight keyword/form rules, applied in a fixed order.
#[derive(Debug, Clone)]
pub struct ReferencePatterns {
    rules: Vec<Rule>,
}

impl ReferencePatterns {
    pub fn new() -> Result<Self> {
        let mut rules = Vec::with_capacity(ReferenceForm::ALL.len() * Keyword::ALL.len());
        for form in ReferenceForm::ALL {
            for keyword in Keyword::ALL {
                let raw = format!(
                    r#"{} (['"]){}"#,
                    keyword.as_str(),
                    regex::escape(form.literal())
                );
                let matcher =
                    Regex::new(&raw).with_context(|| format!("invalid reference pattern: {raw}"))?;
                rules.push(Rule {
                    keyword,
                    form,
                    matcher,
                });
            }
        }
        Ok(Self { rules })
    }

    /// Keyword/form pairs in application order.
    pub fn order(&self) -> impl Iterator<Item = (Keyword, ReferenceForm)> + '_ {
        self.rules.iter().map(|r| (r.keyword, r.form))
    }

    /// Replace the path portion of every recognized reference with `prefix`.
    ///
    /// The keyword and the opening quote are kept; whatever follows the
    /// matched form (file name, closing quote) is left as it was.
    pub fn rewrite(&self, text: &str, prefix: &TargetPrefix) -> Rewritten {
        let mut current = text.to_string();
        let mut replacements = 0;

        for rule in &self.rules {
            let keyword = rule.keyword.as_str();
            if !rule.matcher.is_match(&current) {
                continue;
            }
            current = rule
                .matcher
                .replace_all(&current, |caps: &Captures<'_>| {
                    replacements += 1;
                    format!("{keyword} {}{}", &caps[1], prefix.as_str())
                })
                .into_owned();
        }

        Rewritten {
            text: current,
            replacements,
        }
    }

    /// True when any rule would fire on `text`.
    pub fn matches_any(&self, text: &str) -> bool {
        self.rules.iter().any(|r| r.matcher.is_match(text))
    }
}
