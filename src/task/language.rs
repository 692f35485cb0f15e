//! Notations under study and the counterbalanced order participants see them in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Jayvee pipeline configuration.
    Jv,
    /// Python with pandas.
    Py,
}

impl Language {
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Jv => "jv",
            Language::Py => "py",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Jv => "Jayvee",
            Language::Py => "Python",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jv" => Ok(Language::Jv),
            "py" => Ok(Language::Py),
            other => Err(Error::UnknownLanguage(other.to_string())),
        }
    }
}

/// Experiment group selecting which language comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    AB,
    BA,
}

impl Group {
    pub const ALL: [Group; 2] = [Group::AB, Group::BA];

    pub fn as_str(&self) -> &'static str {
        match self {
            Group::AB => "AB",
            Group::BA => "BA",
        }
    }

    pub fn other(&self) -> Group {
        match self {
            Group::AB => Group::BA,
            Group::BA => Group::AB,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AB" => Ok(Group::AB),
            "BA" => Ok(Group::BA),
            other => Err(Error::UnknownGroup(other.to_string())),
        }
    }
}

/// Indices of the warm-up tasks. They are not measured and use the same
/// language in both groups.
pub const EXAMPLE_TASKS: [usize; 2] = [0, 5];

/// One language per task index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LanguageSequence(Vec<Language>);

impl LanguageSequence {
    pub fn get(&self, index: usize) -> Option<Language> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Language] {
        &self.0
    }
}

/// The fixed language order for `group`. Deterministic so a restarted run
/// resumes with the same assignment.
pub fn sequence_for(group: Group) -> LanguageSequence {
    use Language::{Jv, Py};
    let languages = match group {
        Group::AB => vec![Jv, Jv, Py, Jv, Py, Jv, Jv, Py, Jv, Py],
        Group::BA => vec![Jv, Py, Jv, Py, Jv, Jv, Py, Jv, Py, Jv],
    };
    LanguageSequence(languages)
}
