//! Screens a participant moves through, addressed by path.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Participant id and group entry.
    Metadata,
    Consent,
    Preparation,
    Task(usize),
    /// End page carrying the participant id.
    End(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Metadata => "/".to_string(),
            Route::Consent => "/consentSyntax".to_string(),
            Route::Preparation => "/prepareSyntax".to_string(),
            Route::Task(index) => format!("/s/{index}"),
            Route::End(id) => format!("/endSyntax/{id}"),
        }
    }

    pub fn parse(path: &str) -> Option<Self> {
        match path {
            "/" => return Some(Route::Metadata),
            "/consentSyntax" => return Some(Route::Consent),
            "/prepareSyntax" => return Some(Route::Preparation),
            _ => {}
        }
        if let Some(index) = path.strip_prefix("/s/") {
            return index.parse().ok().map(Route::Task);
        }
        path.strip_prefix("/endSyntax/")
            .filter(|id| !id.is_empty())
            .map(|id| Route::End(id.to_string()))
    }

    pub fn task_index(&self) -> Option<usize> {
        match self {
            Route::Task(index) => Some(*index),
            _ => None,
        }
    }

    pub fn location(&self) -> Location {
        Location {
            pathname: self.path(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Location context attached to every recorded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub pathname: String,
}

impl Location {
    /// Task index for `/s/{index}` locations.
    pub fn task_index(&self) -> Option<usize> {
        Route::parse(&self.pathname).and_then(|r| r.task_index())
    }
}
