//! Data structures for integrity signals.

use serde::{Deserialize, Serialize};

/// A behavioral signal raised while an assessment attempt is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrityFlagKind {
    /// The page became hidden (tab switch).
    TabSwitch,
    /// The window lost focus.
    FocusLost,
    /// A clipboard copy happened.
    CopyAttempt,
}

impl IntegrityFlagKind {
    pub fn as_tag(&self) -> &'static str {
        match self {
            IntegrityFlagKind::TabSwitch => "TAB_SWITCH",
            IntegrityFlagKind::FocusLost => "FOCUS_LOST",
            IntegrityFlagKind::CopyAttempt => "COPY_ATTEMPT",
        }
    }

    /// Parse a tag, accepting either case.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "TAB_SWITCH" => Some(IntegrityFlagKind::TabSwitch),
            "FOCUS_LOST" => Some(IntegrityFlagKind::FocusLost),
            "COPY_ATTEMPT" => Some(IntegrityFlagKind::CopyAttempt),
            _ => None,
        }
    }
}

impl std::fmt::Display for IntegrityFlagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}

/// One recorded signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityFlag {
    pub kind: IntegrityFlagKind,
    pub timestamp: u64,
}

/// Per-kind signal counts for one attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegritySummary {
    pub tab_switches: u32,
    pub focus_lost: u32,
    pub copy_attempts: u32,
}

impl IntegritySummary {
    /// Count the flags in a list.
    pub fn from_flags(flags: &[IntegrityFlag]) -> Self {
        let mut summary = Self::default();
        for flag in flags {
            match flag.kind {
                IntegrityFlagKind::TabSwitch => summary.tab_switches += 1,
                IntegrityFlagKind::FocusLost => summary.focus_lost += 1,
                IntegrityFlagKind::CopyAttempt => summary.copy_attempts += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> u32 {
        self.tab_switches + self.focus_lost + self.copy_attempts
    }
}
