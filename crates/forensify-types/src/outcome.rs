//! Per-analysis outcome slot
//!
//! Each analysis is independent and optional: the report must render
//! whatever subset of results exists. `Analysis<T>` makes absence a
//! first-class value so a failed call never aborts its siblings.

use serde::{Deserialize, Serialize};

/// Why a result slot holds no value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum Absence {
    /// The caller never requested this analysis.
    NotRequested,
    /// The service answered successfully but had nothing to report;
    /// the corresponding report section renders an `N/A` placeholder.
    NotAvailable,
    /// The operation failed; the reason has already been logged.
    Failed(String),
}

/// Outcome of one analysis operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "outcome", content = "value")]
pub enum Analysis<T> {
    Found(T),
    Absent(Absence),
}

impl<T> Analysis<T> {
    pub fn not_requested() -> Self {
        Analysis::Absent(Absence::NotRequested)
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Analysis::Absent(Absence::Failed(reason.into()))
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Analysis::Found(_))
    }

    /// True when the slot produced a value or an explicit "nothing found",
    /// i.e. when its report section should render.
    pub fn is_reportable(&self) -> bool {
        matches!(self, Analysis::Found(_) | Analysis::Absent(Absence::NotAvailable))
    }

    pub fn as_found(&self) -> Option<&T> {
        match self {
            Analysis::Found(v) => Some(v),
            Analysis::Absent(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Analysis<U> {
        match self {
            Analysis::Found(v) => Analysis::Found(f(v)),
            Analysis::Absent(a) => Analysis::Absent(a),
        }
    }
}

impl<T> From<Option<T>> for Analysis<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Analysis::Found(v),
            None => Analysis::Absent(Absence::NotAvailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reportable_states() {
        assert!(Analysis::Found(1).is_reportable());
        assert!(Analysis::<i32>::Absent(Absence::NotAvailable).is_reportable());
        assert!(!Analysis::<i32>::failed("boom").is_reportable());
        assert!(!Analysis::<i32>::not_requested().is_reportable());
    }

    #[test]
    fn map_preserves_absence() {
        let absent: Analysis<i32> = Analysis::failed("timeout");
        let mapped = absent.map(|v| v * 2);
        assert_eq!(mapped, Analysis::Absent(Absence::Failed("timeout".into())));
    }
}
