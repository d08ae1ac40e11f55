//! Calculation stages and their ordering
//!
//! The stages form a small state machine:
//!
//! ```text
//! Constructed → Normalized → ParametersComputed → [MomentumReady, hot only]
//!     → WindReady → { ConcentrationReady → DistanceReady } and/or { MpeReady }
//! ```
//!
//! The two trailing groups are independent of each other. No stage runs twice.

use serde::Serialize;
use std::fmt;

/// A calculation stage, named after the state it leaves the calculator in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    /// Inputs accepted
    Constructed,
    /// Flow, velocity and geometry made consistent
    Normalized,
    /// f, Vm, Vm', fe computed
    ParametersComputed,
    /// Momentum coefficient m computed (hot sources)
    MomentumReady,
    /// Wind coefficient n computed
    WindReady,
    /// Maximum concentration Cm computed
    ConcentrationReady,
    /// Distance Xm computed
    DistanceReady,
    /// Maximum permissible emission computed
    MpeReady,
}

impl Stage {
    /// Every stage in declaration order
    pub const ALL: [Stage; 8] = [
        Stage::Constructed,
        Stage::Normalized,
        Stage::ParametersComputed,
        Stage::MomentumReady,
        Stage::WindReady,
        Stage::ConcentrationReady,
        Stage::DistanceReady,
        Stage::MpeReady,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Name of the operation that produces this stage
    pub fn operation(self) -> &'static str {
        match self {
            Stage::Constructed => "new",
            Stage::Normalized => "normalize",
            Stage::ParametersComputed => "parameters",
            Stage::MomentumReady => "m_coef",
            Stage::WindReady => "n_coef",
            Stage::ConcentrationReady => "max_concentrate",
            Stage::DistanceReady => "max_distance",
            Stage::MpeReady => "pdv_func",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} ({})", self.operation())
    }
}

/// Set of completed stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletedStages(u8);

impl CompletedStages {
    /// No stage completed
    pub const fn empty() -> Self {
        CompletedStages(0)
    }

    /// Mark `stage` as completed
    pub fn insert(&mut self, stage: Stage) {
        self.0 |= stage.bit();
    }

    /// Whether `stage` has completed
    pub fn contains(self, stage: Stage) -> bool {
        self.0 & stage.bit() != 0
    }

    /// Completed stages in declaration order
    pub fn iter(self) -> impl Iterator<Item = Stage> {
        Stage::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_stages() {
        let mut done = CompletedStages::empty();
        assert!(!done.contains(Stage::Constructed));

        done.insert(Stage::Constructed);
        done.insert(Stage::WindReady);
        assert!(done.contains(Stage::WindReady));
        assert!(!done.contains(Stage::MomentumReady));
        assert_eq!(
            done.iter().collect::<Vec<_>>(),
            vec![Stage::Constructed, Stage::WindReady]
        );
    }

    #[test]
    fn test_stage_display_names_operation() {
        assert_eq!(Stage::MomentumReady.to_string(), "MomentumReady (m_coef)");
        assert_eq!(Stage::MpeReady.operation(), "pdv_func");
    }
}
