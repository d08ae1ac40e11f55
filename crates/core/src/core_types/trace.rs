//! Derivation trace: the worked solution produced alongside the numbers
//!
//! Each stage appends [`DerivationStep`] records describing what it
//! computed: the classification it made, the formula it applied, the values
//! substituted into it and the rounded result. The trace is output only and
//! never feeds back into the calculation.
//!
//! Rendering is left to the caller. [`fmt::Display`] gives a plain-text
//! version, one line per step.

use serde::Serialize;
use std::fmt;

/// What a step records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Section heading (source classification, start of a stage)
    Heading,
    /// Which regime of a piecewise formula was selected
    Regime,
    /// A formula evaluated with substituted operands
    Formula,
}

/// A named value substituted into a formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Operand {
    /// Methodology symbol (`W0`, `ΔT`, `Vm'`, ...)
    pub symbol: &'static str,
    /// Substituted value
    pub value: f64,
}

/// One record of the derivation trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivationStep {
    /// Kind of record
    pub kind: StepKind,
    /// Human-readable description
    pub label: String,
    /// Formula template in plain text, for [`StepKind::Formula`] steps
    pub formula: Option<&'static str>,
    /// Operands in the order they appear in the formula
    pub operands: Vec<Operand>,
    /// Value the formula produced
    pub result: Option<f64>,
    /// Unit of the result
    pub unit: Option<&'static str>,
}

impl DerivationStep {
    /// Heading record
    pub fn heading(label: impl Into<String>) -> Self {
        Self::with_kind(StepKind::Heading, label)
    }

    /// Regime selection record
    pub fn regime(label: impl Into<String>) -> Self {
        Self::with_kind(StepKind::Regime, label)
    }

    /// Formula record; add operands and the result with the builder methods
    pub fn formula(label: impl Into<String>, formula: &'static str) -> Self {
        Self {
            formula: Some(formula),
            ..Self::with_kind(StepKind::Formula, label)
        }
    }

    fn with_kind(kind: StepKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            formula: None,
            operands: Vec::new(),
            result: None,
            unit: None,
        }
    }

    /// Append a substituted operand
    pub fn operand(mut self, symbol: &'static str, value: f64) -> Self {
        self.operands.push(Operand { symbol, value });
        self
    }

    /// Set the result
    pub fn result(mut self, value: f64) -> Self {
        self.result = Some(value);
        self
    }

    /// Set the result unit
    pub fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Value of the operand named `symbol`, if present
    pub fn operand_value(&self, symbol: &str) -> Option<f64> {
        self.operands
            .iter()
            .find(|op| op.symbol == symbol)
            .map(|op| op.value)
    }
}

impl fmt::Display for DerivationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StepKind::Heading => write!(f, "{}:", self.label),
            StepKind::Regime => write!(f, "  {}", self.label),
            StepKind::Formula => {
                write!(f, "  {}", self.label)?;
                if let Some(formula) = self.formula {
                    write!(f, ": {formula}")?;
                }
                if !self.operands.is_empty() {
                    let substituted = self
                        .operands
                        .iter()
                        .map(|op| format!("{} = {}", op.symbol, op.value))
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(f, " [{substituted}]")?;
                }
                if let Some(result) = self.result {
                    write!(f, " = {result}")?;
                    if let Some(unit) = self.unit {
                        write!(f, " {unit}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Ordered, append-only sequence of derivation steps
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct DerivationTrace {
    steps: Vec<DerivationStep>,
}

impl DerivationTrace {
    /// Empty trace
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step
    pub fn push(&mut self, step: DerivationStep) {
        self.steps.push(step);
    }

    /// All steps in order
    pub fn steps(&self) -> &[DerivationStep] {
        &self.steps
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate over the steps
    pub fn iter(&self) -> std::slice::Iter<'_, DerivationStep> {
        self.steps.iter()
    }

    /// Last formula step whose label contains `needle`
    pub fn find_formula(&self, needle: &str) -> Option<&DerivationStep> {
        self.steps
            .iter()
            .rev()
            .find(|s| s.kind == StepKind::Formula && s.label.contains(needle))
    }
}

impl<'a> IntoIterator for &'a DerivationTrace {
    type Item = &'a DerivationStep;
    type IntoIter = std::slice::Iter<'a, DerivationStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl Extend<DerivationStep> for DerivationTrace {
    fn extend<I: IntoIterator<Item = DerivationStep>>(&mut self, steps: I) {
        self.steps.extend(steps);
    }
}

impl fmt::Display for DerivationTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "{step}")?;
        }
        Ok(())
    }
}
