//! Scripted stimuli and expectations for a fixed-length run.

use std::fmt;
use std::sync::Arc;

use crate::device::{Inputs, SignalValue};
use crate::error::DeviceFault;

pub type Formula = Arc<dyn Fn(&Inputs<'_>) -> Result<SignalValue, DeviceFault> + Send + Sync>;

/// What an output should read: a literal, or a value derived from the inputs
/// at the moment of the check.
#[derive(Clone)]
pub enum Expected {
    Literal(SignalValue),
    Formula {
        description: &'static str,
        eval: Formula,
    },
}

impl Expected {
    pub fn resolve(&self, inputs: &Inputs<'_>) -> Result<SignalValue, DeviceFault> {
        match self {
            Expected::Literal(value) => Ok(*value),
            Expected::Formula { eval, .. } => eval(inputs),
        }
    }
}

impl fmt::Debug for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Literal(value) => write!(f, "Literal({value:#x})"),
            Expected::Formula { description, .. } => write!(f, "Formula({description})"),
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Literal(value) => write!(f, "{value:#x}"),
            Expected::Formula { description, .. } => f.write_str(description),
        }
    }
}

/// Input assignments applied before the evaluation of step `at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stimulus {
    pub at: usize,
    pub assignments: Vec<(&'static str, SignalValue)>,
}

#[derive(Debug, Clone)]
pub struct Expectation {
    pub at: usize,
    pub signal: &'static str,
    pub expected: Expected,
    label: Option<String>,
}

impl Expectation {
    pub fn literal(at: usize, signal: &'static str, value: SignalValue) -> Self {
        Self {
            at,
            signal,
            expected: Expected::Literal(value),
            label: None,
        }
    }

    pub fn formula<F>(at: usize, signal: &'static str, description: &'static str, eval: F) -> Self
    where
        F: Fn(&Inputs<'_>) -> Result<SignalValue, DeviceFault> + Send + Sync + 'static,
    {
        Self {
            at,
            signal,
            expected: Expected::Formula {
                description,
                eval: Arc::new(eval),
            },
            label: None,
        }
    }

    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{} == {}", self.signal, self.expected),
        }
    }
}

/// A signal whose value is logged and recorded but never checked. With
/// conditions, it is recorded only at steps where every condition signal
/// reads its given value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watch {
    pub at: usize,
    pub signal: &'static str,
    pub when: Vec<(&'static str, SignalValue)>,
}

/// What one script step advances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stepping {
    /// A full clock cycle, ending on the active edge.
    #[default]
    Cycle,
    /// A single clock toggle.
    Phase,
}

#[derive(Debug, Clone)]
pub struct Script {
    name: String,
    steps: usize,
    stepping: Stepping,
    stimuli: Vec<Stimulus>,
    expectations: Vec<Expectation>,
    watches: Vec<Watch>,
}

impl Script {
    pub fn new(name: impl Into<String>, steps: usize) -> Self {
        Self {
            name: name.into(),
            steps,
            stepping: Stepping::Cycle,
            stimuli: Vec::new(),
            expectations: Vec::new(),
            watches: Vec::new(),
        }
    }

    /// Count steps in clock toggles instead of cycles.
    pub fn per_phase(mut self) -> Self {
        self.stepping = Stepping::Phase;
        self
    }

    fn check_step(&self, at: usize, what: &str) {
        assert!(
            at < self.steps,
            "{what} at step {at} is outside the {}-step script `{}`",
            self.steps,
            self.name
        );
    }

    pub fn drive<I>(mut self, at: usize, assignments: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, SignalValue)>,
    {
        self.check_step(at, "Stimulus");
        self.stimuli.push(Stimulus {
            at,
            assignments: assignments.into_iter().collect(),
        });
        self
    }

    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.check_step(expectation.at, "Expectation");
        self.expectations.push(expectation);
        self
    }

    pub fn watch(mut self, at: usize, signal: &'static str) -> Self {
        self.check_step(at, "Watch");
        self.watches.push(Watch {
            at,
            signal,
            when: Vec::new(),
        });
        self
    }

    /// Watch `signal` after every step.
    pub fn watch_every(self, signal: &'static str) -> Self {
        self.watch_every_when(signal, [])
    }

    /// Watch `signal` after every step at which all of `when` hold.
    pub fn watch_every_when<I>(mut self, signal: &'static str, when: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, SignalValue)>,
    {
        let when: Vec<_> = when.into_iter().collect();
        self.watches.extend((0..self.steps).map(|at| Watch {
            at,
            signal,
            when: when.clone(),
        }));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn stimuli_at(&self, at: usize) -> impl Iterator<Item = &Stimulus> {
        self.stimuli.iter().filter(move |s| s.at == at)
    }

    pub fn expectations_at(&self, at: usize) -> impl Iterator<Item = &Expectation> {
        self.expectations.iter().filter(move |e| e.at == at)
    }

    pub fn stepping(&self) -> Stepping {
        self.stepping
    }

    pub fn watches_at(&self, at: usize) -> impl Iterator<Item = &Watch> {
        self.watches.iter().filter(move |w| w.at == at)
    }

    pub fn expectation_count(&self) -> usize {
        self.expectations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_grouped_by_step() {
        let script = Script::new("demo", 3)
            .drive(0, [("a", 1), ("b", 0)])
            .drive(2, [("a", 0)])
            .expect(Expectation::literal(0, "y", 0))
            .expect(Expectation::literal(2, "y", 1).named("second"))
            .expect(Expectation::literal(2, "z", 1))
            .watch(1, "y");

        assert_eq!(script.stimuli_at(0).count(), 1);
        assert_eq!(script.stimuli_at(1).count(), 0);
        assert_eq!(script.stimuli_at(0).next().unwrap().assignments.len(), 2);

        let at_two: Vec<_> = script.expectations_at(2).map(|e| e.label()).collect();
        assert_eq!(at_two, vec!["second".to_string(), "z == 0x1".to_string()]);
        assert_eq!(script.watches_at(1).count(), 1);
        assert_eq!(script.stepping(), Stepping::Cycle);
        assert_eq!(script.expectation_count(), 3);
    }

    #[test]
    fn test_watch_every_covers_all_steps() {
        let script = Script::new("blink", 4).watch_every("led");
        assert!((0..4).all(|at| script.watches_at(at).count() == 1));
        assert!(script.watches_at(3).all(|w| w.when.is_empty()));
    }

    #[test]
    fn test_conditional_watch_keeps_conditions() {
        let script = Script::new("tx", 3)
            .per_phase()
            .watch_every_when("data", [("en", 1), ("busy", 0)]);
        assert_eq!(script.stepping(), Stepping::Phase);
        let watch = script.watches_at(2).next().unwrap();
        assert_eq!(watch.signal, "data");
        assert_eq!(watch.when, vec![("en", 1), ("busy", 0)]);
    }

    #[test]
    fn test_formula_label_uses_description() {
        let e = Expectation::formula(0, "result", "A + B", |_| Ok(0));
        assert_eq!(e.label(), "result == A + B");
        assert_eq!(format!("{:?}", e.expected), "Formula(A + B)");
    }

    #[test]
    #[should_panic(expected = "outside the 2-step script")]
    fn test_out_of_range_step_is_rejected() {
        let _ = Script::new("short", 2).drive(2, [("a", 1)]);
    }
}
