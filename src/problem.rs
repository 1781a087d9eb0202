//! The validation problem model.
//!
//! A problem is an immutable record of one violated assertion: a stable
//! message key, an ordered parameter bag, the source location of the event
//! that triggered it, the keyword that produced it, and, for compound
//! failures (`anyOf`, `oneOf`), child branches of per-alternative problems.
use crate::events::Location;
use crate::messages::{self, Locale};
use serde_json::Value;
use std::fmt;

/// A single validation failure.
#[derive(Debug, Clone)]
pub struct Problem {
    keyword: &'static str,
    message_key: &'static str,
    parameters: Vec<(&'static str, Value)>,
    location: Location,
    branches: Vec<Vec<Problem>>,
}

impl Problem {
    pub(crate) fn new(
        keyword: &'static str,
        message_key: &'static str,
        location: Location,
    ) -> Problem {
        Problem {
            keyword,
            message_key,
            parameters: Vec::new(),
            location,
            branches: Vec::new(),
        }
    }

    pub(crate) fn param(mut self, name: &'static str, value: impl Into<Value>) -> Problem {
        self.parameters.push((name, value.into()));
        self
    }

    pub(crate) fn with_branches(mut self, branches: Vec<Vec<Problem>>) -> Problem {
        self.branches = branches;
        self
    }

    /// The keyword that emitted this problem, e.g. `"maxLength"`.
    pub fn keyword(&self) -> &str {
        self.keyword
    }

    /// Stable message key, resolved through the localized catalog.
    pub fn message_key(&self) -> &str {
        self.message_key
    }

    /// Message parameters in insertion order.
    pub fn parameters(&self) -> &[(&'static str, Value)] {
        &self.parameters
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Child problem lists of a compound problem, one list per branch.
    pub fn branches(&self) -> &[Vec<Problem>] {
        &self.branches
    }

    /// Render the message in the given locale, without the location prefix.
    pub fn message(&self, locale: Locale) -> String {
        messages::render(self, locale)
    }

    /// Render the `<location> <message>` line plus indented branch groups.
    pub fn to_display_lines(&self, locale: Locale) -> Vec<String> {
        let mut lines = Vec::new();
        self.push_lines(locale, 0, &mut lines);
        lines
    }

    fn push_lines(&self, locale: Locale, indent: usize, lines: &mut Vec<String>) {
        let pad = "    ".repeat(indent);
        lines.push(format!("{}{} {}", pad, self.location, self.message(locale)));
        for (index, branch) in self.branches.iter().enumerate() {
            lines.push(format!(
                "{}{}) {}",
                "    ".repeat(indent + 1),
                index + 1,
                messages::branch_header(locale)
            ));
            for problem in branch {
                problem.push_lines(locale, indent + 2, lines);
            }
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self.to_display_lines(Locale::default());
        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Receiver of dispatched problems.
pub trait ProblemSink {
    fn dispatch(&mut self, problem: Problem);
}

impl ProblemSink for Vec<Problem> {
    fn dispatch(&mut self, problem: Problem) {
        self.push(problem);
    }
}

/// Sink that drops everything. Used where problems are evaluated silently,
/// such as the `if` branch of a conditional.
pub(crate) struct Discard;

impl ProblemSink for Discard {
    fn dispatch(&mut self, _: Problem) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parameters_keep_order() {
        let problem = Problem::new("dependencies", "instance.problem.dependencies", Location::new(1, 1))
            .param("dependant", "a")
            .param("missing", json!(["b"]));
        let names: Vec<_> = problem.parameters().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["dependant", "missing"]);
    }

    #[test]
    fn display_includes_location() {
        let problem = Problem::new("required", "instance.problem.required", Location::new(2, 5))
            .param("missing", json!(["a"]));
        assert!(problem.to_string().starts_with("[2,5] "));
    }
}
