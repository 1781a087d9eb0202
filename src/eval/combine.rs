//! Logical combinators over child evaluators.
//!
//! All three combinators tee every incoming event to every still-undecided
//! child, which is how sibling subschemas evaluate one value in lockstep
//! without re-reading the stream. Problems produced by a child are buffered
//! per child and only move upward once the combinator itself settles, except
//! in the conjunctive case where a child failure already seals the outcome.
use super::{Eval, Evaluate, Verdict};
use crate::events::ParsedEvent;
use crate::problem::{Problem, ProblemSink};

struct Child {
    eval: Option<Eval>,
    verdict: Verdict,
    problems: Vec<Problem>,
}

impl Child {
    fn new(eval: Eval) -> Child {
        Child {
            eval: Some(eval),
            verdict: Verdict::Pending,
            problems: Vec::new(),
        }
    }

    fn step(&mut self, ev: &ParsedEvent, depth: usize) -> Verdict {
        let verdict = match self.eval.as_mut() {
            Some(eval) => eval.evaluate(ev, depth, &mut self.problems),
            None => return self.verdict,
        };
        if verdict.is_final() {
            self.eval = None;
            self.verdict = verdict;
        }
        verdict
    }

    fn undecided(&self) -> bool {
        self.eval.is_some()
    }

    /// A failed branch whose problems can point the user at a fix.
    fn resolvable(&self) -> bool {
        self.verdict == Verdict::False && !self.problems.is_empty()
    }
}

fn branch_lists(children: &mut Vec<Child>) -> Vec<Vec<Problem>> {
    let any_resolvable = children.iter().any(Child::resolvable);
    children
        .iter_mut()
        .filter(|child| !any_resolvable || child.resolvable())
        .map(|child| std::mem::take(&mut child.problems))
        .collect()
}

/// FALSE iff any child is FALSE; problems of every failed child surface.
/// `allOf`, the implicit keyword conjunction, and negated `anyOf`.
pub(crate) struct Conjunction {
    children: Vec<Child>,
    falsified: bool,
}

impl Conjunction {
    pub(crate) fn new(children: Vec<Eval>) -> Conjunction {
        Conjunction {
            children: children.into_iter().map(Child::new).collect(),
            falsified: false,
        }
    }

    pub(crate) fn boxed(children: Vec<Eval>) -> Eval {
        Box::new(Conjunction::new(children))
    }
}

impl Evaluate for Conjunction {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        for child in &mut self.children {
            if !child.undecided() {
                continue;
            }
            match child.step(ev, depth) {
                Verdict::Pending => {}
                Verdict::False => {
                    self.falsified = true;
                    for problem in child.problems.drain(..) {
                        sink.dispatch(problem);
                    }
                }
                // IGNORED coerces to TRUE under conjunction.
                Verdict::True | Verdict::Ignored => child.problems.clear(),
            }
        }
        if self.children.iter().any(Child::undecided) {
            Verdict::Pending
        } else if self.falsified {
            Verdict::False
        } else {
            Verdict::True
        }
    }
}

/// TRUE iff any child is TRUE. On all-FALSE emits one compound problem whose
/// branches are the per-child problem lists, preferring resolvable branches.
/// `anyOf`, negated `allOf`, and schema-level negation.
pub(crate) struct Disjunction {
    children: Vec<Child>,
    keyword: &'static str,
    message_key: &'static str,
    report_branches: bool,
}

impl Disjunction {
    pub(crate) fn new(
        children: Vec<Eval>,
        keyword: &'static str,
        message_key: &'static str,
        report_branches: bool,
    ) -> Disjunction {
        Disjunction {
            children: children.into_iter().map(Child::new).collect(),
            keyword,
            message_key,
            report_branches,
        }
    }

    pub(crate) fn boxed(
        children: Vec<Eval>,
        keyword: &'static str,
        message_key: &'static str,
        report_branches: bool,
    ) -> Eval {
        Box::new(Disjunction::new(
            children,
            keyword,
            message_key,
            report_branches,
        ))
    }
}

impl Evaluate for Disjunction {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        for child in &mut self.children {
            if !child.undecided() {
                continue;
            }
            match child.step(ev, depth) {
                // IGNORED is a vacuous TRUE for every logical parent.
                Verdict::True | Verdict::Ignored => return Verdict::True,
                _ => {}
            }
        }
        if self.children.iter().any(Child::undecided) {
            return Verdict::Pending;
        }
        let total = self.children.len();
        let mut problem = Problem::new(self.keyword, self.message_key, ev.location)
            .param("total", total as u64);
        if self.report_branches {
            problem = problem.with_branches(branch_lists(&mut self.children));
        }
        sink.dispatch(problem);
        Verdict::False
    }
}

/// TRUE iff exactly one child is TRUE (affirmative) or anything else
/// (negated). `oneOf` in both polarities.
pub(crate) struct Exclusive {
    children: Vec<Child>,
    affirmative: bool,
}

impl Exclusive {
    pub(crate) fn boxed(children: Vec<Eval>, affirmative: bool) -> Eval {
        Box::new(Exclusive {
            children: children.into_iter().map(Child::new).collect(),
            affirmative,
        })
    }

    fn matched(&self) -> usize {
        self.children
            .iter()
            .filter(|child| matches!(child.verdict, Verdict::True | Verdict::Ignored))
            .count()
    }
}

impl Evaluate for Exclusive {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        for child in &mut self.children {
            if child.undecided() {
                child.step(ev, depth);
            }
        }
        let matched = self.matched();
        let total = self.children.len();
        if matched >= 2 {
            // Settled regardless of pending children.
            return if self.affirmative {
                let branches = self
                    .children
                    .iter_mut()
                    .filter(|child| matches!(child.verdict, Verdict::True | Verdict::Ignored))
                    .map(|child| std::mem::take(&mut child.problems))
                    .collect();
                let problem = Problem::new("oneOf", "instance.problem.oneOf.many", ev.location)
                    .param("total", total as u64)
                    .param("matched", matched as u64)
                    .with_branches(branches);
                sink.dispatch(problem);
                Verdict::False
            } else {
                Verdict::True
            };
        }
        if self.children.iter().any(Child::undecided) {
            return Verdict::Pending;
        }
        match (matched, self.affirmative) {
            (1, true) | (0, false) => Verdict::True,
            (0, true) => {
                let problem = Problem::new("oneOf", "instance.problem.oneOf.few", ev.location)
                    .param("total", total as u64)
                    .with_branches(branch_lists(&mut self.children));
                sink.dispatch(problem);
                Verdict::False
            }
            (_, false) => {
                let problem = Problem::new("not", "instance.problem.not.oneOf", ev.location)
                    .param("total", total as u64);
                sink.dispatch(problem);
                Verdict::False
            }
            (_, true) => unreachable!("two matches settle earlier"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::test_util::run;
    use crate::eval::{AlwaysFalse, AlwaysTrue};

    fn always_false() -> Eval {
        Box::new(AlwaysFalse::new("false", "instance.problem.unacceptable"))
    }

    #[test]
    fn conjunction_collects_all_failures() {
        let mut eval = Conjunction::new(vec![always_false(), Box::new(AlwaysTrue), always_false()]);
        let (verdict, problems) = run(&mut eval, "3");
        assert_eq!(verdict, Verdict::False);
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn disjunction_short_circuits() {
        let mut eval = Disjunction::new(
            vec![always_false(), Box::new(AlwaysTrue)],
            "anyOf",
            "instance.problem.anyOf",
            true,
        );
        let (verdict, problems) = run(&mut eval, "3");
        assert_eq!(verdict, Verdict::True);
        assert!(problems.is_empty());
    }

    #[test]
    fn disjunction_reports_branches() {
        let mut eval = Disjunction::new(
            vec![always_false(), always_false()],
            "anyOf",
            "instance.problem.anyOf",
            true,
        );
        let (verdict, problems) = run(&mut eval, "3");
        assert_eq!(verdict, Verdict::False);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].branches().len(), 2);
    }

    #[test]
    fn exclusive_wants_exactly_one() {
        let mut eval = Exclusive::boxed(vec![Box::new(AlwaysTrue), Box::new(AlwaysTrue)], true);
        let (verdict, problems) = run(eval.as_mut(), "3");
        assert_eq!(verdict, Verdict::False);
        assert_eq!(problems[0].message_key(), "instance.problem.oneOf.many");
        assert_eq!(problems[0].branches().len(), 2);

        let mut eval = Exclusive::boxed(vec![Box::new(AlwaysTrue), always_false()], true);
        let (verdict, problems) = run(eval.as_mut(), "3");
        assert_eq!(verdict, Verdict::True);
        assert!(problems.is_empty());

        let mut eval = Exclusive::boxed(vec![always_false(), always_false()], true);
        let (verdict, problems) = run(eval.as_mut(), "3");
        assert_eq!(verdict, Verdict::False);
        assert_eq!(problems[0].message_key(), "instance.problem.oneOf.few");
    }

    #[test]
    fn negated_exclusive_flips() {
        let mut eval = Exclusive::boxed(vec![Box::new(AlwaysTrue), Box::new(AlwaysTrue)], false);
        let (verdict, _) = run(eval.as_mut(), "3");
        assert_eq!(verdict, Verdict::True);

        let mut eval = Exclusive::boxed(vec![Box::new(AlwaysTrue), always_false()], false);
        let (verdict, problems) = run(eval.as_mut(), "3");
        assert_eq!(verdict, Verdict::False);
        assert_eq!(problems[0].message_key(), "instance.problem.not.oneOf");
    }
}
