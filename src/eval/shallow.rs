//! Depth filter for evaluators that only inspect a container's surface.
use super::{Eval, Evaluate, Verdict};
use crate::events::ParsedEvent;
use crate::problem::ProblemSink;

/// Hands the inner evaluator a pre-filtered view: only depth 0 and 1 events.
/// Size assertions, `required`, `propertyNames` and the required-list form of
/// `dependencies` never look deeper.
pub(crate) struct Shallow {
    inner: Eval,
}

impl Shallow {
    pub(crate) fn wrap(inner: Eval) -> Eval {
        Box::new(Shallow { inner })
    }
}

impl Evaluate for Shallow {
    fn evaluate(&mut self, ev: &ParsedEvent, depth: usize, sink: &mut dyn ProblemSink) -> Verdict {
        if depth > 1 {
            return Verdict::Pending;
        }
        self.inner.evaluate(ev, depth, sink)
    }
}
