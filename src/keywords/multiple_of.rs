//! Validator for the `multipleOf` keyword.
//!
//! Divisibility is decided on exact decimal fractions built from the source
//! lexemes, so `0.3` is a multiple of `0.1` even though neither has an exact
//! binary representation.
use super::helpers::compare;
use super::{fail, ok, CompileResult, Keyword};
use crate::error::BuildError;
use crate::eval::{Assertion, AssertionEval, Eval};
use crate::events::{Event, Location};
use crate::instance_type::InstanceType;
use crate::problem::Problem;
use crate::reader::ReaderContext;
use fraction::BigUint;
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;

/// `|literal|` as an exact numerator/denominator pair.
fn decimal_fraction(literal: &str) -> Option<(BigUint, BigUint)> {
    let unsigned = literal.strip_prefix('-').unwrap_or(literal);
    let (mantissa, exponent) = match unsigned.find(|c| c == 'e' || c == 'E') {
        Some(at) => {
            let exponent: i64 = unsigned[at + 1..].trim_start_matches('+').parse().ok()?;
            (&unsigned[..at], exponent)
        }
        None => (unsigned, 0),
    };
    let (int_part, frac_part) = match mantissa.find('.') {
        Some(at) => (&mantissa[..at], &mantissa[at + 1..]),
        None => (mantissa, ""),
    };
    let digits = format!("{}{}", int_part, frac_part);
    let mut numerator = BigUint::parse_bytes(digits.as_bytes(), 10)?;
    let mut denominator = BigUint::from(1u32);
    let scale = frac_part.len() as i64 - exponent;
    match scale.cmp(&0) {
        Ordering::Greater => denominator = pow10(scale as u32),
        Ordering::Less => numerator *= pow10((-scale) as u32),
        Ordering::Equal => {}
    }
    Some((numerator, denominator))
}

fn pow10(exponent: u32) -> BigUint {
    let ten = BigUint::from(10u32);
    let mut result = BigUint::from(1u32);
    for _ in 0..exponent {
        result *= &ten;
    }
    result
}

#[derive(Debug, Clone)]
pub(crate) struct MultipleOf {
    factor: Number,
    numerator: BigUint,
    denominator: BigUint,
}

impl MultipleOf {
    pub(crate) fn new(factor: Number) -> Result<MultipleOf, BuildError> {
        let positive = compare(&factor, &Number::from(0u32)) == Some(Ordering::Greater);
        if !positive {
            return Err(BuildError::OutOfRange {
                keyword: "multipleOf",
                constraint: "strictly greater than 0",
            });
        }
        let (numerator, denominator) =
            decimal_fraction(&factor.to_string()).ok_or(BuildError::WrongType {
                keyword: "multipleOf",
                expected: "a number",
            })?;
        Ok(MultipleOf {
            factor,
            numerator,
            denominator,
        })
    }
}

impl Assertion for MultipleOf {
    fn test(&self, event: &Event) -> bool {
        match event {
            Event::Number(number) => match decimal_fraction(number.literal()) {
                // instance/factor = (in * fd) / (id * fn); integral iff the
                // remainder is zero.
                Some((numerator, denominator)) => {
                    let dividend = numerator * &self.denominator;
                    let divisor = denominator * &self.numerator;
                    (dividend % divisor) == BigUint::from(0u32)
                }
                None => false,
            },
            _ => true,
        }
    }

    fn problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("multipleOf", "instance.problem.multipleOf", location)
            .param("factor", self.factor.clone())
    }

    fn negated_problem(&self, _: &Event, location: Location) -> Problem {
        Problem::new("multipleOf", "instance.problem.not.multipleOf", location)
            .param("factor", self.factor.clone())
    }
}

impl Keyword for MultipleOf {
    fn name(&self) -> &str {
        "multipleOf"
    }

    fn applies_to(&self, ty: InstanceType) -> bool {
        ty.is(InstanceType::Number)
    }

    fn serialize(&self, map: &mut Map<String, Value>) {
        map.insert("multipleOf".to_string(), Value::Number(self.factor.clone()));
    }

    fn evaluator(&self, ty: InstanceType, affirmative: bool) -> Option<Eval> {
        if ty.is(InstanceType::Number) {
            Some(AssertionEval::boxed(self.clone(), affirmative))
        } else {
            None
        }
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    _: &mut ReaderContext<'_>,
) -> CompileResult {
    match schema {
        Value::Number(factor) => match MultipleOf::new(factor.clone()) {
            Ok(keyword) => ok(keyword),
            Err(error) => fail(error),
        },
        _ => fail(BuildError::WrongType {
            keyword: "multipleOf",
            expected: "a number",
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::test_util::check;
    use crate::schemas::Schema;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!({"multipleOf": 2}), "8", true)]
    #[test_case(json!({"multipleOf": 2}), "7", false)]
    #[test_case(json!({"multipleOf": 0.1}), "0.3", true; "decimal semantics")]
    #[test_case(json!({"multipleOf": 0.01}), "0.03", true)]
    #[test_case(json!({"multipleOf": 0.1}), "0.35", false)]
    #[test_case(json!({"multipleOf": 1.5}), "4.5", true)]
    #[test_case(json!({"multipleOf": 3}), "-9", true; "sign is irrelevant")]
    #[test_case(json!({"multipleOf": 5}), "0", true)]
    #[test_case(json!({"multipleOf": 2}), "\"x\"", true; "only numbers are constrained")]
    fn verdicts(schema: serde_json::Value, instance: &str, expected: bool) {
        let (valid, problems) = check(&schema, instance);
        assert_eq!(valid, expected);
        assert_eq!(problems.is_empty(), expected);
    }

    #[test]
    fn rejects_non_positive_factor() {
        assert!(Schema::compile(&json!({"multipleOf": 0})).is_err());
        assert!(Schema::compile(&json!({"multipleOf": -2})).is_err());
        assert!(Schema::compile(&json!({"multipleOf": "2"})).is_err());
    }
}
