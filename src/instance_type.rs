//! The closed set of JSON instance types.
use crate::events::Event;
use std::{convert::TryFrom, fmt};

/// Instance types as seen by assertions. `Integer` is a refinement of
/// `Number`: a number is an integer whenever its numerical value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl InstanceType {
    /// Derive the type of a value from its first parse event.
    pub(crate) fn of(event: &Event) -> Option<InstanceType> {
        match event {
            Event::StartObject => Some(InstanceType::Object),
            Event::StartArray => Some(InstanceType::Array),
            Event::String(_) => Some(InstanceType::String),
            Event::Bool(_) => Some(InstanceType::Boolean),
            Event::Null => Some(InstanceType::Null),
            Event::Number(number) => {
                if number.is_integral() {
                    Some(InstanceType::Integer)
                } else {
                    Some(InstanceType::Number)
                }
            }
            Event::Key(_) | Event::EndObject | Event::EndArray => None,
        }
    }

    /// Whether an instance of type `self` belongs to `required`, honouring
    /// the integer/number refinement.
    pub(crate) fn is(self, required: InstanceType) -> bool {
        self == required || (self == InstanceType::Integer && required == InstanceType::Number)
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceType::Array => write!(f, "array"),
            InstanceType::Boolean => write!(f, "boolean"),
            InstanceType::Integer => write!(f, "integer"),
            InstanceType::Null => write!(f, "null"),
            InstanceType::Number => write!(f, "number"),
            InstanceType::Object => write!(f, "object"),
            InstanceType::String => write!(f, "string"),
        }
    }
}

impl TryFrom<&str> for InstanceType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "array" => Ok(InstanceType::Array),
            "boolean" => Ok(InstanceType::Boolean),
            "integer" => Ok(InstanceType::Integer),
            "null" => Ok(InstanceType::Null),
            "number" => Ok(InstanceType::Number),
            "object" => Ok(InstanceType::Object),
            "string" => Ok(InstanceType::String),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::JsonNumber;

    #[test]
    fn integer_refines_number() {
        assert!(InstanceType::Integer.is(InstanceType::Number));
        assert!(!InstanceType::Number.is(InstanceType::Integer));
        assert!(InstanceType::Integer.is(InstanceType::Integer));
    }

    #[test]
    fn type_of_events() {
        assert_eq!(
            InstanceType::of(&Event::Number(JsonNumber::new("2.0").unwrap())),
            Some(InstanceType::Integer)
        );
        assert_eq!(
            InstanceType::of(&Event::Number(JsonNumber::new("2.5").unwrap())),
            Some(InstanceType::Number)
        );
        assert_eq!(InstanceType::of(&Event::StartArray), Some(InstanceType::Array));
        assert_eq!(InstanceType::of(&Event::Key("a".to_string())), None);
    }
}
