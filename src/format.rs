//! Format attributes: pure `&str -> bool` matchers, looked up by name at
//! compile time through a per-validator registry.
//!
//! The matchers are small hand-written scanners over the RFC grammars; the
//! only crates involved are `chrono` for calendar validity, `idna` for
//! internationalized hostnames and `url` for absolute URI parsing.
use chrono::NaiveDate;
use regex::RegexBuilder;
use std::collections::HashMap;
use std::iter::Peekable;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::{Chars, FromStr};
use url::Url;

pub(crate) type FormatFn = fn(&str) -> bool;

fn two_digits(bytes: &[u8]) -> Option<u32> {
    match bytes {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => None,
    }
}

fn hex_escape(first: Option<char>, second: Option<char>) -> bool {
    first.map_or(false, |c| c.is_ascii_hexdigit()) && second.map_or(false, |c| c.is_ascii_hexdigit())
}

/// RFC 3339 `full-date`: the shape is checked here, the calendar decides
/// whether the day exists.
pub(crate) fn date(instance: &str) -> bool {
    let bytes = instance.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    if !bytes[..4].iter().all(u8::is_ascii_digit) {
        return false;
    }
    let year: i32 = match instance[..4].parse() {
        Ok(year) => year,
        Err(_) => return false,
    };
    let month = match two_digits(&bytes[5..7]) {
        Some(month) => month,
        None => return false,
    };
    let day = match two_digits(&bytes[8..10]) {
        Some(day) => day,
        None => return false,
    };
    NaiveDate::from_ymd_opt(year, month, day).is_some()
}

/// RFC 3339 `full-time`: `hh:mm:ss`, optional fraction of any length, then
/// `Z` or a `±hh:mm` offset. Second 60 admits leap seconds.
pub(crate) fn time(instance: &str) -> bool {
    let bytes = instance.as_bytes();
    if bytes.len() < 9 || bytes[2] != b':' || bytes[5] != b':' {
        return false;
    }
    if !two_digits(&bytes[..2]).map_or(false, |hour| hour <= 23) {
        return false;
    }
    if !two_digits(&bytes[3..5]).map_or(false, |minute| minute <= 59) {
        return false;
    }
    if !two_digits(&bytes[6..8]).map_or(false, |second| second <= 60) {
        return false;
    }
    let mut rest = &bytes[8..];
    if rest.first() == Some(&b'.') {
        let digits = rest[1..].iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return false;
        }
        rest = &rest[1 + digits..];
    }
    match rest {
        [b'Z'] | [b'z'] => true,
        [b'+', offset @ ..] | [b'-', offset @ ..] => match offset {
            [h1, h2, b':', m1, m2] => {
                two_digits(&[*h1, *h2]).map_or(false, |hour| hour <= 23)
                    && two_digits(&[*m1, *m2]).map_or(false, |minute| minute <= 59)
            }
            _ => false,
        },
        _ => false,
    }
}

/// RFC 3339 `date-time` is a date, a `T`, and a time.
pub(crate) fn datetime(instance: &str) -> bool {
    let bytes = instance.as_bytes();
    if bytes.len() < 11 || (bytes[10] != b'T' && bytes[10] != b't') {
        return false;
    }
    date(&instance[..10]) && time(&instance[11..])
}

pub(crate) fn email(instance: &str) -> bool {
    // Addresses with quoting or comments are out of scope; the RFC 5322
    // shape that occurs in practice is local@domain.
    match instance.rfind('@') {
        Some(at) => {
            let (local, domain) = instance.split_at(at);
            let domain = &domain[1..];
            !local.is_empty()
                && local.len() <= 64
                && !local.starts_with('.')
                && !local.ends_with('.')
                && !local.contains("..")
                && hostname(domain)
        }
        None => false,
    }
}

pub(crate) fn idn_email(instance: &str) -> bool {
    match instance.rfind('@') {
        Some(at) => {
            let (local, domain) = instance.split_at(at);
            !local.is_empty() && idn_hostname(&domain[1..])
        }
        None => false,
    }
}

/// RFC 1034 labels: LDH characters, 63 octets per label, no hyphen at either
/// end, 253 octets for the whole name.
pub(crate) fn hostname(instance: &str) -> bool {
    if instance.len() > 253 {
        return false;
    }
    instance.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    })
}

pub(crate) fn idn_hostname(instance: &str) -> bool {
    match idna::domain_to_ascii(instance) {
        Ok(converted) => hostname(&converted),
        Err(_) => false,
    }
}

pub(crate) fn ipv4(instance: &str) -> bool {
    // `Ipv4Addr` accepts the plain dotted quad only, which matches RFC 2673.
    Ipv4Addr::from_str(instance).is_ok()
}

pub(crate) fn ipv6(instance: &str) -> bool {
    Ipv6Addr::from_str(instance).is_ok()
}

pub(crate) fn uri(instance: &str) -> bool {
    // An URI proper requires a scheme; `Url` only parses absolute URLs.
    instance.is_ascii() && Url::from_str(instance).is_ok()
}

pub(crate) fn iri(instance: &str) -> bool {
    // The parser percent-encodes the UCS range itself, so parsing decides
    // absoluteness; whitespace is rejected up front because `Url` strips
    // tabs and newlines instead of failing on them.
    !instance.chars().any(char::is_whitespace) && Url::parse(instance).is_ok()
}

/// One part of a URI reference: no whitespace or controls, the characters
/// RFC 3986 leaves out of every production stay encoded, and `%` always
/// starts a valid escape. `extended` admits the UCS range of RFC 3987.
fn acceptable_reference(part: &str, extended: bool) -> bool {
    let mut chars = part.chars();
    while let Some(c) = chars.next() {
        if c == '%' {
            if !hex_escape(chars.next(), chars.next()) {
                return false;
            }
            continue;
        }
        if c.is_whitespace() || c.is_control() {
            return false;
        }
        if matches!(c, '\\' | '"' | '<' | '>' | '^' | '`' | '{' | '}' | '|') {
            return false;
        }
        if !extended && !c.is_ascii() {
            return false;
        }
    }
    true
}

fn reference(instance: &str, extended: bool) -> bool {
    // At most one fragment marker splits the reference.
    let (body, fragment) = match instance.find('#') {
        Some(at) => (&instance[..at], Some(&instance[at + 1..])),
        None => (instance, None),
    };
    if let Some(fragment) = fragment {
        if fragment.contains('#') || !acceptable_reference(fragment, extended) {
            return false;
        }
    }
    acceptable_reference(body, extended)
}

pub(crate) fn uri_reference(instance: &str) -> bool {
    reference(instance, false)
}

pub(crate) fn iri_reference(instance: &str) -> bool {
    reference(instance, true)
}

/// RFC 6570. Literals outside expressions reuse the reference character
/// rules; expressions are parsed against the operator / varname / modifier
/// grammar.
pub(crate) fn uri_template(instance: &str) -> bool {
    let mut chars = instance.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if !template_expression(&mut chars) {
                    return false;
                }
            }
            '}' => return false,
            '%' => {
                if !hex_escape(chars.next(), chars.next()) {
                    return false;
                }
            }
            c if c.is_control() || matches!(c, ' ' | '"' | '\'' | '<' | '>' | '\\' | '^' | '`' | '|') => {
                return false;
            }
            _ => {}
        }
    }
    true
}

/// The inside of `{...}`: an optional operator, then a comma-separated
/// variable list, each with an optional `:n` or `*` modifier.
fn template_expression(chars: &mut Peekable<Chars<'_>>) -> bool {
    if let Some(&c) = chars.peek() {
        if matches!(c, '+' | '#' | '.' | '/' | ';' | '?' | '&' | '=' | ',' | '!' | '@' | '|') {
            chars.next();
        }
    }
    loop {
        if !template_varname(chars) {
            return false;
        }
        match chars.peek() {
            Some(&':') => {
                chars.next();
                // max-length is 1 to 9999: up to four digits, no leading zero.
                let mut digits = 0usize;
                while let Some(&c) = chars.peek() {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    if digits == 0 && c == '0' {
                        return false;
                    }
                    chars.next();
                    digits += 1;
                }
                if digits == 0 || digits > 4 {
                    return false;
                }
            }
            Some(&'*') => {
                chars.next();
            }
            _ => {}
        }
        match chars.next() {
            Some(',') => continue,
            Some('}') => return true,
            _ => return false,
        }
    }
}

/// varchar *( ["."] varchar ), where varchar is alphanumeric, `_`, or a
/// percent escape.
fn template_varname(chars: &mut Peekable<Chars<'_>>) -> bool {
    let mut length = 0usize;
    let mut trailing_dot = false;
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_ascii_alphanumeric() || c == '_' => {
                chars.next();
                length += 1;
                trailing_dot = false;
            }
            '%' => {
                chars.next();
                if !hex_escape(chars.next(), chars.next()) {
                    return false;
                }
                length += 1;
                trailing_dot = false;
            }
            '.' if length > 0 && !trailing_dot => {
                chars.next();
                trailing_dot = true;
            }
            _ => break,
        }
    }
    length > 0 && !trailing_dot
}

/// RFC 6901: the empty pointer, or `/`-led tokens where `~` only occurs as
/// `~0` or `~1`.
pub(crate) fn json_pointer(instance: &str) -> bool {
    if instance.is_empty() {
        return true;
    }
    if !instance.starts_with('/') {
        return false;
    }
    let mut chars = instance.chars();
    while let Some(c) = chars.next() {
        if c == '~' && !matches!(chars.next(), Some('0') | Some('1')) {
            return false;
        }
    }
    true
}

/// A non-negative integer without leading zeros, then either `#` or a JSON
/// Pointer.
pub(crate) fn relative_json_pointer(instance: &str) -> bool {
    let split = instance
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or_else(|| instance.len());
    let (prefix, rest) = instance.split_at(split);
    if prefix.is_empty() || (prefix.len() > 1 && prefix.starts_with('0')) {
        return false;
    }
    rest.is_empty() || rest == "#" || json_pointer(rest)
}

pub(crate) fn regex(instance: &str) -> bool {
    // Compilability is the test; the size limit keeps adversarial patterns
    // from ballooning during the check.
    RegexBuilder::new(instance)
        .size_limit(1 << 20)
        .build()
        .is_ok()
}

/// Per-validator registry of format attributes. Starts with the Draft-07
/// set; hosts may add their own.
#[derive(Clone)]
pub struct FormatRegistry {
    attributes: HashMap<String, FormatFn>,
}

impl Default for FormatRegistry {
    fn default() -> FormatRegistry {
        let mut registry = FormatRegistry {
            attributes: HashMap::new(),
        };
        registry.register("date", date);
        registry.register("date-time", datetime);
        registry.register("time", time);
        registry.register("email", email);
        registry.register("idn-email", idn_email);
        registry.register("hostname", hostname);
        registry.register("idn-hostname", idn_hostname);
        registry.register("ipv4", ipv4);
        registry.register("ipv6", ipv6);
        registry.register("uri", uri);
        registry.register("uri-reference", uri_reference);
        registry.register("iri", iri);
        registry.register("iri-reference", iri_reference);
        registry.register("uri-template", uri_template);
        registry.register("json-pointer", json_pointer);
        registry.register("relative-json-pointer", relative_json_pointer);
        registry.register("regex", regex);
        registry
    }
}

impl FormatRegistry {
    pub fn register(&mut self, name: &str, attribute: FormatFn) {
        self.attributes.insert(name.to_string(), attribute);
    }

    pub(crate) fn get(&self, name: &str) -> Option<FormatFn> {
        self.attributes.get(name).copied()
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FormatRegistry({} attributes)", self.attributes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("a@b.c", true)]
    #[test_case("not-an-email", false)]
    #[test_case("@b.c", false)]
    #[test_case("a..b@c.d", false)]
    fn emails(instance: &str, expected: bool) {
        assert_eq!(email(instance), expected);
    }

    #[test_case("example.com", true)]
    #[test_case("-example.com", false)]
    #[test_case("exa_mple.com", false)]
    #[test_case("example..com", false; "double dot")]
    fn hostnames(instance: &str, expected: bool) {
        assert_eq!(hostname(instance), expected);
    }

    #[test]
    fn hostname_length_limits() {
        let label = "a".repeat(63);
        assert!(hostname(&label));
        assert!(!hostname(&"a".repeat(64)));
        let name = [label.as_str(); 4].join(".");
        assert!(!hostname(&name));
    }

    #[test_case("127.0.0.1", true)]
    #[test_case("256.0.0.1", false)]
    #[test_case("::1", false)]
    fn ipv4s(instance: &str, expected: bool) {
        assert_eq!(ipv4(instance), expected);
    }

    #[test_case("::1", true)]
    #[test_case("2001:db8::8a2e:370:7334", true)]
    #[test_case("127.0.0.1", false)]
    fn ipv6s(instance: &str, expected: bool) {
        assert_eq!(ipv6(instance), expected);
    }

    #[test_case("http://example.com/path?q=1#frag", true)]
    #[test_case("relative/path", false; "uri needs a scheme")]
    fn uris(instance: &str, expected: bool) {
        assert_eq!(uri(instance), expected);
    }

    #[test_case("relative/path", true)]
    #[test_case("#fragment", true)]
    #[test_case("a%2Fb", true)]
    #[test_case("has space", false)]
    #[test_case("100%", false; "bare percent")]
    #[test_case("a#b#c", false; "second fragment marker")]
    fn uri_references(instance: &str, expected: bool) {
        assert_eq!(uri_reference(instance), expected);
    }

    #[test]
    fn iri_family_admits_ucs() {
        assert!(iri("http://例え.jp/パス"));
        assert!(iri_reference("パス/まで"));
        assert!(!uri_reference("パス/まで"));
    }

    #[test_case("", true)]
    #[test_case("/a/b", true)]
    #[test_case("/a/~01", true)]
    #[test_case("/a/~2", false)]
    #[test_case("a", false)]
    fn json_pointers(instance: &str, expected: bool) {
        assert_eq!(json_pointer(instance), expected);
    }

    #[test_case("2023-01-31", true)]
    #[test_case("2023-02-30", false)]
    #[test_case("2023-1-31", false; "months are zero padded")]
    fn dates(instance: &str, expected: bool) {
        assert_eq!(date(instance), expected);
    }

    #[test_case("1996-12-19T16:39:57-08:00", true)]
    #[test_case("1996-12-19t16:39:57z", true; "lowercase separators")]
    #[test_case("1996-12-19 16:39", false)]
    fn datetimes(instance: &str, expected: bool) {
        assert_eq!(datetime(instance), expected);
    }

    #[test_case("08:30:06Z", true)]
    #[test_case("12:00:00.5Z", true; "any fraction length")]
    #[test_case("23:59:60+23:59", true)]
    #[test_case("24:00:00Z", false)]
    #[test_case("12:00:00", false; "offset is required")]
    fn times(instance: &str, expected: bool) {
        assert_eq!(time(instance), expected);
    }

    #[test_case("http://example.com/{id}", true)]
    #[test_case("http://example.com/{ID}{?q,lang:4}", true)]
    #[test_case("{+path}/here", true)]
    #[test_case("{list*}", true)]
    #[test_case("http://example.com/{id", false)]
    #[test_case("{x:0}", false; "zero max length")]
    #[test_case("{.}", false; "dot needs varchars")]
    fn uri_templates(instance: &str, expected: bool) {
        assert_eq!(uri_template(instance), expected);
    }

    #[test_case("0", true)]
    #[test_case("1/a", true)]
    #[test_case("3#", true)]
    #[test_case("01", false)]
    #[test_case("1~", false)]
    fn relative_json_pointers(instance: &str, expected: bool) {
        assert_eq!(relative_json_pointer(instance), expected);
    }

    #[test]
    fn regexes() {
        assert!(regex("^ab?c$"));
        assert!(!regex("("));
    }
}
