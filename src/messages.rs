//! Localized problem messages.
//!
//! Message keys are stable identifiers; the catalogs below resolve them into
//! human-readable templates. Parameters are substituted by `{name}`.
use crate::problem::Problem;
use serde_json::Value;
use std::collections::HashMap;
use std::env;

/// Supported message locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    En,
    Ja,
}

impl Locale {
    /// Parse a locale tag such as `ja`, `ja_JP.UTF-8` or `en-US`.
    pub fn from_tag(tag: &str) -> Option<Locale> {
        let language = tag
            .split(|c| c == '_' || c == '-' || c == '.')
            .next()
            .unwrap_or("");
        match language {
            "en" | "C" | "POSIX" => Some(Locale::En),
            "ja" => Some(Locale::Ja),
            _ => None,
        }
    }

    /// Locale from the standard environment variables, `LC_ALL` first.
    pub fn from_environment() -> Locale {
        for name in &["LC_ALL", "LC_MESSAGES", "LANG"] {
            if let Ok(tag) = env::var(name) {
                if let Some(locale) = Locale::from_tag(&tag) {
                    return locale;
                }
            }
        }
        Locale::En
    }
}

impl Default for Locale {
    fn default() -> Locale {
        *DETECTED
    }
}

lazy_static::lazy_static! {
    static ref DETECTED: Locale = Locale::from_environment();

    static ref EN: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("instance.problem.type", "the value must be of {expected} type, but actual type is {actual}");
        m.insert("instance.problem.not.type", "the value must not be of {expected} type");
        m.insert("instance.problem.enum", "the value must be one of {expected}");
        m.insert("instance.problem.not.enum", "the value must not be one of {expected}");
        m.insert("instance.problem.const", "the value must be constant {expected}");
        m.insert("instance.problem.not.const", "the value must not be constant {expected}");
        m.insert("instance.problem.multipleOf", "the numeric value must be a multiple of {factor}");
        m.insert("instance.problem.not.multipleOf", "the numeric value must not be a multiple of {factor}");
        m.insert("instance.problem.maximum", "the numeric value must be less than or equal to {bound}");
        m.insert("instance.problem.not.maximum", "the numeric value must be greater than {bound}");
        m.insert("instance.problem.exclusiveMaximum", "the numeric value must be less than {bound}");
        m.insert("instance.problem.not.exclusiveMaximum", "the numeric value must be greater than or equal to {bound}");
        m.insert("instance.problem.minimum", "the numeric value must be greater than or equal to {bound}");
        m.insert("instance.problem.not.minimum", "the numeric value must be less than {bound}");
        m.insert("instance.problem.exclusiveMinimum", "the numeric value must be greater than {bound}");
        m.insert("instance.problem.not.exclusiveMinimum", "the numeric value must be less than or equal to {bound}");
        m.insert("instance.problem.maxLength", "the string must be at most {bound} characters long, but actual length is {actual}");
        m.insert("instance.problem.not.maxLength", "the string must be more than {bound} characters long");
        m.insert("instance.problem.minLength", "the string must be at least {bound} characters long, but actual length is {actual}");
        m.insert("instance.problem.not.minLength", "the string must be less than {bound} characters long");
        m.insert("instance.problem.pattern", "the string must match the pattern \"{pattern}\"");
        m.insert("instance.problem.not.pattern", "the string must not match the pattern \"{pattern}\"");
        m.insert("instance.problem.maxItems", "the array must have at most {bound} element(s), but actual size is {actual}");
        m.insert("instance.problem.not.maxItems", "the array must have more than {bound} element(s)");
        m.insert("instance.problem.minItems", "the array must have at least {bound} element(s), but actual size is {actual}");
        m.insert("instance.problem.not.minItems", "the array must have less than {bound} element(s)");
        m.insert("instance.problem.additionalItems", "the array must have at most {bound} element(s) matched by the tuple");
        m.insert("instance.problem.uniqueItems", "the array must not have duplicate elements, but the element at {index} repeats the one at {first}");
        m.insert("instance.problem.not.uniqueItems", "the array must have duplicate elements");
        m.insert("instance.problem.contains", "the array must contain at least {bound} element(s) matching the schema");
        m.insert("instance.problem.maxContains", "the array must contain at most {bound} element(s) matching the schema, but actually contains {actual}");
        m.insert("instance.problem.not.contains", "the array must not contain an element matching the schema");
        m.insert("instance.problem.maxProperties", "the object must have at most {bound} propert(ies), but actual count is {actual}");
        m.insert("instance.problem.not.maxProperties", "the object must have more than {bound} propert(ies)");
        m.insert("instance.problem.minProperties", "the object must have at least {bound} propert(ies), but actual count is {actual}");
        m.insert("instance.problem.not.minProperties", "the object must have less than {bound} propert(ies)");
        m.insert("instance.problem.required", "the object must have the propert(ies) {missing}");
        m.insert("instance.problem.not.required", "the object must not have all of the propert(ies) {expected}");
        m.insert("instance.problem.additionalProperties", "the object must not have a property whose name is \"{name}\"");
        m.insert("instance.problem.not.additionalProperties", "the object must have a property outside of the declared ones");
        m.insert("instance.problem.dependencies", "the object must have the propert(ies) {missing} when the property \"{dependant}\" is present");
        m.insert("instance.problem.not.dependencies", "the object must miss one of the propert(ies) {expected} when the property \"{dependant}\" is present");
        m.insert("instance.problem.not.properties", "some declared property value must violate its schema");
        m.insert("instance.problem.not.patternProperties", "some pattern-matched property value must violate its schema");
        m.insert("instance.problem.not.items", "some array element must violate its schema");
        m.insert("instance.problem.not.propertyNames", "some property name must violate its schema");
        m.insert("instance.problem.anyOf", "the value must match at least one schema out of {total}");
        m.insert("instance.problem.oneOf.few", "the value must match exactly one schema out of {total}, but matched none");
        m.insert("instance.problem.oneOf.many", "the value must match exactly one schema out of {total}, but matched {matched}");
        m.insert("instance.problem.not.oneOf", "the value must not match exactly one of the schemas");
        m.insert("instance.problem.format", "the value must be a valid \"{attribute}\"");
        m.insert("instance.problem.not.format", "the value must not be a valid \"{attribute}\"");
        m.insert("instance.problem.contentEncoding", "the string must be encoded in \"{encoding}\"");
        m.insert("instance.problem.contentMediaType", "the content must be of media type \"{type}\"");
        m.insert("instance.problem.ref", "the schema reference \"{uri}\" cannot be resolved");
        m.insert("instance.problem.unacceptable", "no value is accepted under this schema");
        m.insert("instance.problem.not.schema", "the value must not satisfy the schema");
        m.insert("branch.header", "candidate:");
        m
    };

    static ref JA: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("instance.problem.type", "値は{expected}型でなければいけません。実際の型は{actual}です。");
        m.insert("instance.problem.not.type", "値は{expected}型であってはいけません。");
        m.insert("instance.problem.enum", "値は{expected}のいずれかでなければいけません。");
        m.insert("instance.problem.not.enum", "値は{expected}のいずれかであってはいけません。");
        m.insert("instance.problem.const", "値は定数{expected}でなければいけません。");
        m.insert("instance.problem.not.const", "値は定数{expected}であってはいけません。");
        m.insert("instance.problem.multipleOf", "数値は{factor}の倍数でなければいけません。");
        m.insert("instance.problem.not.multipleOf", "数値は{factor}の倍数であってはいけません。");
        m.insert("instance.problem.maximum", "数値は{bound}以下でなければいけません。");
        m.insert("instance.problem.not.maximum", "数値は{bound}より大きくなければいけません。");
        m.insert("instance.problem.exclusiveMaximum", "数値は{bound}より小さくなければいけません。");
        m.insert("instance.problem.not.exclusiveMaximum", "数値は{bound}以上でなければいけません。");
        m.insert("instance.problem.minimum", "数値は{bound}以上でなければいけません。");
        m.insert("instance.problem.not.minimum", "数値は{bound}より小さくなければいけません。");
        m.insert("instance.problem.exclusiveMinimum", "数値は{bound}より大きくなければいけません。");
        m.insert("instance.problem.not.exclusiveMinimum", "数値は{bound}以下でなければいけません。");
        m.insert("instance.problem.maxLength", "文字列の長さは{bound}文字以下でなければいけません。実際の長さは{actual}です。");
        m.insert("instance.problem.not.maxLength", "文字列の長さは{bound}文字より長くなければいけません。");
        m.insert("instance.problem.minLength", "文字列の長さは{bound}文字以上でなければいけません。実際の長さは{actual}です。");
        m.insert("instance.problem.not.minLength", "文字列の長さは{bound}文字より短くなければいけません。");
        m.insert("instance.problem.pattern", "文字列はパターン\"{pattern}\"に一致しなければいけません。");
        m.insert("instance.problem.not.pattern", "文字列はパターン\"{pattern}\"に一致してはいけません。");
        m.insert("instance.problem.maxItems", "配列の要素数は{bound}個以下でなければいけません。実際の要素数は{actual}です。");
        m.insert("instance.problem.not.maxItems", "配列の要素数は{bound}個より多くなければいけません。");
        m.insert("instance.problem.minItems", "配列の要素数は{bound}個以上でなければいけません。実際の要素数は{actual}です。");
        m.insert("instance.problem.not.minItems", "配列の要素数は{bound}個より少なくなければいけません。");
        m.insert("instance.problem.additionalItems", "配列の要素数は{bound}個以下でなければいけません。");
        m.insert("instance.problem.uniqueItems", "配列の要素は重複してはいけません。{index}番目の要素は{first}番目の要素と同じです。");
        m.insert("instance.problem.not.uniqueItems", "配列は重複する要素を持たなければいけません。");
        m.insert("instance.problem.contains", "配列はスキーマに一致する要素を{bound}個以上含まなければいけません。");
        m.insert("instance.problem.maxContains", "配列はスキーマに一致する要素を{bound}個以下しか含んではいけません。実際は{actual}個です。");
        m.insert("instance.problem.not.contains", "配列はスキーマに一致する要素を含んではいけません。");
        m.insert("instance.problem.maxProperties", "オブジェクトのプロパティ数は{bound}個以下でなければいけません。実際の数は{actual}です。");
        m.insert("instance.problem.not.maxProperties", "オブジェクトのプロパティ数は{bound}個より多くなければいけません。");
        m.insert("instance.problem.minProperties", "オブジェクトのプロパティ数は{bound}個以上でなければいけません。実際の数は{actual}です。");
        m.insert("instance.problem.not.minProperties", "オブジェクトのプロパティ数は{bound}個より少なくなければいけません。");
        m.insert("instance.problem.required", "オブジェクトはプロパティ{missing}を持たなければいけません。");
        m.insert("instance.problem.not.required", "オブジェクトはプロパティ{expected}のすべてを持ってはいけません。");
        m.insert("instance.problem.additionalProperties", "オブジェクトは\"{name}\"という名前のプロパティを持ってはいけません。");
        m.insert("instance.problem.not.additionalProperties", "オブジェクトは宣言されていないプロパティを持たなければいけません。");
        m.insert("instance.problem.dependencies", "プロパティ\"{dependant}\"が存在する場合、オブジェクトはプロパティ{missing}を持たなければいけません。");
        m.insert("instance.problem.not.dependencies", "プロパティ\"{dependant}\"が存在する場合、オブジェクトはプロパティ{expected}のいずれかを欠かなければいけません。");
        m.insert("instance.problem.not.properties", "宣言されたプロパティの値のいずれかがスキーマに違反しなければいけません。");
        m.insert("instance.problem.not.patternProperties", "パターンに一致するプロパティの値のいずれかがスキーマに違反しなければいけません。");
        m.insert("instance.problem.not.items", "配列要素のいずれかがスキーマに違反しなければいけません。");
        m.insert("instance.problem.not.propertyNames", "プロパティ名のいずれかがスキーマに違反しなければいけません。");
        m.insert("instance.problem.anyOf", "値は{total}個のスキーマのうち少なくとも1つに一致しなければいけません。");
        m.insert("instance.problem.oneOf.few", "値は{total}個のスキーマのうちちょうど1つに一致しなければいけませんが、どれにも一致しません。");
        m.insert("instance.problem.oneOf.many", "値は{total}個のスキーマのうちちょうど1つに一致しなければいけませんが、{matched}個に一致します。");
        m.insert("instance.problem.not.oneOf", "値はスキーマのちょうど1つに一致してはいけません。");
        m.insert("instance.problem.format", "値は有効な\"{attribute}\"でなければいけません。");
        m.insert("instance.problem.not.format", "値は有効な\"{attribute}\"であってはいけません。");
        m.insert("instance.problem.contentEncoding", "文字列は\"{encoding}\"で符号化されていなければいけません。");
        m.insert("instance.problem.contentMediaType", "内容のメディアタイプは\"{type}\"でなければいけません。");
        m.insert("instance.problem.ref", "スキーマ参照\"{uri}\"を解決できません。");
        m.insert("instance.problem.unacceptable", "このスキーマの下ではどの値も受け入れられません。");
        m.insert("instance.problem.not.schema", "値はスキーマを満たしてはいけません。");
        m.insert("branch.header", "候補:");
        m
    };
}

fn catalog(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    match locale {
        Locale::En => &EN,
        Locale::Ja => &JA,
    }
}

pub(crate) fn branch_header(locale: Locale) -> &'static str {
    catalog(locale).get("branch.header").copied().unwrap_or("")
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(format_value).collect();
            parts.join(", ")
        }
        other => other.to_string(),
    }
}

/// Resolve the problem's message key through the locale catalog and
/// substitute its parameters.
pub(crate) fn render(problem: &Problem, locale: Locale) -> String {
    let template = match catalog(locale).get(problem.message_key()) {
        Some(template) => *template,
        // Unknown keys degrade to the key itself plus the parameter bag.
        None => {
            let mut out = problem.message_key().to_string();
            for (name, value) in problem.parameters() {
                out.push_str(&format!(" {}={}", name, format_value(value)));
            }
            return out;
        }
    };
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        match rest[open..].find('}') {
            Some(close) => {
                let name = &rest[open + 1..open + close];
                match problem.parameters().iter().find(|(n, _)| *n == name) {
                    Some((_, value)) => out.push_str(&format_value(value)),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &rest[open + close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Location;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("ja", Some(Locale::Ja))]
    #[test_case("ja_JP.UTF-8", Some(Locale::Ja))]
    #[test_case("en-US", Some(Locale::En))]
    #[test_case("C", Some(Locale::En))]
    #[test_case("fr_FR", None)]
    fn locale_tags(tag: &str, expected: Option<Locale>) {
        assert_eq!(Locale::from_tag(tag), expected);
    }

    #[test]
    fn substitutes_parameters() {
        let problem = Problem::new("maximum", "instance.problem.maximum", Location::new(1, 1))
            .param("bound", 100);
        assert_eq!(
            render(&problem, Locale::En),
            "the numeric value must be less than or equal to 100"
        );
        assert_eq!(render(&problem, Locale::Ja), "数値は100以下でなければいけません。");
    }

    #[test]
    fn unknown_key_falls_back() {
        let problem = Problem::new("x", "instance.problem.bogus", Location::new(1, 1))
            .param("a", json!(1));
        assert_eq!(render(&problem, Locale::En), "instance.problem.bogus a=1");
    }
}
