//! Built-in Handlebars helpers
//!
//! Helpers return JSON values rather than writing strings, so they compose
//! inside subexpressions: `{{#if (and (gt count 0) (not hidden))}}`.
//! Missing values are treated like empty strings instead of raising errors,
//! matching what template authors expect from JavaScript Handlebars.

use handlebars::{Handlebars, JsonTruthy, handlebars_helper};
use serde_json::Value as Json;

/// Register all built-in helpers
pub fn register_builtin_helpers(handlebars: &mut Handlebars) {
    // Comparison
    handlebars.register_helper("eq", Box::new(eq_helper));
    handlebars.register_helper("ne", Box::new(ne_helper));
    handlebars.register_helper("lt", Box::new(lt_helper));
    handlebars.register_helper("gt", Box::new(gt_helper));
    handlebars.register_helper("lte", Box::new(lte_helper));
    handlebars.register_helper("gte", Box::new(gte_helper));

    // Logic
    handlebars.register_helper("and", Box::new(and_helper));
    handlebars.register_helper("or", Box::new(or_helper));
    handlebars.register_helper("not", Box::new(not_helper));

    // String
    handlebars.register_helper("upper", Box::new(upper_helper));
    handlebars.register_helper("lower", Box::new(lower_helper));
    handlebars.register_helper("capitalize", Box::new(capitalize_helper));
    handlebars.register_helper("trim", Box::new(trim_helper));
    handlebars.register_helper("replace", Box::new(replace_helper));
    handlebars.register_helper("truncate", Box::new(truncate_helper));
    handlebars.register_helper("append", Box::new(append_helper));
    handlebars.register_helper("prepend", Box::new(prepend_helper));
    handlebars.register_helper("split", Box::new(split_helper));
    handlebars.register_helper("startsWith", Box::new(starts_with_helper));
    handlebars.register_helper("endsWith", Box::new(ends_with_helper));
    handlebars.register_helper("contains", Box::new(contains_helper));

    // Collections
    handlebars.register_helper("len", Box::new(len_helper));
    handlebars.register_helper("join", Box::new(join_helper));
    handlebars.register_helper("first", Box::new(first_helper));
    handlebars.register_helper("last", Box::new(last_helper));
    handlebars.register_helper("includes", Box::new(contains_helper));

    // Math
    handlebars.register_helper("add", Box::new(add_helper));
    handlebars.register_helper("subtract", Box::new(subtract_helper));
    handlebars.register_helper("multiply", Box::new(multiply_helper));
    handlebars.register_helper("divide", Box::new(divide_helper));

    // Utility
    handlebars.register_helper("json", Box::new(json_helper));
    handlebars.register_helper("default", Box::new(default_helper));
}

/// String form of a value as it would print in a template.
fn text(value: &Json) -> String {
    match value {
        Json::Null => String::new(),
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn number(value: &Json) -> Option<f64> {
    match value {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Whole results print without a trailing `.0`.
fn number_json(value: f64) -> Json {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Json::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Json::Number)
            .unwrap_or(Json::Null)
    }
}

fn compare(a: &Json, b: &Json) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Json::String(x), Json::String(y)) => Some(x.cmp(y)),
        _ => number(a)?.partial_cmp(&number(b)?),
    }
}

fn arithmetic(a: &Json, b: &Json, op: fn(f64, f64) -> f64) -> Json {
    match (number(a), number(b)) {
        (Some(x), Some(y)) => number_json(op(x, y)),
        _ => Json::Null,
    }
}

// Comparison: {{#if (eq a b)}}
handlebars_helper!(eq_helper: |a: Json, b: Json| a == b);
handlebars_helper!(ne_helper: |a: Json, b: Json| a != b);
handlebars_helper!(lt_helper: |a: Json, b: Json| compare(a, b).is_some_and(|o| o.is_lt()));
handlebars_helper!(gt_helper: |a: Json, b: Json| compare(a, b).is_some_and(|o| o.is_gt()));
handlebars_helper!(lte_helper: |a: Json, b: Json| compare(a, b).is_some_and(|o| o.is_le()));
handlebars_helper!(gte_helper: |a: Json, b: Json| compare(a, b).is_some_and(|o| o.is_ge()));

// Logic: {{#if (and a b c)}}
// Truthiness matches `{{#if}}`: zero and empty collections are false.
handlebars_helper!(and_helper: |*args| {
    !args.is_empty() && args.iter().all(|v| v.is_truthy(false))
});
handlebars_helper!(or_helper: |*args| args.iter().any(|v| v.is_truthy(false)));
handlebars_helper!(not_helper: |v: Json| !v.is_truthy(false));

// String
handlebars_helper!(upper_helper: |s: Json| text(s).to_uppercase());
handlebars_helper!(lower_helper: |s: Json| text(s).to_lowercase());
handlebars_helper!(capitalize_helper: |s: Json| {
    let s = text(s);
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    }
});
handlebars_helper!(trim_helper: |s: Json| text(s).trim().to_string());
handlebars_helper!(replace_helper: |s: Json, from: Json, to: Json| {
    let from = text(from);
    if from.is_empty() { text(s) } else { text(s).replace(&from, &text(to)) }
});
handlebars_helper!(truncate_helper: |s: Json, limit: Json, {suffix: str = ""}| {
    let s = text(s);
    let limit = number(limit).map(|n| n.max(0.0) as usize).unwrap_or(usize::MAX);
    if s.chars().count() <= limit {
        s
    } else {
        s.chars().take(limit).collect::<String>() + suffix
    }
});
handlebars_helper!(append_helper: |s: Json, suffix: Json| text(s) + &text(suffix));
handlebars_helper!(prepend_helper: |s: Json, prefix: Json| text(prefix) + &text(s));
handlebars_helper!(split_helper: |s: Json, {sep: str = ","}| {
    text(s)
        .split(sep)
        .map(|part| Json::String(part.to_string()))
        .collect::<Vec<Json>>()
});
handlebars_helper!(starts_with_helper: |s: Json, prefix: Json| text(s).starts_with(&text(prefix)));
handlebars_helper!(ends_with_helper: |s: Json, suffix: Json| text(s).ends_with(&text(suffix)));
handlebars_helper!(contains_helper: |haystack: Json, needle: Json| match haystack {
    Json::Array(items) => items.contains(needle),
    Json::Object(map) => map.contains_key(&text(needle)),
    Json::Null => false,
    other => text(other).contains(&text(needle)),
});

// Collections
handlebars_helper!(len_helper: |v: Json| match v {
    Json::Array(arr) => arr.len(),
    Json::Object(obj) => obj.len(),
    Json::String(s) => s.chars().count(),
    _ => 0,
});
handlebars_helper!(join_helper: |*args| {
    let sep = args.get(1).map(|v| text(v)).unwrap_or_else(|| ", ".to_string());
    match args.first() {
        Some(Json::Array(items)) => items.iter().map(text).collect::<Vec<_>>().join(&sep),
        Some(other) => text(other),
        None => String::new(),
    }
});
handlebars_helper!(first_helper: |v: Json| match v {
    Json::Array(items) => items.first().cloned().unwrap_or(Json::Null),
    _ => Json::Null,
});
handlebars_helper!(last_helper: |v: Json| match v {
    Json::Array(items) => items.last().cloned().unwrap_or(Json::Null),
    _ => Json::Null,
});

// Math
handlebars_helper!(add_helper: |a: Json, b: Json| arithmetic(a, b, |x, y| x + y));
handlebars_helper!(subtract_helper: |a: Json, b: Json| arithmetic(a, b, |x, y| x - y));
handlebars_helper!(multiply_helper: |a: Json, b: Json| arithmetic(a, b, |x, y| x * y));
handlebars_helper!(divide_helper: |a: Json, b: Json| arithmetic(a, b, |x, y| x / y));

// Utility
handlebars_helper!(json_helper: |v: Json| serde_json::to_string(v).unwrap_or_default());
handlebars_helper!(default_helper: |*args| {
    match (args.first(), args.get(1)) {
        (Some(value), _) if value.is_truthy(false) => (*value).clone(),
        (_, Some(fallback)) => (*fallback).clone(),
        _ => Json::Null,
    }
});

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(template: &str, data: Json) -> String {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        register_builtin_helpers(&mut handlebars);
        handlebars.render_template(template, &data).unwrap()
    }

    #[test]
    fn test_eq_helper() {
        let template = "{{#if (eq a b)}}equal{{else}}not equal{{/if}}";
        assert_eq!(render(template, json!({"a": 5, "b": 5})), "equal");
        assert_eq!(render(template, json!({"a": 5, "b": 10})), "not equal");
    }

    #[test]
    fn test_ordering_helpers() {
        let template = "{{#if (gt count 10)}}many{{else}}few{{/if}}";
        assert_eq!(render(template, json!({"count": 42})), "many");
        assert_eq!(render(template, json!({"count": 3})), "few");
        assert_eq!(render(template, json!({})), "few");

        assert_eq!(render("{{lte a b}}", json!({"a": "apple", "b": "banana"})), "true");
    }

    #[test]
    fn test_logic_helpers() {
        let data = json!({"a": true, "b": "", "c": [1]});
        assert_eq!(render("{{and a c}}", data.clone()), "true");
        assert_eq!(render("{{and a b}}", data.clone()), "false");
        assert_eq!(render("{{or b c}}", data.clone()), "true");
        assert_eq!(render("{{not b}}", data), "true");
    }

    #[test]
    fn test_logic_helpers_agree_with_if() {
        let data = json!({"none": [], "zero": 0, "some": {"k": 1}});
        assert_eq!(render("{{#if none}}yes{{else}}no{{/if}}", data.clone()), "no");
        assert_eq!(render("{{not none}}", data.clone()), "true");
        assert_eq!(render("{{or zero none}}", data.clone()), "false");
        assert_eq!(render("{{and some}}", data.clone()), "true");
        assert_eq!(render("{{default zero \"n/a\"}}", data), "n/a");
    }

    #[test]
    fn test_string_helpers() {
        let data = json!({"name": "  ada lovelace  ", "word": "hello"});
        assert_eq!(render("{{upper word}}", data.clone()), "HELLO");
        assert_eq!(render("{{capitalize (trim name)}}", data.clone()), "Ada lovelace");
        assert_eq!(render("{{replace word \"l\" \"L\"}}", data.clone()), "heLLo");
        assert_eq!(render("{{truncate word 3 suffix=\"...\"}}", data.clone()), "hel...");
        assert_eq!(render("{{append word \"!\"}}", data.clone()), "hello!");
        assert_eq!(render("{{#if (startsWith word \"he\")}}yes{{/if}}", data), "yes");
    }

    #[test]
    fn test_missing_values_render_empty() {
        assert_eq!(render("[{{upper missing}}]", json!({})), "[]");
        assert_eq!(render("[{{len missing}}]", json!({})), "[0]");
    }

    #[test]
    fn test_collection_helpers() {
        let data = json!({"items": ["a", "b", "c"], "csv": "x,y"});
        assert_eq!(render("{{len items}}", data.clone()), "3");
        assert_eq!(render("{{join items \" | \"}}", data.clone()), "a | b | c");
        assert_eq!(render("{{join items}}", data.clone()), "a, b, c");
        assert_eq!(render("{{first items}}-{{last items}}", data.clone()), "a-c");
        assert_eq!(render("{{#each (split csv)}}<{{this}}>{{/each}}", data.clone()), "<x><y>");
        assert_eq!(render("{{includes items \"b\"}}", data), "true");
    }

    #[test]
    fn test_math_helpers() {
        let data = json!({"price": 10, "qty": "3"});
        assert_eq!(render("{{multiply price qty}}", data.clone()), "30");
        assert_eq!(render("{{add price 0.5}}", data.clone()), "10.5");
        assert_eq!(render("{{subtract price qty}}", data.clone()), "7");
        assert_eq!(render("[{{divide price 0}}]", data), "[]");
    }

    #[test]
    fn test_default_and_json() {
        assert_eq!(render("{{default name \"friend\"}}", json!({})), "friend");
        assert_eq!(render("{{default name \"friend\"}}", json!({"name": "Kim"})), "Kim");
        assert_eq!(render("{{json obj}}", json!({"obj": {"a": 1}})), "{\"a\":1}");
    }
}
