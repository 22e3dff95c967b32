use any_ascii::any_ascii;
use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};

use crate::ir::NormalizedName;

/// Create a `NormalizedName` from an arbitrary string, computing all casing variants.
pub fn normalize_name(name: &str) -> NormalizedName {
    let sanitized = sanitize_identifier(&transliterate(name));

    NormalizedName {
        original: name.to_string(),
        pascal_case: sanitized.to_pascal_case(),
        camel_case: sanitized.to_lower_camel_case(),
        snake_case: sanitized.to_snake_case(),
        screaming_snake: sanitized.to_shouty_snake_case(),
    }
}

/// Reduce a name to ASCII. German umlauts become their two-letter spelling
/// (`Größe` → `Groesse`); everything else goes through `any_ascii`.
pub fn transliterate(name: &str) -> String {
    let mut expanded = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            'ä' => expanded.push_str("ae"),
            'ö' => expanded.push_str("oe"),
            'ü' => expanded.push_str("ue"),
            'Ä' => expanded.push_str("Ae"),
            'Ö' => expanded.push_str("Oe"),
            'Ü' => expanded.push_str("Ue"),
            other => expanded.push(other),
        }
    }
    any_ascii(&expanded)
}

/// Derive a camelCase operation name from HTTP method + path.
///
/// Examples:
/// - `GET /users` → `listUsers`
/// - `POST /users` → `createUsers`
/// - `GET /users/{userId}` → `getUser`
/// - `DELETE /users/{userId}` → `deleteUser`
/// - `GET /users/{userId}/messages` → `listUsersMessages`
pub fn route_to_name(method: &str, path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let mut resource_parts: Vec<String> = Vec::new();
    let mut ends_with_param = false;

    for seg in &segments {
        if seg.starts_with('{') && seg.ends_with('}') {
            ends_with_param = true;
        } else {
            resource_parts.push(transliterate(seg));
            ends_with_param = false;
        }
    }

    let method_upper = method.to_uppercase();
    let prefix = match method_upper.as_str() {
        "GET" if ends_with_param => "get",
        "GET" => "list",
        "POST" => "create",
        "PUT" => "update",
        "DELETE" => "delete",
        "PATCH" => "patch",
        "OPTIONS" => "options",
        "HEAD" => "head",
        "TRACE" => "trace",
        other => other,
    };

    if resource_parts.is_empty() {
        return prefix.to_string();
    }

    // Only the last segment of a single-resource route is singularized.
    let mut pascal_parts = String::new();
    for (i, part) in resource_parts.iter().enumerate() {
        let is_last = i == resource_parts.len() - 1;
        let word = if is_last && ends_with_param {
            singularize(part)
        } else {
            part.to_string()
        };
        pascal_parts.push_str(&word.to_pascal_case());
    }

    format!("{prefix}{pascal_parts}")
}

/// Naive singularization: strips trailing 's' if present.
fn singularize(word: &str) -> String {
    if word.ends_with("ies") && word.len() > 3 {
        format!("{}y", &word[..word.len() - 3])
    } else if word.ends_with("ses") || word.ends_with("xes") || word.ends_with("zes") {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Upper-case with an underscore before every capital of the input.
///
/// `partnerId` → `PARTNER_ID`. Leading capitals also get one, so `Id` → `_ID`.
pub fn constant_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            result.push('_');
        }
        result.push(ch.to_ascii_uppercase());
    }
    result
}

/// Join the letters-only words of `text` as lowerCamel case.
///
/// `Some Sample REST Application` → `someSampleRestApplication`
pub fn camelize_spaced(text: &str) -> String {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            transliterate(w)
                .chars()
                .filter(|c| c.is_ascii_alphabetic())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();
    words.join(" ").to_lower_camel_case()
}

/// Upper-case the first character.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The short application name, in lowerCamel case. A configured service
/// name wins over the `x-short-name` extension, which wins over the title.
pub fn short_app_name(service_name: Option<&str>, short_name: Option<&str>, title: &str) -> String {
    let source = service_name.or(short_name).unwrap_or(title);
    let name = camelize_spaced(source);
    if name.is_empty() {
        "api".to_string()
    } else {
        name
    }
}

/// The 32-bit string hash used by JVM-generated code: UTF-16 code units,
/// `h = 31 * h + c`, wrapping.
pub fn java_string_hash(text: &str) -> i32 {
    text.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Sanitize a string to be a valid identifier.
fn sanitize_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_was_separator = false;

    for (i, ch) in name.chars().enumerate() {
        if ch.is_alphanumeric() {
            if i == 0 && ch.is_ascii_digit() {
                result.push('_');
            }
            if prev_was_separator && !result.is_empty() {
                result.push('_');
            }
            result.push(ch);
            prev_was_separator = false;
        } else {
            prev_was_separator = true;
        }
    }

    if result.is_empty() {
        return "unnamed".to_string();
    }

    result
}
