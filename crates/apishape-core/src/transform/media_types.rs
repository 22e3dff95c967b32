use std::sync::LazyLock;

use regex::Regex;

use crate::ir::MediaTypeEntry;

static JSON_MIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^application/json(;.*)?$").expect("invalid regex"));
static JSON_VENDOR_MIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^application/vnd\..+\+json(;.*)?$").expect("invalid regex"));

const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// `application/json`, with or without parameters, any case.
pub fn is_json_mime(mime: &str) -> bool {
    JSON_MIME.is_match(mime)
}

/// `application/vnd.<vendor>+json`, e.g. `application/vnd.acme.pets.v1+json`.
pub fn is_json_vendor_mime(mime: &str) -> bool {
    JSON_VENDOR_MIME.is_match(mime)
}

/// Multipart operations keep their declared order; only the first entry counts.
pub fn is_multipart(consumes: &[String]) -> bool {
    consumes.first().is_some_and(|mt| mt == MULTIPART_FORM_DATA)
}

/// Reorder consumed media types so vendor JSON comes first, then plain JSON,
/// then everything else. Order within each bucket is preserved; lists of at
/// most one entry are returned as they are.
pub fn prioritize(consumes: &[String]) -> Vec<String> {
    if consumes.len() <= 1 {
        return consumes.to_vec();
    }

    let mut vendor_json = Vec::new();
    let mut json = Vec::new();
    let mut rest = Vec::new();
    for mime in consumes {
        if is_json_vendor_mime(mime) {
            vendor_json.push(mime.clone());
        } else if is_json_mime(mime) {
            json.push(mime.clone());
        } else {
            rest.push(mime.clone());
        }
    }

    vendor_json.extend(json);
    vendor_json.extend(rest);
    vendor_json
}

/// [`prioritize`], with the rendering marker set on every entry but the last.
pub fn prioritize_entries(consumes: &[String]) -> Vec<MediaTypeEntry> {
    MediaTypeEntry::sequence(&prioritize(consumes))
}
