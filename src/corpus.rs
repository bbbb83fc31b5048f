//! Flat-file record parser.
//!
//! The corpus is a text file of review records separated by blank lines.
//! Each record is a run of `key: value` lines, where keys may carry a
//! `/`-separated hierarchy (`review/points`); only the final segment is the
//! logical field name. The whole blob is HTML-entity-decoded before any
//! splitting, since entity-encoded text can span field values.
//!
//! Parsing is best-effort: a line without the `": "` delimiter is skipped,
//! and a block that yields no fields produces no record. A single bad block
//! never fails the load.

use std::collections::HashMap;

/// Raw field map for one record block, before typed projection.
pub type RawRecord = HashMap<String, String>;

/// Parse the full corpus blob into raw records.
///
/// Blocks are delimited by two consecutive newlines; lines within a block are
/// split on the first `": "` occurrence (values may themselves contain
/// colons).
pub fn parse_records(blob: &str) -> Vec<RawRecord> {
    let decoded = decode_entities(blob);

    decoded
        .split("\n\n")
        .filter_map(|block| {
            let record = parse_block(block);
            if record.is_empty() {
                None
            } else {
                Some(record)
            }
        })
        .collect()
}

/// Parse one record block into a field map. Lines lacking the delimiter are
/// skipped.
fn parse_block(block: &str) -> RawRecord {
    let mut fields = RawRecord::new();

    for line in block.split('\n') {
        let Some((key, value)) = line.split_once(": ") else {
            continue;
        };
        fields.insert(field_name(key).to_string(), value.to_string());
    }

    fields
}

/// Derive the logical field name: the final `/`-segment of the key.
fn field_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Decode HTML entities: the named entities that occur in the corpus plus
/// decimal (`&#39;`) and hex (`&#x27;`) numeric forms.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        // An entity is '&' .. ';' with no intervening whitespace or '&'.
        let Some(end) = rest[1..]
            .find(';')
            .filter(|&end| !rest[1..1 + end].contains(|c: char| c == ' ' || c == '\n' || c == '&'))
        else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };

        let entity = &rest[1..1 + end];
        match decode_entity(entity) {
            Some(decoded) => {
                out.push_str(&decoded);
                rest = &rest[entity.len() + 2..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<String> {
    let named = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        _ => "",
    };
    if !named.is_empty() {
        return Some(named.to_string());
    }

    let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()?
    } else {
        return None;
    };

    char::from_u32(code).map(|c| c.to_string())
}
