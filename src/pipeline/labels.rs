// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Stage keys and labels
//!
//! A stage appears in the document under `camelCase(type)[:label]`. Labels
//! only need to be unique among stages of the same type.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::{HashMap, HashSet};

use crate::stages::{Stage, StageId};

/// Length of generated labels
const GENERATED_LABEL_LEN: usize = 6;

/// Split text into words on separators and case boundaries
fn words(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if !current.is_empty() && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            // "fooBar" and "HTTPServer" both split before the capital
            if !prev.is_uppercase() || next_is_lower {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

/// `"DiffWithSkeleton"` → `"diffWithSkeleton"`, `"all Copy"` → `"allCopy"`
pub fn camel_case(text: &str) -> String {
    words(text)
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i == 0 {
                return lower;
            }
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Upper-case the first character: `"stdioTest"` → `"StdioTest"`
pub fn title_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Document key of a stage
pub fn stage_key(name: &str, label: &str) -> String {
    if label.is_empty() {
        camel_case(name)
    } else {
        format!("{}:{}", camel_case(name), label)
    }
}

/// Short random alphanumeric label
pub fn random_label() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_LABEL_LEN)
        .map(char::from)
        .collect()
}

/// Give stages that share an empty label with others of their type a label
///
/// Stages with a label, or alone of their type, are untouched. Generated
/// labels never repeat a label already used by that type.
pub fn generate_disambiguating_labels(
    stage_data: &HashMap<StageId, Stage>,
) -> HashMap<StageId, Stage> {
    let mut unlabelled: HashMap<&str, Vec<StageId>> = HashMap::new();
    let mut used: HashMap<&str, HashSet<&str>> = HashMap::new();

    for (id, stage) in stage_data {
        if stage.label.is_empty() {
            unlabelled.entry(stage.name.as_str()).or_default().push(*id);
        } else {
            used.entry(stage.name.as_str())
                .or_default()
                .insert(stage.label.as_str());
        }
    }

    let mut result = stage_data.clone();

    for (name, ids) in unlabelled.into_iter().filter(|(_, ids)| ids.len() > 1) {
        let mut taken: HashSet<String> = used
            .get(name)
            .map(|labels| labels.iter().map(|l| l.to_string()).collect())
            .unwrap_or_default();

        for id in ids {
            let label = loop {
                let candidate = random_label();
                if taken.insert(candidate.clone()) {
                    break candidate;
                }
            };
            tracing::debug!(stage = name, label = %label, "Generated stage label");
            if let Some(stage) = result.get_mut(&id) {
                stage.label = label;
            }
        }
    }

    result
}
