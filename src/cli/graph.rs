// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Graph command - show the stage graph

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::{load_config, report, GraphFormat};
use crate::editor::GraphEditor;
use crate::errors::BuilderResult;
use crate::pipeline::Config;
use crate::stages::{palette, StageId};
use crate::utils::{print_header, print_section};

/// Run the graph command
///
/// With `--verbose`, the text format is followed by the node layout.
pub async fn run(
    file: PathBuf,
    format: GraphFormat,
    show_palette: bool,
    verbose: bool,
) -> Result<()> {
    if show_palette {
        print_palette();
        return Ok(());
    }

    let config = load_config(&file)?;

    let output = match format {
        GraphFormat::Text => to_text(&config).map_err(report)?,
        GraphFormat::Dot => to_dot(&config),
        GraphFormat::Mermaid => to_mermaid(&config),
        GraphFormat::Layout => to_layout(&config),
    };

    println!("{}", output);

    if verbose && format == GraphFormat::Text {
        print_section("Layout");
        print!("{}", to_layout(&config));
    }

    Ok(())
}

fn print_palette() {
    print_header("Stage types");
    for (kind, types) in palette() {
        print_section(&kind.to_string());
        for stage_type in types {
            println!(
                "  {:<26} {}",
                stage_type.name.cyan(),
                stage_type.description.dimmed()
            );
        }
    }
}

fn key_of(config: &Config, id: StageId) -> String {
    config
        .stage_data
        .get(&id)
        .map(|stage| stage.key())
        .unwrap_or_else(|| id.to_string())
}

/// Relations as `(dependency key, dependent key)`, sorted for stable output
fn keyed_relations(config: &Config) -> Vec<(String, String)> {
    let mut relations: Vec<(String, String)> = config
        .stage_deps
        .relations()
        .map(|(dep, node)| (key_of(config, dep), key_of(config, node)))
        .collect();
    relations.sort();
    relations
}

/// Numbered execution order
pub fn to_text(config: &Config) -> BuilderResult<String> {
    let mut out = String::new();

    for (i, (key, stage)) in config.ordered_stages()?.into_iter().enumerate() {
        out.push_str(&format!("{}. {} ({}, {})", i + 1, key, stage.name, stage.kind));
        if !stage.config.is_supported() {
            out.push_str(" [unsupported]");
        }
        out.push('\n');
    }

    Ok(out)
}

/// Graphviz rendering; works for any graph shape
pub fn to_dot(config: &Config) -> String {
    let mut out = String::from("digraph pipeline {\n");
    out.push_str("    rankdir=TB;\n");
    out.push_str("    node [shape=box, style=rounded];\n\n");

    for (from, to) in keyed_relations(config) {
        out.push_str(&format!("    \"{}\" -> \"{}\";\n", from, to));
    }

    // Isolated stages
    let mut isolated: Vec<String> = config
        .stage_deps
        .nodes()
        .filter(|id| {
            config.stage_deps.dependencies(*id).is_empty()
                && config.stage_deps.successors(*id).is_empty()
        })
        .map(|id| key_of(config, id))
        .collect();
    isolated.sort();
    for key in isolated {
        out.push_str(&format!("    \"{}\";\n", key));
    }

    out.push_str("}\n");
    out
}

/// Mermaid flowchart rendering
pub fn to_mermaid(config: &Config) -> String {
    let mut out = String::from("graph TD\n");
    let node_name = |key: &str| key.replace(':', "_");

    let mut keys: Vec<String> = config.stage_data.values().map(|s| s.key()).collect();
    keys.sort();
    for key in &keys {
        out.push_str(&format!("    {}[\"{}\"]\n", node_name(key), key));
    }

    for (from, to) in keyed_relations(config) {
        out.push_str(&format!("    {} --> {}\n", node_name(&from), node_name(&to)));
    }

    out
}

/// Node positions as computed by the editor layout
pub fn to_layout(config: &Config) -> String {
    let editor = GraphEditor::new(config.clone());
    let mut out = String::new();

    for node in editor.nodes() {
        out.push_str(&format!(
            "{:<32} x={:>7.1} y={:>7.1}\n",
            key_of(config, node.id),
            node.position.x,
            node.position.y
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN: &str = "diffWithSkeleton:\ncompile:all:\n  input: ['*.c']\nscore:\n";

    #[test]
    fn test_text_lists_execution_order() {
        let text = to_text(&Config::parse(CHAIN).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("1. diffWithSkeleton"));
        assert!(lines[1].contains("compile:all (Compile, pre-local)"));
    }

    #[test]
    fn test_dot_output() {
        let dot = to_dot(&Config::parse(CHAIN).unwrap());
        assert!(dot.contains("\"diffWithSkeleton\" -> \"compile:all\";"));
        assert!(dot.contains("\"compile:all\" -> \"score\";"));
    }

    #[test]
    fn test_mermaid_output() {
        let mermaid = to_mermaid(&Config::parse(CHAIN).unwrap());
        assert!(mermaid.starts_with("graph TD"));
        assert!(mermaid.contains("compile_all --> score"));
    }

    #[test]
    fn test_layout_output() {
        let layout = to_layout(&Config::parse(CHAIN).unwrap());
        let lines: Vec<&str> = layout.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("score"));
        assert!(lines[2].contains("y=  260.0"));
    }
}
