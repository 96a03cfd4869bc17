// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 gradeflow contributors

//! Canvas change events

use serde::{Deserialize, Serialize};

use super::{GraphEditor, Position};
use crate::stages::StageId;

/// A discrete change reported by the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasEvent {
    Move { id: StageId, position: Position },
    Select { id: StageId },
    Deselect { id: StageId },
    Remove { id: StageId },
    Connect { source: StageId, target: StageId },
    Disconnect { edge: String },
}

/// Returns whether the event changed anything
pub(super) fn apply(editor: &mut GraphEditor, event: CanvasEvent) -> bool {
    tracing::trace!(?event, "Canvas event");

    match event {
        CanvasEvent::Move { id, position } => editor.move_node(id, position),
        CanvasEvent::Select { id } => editor.select(id),
        CanvasEvent::Deselect { id } => {
            editor.deselect(id);
            true
        }
        CanvasEvent::Remove { id } => editor.delete_stage(id),
        CanvasEvent::Connect { source, target } => editor.connect(source, target),
        CanvasEvent::Disconnect { edge } => editor.disconnect(&edge),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Config;

    #[test]
    fn test_events_fold_into_state() {
        let config = Config::parse("compile:\nscore:\n").unwrap();
        let order = config.execution_order().unwrap();
        let mut editor = GraphEditor::new(config);

        assert!(editor.apply(CanvasEvent::Move {
            id: order[0],
            position: Position::new(10.0, 20.0),
        }));
        assert_eq!(editor.node(order[0]).unwrap().position, Position::new(10.0, 20.0));

        assert!(editor.apply(CanvasEvent::Select { id: order[0] }));
        assert!(editor.apply(CanvasEvent::Select { id: order[1] }));
        assert_eq!(editor.selected_stage(), Some(order[1]));
        assert!(!editor.node(order[0]).unwrap().selected);

        let edge = editor.edges()[0].id.clone();
        assert!(editor.apply(CanvasEvent::Disconnect { edge }));
        assert!(editor.edges().is_empty());

        assert!(editor.apply(CanvasEvent::Connect {
            source: order[0],
            target: order[1],
        }));
        assert!(editor.apply(CanvasEvent::Remove { id: order[1] }));
        assert_eq!(editor.nodes().len(), 1);
    }

    #[test]
    fn test_event_wire_format() {
        let id = StageId::new();
        let json = serde_json::to_string(&CanvasEvent::Select { id }).unwrap();
        assert_eq!(json, format!(r#"{{"type":"select","id":"{}"}}"#, id));

        let event: CanvasEvent =
            serde_json::from_str(r#"{"type":"disconnect","edge":"edge-a-b"}"#).unwrap();
        assert_eq!(event, CanvasEvent::Disconnect { edge: "edge-a-b".into() });
    }
}
