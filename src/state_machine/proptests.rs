//! Property-based tests for the conversation engine
//!
//! Graphs are generated with arbitrary shape (cycles, converging edges,
//! terminal nodes, dangling targets) and walked with arbitrary choices.

use super::*;
use crate::graph::{ConversationGraph, ConversationNode, SideEffect};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Generators
// ============================================================================

const MISSING: &str = "missing";

fn node_id(i: usize) -> String {
    format!("n{i}")
}

/// Per node: target indices for each choice, plus whether it dials.
/// A target index equal to the node count points at a node that does not exist.
type NodeSpec = (Vec<usize>, bool);

fn build_graph(node_count: usize, specs: &[NodeSpec]) -> ConversationGraph {
    let nodes = specs.iter().enumerate().map(|(i, (targets, dials))| {
        let mut node = ConversationNode::new(node_id(i), format!("prompt {i}"));
        for (c, &t) in targets.iter().enumerate() {
            let target = if t >= node_count {
                MISSING.to_string()
            } else {
                node_id(t)
            };
            node = node.choice(format!("choice {i}.{c}"), target);
        }
        if *dials {
            node = node.with_side_effect(SideEffect::Dial);
        }
        node
    });
    ConversationGraph::new("arb", node_id(0), nodes).unwrap()
}

/// Graph that may contain dangling targets
fn arb_graph() -> impl Strategy<Value = ConversationGraph> {
    (1usize..8).prop_flat_map(|n| {
        proptest::collection::vec(
            (proptest::collection::vec(0..=n, 0..4), any::<bool>()),
            n,
        )
        .prop_map(move |specs| build_graph(n, &specs))
    })
}

/// Graph whose targets all exist
fn arb_well_formed_graph() -> impl Strategy<Value = ConversationGraph> {
    (1usize..8).prop_flat_map(|n| {
        proptest::collection::vec((proptest::collection::vec(0..n, 0..4), any::<bool>()), n)
            .prop_map(move |specs| build_graph(n, &specs))
    })
}

fn arb_choices() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(0usize..6, 0..30)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Every step either lands on the transition target with exactly two new
    // entries, or fails and leaves the session as it was
    #[test]
    fn prop_step_lands_on_target_or_changes_nothing(
        graph in arb_graph(),
        choices in arb_choices()
    ) {
        let mut session = ConversationSession::start(Arc::new(graph));

        for choice in choices {
            let before_len = session.transcript().len();
            let before_node = session.current_node().clone();

            match session.select_choice(choice) {
                Ok(update) => {
                    let expected = &before_node.transitions[&choice];
                    prop_assert_eq!(&update.node_id, expected);
                    prop_assert_eq!(session.current_node_id(), expected.as_str());
                    prop_assert_eq!(session.transcript().len(), before_len + 2);

                    let user = &session.transcript()[before_len];
                    let assistant = &session.transcript()[before_len + 1];
                    prop_assert_eq!(user.speaker, Speaker::User);
                    prop_assert_eq!(&user.text, &before_node.choices[choice - 1]);
                    prop_assert_eq!(assistant.speaker, Speaker::Assistant);
                    prop_assert_eq!(&assistant.text, &session.current_node().prompt);
                }
                Err(TransitionError::InvalidChoice { available, .. }) => {
                    prop_assert!(choice == 0 || choice > before_node.choices.len());
                    prop_assert_eq!(available, before_node.choices.len());
                    prop_assert_eq!(session.transcript().len(), before_len);
                    prop_assert_eq!(session.current_node_id(), before_node.id.as_str());
                }
                Err(TransitionError::BrokenGraph { target, .. }) => {
                    prop_assert_eq!(target.as_deref(), Some(MISSING));
                    prop_assert_eq!(session.transcript().len(), before_len);
                    prop_assert_eq!(session.current_node_id(), before_node.id.as_str());
                }
            }
        }
    }

    // is_terminal holds exactly when the current node has no choices
    #[test]
    fn prop_terminal_iff_no_choices(graph in arb_graph(), choices in arb_choices()) {
        let mut session = ConversationSession::start(Arc::new(graph));

        for choice in choices {
            prop_assert_eq!(session.is_terminal(), session.choices().is_empty());
            if let Ok(update) = session.select_choice(choice) {
                prop_assert_eq!(update.terminal, update.choices.is_empty());
                prop_assert_eq!(
                    update.terminal,
                    update.effects.contains(&Effect::ConversationEnded)
                );
            }
        }
        prop_assert_eq!(session.is_terminal(), session.choices().is_empty());
    }

    // Inspecting a session never changes it
    #[test]
    fn prop_inspection_is_idempotent(graph in arb_graph(), choices in arb_choices()) {
        let mut session = ConversationSession::start(Arc::new(graph));
        for choice in choices {
            let _ = session.select_choice(choice);
        }

        let transcript = session.transcript().to_vec();
        let node = session.current_node_id().to_string();
        for _ in 0..3 {
            let _ = session.is_terminal();
            let _ = session.transcript();
            let _ = transition(&session, 1);
        }
        prop_assert_eq!(session.transcript(), transcript.as_slice());
        prop_assert_eq!(session.current_node_id(), node.as_str());
    }

    // A side effect is reported once per entry into a tagged node, never otherwise
    #[test]
    fn prop_side_effect_only_on_entry(graph in arb_graph(), choices in arb_choices()) {
        let mut session = ConversationSession::start(Arc::new(graph));

        for choice in choices {
            if let Ok(update) = session.select_choice(choice) {
                let tagged = session.current_node().side_effect.is_some();
                let performed = update
                    .effects
                    .iter()
                    .filter(|e| matches!(e, Effect::Perform(_)))
                    .count();
                prop_assert_eq!(performed, usize::from(tagged));
                prop_assert_eq!(update.side_effect.is_some(), tagged);
            }
        }
    }

    // Graphs without dangling targets validate, and never raise BrokenGraph
    #[test]
    fn prop_well_formed_graph_never_breaks(
        graph in arb_well_formed_graph(),
        choices in arb_choices()
    ) {
        prop_assert!(graph.validate().is_ok());
        for node in graph.nodes() {
            for index in 1..=node.choices.len() {
                prop_assert!(node.transitions.contains_key(&index));
            }
        }

        let mut session = ConversationSession::start(Arc::new(graph));
        for choice in choices {
            let result = session.select_choice(choice);
            let broke = matches!(result, Err(TransitionError::BrokenGraph { .. }));
            prop_assert!(!broke);
        }
    }

    // Graphs with a dangling target are caught by validation
    #[test]
    fn prop_dangling_targets_fail_validation(graph in arb_graph()) {
        let dangling = graph
            .nodes()
            .any(|n| n.transitions.values().any(|t| t == MISSING));
        prop_assert_eq!(graph.validate().is_err(), dangling);
    }
}
