//! Integration tests for the semantic reducer and the event layer.

use std::collections::BTreeMap;

use serde_json::json;

use test_fixtures::tree;
use weft_core::WeftOp;
use weft_reducer::{apply_events, BotEvent, BotsState, WeftReducer};

fn add_bot_event(id: &str) -> BotEvent {
    BotEvent::AddBot {
        id: id.to_string(),
        tags: BTreeMap::new(),
    }
}

fn update_tag(id: &str, tag: &str, value: serde_json::Value) -> BotEvent {
    let mut tags = BTreeMap::new();
    tags.insert(tag.to_string(), value);
    BotEvent::UpdateBot {
        id: id.to_string(),
        tags,
    }
}

#[test]
fn a_new_bot_projects_with_no_tags() {
    let mut replica = tree("a");
    let mut state = BotsState::new();

    let updates = apply_events(&mut replica, &[add_bot_event("test")], &mut state).unwrap();

    assert_eq!(updates.added_bots, vec!["test".to_string()]);
    assert!(updates.removed_bots.is_empty());
    assert!(updates.updated_bots.is_empty());
    let bot = state.bot("test").unwrap();
    assert!(bot.tags.is_empty());
}

#[test]
fn tag_values_project_and_supersede() {
    let mut replica = tree("a");
    let mut state = BotsState::new();
    apply_events(
        &mut replica,
        &[
            add_bot_event("test"),
            update_tag("test", "abc", json!("def")),
        ],
        &mut state,
    )
    .unwrap();
    assert_eq!(state.tag_value("test", "abc"), Some(&json!("def")));

    // Overwriting replaces the projection and prunes the old lineage:
    // exactly bot + tag + the new value remain.
    let updates = apply_events(
        &mut replica,
        &[update_tag("test", "abc", json!(123))],
        &mut state,
    )
    .unwrap();

    assert_eq!(state.tag_value("test", "abc"), Some(&json!(123)));
    assert_eq!(updates.updated_bots.len(), 1);
    assert_eq!(updates.updated_bots[0].bot, "test");
    assert!(updates.updated_bots[0].tags.contains("abc"));
    assert_eq!(replica.weave().len(), 3);
}

#[test]
fn superseded_value_is_reported_as_removed() {
    let mut replica = tree("a");
    let mut state = BotsState::new();

    let bot = replica.create_atom(None, WeftOp::bot("test"));
    let bot_result = replica.add(bot.clone()).unwrap();
    let tag = replica.create_atom(Some(bot.id.clone()), WeftOp::tag("abc"));
    let tag_result = replica.add(tag.clone()).unwrap();
    let old = replica.create_atom(Some(tag.id.clone()), WeftOp::value(json!("def")));
    let old_result = replica.add(old.clone()).unwrap();
    WeftReducer::update(
        &replica,
        &[bot_result, tag_result, old_result],
        &mut state,
    );

    let new = replica.create_atom(Some(tag.id.clone()), WeftOp::value(json!(123)));
    let result = replica.add(new).unwrap();
    let removed: Vec<_> = result.removed().map(|atom| atom.id.clone()).collect();
    assert_eq!(removed, vec![old.id.clone()]);

    let updates = WeftReducer::update(&replica, &[result], &mut state);
    assert_eq!(state.tag_value("test", "abc"), Some(&json!(123)));
    assert_eq!(updates.updated_bots.len(), 1);
}

#[test]
fn removing_a_bot_empties_its_projection() {
    let mut replica = tree("a");
    let mut state = BotsState::new();
    apply_events(
        &mut replica,
        &[
            add_bot_event("test"),
            update_tag("test", "abc", json!("def")),
        ],
        &mut state,
    )
    .unwrap();

    let updates = apply_events(
        &mut replica,
        &[BotEvent::RemoveBot {
            id: "test".to_string(),
        }],
        &mut state,
    )
    .unwrap();

    assert_eq!(updates.removed_bots, vec!["test".to_string()]);
    assert!(state.is_empty());
    // The weave keeps only the defining atom and its tombstone.
    assert_eq!(replica.weave().len(), 2);

    // Removing again changes nothing.
    let again = apply_events(
        &mut replica,
        &[BotEvent::RemoveBot {
            id: "test".to_string(),
        }],
        &mut state,
    )
    .unwrap();
    assert!(again.is_empty());
}

#[test]
fn unchanged_writes_emit_no_delta_and_no_atoms() {
    let mut replica = tree("a");
    let mut state = BotsState::new();
    apply_events(
        &mut replica,
        &[
            add_bot_event("test"),
            update_tag("test", "abc", json!("def")),
        ],
        &mut state,
    )
    .unwrap();
    let atoms_before = replica.weave().len();

    let updates = apply_events(
        &mut replica,
        &[update_tag("test", "abc", json!("def"))],
        &mut state,
    )
    .unwrap();

    assert!(updates.is_empty());
    assert_eq!(replica.weave().len(), atoms_before);
}

#[test]
fn null_unsets_a_tag_and_prunes_its_lineage() {
    let mut replica = tree("a");
    let mut state = BotsState::new();
    apply_events(
        &mut replica,
        &[
            add_bot_event("test"),
            update_tag("test", "abc", json!("def")),
        ],
        &mut state,
    )
    .unwrap();

    let updates = apply_events(
        &mut replica,
        &[update_tag("test", "abc", json!(null))],
        &mut state,
    )
    .unwrap();

    assert_eq!(state.tag_value("test", "abc"), None);
    assert_eq!(updates.updated_bots.len(), 1);
    // bot + tag + the null marker value.
    assert_eq!(replica.weave().len(), 3);

    // Unsetting an already-unset tag is a no-op.
    let again = apply_events(
        &mut replica,
        &[update_tag("test", "abc", json!(null))],
        &mut state,
    )
    .unwrap();
    assert!(again.is_empty());
}

#[test]
fn masks_layer_over_tags_and_follow_the_supersede_rule() {
    let mut replica = tree("a");
    let mut state = BotsState::new();
    apply_events(
        &mut replica,
        &[
            add_bot_event("test"),
            update_tag("test", "color", json!("red")),
        ],
        &mut state,
    )
    .unwrap();

    let updates = apply_events(
        &mut replica,
        &[BotEvent::UpdateTagMask {
            bot: "test".to_string(),
            tag: "color".to_string(),
            value: json!("blue"),
        }],
        &mut state,
    )
    .unwrap();

    assert_eq!(state.tag_value("test", "color"), Some(&json!("blue")));
    assert_eq!(updates.updated_bots.len(), 1);
    assert!(updates.updated_bots[0].tags.contains("color"));

    // Mask overwrites prune the old mask value lineage too.
    let atoms_before = replica.weave().len();
    apply_events(
        &mut replica,
        &[BotEvent::UpdateTagMask {
            bot: "test".to_string(),
            tag: "color".to_string(),
            value: json!("green"),
        }],
        &mut state,
    )
    .unwrap();
    assert_eq!(replica.weave().len(), atoms_before);
    assert_eq!(state.tag_value("test", "color"), Some(&json!("green")));

    // Unsetting the mask reveals the bot's own tag again.
    apply_events(
        &mut replica,
        &[BotEvent::UpdateTagMask {
            bot: "test".to_string(),
            tag: "color".to_string(),
            value: json!(null),
        }],
        &mut state,
    )
    .unwrap();
    assert_eq!(state.tag_value("test", "color"), Some(&json!("red")));
}

#[test]
fn masks_on_missing_bots_wait_for_the_bot() {
    let mut replica = tree("a");
    let mut state = BotsState::new();

    let updates = apply_events(
        &mut replica,
        &[BotEvent::UpdateTagMask {
            bot: "ghost".to_string(),
            tag: "color".to_string(),
            value: json!("blue"),
        }],
        &mut state,
    )
    .unwrap();

    // Nothing visible yet.
    assert!(updates.is_empty());
    assert_eq!(state.tag_value("ghost", "color"), None);

    // Once the bot appears, the mask applies.
    apply_events(&mut replica, &[add_bot_event("ghost")], &mut state).unwrap();
    assert_eq!(state.tag_value("ghost", "color"), Some(&json!("blue")));
}

#[test]
fn batch_updates_merge_per_bot() {
    let mut replica = tree("a");
    let mut state = BotsState::new();
    apply_events(&mut replica, &[add_bot_event("test")], &mut state).unwrap();

    let updates = apply_events(
        &mut replica,
        &[
            update_tag("test", "x", json!(1)),
            update_tag("test", "y", json!(2)),
            update_tag("test", "z", json!(3)),
        ],
        &mut state,
    )
    .unwrap();

    assert_eq!(updates.updated_bots.len(), 1);
    let update = &updates.updated_bots[0];
    assert_eq!(update.bot, "test");
    assert_eq!(
        update.tags.iter().cloned().collect::<Vec<_>>(),
        vec!["x".to_string(), "y".to_string(), "z".to_string()]
    );
}

#[test]
fn orphaned_atoms_never_surface() {
    let mut replica = tree("a");
    let mut state = BotsState::new();

    // A tag with no bot ancestor exists in the weave but not in the
    // projection.
    let orphan_tag = replica.create_atom(None, WeftOp::tag("lonely"));
    let result = replica.add(orphan_tag).unwrap();
    let updates = WeftReducer::update(&replica, &[result], &mut state);

    assert!(updates.is_empty());
    assert!(state.is_empty());
    assert_eq!(replica.weave().len(), 1);
}

#[test]
fn adding_an_existing_bot_is_a_noop() {
    let mut replica = tree("a");
    let mut state = BotsState::new();
    apply_events(&mut replica, &[add_bot_event("test")], &mut state).unwrap();
    let atoms_before = replica.weave().len();

    let updates = apply_events(&mut replica, &[add_bot_event("test")], &mut state).unwrap();
    assert!(updates.is_empty());
    assert_eq!(replica.weave().len(), atoms_before);
}
