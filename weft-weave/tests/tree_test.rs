//! Integration tests for the causal tree's ingest, removal, and
//! snapshot interfaces.

use serde_json::json;

use test_fixtures::{seed_bot, tree, weave_ids};
use weft_core::errors::WeaveError;
use weft_core::{SiteId, WeftError, WeftOp};
use weft_weave::CausalTree;

#[test]
fn batch_ingest_returns_one_result_per_input() {
    let mut author = tree("a");
    let chain = seed_bot(&mut author, "b1", "color", json!("red"));

    let mut replica = tree("b");
    let batch = vec![chain.bot.clone(), chain.tag.clone(), chain.value.clone()];
    let results = replica.add_many(batch);

    assert_eq!(results.len(), 3);
    for result in &results {
        let result = result.as_ref().unwrap();
        assert_eq!(result.added().count(), 1);
    }
    assert_eq!(weave_ids(&replica), weave_ids(&author));
}

#[test]
fn dangling_input_does_not_abort_the_batch() {
    let mut author = tree("a");
    let chain = seed_bot(&mut author, "b1", "color", json!("red"));

    // Deliver out of order: the tag references a bot the replica has
    // not seen yet.
    let mut replica = tree("b");
    let results = replica.add_many(vec![chain.tag.clone(), chain.bot.clone()]);

    assert!(matches!(
        results[0],
        Err(WeftError::Weave(WeaveError::DanglingCause { .. }))
    ));
    assert!(results[1].is_ok());

    // The caller re-delivers the buffered atom once its cause exists.
    replica.add(chain.tag.clone()).unwrap();
    assert_eq!(replica.weave().len(), 2);
}

#[test]
fn remove_many_by_hash_reports_per_input() {
    let mut replica = tree("a");
    let chain = seed_bot(&mut replica, "b1", "color", json!("red"));
    let hash = chain.bot.content_hash().unwrap();

    let results =
        replica.remove_many_by_hash(&[hash.clone(), "missing-hash".to_string()]);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(WeftError::Weave(WeaveError::HashNotFound { .. }))
    ));

    // Tombstone survives; tag and value are gone.
    assert_eq!(replica.weave().len(), 2);
    // The atom is still addressable by hash, but a second removal
    // through it is a no-op.
    let again = replica.remove_by_hash(&hash).unwrap();
    assert!(again.events.is_empty());
}

#[test]
fn snapshot_import_preserves_projection_inputs() {
    let mut replica = tree("a");
    seed_bot(&mut replica, "b1", "color", json!("red"));
    seed_bot(&mut replica, "b2", "size", json!(4));
    let mask = replica.create_atom(None, WeftOp::tag_mask("b1", "color"));
    replica.add(mask.clone()).unwrap();
    let mask_value = replica.create_atom(Some(mask.id.clone()), WeftOp::value(json!("blue")));
    replica.add(mask_value).unwrap();

    let exported = replica.export();
    let mut imported = CausalTree::import(SiteId::new("b"), exported.clone()).unwrap();

    assert_eq!(imported.export(), exported);
    assert_eq!(imported.weave().len(), replica.weave().len());
    // The importing site can immediately author on top without clock
    // collisions.
    let next = imported.create_atom(None, WeftOp::bot("b3"));
    assert_eq!(imported.add(next).unwrap().added().count(), 1);
}

#[test]
fn tombstoned_snapshot_round_trips() {
    let mut replica = tree("a");
    let chain = seed_bot(&mut replica, "b1", "color", json!("red"));
    replica.remove(&chain.bot.id).unwrap();
    assert_eq!(replica.weave().len(), 2);

    let exported = replica.export();
    let imported = CausalTree::import(SiteId::new("b"), exported.clone()).unwrap();
    assert_eq!(imported.export(), exported);

    let bot_index = imported.weave().get_index(&chain.bot.id).unwrap();
    assert!(imported.weave().is_tombstoned(bot_index));
}
