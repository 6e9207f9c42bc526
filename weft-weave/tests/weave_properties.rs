//! Property tests for the weave's replication guarantees:
//! determinism, convergence, idempotence, and the GC bound.

use std::collections::HashSet;

use proptest::prelude::*;
use serde_json::json;

use test_fixtures::{history_tree, tree, weave_ids};
use weft_core::constants::TOMBSTONE_PRIORITY;
use weft_core::errors::WeaveError;
use weft_core::{Atom, AtomId, SiteId, SiteStatus, WeftError, WeftOp};
use weft_weave::CausalTree;

/// One atom's generation seed: (site, cause choice, op choice).
type Seed = (u8, usize, u8);

/// Build a causally-valid multi-site history from seeds. The returned
/// order is a valid delivery order (causes always precede effects).
fn build_history(seeds: &[Seed]) -> Vec<Atom> {
    let mut clocks = [
        SiteStatus::new(SiteId::new("a")),
        SiteStatus::new(SiteId::new("b")),
        SiteStatus::new(SiteId::new("c")),
    ];
    let mut atoms: Vec<Atom> = Vec::new();

    for &(site_seed, cause_seed, op_seed) in seeds {
        let site = (site_seed % 3) as usize;
        let cause = if atoms.is_empty() || cause_seed % 4 == 0 {
            None
        } else {
            Some(atoms[cause_seed % atoms.len()].id.clone())
        };
        let (op, priority) = match (op_seed % 4, &cause) {
            (0, _) | (3, None) => (WeftOp::bot(format!("b{}", cause_seed % 5)), 0),
            (1, _) => (WeftOp::tag(format!("t{}", cause_seed % 5)), 0),
            (2, _) => (WeftOp::value(json!(cause_seed)), 0),
            (_, Some(_)) => (WeftOp::tombstone(), TOMBSTONE_PRIORITY),
            _ => unreachable!(),
        };
        let id = clocks[site].next_id(priority);
        for clock in &mut clocks {
            clock.observe(&id);
        }
        atoms.push(Atom::new(id, cause, op));
    }
    atoms
}

/// A different causally-valid delivery order, derived from a seed.
fn causal_reorder(atoms: &[Atom], seed: u64) -> Vec<Atom> {
    let mut remaining: Vec<Atom> = atoms.to_vec();
    let mut delivered: HashSet<AtomId> = HashSet::new();
    let mut out = Vec::with_capacity(atoms.len());
    let mut state = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);

    while !remaining.is_empty() {
        let ready: Vec<usize> = remaining
            .iter()
            .enumerate()
            .filter(|(_, atom)| {
                atom.cause
                    .as_ref()
                    .map_or(true, |cause| delivered.contains(cause))
            })
            .map(|(index, _)| index)
            .collect();
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let pick = ready[(state >> 33) as usize % ready.len()];
        let atom = remaining.remove(pick);
        delivered.insert(atom.id.clone());
        out.push(atom);
    }
    out
}

/// Apply atoms, tolerating dangling causes: with GC on, a prune may
/// have raced ahead of a late arrival, which a real caller would
/// buffer. Everything else is a hard failure.
fn apply_tolerant(tree: &mut CausalTree, atoms: &[Atom]) {
    for atom in atoms {
        match tree.add(atom.clone()) {
            Ok(_) => {}
            Err(WeftError::Weave(WeaveError::DanglingCause { .. })) => {}
            Err(other) => panic!("unexpected failure: {other}"),
        }
    }
}

proptest! {
    /// Same atoms, different causally-valid arrival orders, full
    /// history retained: byte-identical weave order.
    #[test]
    fn determinism_without_gc(
        seeds in prop::collection::vec((0u8..3, 0usize..1000, 0u8..3), 1..30),
        shuffle in any::<u64>(),
    ) {
        let atoms = build_history(&seeds);
        let reordered = causal_reorder(&atoms, shuffle);

        let mut left = history_tree("x");
        apply_tolerant(&mut left, &atoms);
        let mut right = history_tree("y");
        apply_tolerant(&mut right, &reordered);

        prop_assert_eq!(weave_ids(&left), weave_ids(&right));
        prop_assert_eq!(left.export(), right.export());
    }

    /// With GC on (including tombstones in the history), replicas
    /// still converge to identical weaves.
    #[test]
    fn convergence_with_gc(
        seeds in prop::collection::vec((0u8..3, 0usize..1000, 0u8..4), 1..30),
        shuffle in any::<u64>(),
    ) {
        let atoms = build_history(&seeds);
        let reordered = causal_reorder(&atoms, shuffle);

        let mut left = tree("x");
        apply_tolerant(&mut left, &atoms);
        let mut right = tree("y");
        apply_tolerant(&mut right, &reordered);

        prop_assert_eq!(weave_ids(&left), weave_ids(&right));
    }

    /// Inserting the same atom twice adds once and no-ops after.
    #[test]
    fn idempotence(
        seeds in prop::collection::vec((0u8..3, 0usize..1000, 0u8..3), 1..20),
    ) {
        let atoms = build_history(&seeds);
        let mut replica = history_tree("x");
        apply_tolerant(&mut replica, &atoms);
        let before = weave_ids(&replica);

        for atom in &atoms {
            let result = replica.add(atom.clone()).unwrap();
            prop_assert!(result.is_noop());
        }
        prop_assert_eq!(weave_ids(&replica), before);
    }

    /// Snapshot round-trip: an imported weave reproduces the exact
    /// exported order.
    #[test]
    fn snapshot_round_trip(
        seeds in prop::collection::vec((0u8..3, 0usize..1000, 0u8..4), 1..30),
    ) {
        let atoms = build_history(&seeds);
        let mut replica = tree("x");
        apply_tolerant(&mut replica, &atoms);

        let exported = replica.export();
        let imported = CausalTree::import(SiteId::new("y"), exported.clone()).unwrap();
        prop_assert_eq!(imported.export(), exported);
    }
}

/// N sequential overwrites leave one live value lineage, not N.
#[test]
fn gc_bound_over_repeated_overwrites() {
    let mut replica = tree("a");
    let bot = replica.create_atom(None, WeftOp::bot("b1"));
    replica.add(bot.clone()).unwrap();
    let tag = replica.create_atom(Some(bot.id.clone()), WeftOp::tag("score"));
    replica.add(tag.clone()).unwrap();

    for n in 0..200 {
        let value = replica.create_atom(Some(tag.id.clone()), WeftOp::value(json!(n)));
        replica.add(value).unwrap();
    }
    assert_eq!(replica.weave().len(), 3);
}
