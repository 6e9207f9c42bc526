//! Shared test builders for the weft workspace.
//!
//! Helpers for scripting replicas and seeding the common
//! bot → tag → value shape without repeating the boilerplate in every
//! crate's test suite.

use serde_json::Value;

use weft_core::{Atom, SiteId, TreeConfig, WeftOp};
use weft_weave::CausalTree;

/// A tree for the named site with the default config (GC on).
pub fn tree(site: &str) -> CausalTree {
    CausalTree::new(SiteId::new(site))
}

/// A tree that keeps full history (GC off).
pub fn history_tree(site: &str) -> CausalTree {
    CausalTree::with_config(
        SiteId::new(site),
        TreeConfig {
            garbage_collect: false,
        },
    )
}

/// The atoms making up one `bot → tag → value` chain.
#[derive(Debug, Clone)]
pub struct BotChain {
    pub bot: Atom,
    pub tag: Atom,
    pub value: Atom,
}

/// Author and apply a full `bot → tag → value` chain on a tree.
///
/// # Panics
/// Panics on structural errors; fixtures are only used on valid input.
pub fn seed_bot(tree: &mut CausalTree, bot_id: &str, tag: &str, value: Value) -> BotChain {
    let bot = tree.create_atom(None, WeftOp::bot(bot_id));
    tree.add(bot.clone()).expect("seed bot atom");
    let tag_atom = tree.create_atom(Some(bot.id.clone()), WeftOp::tag(tag));
    tree.add(tag_atom.clone()).expect("seed tag atom");
    let value_atom = tree.create_atom(Some(tag_atom.id.clone()), WeftOp::value(value));
    tree.add(value_atom.clone()).expect("seed value atom");
    BotChain {
        bot,
        tag: tag_atom,
        value: value_atom,
    }
}

/// Apply foreign atoms in the given order, panicking on any failure.
pub fn deliver(tree: &mut CausalTree, atoms: &[Atom]) {
    for atom in atoms {
        tree.add(atom.clone()).expect("deliver atom");
    }
}

/// The weave's atom ids in weave order, for order assertions.
pub fn weave_ids(tree: &CausalTree) -> Vec<weft_core::AtomId> {
    tree.weave().atoms().map(|atom| atom.id.clone()).collect()
}
