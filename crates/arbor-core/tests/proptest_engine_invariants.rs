//! Property-based invariant tests for the tree engine and dispatcher.
//!
//! 1. Dispatch preserves the multiset of ids.
//! 2. Operations against a missing id return an equal tree.
//! 3. `path_to_item` never contains the queried id and has one entry per level.
//! 4. `move_targets` never contains the excluded id and skips only it.
//! 5. `remove` drops exactly the node and its subtree.
//! 6. A toggle makes the subtree uniform; twice restores a uniform start.
//! 7. Dispatch never makes a node its own descendant.

use arbor_core::engine::{
    children_of_item, collect_ids, find, insert_after, insert_before, insert_child, move_targets,
    path_to_item, remove,
};
use arbor_core::{HighlightSet, Instruction, TreeNode, apply_instruction};
use proptest::prelude::*;
use proptest::sample::Index;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Shape(Vec<Shape>);

fn shape_strategy() -> impl Strategy<Value = Vec<Shape>> {
    let leaf = Just(Shape(Vec::new()));
    let node = leaf.prop_recursive(4, 40, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Shape)
    });
    prop::collection::vec(node, 1..5)
}

fn build(shapes: &[Shape], next: &mut usize) -> Vec<TreeNode> {
    shapes
        .iter()
        .map(|shape| {
            let id = format!("n{next}");
            *next += 1;
            let children = build(&shape.0, next);
            TreeNode::new(id.clone(), id.to_uppercase()).with_children(children)
        })
        .collect()
}

fn tree_strategy() -> impl Strategy<Value = Vec<TreeNode>> {
    shape_strategy().prop_map(|shapes| {
        let mut next = 0;
        build(&shapes, &mut next)
    })
}

fn instruction_strategy() -> impl Strategy<Value = Instruction> {
    prop_oneof![
        Just(Instruction::ReorderAbove),
        Just(Instruction::ReorderBelow),
        Just(Instruction::MakeChild),
        (0usize..5).prop_map(|desired_level| Instruction::Reparent { desired_level }),
    ]
}

fn sorted_ids(tree: &[TreeNode]) -> Vec<String> {
    let mut ids: Vec<String> = collect_ids(tree).into_iter().map(str::to_owned).collect();
    ids.sort();
    ids
}

fn pick(tree: &[TreeNode], index: Index) -> String {
    let ids = collect_ids(tree);
    ids[index.index(ids.len())].to_owned()
}

fn no_self_nesting(tree: &[TreeNode]) -> bool {
    // With unique ids a cycle would show up as a repeated id.
    let ids = collect_ids(tree);
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().all(|id| seen.insert(id))
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Dispatch preserves ids
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn dispatch_preserves_ids(
        tree in tree_strategy(),
        item in any::<Index>(),
        target in any::<Index>(),
        instruction in instruction_strategy(),
    ) {
        let item_id = pick(&tree, item);
        let target_id = pick(&tree, target);
        let out = apply_instruction(&tree, &item_id, &target_id, &instruction);
        prop_assert_eq!(
            sorted_ids(&out.tree),
            sorted_ids(&tree),
            "ids changed: item={} target={} instruction={} outcome={}",
            item_id, target_id, instruction, out.outcome
        );
        if !out.is_applied() {
            prop_assert_eq!(&out.tree, &tree);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Missing ids are no-ops
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn missing_target_is_identity(tree in tree_strategy()) {
        let item = TreeNode::leaf("fresh", "Fresh");
        prop_assert_eq!(&remove(&tree, "missing"), &tree);
        prop_assert_eq!(&insert_before(&tree, "missing", &item), &tree);
        prop_assert_eq!(&insert_after(&tree, "missing", &item), &tree);
        prop_assert_eq!(&insert_child(&tree, "missing", &item), &tree);
        prop_assert!(find(&tree, "missing").is_none());
        prop_assert!(path_to_item(&tree, "missing").is_none());
        prop_assert!(children_of_item(&tree, "missing").is_empty());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Path exclusivity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn path_excludes_item(tree in tree_strategy(), index in any::<Index>()) {
        let id = pick(&tree, index);
        let path = path_to_item(&tree, &id).expect("picked id is in the tree");
        prop_assert!(!path.contains(&id));
        // Each entry is the parent of the next one (or of the item).
        for window in path.windows(2) {
            let kids = children_of_item(&tree, &window[0]);
            prop_assert!(kids.iter().any(|n| n.id == window[1]));
        }
        if let Some(parent) = path.last() {
            prop_assert!(children_of_item(&tree, parent).iter().any(|n| n.id == id));
        } else {
            prop_assert!(tree.iter().any(|n| n.id == id));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Move-target exclusion
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn move_targets_exclude_item(tree in tree_strategy(), index in any::<Index>()) {
        let id = pick(&tree, index);
        let targets = move_targets(&tree, &id);
        prop_assert!(targets.iter().all(|n| n.id != id));
        prop_assert_eq!(targets.len(), collect_ids(&tree).len() - 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Remove drops exactly one subtree
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn remove_drops_subtree(tree in tree_strategy(), index in any::<Index>()) {
        let id = pick(&tree, index);
        let subtree = find(&tree, &id).expect("picked id is in the tree");
        let removed: Vec<String> = subtree.ids().into_iter().map(str::to_owned).collect();
        let out = remove(&tree, &id);
        let remaining = sorted_ids(&out);
        prop_assert_eq!(remaining.len(), collect_ids(&tree).len() - removed.len());
        prop_assert!(removed.iter().all(|r| !remaining.contains(r)));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Highlight toggles
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn highlight_toggle_twice_restores_uniform_subtree(
        tree in tree_strategy(),
        preset in prop::collection::vec(any::<Index>(), 0..6),
        index in any::<Index>(),
        start_on in any::<bool>(),
    ) {
        let id = pick(&tree, index);
        let node = find(&tree, &id).expect("picked id is in the tree");
        let subtree = node.ids();
        let mut marks: Vec<String> = preset
            .into_iter()
            .map(|i| pick(&tree, i))
            .filter(|p| !subtree.contains(&p.as_str()))
            .collect();
        if start_on {
            marks.extend(subtree.iter().map(|s| (*s).to_owned()));
        }
        let mut set: HighlightSet = marks.into_iter().collect();
        let before = set.clone();

        let state = set.toggle_highlight(node);
        prop_assert_eq!(state, !start_on);
        set.toggle_highlight(node);
        prop_assert_eq!(set, before);
    }

    #[test]
    fn highlight_toggle_flattens_mixed_subtree(
        tree in tree_strategy(),
        preset in prop::collection::vec(any::<Index>(), 0..6),
        index in any::<Index>(),
    ) {
        let mut set: HighlightSet = preset.into_iter().map(|i| pick(&tree, i)).collect();
        let before = set.clone();
        let id = pick(&tree, index);
        let node = find(&tree, &id).expect("picked id is in the tree");
        let root_was_on = set.is_highlighted(&id);

        let state = set.toggle_highlight(node);
        prop_assert_eq!(state, !root_was_on);
        let subtree = node.ids();
        for sub in &subtree {
            prop_assert_eq!(set.is_highlighted(sub), state);
        }
        for other in collect_ids(&tree) {
            if !subtree.contains(&other) {
                prop_assert_eq!(set.is_highlighted(other), before.is_highlighted(other));
            }
        }
    }
}

#[test]
fn highlight_toggle_twice_from_mixed_start_is_uniform() {
    let tree = vec![
        TreeNode::new("n0", "N0")
            .child(TreeNode::new("n1", "N1"))
            .child(TreeNode::new("n2", "N2")),
    ];
    let mut set: HighlightSet = std::iter::once("n0".to_owned()).collect();
    set.toggle_highlight(&tree[0]);
    assert!(set.is_empty());
    set.toggle_highlight(&tree[0]);
    let mut ids: Vec<&str> = set.iter().collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["n0", "n1", "n2"]);
}

// ═════════════════════════════════════════════════════════════════════════
// 7. No cycles after a sequence of dispatches
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn dispatch_sequence_stays_acyclic(
        tree in tree_strategy(),
        moves in prop::collection::vec(
            (any::<Index>(), any::<Index>(), instruction_strategy()),
            1..8,
        ),
    ) {
        let original = sorted_ids(&tree);
        let mut current = tree;
        for (item, target, instruction) in moves {
            let item_id = pick(&current, item);
            let target_id = pick(&current, target);
            current = apply_instruction(&current, &item_id, &target_id, &instruction).tree;
            prop_assert!(no_self_nesting(&current));
        }
        prop_assert_eq!(sorted_ids(&current), original);
    }
}
