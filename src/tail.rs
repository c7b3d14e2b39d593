//! Tail buffer: the undersized rightmost leaf held outside the trie.
//!
//! Single-element appends land here so the common case of sequential
//! `push_back` is amortized O(1) instead of an O(log n) trie walk. Only
//! when the tail reaches `WIDTH` elements is it grafted into the trie —
//! the sole operation that can grow tree height.

use crate::error::VectorError;
use crate::node::{Node, Ref, new_ref};
use crate::policy::{MemoryPolicy, NodeRef};
use crate::tracing_helpers::trace_log;

/// Push one element into the tail leaf.
///
/// Mutates the leaf in place when it is uniquely owned, clones it first
/// otherwise. Returns `Some((full_leaf, value))` when the tail is already
/// full: the caller must graft `full_leaf` into the trie and start a fresh
/// tail holding `value`.
///
/// # Errors
///
/// Propagates allocation failure from the clone or the fresh leaf.
pub(crate) fn tail_push<T, P>(
    tail: &mut Option<Ref<T, P>>,
    value: T,
    width: usize,
) -> Result<Option<(Ref<T, P>, T)>, VectorError>
where
    T: Clone,
    P: MemoryPolicy,
{
    if tail
        .as_ref()
        .is_some_and(|leaf| leaf.get().leaf_len() >= width)
    {
        let full = tail.take();
        return Ok(full.map(|leaf| (leaf, value)));
    }

    match tail.as_mut() {
        Some(leaf) => leaf.make_mut()?.elems_mut().push(value),
        None => *tail = Some(new_ref(Node::<T, P>::leaf_one(value, width))?),
    }
    Ok(None)
}

/// Wrap a leaf in single-child branches down from `target_shift` to 0.
///
/// The chains are regular: a lone child is also the last child, so no size
/// table is needed regardless of how full the leaf is.
///
/// # Errors
///
/// Propagates allocation failure for each wrapper branch.
pub(crate) fn wrap_leaf<T, P>(
    leaf: Ref<T, P>,
    target_shift: usize,
    bits: usize,
) -> Result<Ref<T, P>, VectorError>
where
    T: Clone,
    P: MemoryPolicy,
{
    let mut node = leaf;
    let mut shift = 0;
    while shift < target_shift {
        node = new_ref(Node::<T, P>::branch(vec![node], None))?;
        shift += bits;
    }
    Ok(node)
}

/// Graft a full tail leaf into a regular trie as its new rightmost leaf.
///
/// `trie_len` is the element count under `root` before the graft; all trie
/// leaves are full in regular mode, so it is a multiple of `WIDTH`. Grows
/// the root by one level exactly when the trie is at capacity.
///
/// # Errors
///
/// Propagates allocation failure; on error the root slot may be left empty,
/// which is only ever observed by the handle under construction.
pub(crate) fn flush_tail_regular<T, P, const BITS: usize>(
    root: &mut Option<Ref<T, P>>,
    shift: &mut usize,
    trie_len: usize,
    tail: Ref<T, P>,
) -> Result<(), VectorError>
where
    T: Clone,
    P: MemoryPolicy,
{
    match root.take() {
        None => {
            *root = Some(tail);
            *shift = 0;
        }

        Some(old_root) => {
            let capacity = 1_usize << (*shift + BITS);
            if trie_len == capacity {
                trace_log!(shift = *shift, trie_len, "growing regular trie root");
                let spine = wrap_leaf::<T, P>(tail, *shift, BITS)?;
                *root = Some(new_ref(Node::<T, P>::branch(vec![old_root, spine], None))?);
                *shift += BITS;
            } else {
                let mut slot = old_root;
                push_leaf_regular::<T, P, BITS>(&mut slot, *shift, trie_len, tail)?;
                *root = Some(slot);
            }
        }
    }
    Ok(())
}

/// Descend the rightmost spine of a non-full regular branch and hang the
/// leaf at the end, creating single-child padding branches where a new
/// subtree begins.
fn push_leaf_regular<T, P, const BITS: usize>(
    slot: &mut Ref<T, P>,
    shift: usize,
    count: usize,
    leaf: Ref<T, P>,
) -> Result<(), VectorError>
where
    T: Clone,
    P: MemoryPolicy,
{
    let child_capacity = 1_usize << shift;
    let remainder = count % child_capacity;

    if remainder == 0 {
        // Every existing child is full; open a fresh rightmost subtree.
        let spine = wrap_leaf::<T, P>(leaf, shift - BITS, BITS)?;
        slot.make_mut()?.as_branch_mut().push_child(spine);
        Ok(())
    } else {
        let last = count / child_capacity;
        let branch = slot.make_mut()?.as_branch_mut();
        push_leaf_regular::<T, P, BITS>(branch.child_mut(last), shift - BITS, remainder, leaf)
    }
}

// ============================================================================
//  Tests
// ============================================================================
