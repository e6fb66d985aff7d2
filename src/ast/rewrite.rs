//! Predicate-driven tree rewriting.
//!
//! Three traversals share one shape: test a tree with `pred`, rewrite it with
//! `f` when the test holds, otherwise descend into a node's children left to
//! right and rebuild it. They differ in ordering and repetition:
//!
//! | Combinator                        | Children first | Re-tests result |
//! |-----------------------------------|----------------|-----------------|
//! | [`exhaustive_collect`]            | No             | Yes             |
//! | [`depth_first_exhaustive_collect`]| Yes            | Yes             |
//! | [`replace`]                       | Yes            | No              |
//!
//! Termination is the caller's obligation: a transform whose output keeps
//! satisfying `pred` makes the exhaustive variants loop forever.
//!
//! Every combinator has a fallible twin (`try_*`); the first error aborts the
//! whole traversal and no partial tree is returned.

use std::convert::Infallible;

use crate::ast::Tree;

// ============================================================================
// FALLIBLE TRAVERSALS
// ============================================================================

/// Rewrites matching trees outermost first, re-testing each result.
pub fn try_exhaustive_collect<P, F, E>(tree: Tree, pred: P, mut f: F) -> Result<Tree, E>
where
    P: Fn(&Tree) -> bool,
    F: FnMut(Tree) -> Result<Tree, E>,
{
    exhaustive(tree, &pred, &mut f)
}

/// Rewrites matching trees innermost first, re-testing each result.
pub fn try_depth_first_exhaustive_collect<P, F, E>(
    tree: Tree,
    pred: P,
    mut f: F,
) -> Result<Tree, E>
where
    P: Fn(&Tree) -> bool,
    F: FnMut(Tree) -> Result<Tree, E>,
{
    depth_first(tree, &pred, &mut f)
}

/// Rewrites each matching position exactly once, children before parents.
pub fn try_replace<P, F, E>(tree: Tree, pred: P, mut f: F) -> Result<Tree, E>
where
    P: Fn(&Tree) -> bool,
    F: FnMut(Tree) -> Result<Tree, E>,
{
    replace_once(tree, &pred, &mut f)
}

fn exhaustive<P, F, E>(tree: Tree, pred: &P, f: &mut F) -> Result<Tree, E>
where
    P: Fn(&Tree) -> bool,
    F: FnMut(Tree) -> Result<Tree, E>,
{
    if pred(&tree) {
        let rewritten = f(tree)?;
        return exhaustive(rewritten, pred, f);
    }
    match tree {
        Tree::List(items) => rebuild(items, |child| exhaustive(child, pred, f)),
        atom => Ok(atom),
    }
}

fn depth_first<P, F, E>(tree: Tree, pred: &P, f: &mut F) -> Result<Tree, E>
where
    P: Fn(&Tree) -> bool,
    F: FnMut(Tree) -> Result<Tree, E>,
{
    let matched = pred(&tree);
    match tree {
        Tree::List(items) if matched => {
            let children_done = rebuild(items, |child| depth_first(child, pred, f))?;
            let rewritten = f(children_done)?;
            depth_first(rewritten, pred, f)
        }
        Tree::List(items) => rebuild(items, |child| depth_first(child, pred, f)),
        atom if matched => {
            let rewritten = f(atom)?;
            depth_first(rewritten, pred, f)
        }
        atom => Ok(atom),
    }
}

fn replace_once<P, F, E>(tree: Tree, pred: &P, f: &mut F) -> Result<Tree, E>
where
    P: Fn(&Tree) -> bool,
    F: FnMut(Tree) -> Result<Tree, E>,
{
    let matched = pred(&tree);
    match tree {
        Tree::List(items) => {
            let children_done = rebuild(items, |child| replace_once(child, pred, f))?;
            if matched {
                f(children_done)
            } else {
                Ok(children_done)
            }
        }
        atom if matched => f(atom),
        atom => Ok(atom),
    }
}

fn rebuild<E>(
    items: Vec<Tree>,
    mut visit: impl FnMut(Tree) -> Result<Tree, E>,
) -> Result<Tree, E> {
    items
        .into_iter()
        .map(&mut visit)
        .collect::<Result<Vec<_>, E>>()
        .map(Tree::List)
}

// ============================================================================
// INFALLIBLE WRAPPERS
// ============================================================================

pub fn exhaustive_collect<P, F>(tree: Tree, pred: P, mut f: F) -> Tree
where
    P: Fn(&Tree) -> bool,
    F: FnMut(Tree) -> Tree,
{
    infallible(try_exhaustive_collect(tree, pred, |t| Ok(f(t))))
}

pub fn depth_first_exhaustive_collect<P, F>(tree: Tree, pred: P, mut f: F) -> Tree
where
    P: Fn(&Tree) -> bool,
    F: FnMut(Tree) -> Tree,
{
    infallible(try_depth_first_exhaustive_collect(tree, pred, |t| Ok(f(t))))
}

pub fn replace<P, F>(tree: Tree, pred: P, mut f: F) -> Tree
where
    P: Fn(&Tree) -> bool,
    F: FnMut(Tree) -> Tree,
{
    infallible(try_replace(tree, pred, |t| Ok(f(t))))
}

/// Applies [`replace`] to every node tagged `tag`.
pub fn replace_with_tag<F>(tree: Tree, tag: &str, f: F) -> Tree
where
    F: FnMut(Tree) -> Tree,
{
    replace(tree, |t| t.has_tag(tag), f)
}

fn infallible(result: Result<Tree, Infallible>) -> Tree {
    match result {
        Ok(tree) => tree,
        Err(never) => match never {},
    }
}
