//! Pluggable ownership policies for tree nodes.
//!
//! This module defines [`MemoryPolicy`], the strategy trait that decides how
//! node references are shared, counted, and mutated. The engines never touch
//! `Rc`/`Arc` directly; every allocation and every clone-on-write decision
//! goes through a [`NodeRef`].
//!
//! # Design
//!
//! The trait uses static dispatch (generics) for zero-cost abstraction: the
//! policy is a type parameter of the vector, chosen at construction time,
//! never a trait object on a hot path.
//!
//! The central question a policy answers is *"is this node reachable from
//! exactly one live handle?"*. When the answer is yes, a mutating operation
//! may write into the node directly without violating any other handle's
//! observed value; when it is no (or unknowable), the node is cloned first
//! and the clone is linked in its place.
//!
//! # Implementors
//!
//! - [`ArcPolicy`] — atomic reference counts; handles may be shared across
//!   threads. The default.
//! - [`RcPolicy`] — non-atomic reference counts; fastest, and handles are
//!   `!Send` so the cross-thread uniqueness race cannot be written at all.
//! - [`AlwaysCopyPolicy`] — models a tracing-collector heap: unique
//!   ownership is never claimed, so every write copies and the engine makes
//!   no reclamation decisions on the policy's behalf.
//!
//! The trait is public and open: test code implements it to inject
//! allocation failures at every [`NodeRef::try_new`] call site.

use std::rc::Rc;
use std::sync::Arc;

use crate::error::VectorError;

// ============================================================================
//  NodeRef
// ============================================================================

/// A shared, clone-on-write reference to a tree node.
///
/// Cloning a `NodeRef` is an ownership bump, never a deep copy. Deep copies
/// happen only inside [`make_mut`](Self::make_mut), and only when the
/// reference is not unique under its policy.
pub trait NodeRef<T: Clone>: Clone {
    /// Allocate a new node.
    ///
    /// This is the observable allocation point required by the
    /// exception-safety contract: a failing implementation must return
    /// [`VectorError::AllocationFailed`] *before* the node becomes reachable
    /// from any handle.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::AllocationFailed`] on heap exhaustion (or
    /// injected failure).
    fn try_new(value: T) -> Result<Self, VectorError>;

    /// Borrow the referenced node.
    fn get(&self) -> &T;

    /// Whether this reference is the only owner of the node.
    ///
    /// `true` means a direct write cannot be observed through any other
    /// handle. Policies that cannot prove uniqueness must return `false`.
    fn is_unique(&self) -> bool;

    /// Mutable access, cloning the node first unless the reference is
    /// unique.
    ///
    /// The clone (if any) is complete before the returned reference can be
    /// written through, so a failure here never leaves a shared node
    /// partially mutated.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::AllocationFailed`] if the clone's allocation
    /// fails.
    fn make_mut(&mut self) -> Result<&mut T, VectorError>;
}

// ============================================================================
//  MemoryPolicy
// ============================================================================

/// Strategy triple deciding heap behavior, ownership discipline, and
/// atomicity for a vector type.
///
/// Injected as a type parameter at vector construction; see the module docs
/// for the canonical instantiations.
pub trait MemoryPolicy: 'static {
    /// The node reference type used under this policy.
    type Ref<T: Clone>: NodeRef<T>;

    /// Whether handles built under this policy may be shared across threads.
    ///
    /// With `false`, ownership counts are not synchronized and the reference
    /// type is expected to be `!Send`.
    const THREAD_SAFE: bool;

    /// Short policy name for diagnostics and benchmark labels.
    const NAME: &'static str;
}

// ============================================================================
//  ArcPolicy
// ============================================================================

/// Atomic reference counting; handles may cross threads.
///
/// Concurrent construction of independent new versions from clones of one
/// base handle is safe without locks: the uniqueness check and the count
/// updates are atomic, so no thread can wrongly observe unique ownership of
/// a node another thread still reaches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArcPolicy;

impl MemoryPolicy for ArcPolicy {
    type Ref<T: Clone> = Arc<T>;

    const THREAD_SAFE: bool = true;
    const NAME: &'static str = "arc";
}

impl<T: Clone> NodeRef<T> for Arc<T> {
    #[inline]
    fn try_new(value: T) -> Result<Self, VectorError> {
        Ok(Arc::new(value))
    }

    #[inline]
    fn get(&self) -> &T {
        self
    }

    #[inline]
    fn is_unique(&self) -> bool {
        Arc::strong_count(self) == 1
    }

    #[inline]
    fn make_mut(&mut self) -> Result<&mut T, VectorError> {
        Ok(Arc::make_mut(self))
    }
}

// ============================================================================
//  RcPolicy
// ============================================================================

/// Non-atomic reference counting; the single-threaded fast path.
///
/// `Rc` is `!Send`, so a handle built under this policy cannot cross a
/// thread boundary at all: the data race that would otherwise make the
/// non-atomic uniqueness check unsound is unrepresentable.
#[derive(Debug, Clone, Copy, Default)]
pub struct RcPolicy;

impl MemoryPolicy for RcPolicy {
    type Ref<T: Clone> = Rc<T>;

    const THREAD_SAFE: bool = false;
    const NAME: &'static str = "rc";
}

impl<T: Clone> NodeRef<T> for Rc<T> {
    #[inline]
    fn try_new(value: T) -> Result<Self, VectorError> {
        Ok(Rc::new(value))
    }

    #[inline]
    fn get(&self) -> &T {
        self
    }

    #[inline]
    fn is_unique(&self) -> bool {
        Rc::strong_count(self) == 1
    }

    #[inline]
    fn make_mut(&mut self) -> Result<&mut T, VectorError> {
        Ok(Rc::make_mut(self))
    }
}

// ============================================================================
//  AlwaysCopyPolicy
// ============================================================================

/// Never claims unique ownership; every write copies.
///
/// Models the capability contract of a tracing-collector heap, where
/// ownership counts are no-ops and "reachable from exactly one handle" is
/// never reliably observable. Trades write throughput for the guarantee
/// that no uniqueness reasoning is ever needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysCopyPolicy;

impl MemoryPolicy for AlwaysCopyPolicy {
    type Ref<T: Clone> = FrozenRef<T>;

    const THREAD_SAFE: bool = true;
    const NAME: &'static str = "always-copy";
}

/// Reference type for [`AlwaysCopyPolicy`].
///
/// Wraps an `Arc` but reports every node as shared, forcing the engines
/// onto the copy path unconditionally.
#[derive(Debug)]
pub struct FrozenRef<T>(Arc<T>);

impl<T> Clone for FrozenRef<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Clone> NodeRef<T> for FrozenRef<T> {
    #[inline]
    fn try_new(value: T) -> Result<Self, VectorError> {
        Ok(Self(Arc::new(value)))
    }

    #[inline]
    fn get(&self) -> &T {
        &self.0
    }

    #[inline]
    fn is_unique(&self) -> bool {
        false
    }

    fn make_mut(&mut self) -> Result<&mut T, VectorError> {
        self.0 = Arc::new(T::clone(&self.0));
        match Arc::get_mut(&mut self.0) {
            Some(value) => Ok(value),
            // A freshly allocated Arc has exactly one strong reference.
            None => Err(VectorError::AllocationFailed),
        }
    }
}

// ============================================================================
//  Tests
// ============================================================================
