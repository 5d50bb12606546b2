// ruleset.rs - Bounded rule enumeration over an engine-owned ruleset.
//
// The helpers never allocate and never touch the ruleset itself: they walk
// the engine's native iteration order and copy handles into a
// caller-supplied buffer.

use std::mem::MaybeUninit;

/// A read-only view over a compiled set of rules.
///
/// Implementors borrow the ruleset; dropping the view or its handles must
/// never free anything owned by the engine.
pub trait Ruleset {
    /// Opaque handle to one rule. Copying a handle never copies the rule.
    type Rule: Copy;

    /// Iterator over the rules in the engine's native order.
    type Iter<'r>: Iterator<Item = Self::Rule>
    where
        Self: 'r;

    fn rules(&self) -> Self::Iter<'_>;
}

/// Copy rule handles into `out`, stopping after `capacity` handles.
///
/// The effective capacity is `min(capacity, out.len())`; slots past it are
/// left untouched and rules beyond it are silently not copied. Returns the
/// number of handles written, which is `min(count(ruleset), capacity)`.
///
/// Any slot type constructible from a handle works, so `Option<R::Rule>`
/// buffers can be used when no placeholder handle is available.
///
/// # Examples
///
/// ```
/// use yara_helpers::ruleset::{self, Ruleset};
///
/// struct Table(Vec<u32>);
///
/// impl Ruleset for Table {
///     type Rule = u32;
///     type Iter<'r> = std::iter::Copied<std::slice::Iter<'r, u32>>;
///
///     fn rules(&self) -> Self::Iter<'_> {
///         self.0.iter().copied()
///     }
/// }
///
/// let table = Table(vec![10, 20, 30, 40, 50]);
/// let mut out: [Option<u32>; 8] = [None; 8];
/// assert_eq!(ruleset::enumerate(&table, &mut out, 3), 3);
/// assert_eq!(out[..4], [Some(10), Some(20), Some(30), None]);
/// assert_eq!(ruleset::count(&table), 5);
/// ```
pub fn enumerate<R, S>(ruleset: &R, out: &mut [S], capacity: usize) -> usize
where
    R: Ruleset + ?Sized,
    S: From<R::Rule>,
{
    let capacity = capacity.min(out.len());
    let mut written = 0;
    for (slot, rule) in out[..capacity].iter_mut().zip(ruleset.rules()) {
        *slot = S::from(rule);
        written += 1;
    }
    written
}

/// [`enumerate`] into possibly uninitialized storage.
///
/// Exactly the first `n` slots are initialized on return, where `n` is the
/// returned count.
pub fn enumerate_uninit<R, S>(ruleset: &R, out: &mut [MaybeUninit<S>], capacity: usize) -> usize
where
    R: Ruleset + ?Sized,
    S: From<R::Rule>,
{
    let capacity = capacity.min(out.len());
    let mut written = 0;
    for (slot, rule) in out[..capacity].iter_mut().zip(ruleset.rules()) {
        slot.write(S::from(rule));
        written += 1;
    }
    written
}

/// Total number of rules, independent of any buffer.
pub fn count<R: Ruleset + ?Sized>(ruleset: &R) -> usize {
    ruleset.rules().count()
}
