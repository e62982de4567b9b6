//! Dependency-tracked caching.
//!
//! A [`Memo`] stores the dependency tuple captured by its last computation next to the result.
//! Reading with an unchanged tuple returns the cached result; any changed element triggers a
//! recompute. Shared handles (`Rc`, `Arc`) compare by pointer, so a state setter that keeps the
//! previous `Arc` keeps every downstream memo warm.

use std::rc::Rc;
use std::sync::Arc;

/// Element-wise "unchanged" comparison for memo dependencies.
pub trait Deps {
    fn same(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Deps for Rc<T> {
    fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> Deps for Arc<T> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: Deps> Deps for Option<T> {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same(b),
            (None, None) => true,
            _ => false,
        }
    }
}

macro_rules! impl_deps_by_value {
    ($($t:ty),*) => {
        $(
            impl Deps for $t {
                fn same(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_deps_by_value!(bool, char, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, &'static str);

impl Deps for () {
    fn same(&self, _other: &Self) -> bool {
        true
    }
}

macro_rules! impl_deps_for_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Deps),+> Deps for ($($name,)+) {
            fn same(&self, other: &Self) -> bool {
                $(self.$idx.same(&other.$idx))&&+
            }
        }
    };
}

impl_deps_for_tuple!(A: 0);
impl_deps_for_tuple!(A: 0, B: 1);
impl_deps_for_tuple!(A: 0, B: 1, C: 2);
impl_deps_for_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_deps_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_deps_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_deps_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_deps_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

type OnChange<R> = Box<dyn Fn(&R)>;

/// A single-slot cache keyed on a dependency tuple.
pub struct Memo<D, R> {
    key: &'static str,
    slot: Option<(D, R)>,
    on_change: Option<OnChange<R>>,
    recomputes: usize,
}

impl<D: Deps, R: Clone> Memo<D, R> {
    /// `key` names the memo in trace output.
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            slot: None,
            on_change: None,
            recomputes: 0,
        }
    }

    /// Called with every freshly computed result.
    pub fn with_on_change(mut self, f: impl Fn(&R) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Returns the cached result when `deps` matches the previous tuple, otherwise computes.
    pub fn get(&mut self, deps: D, compute: impl FnOnce(&D) -> R) -> R {
        match self.try_get(deps, |d| Ok::<R, std::convert::Infallible>(compute(d))) {
            Ok(r) => r,
            Err(never) => match never {},
        }
    }

    /// Like [`Memo::get`], but a failing `compute` leaves the previous result and tuple in
    /// place.
    pub fn try_get<E>(
        &mut self,
        deps: D,
        compute: impl FnOnce(&D) -> Result<R, E>,
    ) -> Result<R, E> {
        if let Some((prev, result)) = &self.slot {
            if prev.same(&deps) {
                return Ok(result.clone());
            }
        }

        let result = compute(&deps)?;
        self.recomputes += 1;
        ttrace!(memo = self.key, recomputes = self.recomputes, "memo recomputed");
        if let Some(f) = &self.on_change {
            f(&result);
        }
        self.slot = Some((deps, result.clone()));
        Ok(result)
    }

    /// The cached result, if any, without checking dependencies.
    pub fn peek(&self) -> Option<&R> {
        self.slot.as_ref().map(|(_, r)| r)
    }

    /// Drops the cached result; the next read recomputes.
    pub fn reset(&mut self) {
        self.slot = None;
    }

    /// How many times `compute` ran successfully.
    pub fn recompute_count(&self) -> usize {
        self.recomputes
    }
}

impl<D, R> std::fmt::Debug for Memo<D, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("key", &self.key)
            .field("cached", &self.slot.is_some())
            .field("recomputes", &self.recomputes)
            .finish()
    }
}

/// Closure form of [`Memo`]: each call evaluates `deps` and recomputes only when they changed.
pub fn memo<D: Deps, R: Clone>(
    mut deps: impl FnMut() -> D,
    mut compute: impl FnMut(&D) -> R,
) -> impl FnMut() -> R {
    let mut cell = Memo::new("memo");
    move || cell.get(deps(), &mut compute)
}
