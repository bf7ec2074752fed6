use alloc::vec::Vec;
use core::fmt::Debug;
use core::fmt::Display;

/// A collection of independent failures captured during a best-effort
/// traversal, kept in the order the elements were visited.
///
/// Suppressing traversals only build one of these when two or more callbacks
/// failed; a lone failure is reported as [`SuppressedError::Single`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeError<E> {
    errors: Vec<E>,
}

impl<E> CompositeError<E> {
    /// Wraps the given failures.
    pub fn new(errors: Vec<E>) -> Self {
        Self { errors }
    }

    /// The captured failures, in visitation order.
    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    /// Number of captured failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` if no failure was captured.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over the captured failures in visitation order.
    pub fn iter(&self) -> core::slice::Iter<'_, E> {
        self.errors.iter()
    }

    /// Unwraps the captured failures.
    pub fn into_inner(self) -> Vec<E> {
        self.errors
    }
}

impl<E: Display> Display for CompositeError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} errors occurred", self.errors.len())?;
        for (index, error) in self.errors.iter().enumerate() {
            write!(f, "\n  #{index}: {error}")?;
        }
        Ok(())
    }
}

impl<E: Debug + Display> core::error::Error for CompositeError<E> {}

impl<E> IntoIterator for CompositeError<E> {
    type IntoIter = alloc::vec::IntoIter<E>;
    type Item = E;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a CompositeError<E> {
    type IntoIter = core::slice::Iter<'a, E>;
    type Item = &'a E;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Failure reported by a suppressing traversal
/// ([`for_each_suppress`](crate::HashSet::for_each_suppress),
/// [`clear_suppress`](crate::HashSet::clear_suppress)).
///
/// Exactly one failure is reported as-is; two or more are bundled into a
/// [`CompositeError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressedError<E> {
    /// The only callback failure of the traversal.
    Single(E),

    /// All callback failures of the traversal, in visitation order. Always
    /// holds at least two.
    Composite(CompositeError<E>),
}

impl<E> SuppressedError<E> {
    /// Applies the collapse rule to the failures captured by a traversal.
    ///
    /// Returns `Ok(())` when nothing failed.
    pub(crate) fn collapse(mut errors: Vec<E>) -> Result<(), Self> {
        if errors.len() > 1 {
            return Err(Self::Composite(CompositeError::new(errors)));
        }
        match errors.pop() {
            Some(error) => Err(Self::Single(error)),
            None => Ok(()),
        }
    }

    /// Number of failures represented by this error.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Composite(composite) => composite.len(),
        }
    }

    /// Always `false`; a reported failure carries at least one error.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Flattens the failure into its underlying errors, in visitation order.
    pub fn into_errors(self) -> Vec<E> {
        match self {
            Self::Single(error) => alloc::vec![error],
            Self::Composite(composite) => composite.into_inner(),
        }
    }
}

impl<E: Display> Display for SuppressedError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Single(error) => Display::fmt(error, f),
            Self::Composite(composite) => Display::fmt(composite, f),
        }
    }
}

impl<E> core::error::Error for SuppressedError<E>
where
    E: core::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Single(error) => Some(error),
            Self::Composite(_) => None,
        }
    }
}

impl<E> From<E> for SuppressedError<E> {
    fn from(value: E) -> Self {
        Self::Single(value)
    }
}
