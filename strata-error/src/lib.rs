//! Error types shared by the strata crates.
#![feature(error_generic_member_access)]

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;

mod ext;

pub use ext::ResultExt;

/// A cheaply cloneable, possibly static error message.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ErrString(Cow<'static, str>);

impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        ErrString(msg.into())
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Debug for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The top-level error type for all strata crates.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StrataError {
    /// An index was outside the addressable range of a row or matrix.
    #[error("index {0} out of bounds from {1} to {2}\nBacktrace:\n{3}")]
    OutOfBounds(usize, usize, usize, Backtrace),
    /// A caller-supplied value failed validation.
    #[error("invalid argument: {0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, Backtrace),
    /// An elementwise operation tag was not recognized.
    #[error("invalid operation: {0}\nBacktrace:\n{1}")]
    InvalidOperation(ErrString, Backtrace),
    /// A matrix dimension exceeded the host addressable range.
    #[error("dimension overflow: {0}\nBacktrace:\n{1}")]
    DimensionOverflow(ErrString, Backtrace),
    /// No serialization mapping exists for a matrix key type.
    #[error("unsupported key type: {0}\nBacktrace:\n{1}")]
    UnsupportedKeyType(ErrString, Backtrace),
    /// A whole-collection pass over the engine failed.
    #[error("compute error: {0}\nBacktrace:\n{1}")]
    ComputeError(ErrString, Backtrace),
    #[error("not implemented: {0}\nBacktrace:\n{1}")]
    NotImplemented(ErrString, Backtrace),
    /// A wrapped error with an additional message.
    #[error("{0}: {1}")]
    Context(ErrString, Box<StrataError>),
}

impl StrataError {
    /// Wrap this error with an additional message.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        StrataError::Context(msg.into(), Box::new(self))
    }
}

pub type StrataResult<T> = Result<T, StrataError>;

/// Construct a [`StrataError`].
///
/// With a leading variant identifier the message lands in that variant,
/// otherwise it defaults to [`StrataError::InvalidArgument`].
#[macro_export]
macro_rules! strata_err {
    (OutOfBounds: $idx:expr, $start:expr, $stop:expr) => {{
        $crate::StrataError::OutOfBounds(
            $idx,
            $start,
            $stop,
            std::backtrace::Backtrace::capture(),
        )
    }};
    (Context: $msg:expr, $err:expr) => {{
        $crate::StrataError::Context($msg.into(), Box::new($err))
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        $crate::StrataError::$variant(
            format!($fmt $(, $arg)*).into(),
            std::backtrace::Backtrace::capture(),
        )
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::strata_err!(InvalidArgument: $fmt $(, $arg)*)
    };
}

/// Return early with a [`StrataError`], using the same forms as [`strata_err!`].
#[macro_export]
macro_rules! strata_bail {
    ($($tt:tt)+) => {
        return Err($crate::strata_err!($($tt)+))
    };
}

/// Panic with a [`StrataError`].
///
/// Reserved for invariant violations that indicate a bug rather than a
/// recoverable condition.
#[macro_export]
macro_rules! strata_panic {
    (OutOfBounds: $idx:expr, $start:expr, $stop:expr) => {{
        let err = $crate::strata_err!(OutOfBounds: $idx, $start, $stop);
        panic!("{}", err)
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let err = $crate::strata_err!($variant: $fmt $(, $arg)*);
        panic!("{}", err)
    }};
    ($err:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let err: $crate::StrataError = $err;
        panic!("{}", err.with_context(format!($fmt $(, $arg)*)))
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        let err = $crate::strata_err!($fmt $(, $arg)*);
        panic!("{}", err)
    }};
    ($err:expr) => {{
        let err: $crate::StrataError = $err;
        panic!("{}", err)
    }};
}

/// Unwrap with a message, panicking through [`strata_panic!`] on failure.
///
/// The lint table denies bare `expect`; this is the sanctioned replacement for
/// invariants that hold by construction.
pub trait StrataExpect {
    type Output;

    fn strata_expect(self, msg: &str) -> Self::Output;
}

impl<T> StrataExpect for StrataResult<T> {
    type Output = T;

    #[allow(clippy::panic)]
    fn strata_expect(self, msg: &str) -> Self::Output {
        self.unwrap_or_else(|e| panic!("{}", e.with_context(msg.to_string())))
    }
}

impl<T> StrataExpect for Option<T> {
    type Output = T;

    #[allow(clippy::panic)]
    fn strata_expect(self, msg: &str) -> Self::Output {
        self.unwrap_or_else(|| panic!("{msg}"))
    }
}

/// Unwrap, panicking through [`strata_panic!`] on failure.
pub trait StrataUnwrap {
    type Output;

    fn strata_unwrap(self) -> Self::Output;
}

impl<T> StrataUnwrap for StrataResult<T> {
    type Output = T;

    #[allow(clippy::panic)]
    fn strata_unwrap(self) -> Self::Output {
        self.unwrap_or_else(|e| panic!("{e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn err_macro_default_variant() {
        let err = strata_err!("bad value {}", 42);
        assert!(matches!(err, StrataError::InvalidArgument(..)));
        assert!(err.to_string().contains("bad value 42"));
    }

    #[test]
    fn err_macro_named_variant() {
        let err = strata_err!(UnsupportedKeyType: "no mapping for {}", "Foo");
        assert!(matches!(err, StrataError::UnsupportedKeyType(..)));
        assert!(err.to_string().contains("no mapping for Foo"));
    }

    #[test]
    fn out_of_bounds_fields() {
        let err = strata_err!(OutOfBounds: 7, 0, 4);
        assert!(err.to_string().contains("index 7 out of bounds from 0 to 4"));
    }

    #[test]
    fn context_chains_messages() {
        let inner = strata_err!(ComputeError: "fold failed");
        let outer = inner.with_context("while inferring ncol");
        let msg = outer.to_string();
        assert!(msg.starts_with("while inferring ncol:"));
        assert!(msg.contains("fold failed"));
    }

    #[test]
    fn bail_returns_err() {
        fn fails() -> StrataResult<()> {
            strata_bail!(InvalidOperation: "unknown tag {:?}", "%")
        }
        assert!(matches!(fails(), Err(StrataError::InvalidOperation(..))));
    }
}
