use crate::{ErrString, StrataResult};

/// Extension trait for attaching context to a [`StrataResult`].
pub trait ResultExt<T>: private::Sealed {
    /// Wrap the error, if any, with an additional message.
    fn context<M: Into<ErrString>>(self, msg: M) -> StrataResult<T>;

    /// Wrap the error, if any, with a lazily built message.
    fn with_context<M: Into<ErrString>, F: FnOnce() -> M>(self, msg: F) -> StrataResult<T>;
}

mod private {
    use crate::StrataResult;

    pub trait Sealed {}

    impl<T> Sealed for StrataResult<T> {}
}

impl<T> ResultExt<T> for StrataResult<T> {
    fn context<M: Into<ErrString>>(self, msg: M) -> StrataResult<T> {
        self.map_err(|e| e.with_context(msg))
    }

    fn with_context<M: Into<ErrString>, F: FnOnce() -> M>(self, msg: F) -> StrataResult<T> {
        self.map_err(|e| e.with_context(msg()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StrataError, strata_err};

    #[test]
    fn context_wraps_err() {
        let res: StrataResult<()> = Err(strata_err!(ComputeError: "count failed"));
        let wrapped = res.context("while forcing row count");
        assert!(matches!(wrapped, Err(StrataError::Context(..))));
    }

    #[test]
    fn context_preserves_ok() {
        let res: StrataResult<u32> = Ok(3);
        assert_eq!(res.context("unused").unwrap(), 3);
    }
}
