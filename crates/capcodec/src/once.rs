use tracing::debug;

use crate::{
    codec::{Codec, Decoder},
    error::{Error, Result},
};

/// Lets a destination consume at most one value in a dispatch step.
///
/// Engines wrap themselves in a `Once` before handing control to a
/// [`FieldDecoder`](crate::FieldDecoder) or
/// [`ElementDecoder`](crate::ElementDecoder). The first `decode` call passes
/// through; every later call fails with [`Error::Arity`]. After the step,
/// [`Once::finish`] reports how many calls were made so the engine can skip
/// an unconsumed value.
#[derive(Debug)]
pub struct Once<'d, D: ?Sized + Decoder> {
    inner: &'d mut D,
    calls: usize,
}

impl<'d, D: ?Sized + Decoder> Once<'d, D> {
    /// Wraps `inner` for one dispatch step.
    pub fn new(inner: &'d mut D) -> Self {
        Self { inner, calls: 0 }
    }

    /// Ends the step and returns the number of `decode` calls attempted.
    #[must_use]
    pub fn finish(self) -> usize {
        self.calls
    }

    /// Checks the outcome of a step.
    ///
    /// More than one call is an [`Error::Arity`] regardless of `result`, so a
    /// destination cannot hide the violation by swallowing the error it got.
    /// Otherwise `result` is returned along with whether the value was
    /// consumed.
    pub(crate) fn settle(self, result: Result<()>) -> Result<bool> {
        match self.finish() {
            0 => result.map(|()| false),
            1 => result.map(|()| true),
            calls => {
                debug!(calls, "destination decoded more than once");
                Err(Error::Arity { calls })
            }
        }
    }
}

impl<D: ?Sized + Decoder> Decoder for Once<'_, D> {
    fn decode(&mut self, v: &mut dyn Codec) -> Result<()> {
        self.calls += 1;
        if self.calls > 1 {
            return Err(Error::Arity { calls: self.calls });
        }
        self.inner.decode(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Discard;

    struct Counting(usize);

    impl Decoder for Counting {
        fn decode(&mut self, _: &mut dyn Codec) -> Result<()> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn second_call_is_rejected() {
        let mut inner = Counting(0);
        let mut once = Once::new(&mut inner);
        once.decode(&mut Discard).unwrap();
        assert_eq!(once.decode(&mut Discard), Err(Error::Arity { calls: 2 }));
        assert_eq!(once.finish(), 2);
        assert_eq!(inner.0, 1);
    }

    #[test]
    fn swallowed_violation_still_fails() {
        let mut inner = Counting(0);
        let mut once = Once::new(&mut inner);
        let _ = once.decode(&mut Discard);
        let _ = once.decode(&mut Discard);
        assert_eq!(once.settle(Ok(())), Err(Error::Arity { calls: 2 }));
    }

    #[test]
    fn unused_guard_reports_unconsumed() {
        let mut inner = Counting(0);
        assert_eq!(Once::new(&mut inner).settle(Ok(())), Ok(false));
    }
}
