/// Configuration shared by the streaming decoders.
///
/// # Examples
///
/// ```rust
/// use capcodec::{DecoderOptions, json::JsonDecoder};
///
/// let options = DecoderOptions {
///     max_depth: Some(64),
///     ..Default::default()
/// };
/// let decoder = JsonDecoder::with_options("[[1]]", options);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderOptions {
    /// The deepest nesting of aggregates (JSON) or elements (XML) the decoder
    /// will enter.
    ///
    /// Exceeding it fails with
    /// [`Error::DepthLimitExceeded`](crate::Error::DepthLimitExceeded).
    /// `None` leaves nesting unbounded, limited only by the stack.
    ///
    /// # Default
    ///
    /// `None`
    pub max_depth: Option<usize>,

    /// Whether to trim leading and trailing whitespace from each run of XML
    /// text between markup and drop runs that are entirely whitespace.
    ///
    /// Character and entity references belong to the surrounding run, so
    /// `<a> fish &amp; chips </a>` reads as `"fish & chips"`.
    ///
    /// Useful for indented documents decoded into [`Value`](crate::Value) or
    /// other destinations that accumulate text.
    ///
    /// # Default
    ///
    /// `false`
    pub trim_text: bool,
}

impl DecoderOptions {
    /// Returns an error if entering one more level would exceed `max_depth`.
    pub(crate) fn check_depth(
        &self,
        depth: usize,
        position: impl FnOnce() -> crate::Position,
    ) -> crate::Result<()> {
        match self.max_depth {
            Some(limit) if depth >= limit => {
                let position = position();
                tracing::debug!(limit, %position, "depth limit exceeded");
                Err(crate::Error::DepthLimitExceeded { limit, position })
            }
            _ => Ok(()),
        }
    }
}
