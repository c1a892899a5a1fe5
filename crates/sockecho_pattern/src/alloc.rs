use crate::error::AllocError;

/// Where extracted capture text gets copied to.
///
/// [`match_extract`](crate::match_extract) uses [`HeapAlloc`]. Anything
/// implementing this trait can be passed to
/// [`match_extract_with`](crate::match_extract_with) instead, e.g. to count
/// live copies or to fail on purpose.
pub trait TextAlloc {
    type Text: AsRef<str>;

    fn copy(&self, text: &str) -> Result<Self::Text, AllocError>;
}

/// Copies into a `String`, reporting allocation failure instead of aborting.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAlloc;

impl TextAlloc for HeapAlloc {
    type Text = String;

    fn copy(&self, text: &str) -> Result<String, AllocError> {
        let mut owned = String::new();
        owned
            .try_reserve_exact(text.len())
            .map_err(|_| AllocError {
                requested: text.len(),
            })?;
        owned.push_str(text);
        Ok(owned)
    }
}
