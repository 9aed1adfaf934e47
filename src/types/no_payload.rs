use std::fmt;

/// Payload for trees that only store keys.
///
/// This is a zero-sized type, so nodes carry no extra space for it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NoPayload;

impl fmt::Display for NoPayload {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::NoPayload;

    #[test]
    fn test_zero_sized() {
        assert_eq!(std::mem::size_of::<NoPayload>(), 0);
        assert_eq!(NoPayload.to_string(), "");
    }
}
