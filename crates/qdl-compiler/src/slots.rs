use qdl_core::QdlError;

/// A table sized up front from the section counts. Filling it past its
/// capacity, or finishing it short, is a build error rather than a resize.
#[derive(Debug)]
pub(crate) struct FixedSlots<T> {
    items: Vec<T>,
    capacity: usize,
    what: &'static str,
}

impl<T> FixedSlots<T> {
    pub(crate) fn with_capacity(capacity: usize, what: &'static str) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            what,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.capacity - self.items.len()
    }

    pub(crate) fn push(&mut self, item: T) -> Result<(), QdlError> {
        if self.items.len() == self.capacity {
            return Err(QdlError::new(
                "QDL_BUILD_CAPACITY",
                format!("More {} than counted ({}).", self.what, self.capacity),
            ));
        }
        self.items.push(item);
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<Box<[T]>, QdlError> {
        if self.items.len() != self.capacity {
            return Err(QdlError::new(
                "QDL_BUILD_CAPACITY",
                format!(
                    "Counted {} {} but filled {}.",
                    self.capacity,
                    self.what,
                    self.items.len()
                ),
            ));
        }
        Ok(self.items.into_boxed_slice())
    }
}

#[cfg(test)]
mod slots_tests {
    use super::*;

    #[test]
    fn fills_exactly_to_capacity() {
        let mut slots = FixedSlots::with_capacity(2, "objects");
        slots.push("a").expect("first");
        assert_eq!(slots.remaining(), 1);
        slots.push("b").expect("second");
        assert_eq!(slots.len(), 2);
        let error = slots.push("c").expect_err("third overflows");
        assert_eq!(error.code, "QDL_BUILD_CAPACITY");
        assert_eq!(&*slots.finish().expect("full"), &["a", "b"]);
    }

    #[test]
    fn finishing_short_is_an_error() {
        let mut slots = FixedSlots::with_capacity(3, "commands");
        slots.push(1).expect("push");
        let error = slots.finish().expect_err("underfilled");
        assert_eq!(error.code, "QDL_BUILD_CAPACITY");
    }
}
