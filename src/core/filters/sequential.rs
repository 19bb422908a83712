use std::marker::PhantomData;

use super::{AlignedRead, ReadsFilter};

#[derive(Copy, Clone)]
pub struct Sequential<R: AlignedRead, First: ReadsFilter<R>, Second: ReadsFilter<R>> {
    first: First,
    second: Second,
    phantom: PhantomData<fn() -> R>,
}

impl<R: AlignedRead, First: ReadsFilter<R>, Second: ReadsFilter<R>> Sequential<R, First, Second> {
    pub fn new(first: First, second: Second) -> Self {
        Sequential { first, second, phantom: Default::default() }
    }
}

impl<R, First, Second> ReadsFilter<R> for Sequential<R, First, Second>
where
    R: AlignedRead,
    First: ReadsFilter<R>,
    Second: ReadsFilter<R>,
{
    #[inline]
    fn is_read_ok(&self, record: &R) -> bool {
        self.first.is_read_ok(record) && self.second.is_read_ok(record)
    }

    #[inline]
    fn is_base_ok(&self, record: &R, base: usize) -> bool {
        self.first.is_base_ok(record, base) && self.second.is_base_ok(record, base)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::filters::MockReadsFilter;
    use crate::core::read::MockRead;

    use super::*;

    fn filter(isok: bool, times: usize) -> MockReadsFilter<MockRead> {
        let mut mock = MockReadsFilter::new();
        mock.expect_is_read_ok().times(times).return_const(isok);
        mock.expect_is_base_ok().times(times).return_const(isok);
        mock
    }

    #[test]
    fn short_circuit() {
        let read = MockRead::new();
        for (first, second, calls, expected) in
            [(true, true, 1, true), (true, false, 1, false), (false, true, 0, false), (false, false, 0, false)]
        {
            let dummy = Sequential::new(filter(first, 1), filter(second, calls));
            assert_eq!(dummy.is_read_ok(&read), expected);
            assert_eq!(dummy.is_base_ok(&read, 0), expected);
        }
    }
}
