use std::ops::{Add, Index, IndexMut};

use bio_types::strand::ReqStrand;
use derive_more::{Add, AddAssign};

#[derive(Default, Copy, Clone, Debug, PartialEq, Add, AddAssign)]
pub struct Stranded<T> {
    pub forward: T,
    pub reverse: T,
}

impl<T> Index<ReqStrand> for Stranded<T> {
    type Output = T;

    fn index(&self, index: ReqStrand) -> &Self::Output {
        match index {
            ReqStrand::Forward => &self.forward,
            ReqStrand::Reverse => &self.reverse,
        }
    }
}

impl<T> IndexMut<ReqStrand> for Stranded<T> {
    fn index_mut(&mut self, index: ReqStrand) -> &mut Self::Output {
        match index {
            ReqStrand::Forward => &mut self.forward,
            ReqStrand::Reverse => &mut self.reverse,
        }
    }
}

impl<T: Add<Output = T> + Copy> Stranded<T> {
    #[inline]
    pub fn total(&self) -> T {
        self.forward + self.reverse
    }
}
