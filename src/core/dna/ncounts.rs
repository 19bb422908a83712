use derive_more::{Add, AddAssign};

use super::Nucleotide;

#[derive(Clone, Copy, Eq, PartialEq, Debug, Add, AddAssign, Default)]
#[allow(non_snake_case)]
pub struct NucCounts {
    pub A: u32,
    pub C: u32,
    pub G: u32,
    pub T: u32,
}

impl NucCounts {
    #[allow(non_snake_case)]
    pub fn new(A: u32, C: u32, G: u32, T: u32) -> Self {
        Self { A, C, G, T }
    }

    #[inline]
    pub fn zeros() -> Self {
        Self::default()
    }

    pub fn from_sequence<'a>(sequence: impl IntoIterator<Item = &'a Nucleotide>) -> Self {
        let mut counts = Self::zeros();
        for nuc in sequence {
            counts.increment(*nuc);
        }
        counts
    }

    #[inline]
    pub fn increment(&mut self, nuc: Nucleotide) {
        match nuc {
            Nucleotide::A => self.A += 1,
            Nucleotide::C => self.C += 1,
            Nucleotide::G => self.G += 1,
            Nucleotide::T => self.T += 1,
            Nucleotide::Unknown => {}
        }
    }

    #[inline]
    pub fn coverage(&self) -> u32 {
        self.A + self.T + self.G + self.C
    }

    #[inline]
    pub fn gc(&self) -> u32 {
        self.G + self.C
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage() {
        let dummy = NucCounts { A: 1, C: 2, G: 3, T: 0 };
        assert_eq!(dummy.coverage(), 6);
        assert_eq!(dummy.gc(), 5);
        assert_eq!(NucCounts::zeros().coverage(), 0);
    }

    #[test]
    fn from_sequence() {
        let sequence = [Nucleotide::A, Nucleotide::Unknown, Nucleotide::G, Nucleotide::G, Nucleotide::T];
        assert_eq!(NucCounts::from_sequence(&sequence), NucCounts::new(1, 0, 2, 1));
    }

    #[test]
    fn add() {
        let mut a = NucCounts { A: 0, C: 1, G: 2, T: 3 };
        let b = NucCounts { A: 1, C: 2, G: 3, T: 4 };
        let result = NucCounts { A: 1, C: 3, G: 5, T: 7 };
        assert_eq!(a + b, result);
        a += b;
        assert_eq!(a, result);
    }
}
