use std::fmt::{Display, Formatter};

/// Reference or read base, anything but ACGT is unknown.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash, Debug)]
pub enum Nucleotide {
    A,
    C,
    G,
    T,
    Unknown,
}

impl Nucleotide {
    pub fn symbol(&self) -> &str {
        match self {
            Nucleotide::A => "A",
            Nucleotide::C => "C",
            Nucleotide::G => "G",
            Nucleotide::T => "T",
            Nucleotide::Unknown => "N",
        }
    }

    #[inline]
    pub fn is_called(&self) -> bool {
        !matches!(self, Nucleotide::Unknown)
    }

    #[inline]
    pub fn is_gc(&self) -> bool {
        matches!(self, Nucleotide::G | Nucleotide::C)
    }
}

impl Display for Nucleotide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Default for Nucleotide {
    fn default() -> Self {
        Nucleotide::Unknown
    }
}

impl From<u8> for Nucleotide {
    fn from(symbol: u8) -> Self {
        // No assumptions can be made on the letter case
        match symbol {
            b'A' | b'a' => Nucleotide::A,
            b'C' | b'c' => Nucleotide::C,
            b'G' | b'g' => Nucleotide::G,
            b'T' | b't' => Nucleotide::T,
            _ => Nucleotide::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_symbol() {
        for (symbol, expected) in [
            (b'A', Nucleotide::A),
            (b'c', Nucleotide::C),
            (b'G', Nucleotide::G),
            (b't', Nucleotide::T),
            (b'N', Nucleotide::Unknown),
            (b'=', Nucleotide::Unknown),
        ] {
            assert_eq!(Nucleotide::from(symbol), expected);
        }
    }

    #[test]
    fn gc() {
        assert!(Nucleotide::G.is_gc() && Nucleotide::C.is_gc());
        assert!(!Nucleotide::A.is_gc() && !Nucleotide::T.is_gc() && !Nucleotide::Unknown.is_gc());
        assert!(!Nucleotide::Unknown.is_called());
    }

    #[test]
    fn display() {
        let symbols: String = b"ACGTN".iter().map(|x| Nucleotide::from(*x).to_string()).collect();
        assert_eq!(symbols, "ACGTN");
    }
}
