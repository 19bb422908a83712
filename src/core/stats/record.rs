use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::core::dna::Nucleotide;

#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Text(Arc<str>),
    Count(u64),
    Real(f64),
    Base(Nucleotide),
}

impl Value {
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Value::Count(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(x) => Some(*x),
            Value::Count(x) => Some(*x as f64),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(x) => write!(f, "{}", x),
            Value::Count(x) => write!(f, "{}", x),
            Value::Real(x) => write!(f, "{:.6}", x),
            Value::Base(x) => write!(f, "{}", x),
        }
    }
}

impl From<u32> for Value {
    fn from(x: u32) -> Self {
        Value::Count(x as u64)
    }
}

impl From<u64> for Value {
    fn from(x: u64) -> Self {
        Value::Count(x)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Real(x)
    }
}

/// One output row: values aligned with the schema of its statistic type.
#[derive(Clone, PartialEq, Debug)]
pub struct StatRecord {
    pub values: Vec<Value>,
    // The depth cap was hit while collecting the reads behind this record
    pub truncated: bool,
}

impl StatRecord {
    pub fn new(values: Vec<Value>, truncated: bool) -> Self {
        Self { values, truncated }
    }

    /// Value of the given field, schema must be the one the record was built with.
    pub fn get<'a>(&'a self, schema: &[String], field: &str) -> Option<&'a Value> {
        schema.iter().position(|x| x == field).and_then(|x| self.values.get(x))
    }
}

/// Running sums sufficient for mean/RMS/std/max of a sample. Empty samples report zeros.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct Moments {
    n: u64,
    sum: f64,
    sumsq: f64,
    max: f64,
}

impl Moments {
    #[inline]
    pub fn push(&mut self, x: f64) {
        self.n += 1;
        self.sum += x;
        self.sumsq += x * x;
        if self.n == 1 || x > self.max {
            self.max = x;
        }
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.n
    }

    pub fn mean(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.sum / self.n as f64
        }
    }

    pub fn rms(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            (self.sumsq / self.n as f64).sqrt()
        }
    }

    /// Population standard deviation
    pub fn std(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.sumsq / self.n as f64 - mean * mean).max(0.0).sqrt()
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

impl std::ops::Add for Moments {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let max = match (self.n, rhs.n) {
            (0, _) => rhs.max,
            (_, 0) => self.max,
            _ => self.max.max(rhs.max),
        };
        Self { n: self.n + rhs.n, sum: self.sum + rhs.sum, sumsq: self.sumsq + rhs.sumsq, max }
    }
}

impl std::ops::AddAssign for Moments {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
