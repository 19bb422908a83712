use std::collections::VecDeque;
use std::marker::PhantomData;
use std::ops::Range;
use std::sync::Arc;

use bio_types::genome::Position;
use derive_more::Constructor;

use crate::core::error::{Error, Result};
use crate::core::filters::ReadsFilter;
use crate::core::pileup::ReadInfo;
use crate::core::read::AlignedRead;
use crate::core::stats::{StatType, Value};

use super::BinnedStat;

/// Fixed-size windows [k * size, (k + 1) * size) tiling a contig.
#[derive(Constructor, Copy, Clone, Eq, PartialEq, Debug)]
pub struct Geometry {
    pub size: u64,
    pub offset: u64,
}

impl Geometry {
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 || self.offset >= self.size {
            return Err(Error::InvalidWindow { size: self.size, offset: self.offset });
        }
        Ok(())
    }

    #[inline]
    pub fn index(&self, pos: Position) -> u64 {
        pos / self.size
    }

    /// Indices of all windows intersecting the region
    pub fn covering(&self, region: &Range<Position>) -> Range<u64> {
        if region.is_empty() {
            let idx = self.index(region.start);
            idx..idx
        } else {
            self.index(region.start)..self.index(region.end - 1) + 1
        }
    }

    /// Window bounds clipped to the contig length
    pub fn bounds(&self, index: u64, contiglen: u64) -> Range<Position> {
        let start = index * self.size;
        let end = start.saturating_add(self.size).min(contiglen.max(start + 1));
        start..end
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct BinnedWindow {
    pub contig: Arc<str>,
    pub range: Range<Position>,
    pub pos: Position,
    pub values: Vec<Value>,
}

enum Pending {
    Window(BinnedWindow),
    // Window indices without reads
    Padding(Range<u64>),
}

/// Streams position-sorted reads into per-window accumulators. Windows are closed as soon as a read
/// from a later window arrives.
pub struct WindowBinner<R, Reads, Filter>
where
    R: AlignedRead,
    Reads: Iterator<Item = Result<R>>,
    Filter: ReadsFilter<R>,
{
    reads: Reads,
    filter: Filter,
    stat: StatType,
    contig: Arc<str>,
    contiglen: u64,
    geometry: Geometry,
    windows: Range<u64>,
    pad: bool,
    truncate: bool,
    current: Option<(u64, BinnedStat)>,
    ready: VecDeque<Pending>,
    nextpad: u64,
    laststart: i64,
    exhausted: bool,
    phantom: PhantomData<fn() -> R>,
}

impl<R, Reads, Filter> WindowBinner<R, Reads, Filter>
where
    R: AlignedRead,
    Reads: Iterator<Item = Result<R>>,
    Filter: ReadsFilter<R>,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reads: Reads,
        filter: Filter,
        stat: StatType,
        contig: Arc<str>,
        contiglen: u64,
        region: Range<Position>,
        geometry: Geometry,
        pad: bool,
        truncate: bool,
    ) -> Result<Self> {
        geometry.validate()?;
        // Fail early on per-position types
        BinnedStat::new(stat)?;

        let windows = geometry.covering(&region);
        Ok(Self {
            reads,
            filter,
            stat,
            contig,
            contiglen,
            geometry,
            nextpad: windows.start,
            windows,
            pad,
            truncate,
            current: None,
            ready: VecDeque::new(),
            laststart: i64::MIN,
            exhausted: false,
            phantom: Default::default(),
        })
    }

    fn window(&self, index: u64, stat: &BinnedStat) -> BinnedWindow {
        let range = self.geometry.bounds(index, self.contiglen);
        let pos = range.start.saturating_add(self.geometry.offset);
        let mut values = Vec::new();
        stat.values(&mut values);
        BinnedWindow { contig: self.contig.clone(), range, pos, values }
    }

    fn pad_until(&mut self, index: u64) {
        if !self.pad {
            return;
        }
        let to = index.min(self.windows.end);
        if self.nextpad < to {
            self.ready.push_back(Pending::Padding(self.nextpad..to));
            self.nextpad = to;
        }
    }

    fn flush(&mut self) {
        if let Some((index, stat)) = self.current.take() {
            self.pad_until(index);
            let window = self.window(index, &stat);
            self.ready.push_back(Pending::Window(window));
            if self.windows.contains(&index) {
                self.nextpad = self.nextpad.max(index + 1);
            }
        }
    }

    fn collide(&mut self, read: &R) -> Result<()> {
        if !self.filter.is_read_ok(read) {
            return Ok(());
        }
        let index = self.geometry.index(read.pos().max(0) as Position);
        if self.truncate && !self.windows.contains(&index) {
            return Ok(());
        }

        if !matches!(self.current, Some((x, _)) if x == index) {
            self.flush();
            self.current = Some((index, BinnedStat::new(self.stat)?));
        }
        if let Some((_, stat)) = self.current.as_mut() {
            stat.process(read, &ReadInfo::new(read));
        }
        Ok(())
    }
}

impl<R, Reads, Filter> Iterator for WindowBinner<R, Reads, Filter>
where
    R: AlignedRead,
    Reads: Iterator<Item = Result<R>>,
    Filter: ReadsFilter<R>,
{
    type Item = Result<BinnedWindow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.ready.pop_front() {
                Some(Pending::Window(window)) => return Some(Ok(window)),
                Some(Pending::Padding(range)) => {
                    if range.start + 1 < range.end {
                        self.ready.push_front(Pending::Padding(range.start + 1..range.end));
                    }
                    return Some(BinnedStat::new(self.stat).map(|x| self.window(range.start, &x)));
                }
                None => {}
            }

            if self.exhausted {
                return None;
            }

            match self.reads.next() {
                None => {
                    self.exhausted = true;
                    self.flush();
                    self.pad_until(self.windows.end);
                }
                Some(Err(e)) => {
                    self.exhausted = true;
                    self.current = None;
                    return Some(Err(e));
                }
                Some(Ok(read)) => {
                    if read.pos() < self.laststart {
                        self.exhausted = true;
                        self.current = None;
                        return Some(Err(Error::SourceRead {
                            contig: self.contig.to_string(),
                            pos: read.pos().max(0) as Position,
                            reason: "alignments are not sorted by position".into(),
                        }));
                    }
                    self.laststart = read.pos();
                    if let Err(e) = self.collide(&read) {
                        self.exhausted = true;
                        return Some(Err(e));
                    }
                }
            }
        }
    }
}
