use std::fs;
use std::path::{Path, PathBuf};

use bio_types::genome::Interval;
use bio_types::strand::ReqStrand;
use itertools::Itertools;
use rust_htslib::bam::header::HeaderRecord;
use rust_htslib::bam::record::{Cigar::*, CigarString};
use rust_htslib::bam::{self, Record};
use tempfile::TempDir;

use pilestats::core::dna::Nucleotide;
use pilestats::core::io::fasta::{IndexedFasta, ReferenceSource};
use pilestats::core::io::hts::{AlignmentSource, HTSSource};
use pilestats::core::read::{flags, AlignedRead, SequencedRead};
use pilestats::core::stats::{StatRecord, StatType};
use pilestats::core::{Config, Error, Pipeline, Result};

// Spans the 64 KiB chunk of the indexed reference
const CHR1: u64 = 70_000;
const CHR2: u64 = 100;
const LINE: usize = 60;

fn chr1(range: std::ops::Range<u64>) -> Vec<u8> {
    range.map(|x| b"ACGT"[(x % 4) as usize]).collect()
}

fn nucleotides(sequence: &[u8]) -> Vec<Nucleotide> {
    sequence.iter().map(|x| Nucleotide::from(*x)).collect()
}

fn fasta(dir: &Path) -> PathBuf {
    let contigs = [("chr1", chr1(0..CHR1)), ("chr2", vec![b'T'; CHR2 as usize])];
    let (mut fasta, mut fai) = (String::new(), String::new());
    for (name, sequence) in contigs.iter() {
        fasta.push_str(&format!(">{}\n", name));
        fai.push_str(&format!("{}\t{}\t{}\t{}\t{}\n", name, sequence.len(), fasta.len(), LINE, LINE + 1));
        for line in sequence.chunks(LINE) {
            fasta.push_str(std::str::from_utf8(line).unwrap());
            fasta.push('\n');
        }
    }
    let path = dir.join("reference.fa");
    fs::write(&path, fasta).unwrap();
    fs::write(dir.join("reference.fa.fai"), fai).unwrap();
    path
}

struct Alignment {
    tid: i32,
    pos: i64,
    cigar: Vec<bam::record::Cigar>,
    seq: Vec<u8>,
    flags: u16,
    mapq: u8,
    tlen: i64,
}

impl Alignment {
    fn new(tid: i32, pos: i64, cigar: Vec<bam::record::Cigar>, seq: Vec<u8>) -> Self {
        Self { tid, pos, cigar, seq, flags: 0, mapq: 60, tlen: 0 }
    }

    fn record(&self, name: usize) -> Record {
        let mut record = Record::new();
        let qual = vec![30; self.seq.len()];
        record.set(format!("read{}", name).as_bytes(), Some(&CigarString(self.cigar.clone())), &self.seq, &qual);
        record.set_tid(self.tid);
        record.set_pos(self.pos);
        record.set_mapq(self.mapq);
        record.set_flags(self.flags);
        if self.flags & flags::PAIRED != 0 {
            record.set_mtid(self.tid);
            record.set_mpos(self.pos + self.tlen.max(0));
            record.set_insert_size(self.tlen);
        } else {
            record.set_mtid(-1);
            record.set_mpos(-1);
        }
        record
    }
}

fn alignments() -> Vec<Alignment> {
    let pp = flags::PAIRED | flags::PROPER_PAIR;
    let mut inserted = chr1(105..110);
    inserted.extend(b"AA");
    inserted.extend(chr1(110..115));
    vec![
        Alignment {
            flags: pp | flags::MATE_REVERSE,
            tlen: 210,
            ..Alignment::new(0, 100, vec![Match(10)], chr1(100..110))
        },
        Alignment {
            flags: pp | flags::REVERSE,
            mapq: 20,
            tlen: -210,
            ..Alignment::new(0, 105, vec![Match(5), Ins(2), Match(5)], inserted)
        },
        Alignment::new(0, 65_530, vec![Match(20)], chr1(65_530..65_550)),
        Alignment::new(1, 10, vec![Match(5)], b"TTTTT".to_vec()),
        // Secondary alignment without a stored sequence (SEQ '*')
        Alignment { flags: flags::SECONDARY, ..Alignment::new(1, 20, vec![Match(5)], vec![]) },
    ]
}

fn bam(dir: &Path) -> PathBuf {
    let mut header = bam::Header::new();
    header.push_record(HeaderRecord::new(b"HD").push_tag(b"VN", &"1.6").push_tag(b"SO", &"coordinate"));
    for (name, length) in [("chr1", CHR1), ("chr2", CHR2)] {
        header.push_record(HeaderRecord::new(b"SQ").push_tag(b"SN", &name).push_tag(b"LN", &length));
    }

    let path = dir.join("alignments.bam");
    {
        let mut writer = bam::Writer::from_path(&path, &header, bam::Format::Bam).unwrap();
        for (name, alignment) in alignments().iter().enumerate() {
            writer.write(&alignment.record(name)).unwrap();
        }
    }
    bam::index::build(&path, None, bam::index::Type::Bai, 1).unwrap();
    path
}

fn rows(config: Config, dir: &Path) -> (Vec<String>, Vec<StatRecord>) {
    let source = HTSSource::new(bam(dir)).unwrap();
    let reference = IndexedFasta::new(fasta(dir)).unwrap();
    let pipeline = Pipeline::new(config, source, Some(reference)).unwrap();
    let schema = pipeline.schema();
    let records = pipeline.rows().unwrap().collect::<Result<Vec<_>>>().unwrap();
    (schema, records)
}

fn count(schema: &[String], record: &StatRecord, field: &str) -> u64 {
    record.get(schema, field).and_then(|x| x.as_count()).unwrap()
}

#[test]
fn indexed_fasta_fetch() {
    let dir = TempDir::new().unwrap();
    let mut reference = IndexedFasta::new(fasta(dir.path())).unwrap();

    assert_eq!(reference.fetch("chr1", 10..14).unwrap(), nucleotides(b"GTAC"));
    // Served from the chunk loaded above
    assert_eq!(reference.fetch("chr1", 1_000..1_003).unwrap(), nucleotides(&chr1(1_000..1_003)));
    assert_eq!(reference.fetch_base("chr1", 60).unwrap(), Nucleotide::A);
    // The chunk loaded above is [10, 65546), so this one crosses its end
    assert_eq!(reference.fetch("chr1", 65_540..65_560).unwrap(), nucleotides(&chr1(65_540..65_560)));
    assert_eq!(reference.fetch("chr1", 2..4).unwrap(), nucleotides(b"GT"));

    assert_eq!(reference.fetch("chr2", 0..3).unwrap(), nucleotides(b"TTT"));
    assert_eq!(reference.fetch("chr1", 4..5).unwrap(), nucleotides(b"A"));
}

#[test]
fn indexed_fasta_clipping() {
    let dir = TempDir::new().unwrap();
    let mut reference = IndexedFasta::new(fasta(dir.path())).unwrap();

    assert_eq!(reference.fetch("chr1", CHR1 - 2..CHR1 + 10).unwrap(), nucleotides(&chr1(CHR1 - 2..CHR1)));
    assert!(reference.fetch("chr1", CHR1 + 100..CHR1 + 200).unwrap().is_empty());
    assert_eq!(reference.fetch_base("chr2", CHR2).unwrap(), Nucleotide::Unknown);
    assert_eq!(reference.fetch_window("chr2", 95, 10, 20).unwrap().len(), 15);
    assert_eq!(reference.fetch_window("chr1", 5, 10, 20).unwrap(), nucleotides(&chr1(0..15)));
}

#[test]
fn indexed_fasta_unknown_contig() {
    let dir = TempDir::new().unwrap();
    let mut reference = IndexedFasta::new(fasta(dir.path())).unwrap();

    assert!(matches!(reference.fetch("chrUn", 0..1), Err(Error::Reference(_))));
    assert!(matches!(reference.fetch_base("1", 10), Err(Error::Reference(_))));
    // The reader stays usable
    assert_eq!(reference.fetch("chr2", 0..1).unwrap(), nucleotides(b"T"));
}

#[test]
fn hts_source() {
    let dir = TempDir::new().unwrap();
    let mut source = HTSSource::new(bam(dir.path())).unwrap();
    assert_eq!(source.contigs(), vec![Interval::new("chr1".into(), 0..CHR1), Interval::new("chr2".into(), 0..CHR2)]);

    let reads = source.fetch("chr1", 0..200).unwrap().collect::<Result<Vec<_>>>().unwrap();
    assert_eq!(reads.iter().map(|x| AlignedRead::pos(x)).collect_vec(), vec![100, 105]);

    let (first, second) = (&reads[0], &reads[1]);
    assert_eq!(AlignedRead::contig(first), "chr1");
    assert_eq!(SequencedRead::strand(first), &ReqStrand::Forward);
    assert_eq!(SequencedRead::strand(second), &ReqStrand::Reverse);
    assert_eq!((AlignedRead::mapq(second), AlignedRead::tlen(second)), (20, -210));
    assert_eq!((AlignedRead::tid(first), AlignedRead::mtid(first)), (0, 0));
    assert_eq!(AlignedRead::cigar(second).end_pos(), 115);
    assert_eq!(SequencedRead::seq(first), chr1(100..110));
    assert_eq!(SequencedRead::base_qual(second, 11), 30);
    assert_eq!(SequencedRead::len(second), 12);

    let reads = source.fetch("chr1", 65_000..66_000).unwrap().map(|x| x.unwrap().pos()).collect_vec();
    assert_eq!(reads, vec![65_530]);

    let missing = source.fetch("chr2", 0..100).unwrap().filter(|x| x.as_ref().unwrap().seq_len() == 0).count();
    assert_eq!(missing, 1);

    assert!(matches!(source.fetch("chr3", 0..10), Err(Error::SourceRead { .. })));
}

#[test]
fn variation_from_files() {
    let dir = TempDir::new().unwrap();
    let config = Config::new(StatType::Variation).with_region("chr1", Some(100), Some(115)).with_truncate(true);
    let (schema, records) = rows(config, dir.path());

    assert_eq!(records.iter().map(|x| count(&schema, x, "pos")).collect_vec(), (100..115).collect_vec());
    for record in &records {
        let pos = count(&schema, record, "pos");
        let depth = if (105..110).contains(&pos) { 2 } else { 1 };
        assert_eq!(count(&schema, record, "reads_all"), depth);
        assert_eq!(count(&schema, record, "matches"), depth);
        assert_eq!(count(&schema, record, "mismatches"), 0);
        assert_eq!(count(&schema, record, "insertions"), (pos == 109) as u64);
    }
}

#[test]
fn missing_sequence_from_files() {
    let dir = TempDir::new().unwrap();

    let config = Config::new(StatType::Variation).with_region("chr2", None, None);
    let (schema, records) = rows(config.clone(), dir.path());
    assert_eq!(records.iter().map(|x| count(&schema, x, "pos")).collect_vec(), (10..15).collect_vec());

    // Secondary alignments pass without the default exclusion
    let (schema, records) = rows(config.with_flags(0, 0), dir.path());
    assert_eq!(records.len(), 10);
    for record in records.iter().filter(|x| count(&schema, x, "pos") >= 20) {
        assert_eq!(count(&schema, record, "reads_all"), 1);
        assert_eq!(count(&schema, record, "matches"), 0);
        assert_eq!(count(&schema, record, "N"), 1);
    }
}
