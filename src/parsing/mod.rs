//! Alignment input.
//!
//! [`AlignmentSource`](alignment::AlignmentSource) is the seam between the
//! estimator and the alignment store: an ordered list of reference sequences
//! plus a single-pass stream of alignments, each reduced to its reference index
//! and read length. [`AlignmentFile`](alignment::AlignmentFile) implements it
//! for SAM and BAM files using noodles.
//!
//! | Extension | Format |
//! |-----------|--------|
//! | `.bam`    | BAM    |
//! | `.cram`   | rejected |
//! | other, `-` (stdin) | SAM |
//!
//! `--input-format` overrides detection, so `--input-format bam -` reads BAM
//! from stdin.

pub mod alignment;
