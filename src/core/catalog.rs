use std::cmp::Reverse;

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::contig::ContigRecord;
use crate::parsing::alignment::{AlignmentSource, ParseError};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read alignments: {0}")]
    Parse(#[from] ParseError),

    #[error("Alignment source declares no reference sequences")]
    EmptyCatalog,

    #[error("No alignments found across {contigs} contigs")]
    NoAlignments { contigs: usize },

    #[error("Alignment {alignment} references a contig that is not in the catalog: {message}")]
    UnknownReference { alignment: u64, message: String },

    #[error(
        "Alignment {alignment} references contig index {index}, but the catalog has only {contigs} contigs"
    )]
    ReferenceOutOfBounds {
        alignment: u64,
        index: usize,
        contigs: usize,
    },
}

/// Per-contig read counts for one run, plus the read statistics they share
#[derive(Debug, Clone)]
pub struct ContigCatalog {
    contigs: Vec<ContigRecord>,
    total_reads: u64,
    avg_read_len: u64,
}

impl ContigCatalog {
    /// Count alignments per contig from a single pass over `source`.
    ///
    /// Alignments without a reference (unplaced reads) are skipped.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyCatalog` if the source has no reference
    /// sequences, `CatalogError::UnknownReference` if an alignment names a
    /// contig the header does not declare, `CatalogError::ReferenceOutOfBounds`
    /// if an alignment points past the end of the catalog, `CatalogError::NoAlignments` if no
    /// alignment was counted, or `CatalogError::Parse` if reading fails.
    pub fn ingest<S: AlignmentSource + ?Sized>(source: &mut S) -> Result<Self, CatalogError> {
        let mut contigs: Vec<ContigRecord> = source
            .reference_sequences()
            .iter()
            .map(|r| ContigRecord::new(r.name.clone(), r.length))
            .collect();

        if contigs.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let mut total_reads: u64 = 0;
        let mut sum_read_length: u64 = 0;
        let mut unplaced: u64 = 0;
        let mut seen: u64 = 0;

        loop {
            let alignment = match source.next_alignment() {
                Ok(Some(alignment)) => alignment,
                Ok(None) => break,
                Err(ParseError::UnknownReference { record, message }) => {
                    return Err(CatalogError::UnknownReference {
                        alignment: record,
                        message,
                    })
                }
                Err(e) => return Err(e.into()),
            };
            seen += 1;
            let Some(index) = alignment.reference_index else {
                unplaced += 1;
                continue;
            };

            let contigs_len = contigs.len();
            let contig = contigs
                .get_mut(index)
                .ok_or(CatalogError::ReferenceOutOfBounds {
                    alignment: seen,
                    index,
                    contigs: contigs_len,
                })?;

            contig.read_count += 1;
            total_reads += 1;
            sum_read_length += alignment.read_length as u64;
        }

        debug!(
            alignments = seen,
            counted = total_reads,
            unplaced,
            "Finished counting alignments"
        );

        Self::from_counts(contigs, total_reads, sum_read_length)
    }

    /// Build a catalog from records whose read counts are already known.
    ///
    /// `sum_read_length` is the total length of all counted reads.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyCatalog` or `CatalogError::NoAlignments`.
    pub fn from_counts(
        mut contigs: Vec<ContigRecord>,
        total_reads: u64,
        sum_read_length: u64,
    ) -> Result<Self, CatalogError> {
        if contigs.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }
        if total_reads == 0 {
            return Err(CatalogError::NoAlignments {
                contigs: contigs.len(),
            });
        }

        let avg_read_len = sum_read_length / total_reads;
        for contig in &mut contigs {
            contig.set_effective_length(avg_read_len);
        }

        let non_positive = contigs.iter().filter(|c| c.effective_length <= 0).count();
        if non_positive > 0 {
            warn!(
                contigs = non_positive,
                avg_read_len, "Contigs shorter than the average read have non-positive effective length"
            );
        }

        debug!(
            contigs = contigs.len(),
            total_reads, avg_read_len, "Built contig catalog"
        );

        Ok(Self {
            contigs,
            total_reads,
            avg_read_len,
        })
    }

    #[must_use]
    pub fn contigs(&self) -> &[ContigRecord] {
        &self.contigs
    }

    pub(crate) fn contigs_mut(&mut self) -> &mut [ContigRecord] {
        &mut self.contigs
    }

    #[must_use]
    pub fn total_reads(&self) -> u64 {
        self.total_reads
    }

    /// Average read length, rounded down
    #[must_use]
    pub fn avg_read_len(&self) -> u64 {
        self.avg_read_len
    }

    /// Catalog indices ordered by length descending, then by catalog index
    #[must_use]
    pub fn by_length(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.contigs.len()).collect();
        order.sort_unstable_by_key(|&i| (Reverse(self.contigs[i].length), i));
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::alignment::{AlignedRead, ReferenceSequence};

    struct VecSource {
        references: Vec<ReferenceSequence>,
        alignments: std::vec::IntoIter<AlignedRead>,
    }

    impl VecSource {
        fn new(references: &[(&str, u64)], alignments: Vec<(Option<usize>, usize)>) -> Self {
            Self {
                references: references
                    .iter()
                    .map(|(name, length)| ReferenceSequence::new(*name, *length))
                    .collect(),
                alignments: alignments
                    .into_iter()
                    .map(|(reference_index, read_length)| AlignedRead {
                        reference_index,
                        read_length,
                    })
                    .collect::<Vec<_>>()
                    .into_iter(),
            }
        }
    }

    impl AlignmentSource for VecSource {
        fn reference_sequences(&self) -> &[ReferenceSequence] {
            &self.references
        }

        fn next_alignment(&mut self) -> Result<Option<AlignedRead>, ParseError> {
            Ok(self.alignments.next())
        }
    }

    #[test]
    fn test_ingest_counts_reads() {
        let mut source = VecSource::new(
            &[("ctg1", 1000), ("ctg2", 500)],
            vec![(Some(0), 100), (Some(1), 100), (Some(0), 101), (None, 50)],
        );

        let catalog = ContigCatalog::ingest(&mut source).unwrap();
        assert_eq!(catalog.contigs().len(), 2);
        assert_eq!(catalog.total_reads(), 3);
        // (100 + 100 + 101) / 3, rounded down
        assert_eq!(catalog.avg_read_len(), 100);

        let contigs = catalog.contigs();
        assert_eq!(contigs[0].name, "ctg1");
        assert_eq!(contigs[0].read_count, 2);
        assert_eq!(contigs[0].effective_length, 901);
        assert_eq!(contigs[1].read_count, 1);
        assert_eq!(contigs[1].effective_length, 401);
        assert!(contigs.iter().all(|c| c.a_stat.is_none()));
    }

    #[test]
    fn test_ingest_empty_catalog() {
        let mut source = VecSource::new(&[], vec![(None, 100)]);
        let result = ContigCatalog::ingest(&mut source);
        assert!(matches!(result, Err(CatalogError::EmptyCatalog)));
    }

    #[test]
    fn test_ingest_no_alignments() {
        let mut source = VecSource::new(&[("ctg1", 1000)], vec![]);
        let result = ContigCatalog::ingest(&mut source);
        assert!(matches!(
            result,
            Err(CatalogError::NoAlignments { contigs: 1 })
        ));

        // Only unplaced reads also counts as no alignments
        let mut source = VecSource::new(&[("ctg1", 1000)], vec![(None, 100)]);
        assert!(matches!(
            ContigCatalog::ingest(&mut source),
            Err(CatalogError::NoAlignments { .. })
        ));
    }

    #[test]
    fn test_ingest_reference_out_of_bounds() {
        let mut source = VecSource::new(
            &[("ctg1", 1000), ("ctg2", 500)],
            vec![(Some(0), 100), (Some(2), 100)],
        );

        match ContigCatalog::ingest(&mut source) {
            Err(CatalogError::ReferenceOutOfBounds {
                alignment,
                index,
                contigs,
            }) => {
                assert_eq!(alignment, 2);
                assert_eq!(index, 2);
                assert_eq!(contigs, 2);
            }
            other => panic!("expected ReferenceOutOfBounds, got {other:?}"),
        }
    }

    struct UnknownReferenceSource {
        references: Vec<ReferenceSequence>,
        remaining: u64,
    }

    impl AlignmentSource for UnknownReferenceSource {
        fn reference_sequences(&self) -> &[ReferenceSequence] {
            &self.references
        }

        fn next_alignment(&mut self) -> Result<Option<AlignedRead>, ParseError> {
            if self.remaining == 0 {
                return Err(ParseError::UnknownReference {
                    record: 3,
                    message: "invalid reference sequence ID".to_string(),
                });
            }
            self.remaining -= 1;
            Ok(Some(AlignedRead {
                reference_index: Some(0),
                read_length: 100,
            }))
        }
    }

    #[test]
    fn test_ingest_unknown_reference() {
        let mut source = UnknownReferenceSource {
            references: vec![ReferenceSequence::new("ctg1", 1000)],
            remaining: 2,
        };

        match ContigCatalog::ingest(&mut source) {
            Err(CatalogError::UnknownReference { alignment, .. }) => assert_eq!(alignment, 3),
            other => panic!("expected UnknownReference, got {other:?}"),
        }
    }

    #[test]
    fn test_by_length_breaks_ties_by_index() {
        let contigs = vec![
            ContigRecord::new("a", 500).with_read_count(1),
            ContigRecord::new("b", 1000),
            ContigRecord::new("c", 500),
            ContigRecord::new("d", 1000),
            ContigRecord::new("e", 20),
        ];
        let catalog = ContigCatalog::from_counts(contigs, 1, 10).unwrap();
        assert_eq!(catalog.by_length(), vec![1, 3, 0, 2, 4]);
    }
}
