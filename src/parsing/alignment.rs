use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use noodles::sam::alignment::RecordBuf;
use noodles::{bam, sam};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Record {record} names a reference sequence missing from the header: {message}")]
    UnknownReference { record: u64, message: String },
}

/// Alignment file formats that can be streamed
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum AlignmentFormat {
    Sam,
    Bam,
}

impl AlignmentFormat {
    /// Detect the format from a file extension.
    ///
    /// Unknown extensions (and `-` for stdin) are treated as SAM.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnsupportedFormat` for CRAM, which needs a
    /// reference repository to decode read sequences.
    pub fn detect(path: &Path) -> Result<Self, ParseError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("bam") => Ok(Self::Bam),
            Some("cram") => Err(ParseError::UnsupportedFormat("cram".to_string())),
            _ => Ok(Self::Sam),
        }
    }
}

/// A reference sequence declared by the alignment source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSequence {
    pub name: String,
    pub length: u64,
}

impl ReferenceSequence {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }
}

/// The parts of an alignment record used for counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedRead {
    /// Index into the source's reference sequences; `None` for unplaced reads
    pub reference_index: Option<usize>,
    pub read_length: usize,
}

/// Supplies an ordered contig catalog and a single-pass alignment stream.
pub trait AlignmentSource {
    /// Reference sequences, indexed `0..M`
    fn reference_sequences(&self) -> &[ReferenceSequence];

    /// Pull the next alignment, or `None` once the stream is exhausted.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the underlying record cannot be read.
    fn next_alignment(&mut self) -> Result<Option<AlignedRead>, ParseError>;
}

trait RecordReader {
    fn read_record(&mut self, header: &sam::Header, record: &mut RecordBuf) -> io::Result<usize>;
}

impl<R: BufRead> RecordReader for sam::io::Reader<R> {
    fn read_record(&mut self, header: &sam::Header, record: &mut RecordBuf) -> io::Result<usize> {
        self.read_record_buf(header, record)
    }
}

impl<R: Read> RecordReader for bam::io::Reader<R> {
    fn read_record(&mut self, header: &sam::Header, record: &mut RecordBuf) -> io::Result<usize> {
        self.read_record_buf(header, record)
    }
}

/// True if noodles rejected a record for naming a reference not in the header
fn is_unknown_reference(error: &io::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(e) = source {
        if e.to_string().contains("reference sequence") {
            return true;
        }
        source = e.source();
    }
    false
}

/// A SAM or BAM file streamed with noodles
pub struct AlignmentFile {
    header: sam::Header,
    reference_sequences: Vec<ReferenceSequence>,
    reader: Box<dyn RecordReader>,
    record: RecordBuf,
    records_read: u64,
}

impl AlignmentFile {
    /// Open an alignment file, reading from stdin when `path` is `-`.
    ///
    /// Stdin is read as SAM unless `format` says otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be opened,
    /// `ParseError::UnsupportedFormat` if the format cannot be streamed, or
    /// `ParseError::Noodles` if the header is malformed.
    pub fn open(path: &Path, format: Option<AlignmentFormat>) -> Result<Self, ParseError> {
        let stdin = path.to_string_lossy() == "-";
        let format = match format {
            Some(format) => format,
            None if stdin => AlignmentFormat::Sam,
            None => AlignmentFormat::detect(path)?,
        };

        debug!(path = %path.display(), ?format, "Opening alignment file");

        match format {
            AlignmentFormat::Sam => {
                let inner: Box<dyn BufRead> = if stdin {
                    Box::new(io::stdin().lock())
                } else {
                    Box::new(File::open(path).map(BufReader::new)?)
                };
                Self::from_sam_reader(sam::io::Reader::new(inner))
            }
            AlignmentFormat::Bam => {
                let inner: Box<dyn Read> = if stdin {
                    Box::new(io::stdin().lock())
                } else {
                    Box::new(File::open(path)?)
                };
                let mut reader = bam::io::Reader::new(inner);
                let header = reader
                    .read_header()
                    .map_err(|e| ParseError::Noodles(e.to_string()))?;
                Ok(Self::new(header, Box::new(reader)))
            }
        }
    }

    fn from_sam_reader(mut reader: sam::io::Reader<Box<dyn BufRead>>) -> Result<Self, ParseError> {
        let header = reader
            .read_header()
            .map_err(|e| ParseError::Noodles(e.to_string()))?;
        Ok(Self::new(header, Box::new(reader)))
    }

    fn new(header: sam::Header, reader: Box<dyn RecordReader>) -> Self {
        let reference_sequences = header
            .reference_sequences()
            .iter()
            .map(|(name, map)| ReferenceSequence::new(name.to_string(), map.length().get() as u64))
            .collect();

        Self {
            header,
            reference_sequences,
            reader,
            record: RecordBuf::default(),
            records_read: 0,
        }
    }
}

impl AlignmentSource for AlignmentFile {
    fn reference_sequences(&self) -> &[ReferenceSequence] {
        &self.reference_sequences
    }

    fn next_alignment(&mut self) -> Result<Option<AlignedRead>, ParseError> {
        let record = self.records_read + 1;
        let n = self
            .reader
            .read_record(&self.header, &mut self.record)
            .map_err(|e| {
                if is_unknown_reference(&e) {
                    ParseError::UnknownReference {
                        record,
                        message: e.to_string(),
                    }
                } else {
                    ParseError::Noodles(e.to_string())
                }
            })?;

        if n == 0 {
            return Ok(None);
        }
        self.records_read = record;

        Ok(Some(AlignedRead {
            reference_index: self.record.reference_sequence_id(),
            read_length: self.record.sequence().len(),
        }))
    }
}
