use crate::error::Result;
use crate::parsers::HeaderMap;
use crate::readers::Latin1Reader;
use crate::utils::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_CHUNK_SIZE, DEFAULT_PREAMBLE_LINES, FIELD_DELIMITER,
};
use csv::StringRecord;
use std::io::{BufRead, BufReader, Read};
use tracing::debug;

/// Opens INMET station streams: latin1 text, a metadata preamble, then a
/// `;`-delimited header row and observation rows.
#[derive(Debug, Clone)]
pub struct StationReader {
    preamble_lines: usize,
    chunk_size: usize,
}

impl StationReader {
    pub fn new() -> Self {
        Self {
            preamble_lines: DEFAULT_PREAMBLE_LINES,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_preamble_lines(mut self, preamble_lines: usize) -> Self {
        self.preamble_lines = preamble_lines;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Skip the preamble and read the header row; rows are then pulled lazily
    pub fn open<R: Read>(&self, source: R) -> Result<StationStream<R>> {
        let mut text = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, Latin1Reader::new(source));

        let mut line = String::new();
        for skipped in 0..self.preamble_lines {
            line.clear();
            if text.read_line(&mut line)? == 0 {
                debug!("Stream ended inside preamble after {} lines", skipped);
                break;
            }
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(FIELD_DELIMITER)
            .has_headers(true)
            .flexible(true)
            .from_reader(text);

        let headers = HeaderMap::new(reader.headers()?.iter());

        Ok(StationStream {
            headers,
            reader,
            chunk_size: self.chunk_size,
            rows_read: 0,
            exhausted: false,
        })
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy, finite, non-restartable sequence of row chunks from one station
pub struct StationStream<R: Read> {
    headers: HeaderMap,
    reader: csv::Reader<BufReader<Latin1Reader<R>>>,
    chunk_size: usize,
    rows_read: usize,
    exhausted: bool,
}

impl<R: Read> StationStream<R> {
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Next batch of at most `chunk_size` rows, or `None` at end of stream
    pub fn next_chunk(&mut self) -> Result<Option<Vec<StringRecord>>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut chunk = Vec::with_capacity(self.chunk_size);
        let mut record = StringRecord::new();
        while chunk.len() < self.chunk_size {
            if !self.reader.read_record(&mut record)? {
                self.exhausted = true;
                break;
            }
            chunk.push(record.clone());
        }

        self.rows_read += chunk.len();
        if chunk.is_empty() {
            Ok(None)
        } else {
            Ok(Some(chunk))
        }
    }
}

impl<R: Read> Iterator for StationStream<R> {
    type Item = Result<Vec<StringRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => None,
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }
}
