use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use encoding_rs::{CoderResult, Decoder, WINDOWS_1252};
use std::io::{self, Read};

/// Streams latin1 bytes out as UTF-8 text.
///
/// INMET station files are declared latin1; decoding goes through
/// windows-1252, the WHATWG mapping for that label, so bytes 0x80-0x9F
/// become their printable counterparts instead of C1 controls.
pub struct Latin1Reader<R> {
    inner: R,
    decoder: Decoder,
    input: Vec<u8>,
    input_pos: usize,
    input_len: usize,
    output: Vec<u8>,
    output_pos: usize,
    output_len: usize,
    last: bool,
    finished: bool,
}

impl<R: Read> Latin1Reader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, inner)
    }

    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        let decoder = WINDOWS_1252.new_decoder_without_bom_handling();
        let output_capacity = decoder
            .max_utf8_buffer_length(capacity)
            .unwrap_or(capacity * 3 + 16);

        Self {
            inner,
            decoder,
            input: vec![0; capacity],
            input_pos: 0,
            input_len: 0,
            output: vec![0; output_capacity],
            output_pos: 0,
            output_len: 0,
            last: false,
            finished: false,
        }
    }

    fn refill(&mut self) -> io::Result<()> {
        if self.input_pos == self.input_len && !self.last {
            self.input_len = self.inner.read(&mut self.input)?;
            self.input_pos = 0;
            self.last = self.input_len == 0;
        }

        let (result, read, written, _) = self.decoder.decode_to_utf8(
            &self.input[self.input_pos..self.input_len],
            &mut self.output,
            self.last,
        );
        self.input_pos += read;
        self.output_pos = 0;
        self.output_len = written;

        if self.last && result == CoderResult::InputEmpty {
            self.finished = true;
        }
        Ok(())
    }
}

impl<R: Read> Read for Latin1Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.output_pos < self.output_len {
                let available = &self.output[self.output_pos..self.output_len];
                let n = available.len().min(buf.len());
                buf[..n].copy_from_slice(&available[..n]);
                self.output_pos += n;
                return Ok(n);
            }

            if self.finished || buf.is_empty() {
                return Ok(0);
            }

            self.refill()?;
        }
    }
}
