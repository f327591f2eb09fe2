use flate2::{Decompress, FlushDecompress, Status};

use crate::error::{Error, Result};

/// Initial size of the inflate buffer, as a multiple of the compressed size.
/// Around 97% of chunks inflate to no more than 14 times their compressed size,
/// so most chunks never need the buffer to grow.
pub const INFLATE_MULTIPLIER: usize = 14;

/// Inflate a zlib compressed chunk payload.
///
/// The output buffer starts at [`INFLATE_MULTIPLIER`] times the input size and
/// doubles whenever it fills. Inflating stops at the end of the zlib stream, or
/// when the inflater can make no more progress. A stream cut short therefore
/// gives back whatever it decoded before the cut, and the NBT decoder deals
/// with the partial data. Malformed streams are an
/// [`ErrorKind::Decompression`][crate::error::ErrorKind::Decompression] error.
pub fn inflate(compressed: &[u8]) -> Result<Vec<u8>> {
    if compressed.is_empty() {
        return Err(Error::decompression("chunk payload is empty"));
    }

    let mut inflater = Decompress::new(true);
    let mut out = Vec::with_capacity(compressed.len().saturating_mul(INFLATE_MULTIPLIER));

    loop {
        if out.len() == out.capacity() {
            out.reserve(out.capacity());
        }

        let consumed = inflater.total_in() as usize;
        let produced = inflater.total_out();

        let status = inflater
            .decompress_vec(&compressed[consumed..], &mut out, FlushDecompress::None)
            .map_err(Error::decompression)?;

        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError => {
                let stalled = inflater.total_out() == produced
                    && inflater.total_in() as usize == consumed;
                if stalled {
                    break;
                }
            }
        }
    }

    out.shrink_to_fit();
    Ok(out)
}
