/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The `Terse` frame store
//!
//! A [`Terse`] owns the packed payload of one or more same-shape
//! frames. The first pushed frame fixes the number of values, the
//! signedness and (once set) the dimensions; later frames must match.
//! Frames are append-only and never mutated in place.
//!
//! Frame starts inside the payload are indexed lazily: pushing or
//! reading records only a sentinel, and asking for frame `k` walks the
//! block headers of the nearest earlier known frame forward, memoising
//! every offset it passes. Materialising an offset never changes what
//! any call returns.

use std::io::{Read, Write};

use log::trace;

use crate::decoder;
use crate::encoder;
use crate::errors::TerseErrors;
use crate::header::TerseHeader;
use crate::sample::{IntSample, Sample};

/// Values per block when none is chosen explicitly.
pub const DEFAULT_BLOCK: usize = 12;

/// A stack of losslessly compressed integer frames.
///
/// # Example
///
/// ```
/// use trpx::Terse;
///
/// let numbers: Vec<i32> = (-500..500).collect();
/// let mut terse = Terse::from_values(&numbers)?;
///
/// let restored: Vec<i32> = terse.unpack(0)?;
/// assert_eq!(numbers, restored);
/// # Ok::<(), trpx::TerseErrors>(())
/// ```
pub struct Terse {
    signed:      bool,
    block:       usize,
    // values per frame
    size:        usize,
    // widest value field used by any block of any frame
    prolix_bits: u32,
    dim:         Vec<usize>,
    data:        Vec<u8>,
    // per frame, 0 when unresolved, otherwise 1 + byte offset
    frames:      Vec<usize>
}

impl Default for Terse {
    fn default() -> Self {
        Terse::new()
    }
}

impl Terse {
    /// Create an empty store with the default block size.
    ///
    /// The first frame pushed fixes the frame length and signedness.
    pub fn new() -> Terse {
        Terse::with_block_size(DEFAULT_BLOCK)
    }

    /// Create an empty store that encodes `block` values per block.
    ///
    /// Smaller blocks adapt faster to local magnitude changes at the
    /// price of more header bits.
    ///
    /// # Panics
    /// If `block` is zero.
    pub fn with_block_size(block: usize) -> Terse {
        assert!(block > 0, "block size must hold at least one value");
        Terse {
            signed:      false,
            block,
            size:        0,
            prolix_bits: 0,
            dim:         Vec::new(),
            data:        Vec::new(),
            frames:      Vec::new()
        }
    }

    /// Compress `values` into a fresh single-frame store.
    pub fn from_values<T: IntSample>(values: &[T]) -> Result<Terse, TerseErrors> {
        let mut terse = Terse::new();
        terse.push_frame(values)?;
        Ok(terse)
    }

    /// Append one frame.
    ///
    /// The first push fixes the frame length and signedness from
    /// `values`; every later push must match them or this returns
    /// [`TerseErrors::ShapeMismatch`] /
    /// [`TerseErrors::SignednessMismatch`].
    pub fn push_frame<T: IntSample>(&mut self, values: &[T]) -> Result<(), TerseErrors> {
        if self.frames.is_empty() {
            if !self.dim.is_empty() {
                let product: usize = self.dim.iter().product();
                if product != values.len() {
                    return Err(TerseErrors::DimensionsMismatch(values.len(), product));
                }
            }
            self.signed = T::SIGNED;
            self.size = values.len();
        } else {
            if values.len() != self.size {
                return Err(TerseErrors::ShapeMismatch(self.size, values.len()));
            }
            if T::SIGNED != self.signed {
                return Err(TerseErrors::SignednessMismatch);
            }
        }

        // frame 0 starts at byte 0; later offsets resolve on demand
        self.frames
            .push(if self.frames.is_empty() { 1 } else { 0 });

        let widest = encoder::compress_frame(values, self.block, &mut self.data)?;
        self.prolix_bits = self.prolix_bits.max(widest);

        trace!(
            "Pushed frame {}: {} values, block width up to {}",
            self.frames.len() - 1,
            values.len(),
            widest
        );
        Ok(())
    }

    /// Decompress frame `frame` into `out`, whose length must equal
    /// [`number_of_values`](Self::number_of_values).
    ///
    /// Signed data cannot be unpacked into unsigned outputs. Outputs
    /// narrower than [`prolix_bits`](Self::prolix_bits) saturate at
    /// their range; everything else is restored bit-exactly.
    pub fn unpack_into<T: Sample>(
        &mut self, frame: usize, out: &mut [T]
    ) -> Result<(), TerseErrors> {
        if frame >= self.frames.len() {
            return Err(TerseErrors::FrameIndexOutOfRange(frame, self.frames.len()));
        }
        if out.len() != self.size {
            return Err(TerseErrors::ShapeMismatch(self.size, out.len()));
        }
        if self.signed && !T::ACCEPTS_SIGNED {
            return Err(TerseErrors::SignednessMismatch);
        }

        let offset = self.resolve_offset(frame)?;
        let used = decoder::decompress_frame(
            &self.data[offset..],
            self.block,
            self.signed,
            out
        )?;

        // decoding walked to the next frame's start anyway, keep it
        if let Some(next) = self.frames.get_mut(frame + 1) {
            if *next == 0 {
                *next = 1 + offset + used;
            }
        }
        Ok(())
    }

    /// Decompress frame `frame` into a freshly allocated vector.
    pub fn unpack<T: Sample>(&mut self, frame: usize) -> Result<Vec<T>, TerseErrors> {
        let mut out = vec![T::default(); self.size];
        self.unpack_into(frame, &mut out)?;
        Ok(out)
    }

    /// Byte offset of `frame` inside the payload, scanning forward
    /// from the nearest earlier resolved frame if needed.
    fn resolve_offset(&mut self, frame: usize) -> Result<usize, TerseErrors> {
        let mut known = frame;
        while self.frames[known] == 0 {
            known -= 1;
        }
        while known < frame {
            let offset = self.frames[known] - 1;
            let len = decoder::frame_len(&self.data[offset..], self.size, self.block)?;
            if offset + len > self.data.len() {
                return Err(TerseErrors::BufferShort(offset + len, self.data.len()));
            }
            self.frames[known + 1] = 1 + offset + len;
            known += 1;
        }
        Ok(self.frames[frame] - 1)
    }

    /// Set the frame dimensions; their product must equal the frame
    /// length. All frames share dimensions, so they can be set once.
    pub fn set_dimensions(&mut self, dim: &[usize]) -> Result<(), TerseErrors> {
        if !self.dim.is_empty() {
            return Err(TerseErrors::DimensionsAlreadySet);
        }
        let product: usize = dim.iter().product();
        if !self.frames.is_empty() && product != self.size {
            return Err(TerseErrors::DimensionsMismatch(self.size, product));
        }
        self.dim = dim.to_vec();
        Ok(())
    }

    /// Dimensions of every frame, empty when none were set.
    pub fn dimensions(&self) -> &[usize] {
        &self.dim
    }

    /// Number of values in each frame.
    pub const fn number_of_values(&self) -> usize {
        self.size
    }

    /// Number of frames stored.
    pub fn number_of_frames(&self) -> usize {
        self.frames.len()
    }

    /// True when the stored data is signed. Signed data cannot be
    /// unpacked into unsigned types.
    pub const fn is_signed(&self) -> bool {
        self.signed
    }

    /// Values per encoded block.
    pub const fn block_size(&self) -> usize {
        self.block
    }

    /// Bits per value needed to unpack without saturating, the width
    /// of the widest block anywhere in the store.
    pub const fn prolix_bits(&self) -> u32 {
        self.prolix_bits
    }

    /// Compressed payload size in bytes, all frames included.
    pub fn terse_size(&self) -> usize {
        self.data.len()
    }

    /// Write the store to a stream: the header element immediately
    /// followed by the payload bytes. Returns the bytes written.
    ///
    /// The byte stream is identical on hosts of any endianness.
    pub fn write<W: Write>(&self, mut sink: W) -> Result<usize, TerseErrors> {
        let header = TerseHeader {
            prolix_bits:      self.prolix_bits,
            signed:           self.signed,
            block:            self.block,
            memory_size:      self.data.len(),
            number_of_values: self.size,
            dimensions:       self.dim.clone(),
            number_of_frames: self.frames.len()
        }
        .encode();

        sink.write_all(header.as_bytes())?;
        sink.write_all(&self.data)?;
        sink.flush()?;

        trace!(
            "Wrote {} frames, {} payload bytes",
            self.frames.len(),
            self.data.len()
        );
        Ok(header.len() + self.data.len())
    }

    /// Reconstitute a store from a stream written by
    /// [`write`](Self::write).
    ///
    /// Scans to the next `Terse` element, then consumes exactly the
    /// announced payload, leaving the stream on the byte after it so
    /// stacked stores can be read back-to-back.
    pub fn read<R: Read>(mut src: R) -> Result<Terse, TerseErrors> {
        let header = TerseHeader::decode(&mut src)?;

        let mut data = vec![0_u8; header.memory_size];
        let mut filled = 0;
        while filled < data.len() {
            match src.read(&mut data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into())
            }
        }
        if filled != data.len() {
            return Err(TerseErrors::BufferShort(data.len(), filled));
        }

        let mut frames = vec![0_usize; header.number_of_frames];
        if let Some(first) = frames.first_mut() {
            *first = 1;
        }

        trace!(
            "Read Terse object: {} values x {} frames, {} payload bytes, up to {} bits per value",
            header.number_of_values,
            header.number_of_frames,
            header.memory_size,
            header.prolix_bits
        );

        Ok(Terse {
            signed: header.signed,
            block: header.block,
            size: header.number_of_values,
            prolix_bits: header.prolix_bits,
            dim: header.dimensions,
            data,
            frames
        })
    }
}
