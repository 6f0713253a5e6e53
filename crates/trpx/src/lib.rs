/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Lossless Terse/Prolix compression for integral raster data
//!
//! Diffraction frames and similar scientific greyscale images are
//! mostly small counts with the occasional hot pixel. This codec
//! packs such data into blocks that each use only as many bits per
//! value as the block needs, typically shrinking raw detector frames
//! to a fraction of their size without losing a bit.
//!
//! A [`Terse`] store holds any number of same-shape frames and
//! restores any of them on demand, into any integer type wide enough
//! (narrower types saturate) or into `f32`/`f64`. On disk a store is
//! a one-line self-describing XML element followed by the packed
//! bytes; files are byte-identical regardless of the writing host's
//! endianness.
//!
//! # Features
//! - Lossless, with sign-aware per-block bit widths
//! - Multi-frame stacks with lazy frame indexing
//! - Endian-neutral file format
//! - Fuzz tested
//!
//! # Example
//!
//! Compress a frame, write it out, read it back:
//!
//! ```
//! use trpx::Terse;
//!
//! let frame: Vec<u16> = (0..256 * 256).map(|i| (i % 40) as u16).collect();
//!
//! let mut terse = Terse::from_values(&frame)?;
//! terse.set_dimensions(&[256, 256])?;
//!
//! let mut file = Vec::new();
//! terse.write(&mut file)?;
//!
//! let mut restored = Terse::read(std::io::Cursor::new(&file))?;
//! let values: Vec<u16> = restored.unpack(0)?;
//! assert_eq!(frame, values);
//! # Ok::<(), trpx::TerseErrors>(())
//! ```

pub use errors::TerseErrors;
pub use sample::{IntSample, Sample};
pub use terse::{Terse, DEFAULT_BLOCK};

mod bitstream;
mod decoder;
mod encoder;
mod errors;
mod header;
mod sample;
mod terse;
