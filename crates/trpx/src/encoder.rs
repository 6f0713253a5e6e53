/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Block-level frame compression
//!
//! A frame is cut into blocks of `block` values (the last block may be
//! short). Every value in a block is stored with the same bit width,
//! the smallest that covers the block, and each block is preceded by a
//! short header announcing that width or repeating the previous one:
//!
//! ```text
//! header := "1"                       width equals the previous block's
//!         | "0" www                   width 0..=6
//!         | "0" 111 xx                width 7..=9   (xx = width - 7)
//!         | "0" 111 11 yyyyyy         width 10..=73 (yyyyyy = width - 10)
//! ```
//!
//! All fields are least-significant-bit-first. Signed values are
//! stored as two's complement at the block width, so the top bit of a
//! field is the sign bit.

use crate::bitstream::BitWriter;
use crate::errors::TerseErrors;
use crate::sample::IntSample;

/// Widest value field the block header grammar can announce.
const MAX_WIDTH: u32 = 73;

/// Compress one frame onto the end of `data`, returning the widest
/// block width used.
///
/// The payload grows by a zero-filled upper bound first and is
/// truncated to the bytes actually used afterwards, so the next frame
/// starts on the byte after the last written bit.
pub(crate) fn compress_frame<T: IntSample>(
    values: &[T], block: usize, data: &mut Vec<u8>
) -> Result<u32, TerseErrors> {
    let start = data.len();
    data.resize(start + frame_upper_bound::<T>(values.len(), block), 0);

    let mut writer = BitWriter::new(&mut data[start..]);
    let mut widest = 0_u32;
    // no previous block exists, so the first header is always explicit
    let mut prev = u32::MAX;

    for chunk in values.chunks(block) {
        let mut or_span = 0_u64;
        let mut or_field = 0_u64;

        for &value in chunk {
            or_span |= value.span();
            or_field |= value.field();
        }
        let width = if or_field == 0 {
            0
        } else {
            (64 - or_span.leading_zeros()) + u32::from(T::SIGNED)
        };

        if width > MAX_WIDTH {
            return Err(TerseErrors::WidthOverflow(width));
        }
        widest = widest.max(width);

        if width == prev {
            writer.write_bit(1);
        } else {
            writer.write_bit(0);
            if width <= 6 {
                writer.write_bits(u64::from(width), 3);
            } else if width <= 9 {
                writer.write_bits(0b111 | (u64::from(width - 7) << 3), 5);
            } else {
                writer.write_bits(0b1_1111 | (u64::from(width - 10) << 5), 11);
            }
            prev = width;
        }

        if width != 0 {
            let mask = field_mask(width);
            for &value in chunk {
                writer.write_bits(value.field() & mask, width);
            }
        }
    }

    let used = writer.position() / 8 + 1;
    data.truncate(start + used);
    Ok(widest)
}

/// Bytes that are always enough to hold one packed frame: twelve
/// header bits per block plus a full-width field per value.
fn frame_upper_bound<T: IntSample>(count: usize, block: usize) -> usize {
    let blocks = count.div_ceil(block);
    let bits = blocks * 12 + count * (T::BITS as usize + usize::from(T::SIGNED));
    bits / 8 + 1
}

#[inline(always)]
fn field_mask(width: u32) -> u64 {
    if width == 64 {
        u64::MAX
    } else {
        (1_u64 << width) - 1
    }
}
