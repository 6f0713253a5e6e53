/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Display, Formatter};
use core::num::ParseIntError;

/// Errors that may occur when packing, unpacking or (de)serializing
/// Terse data
pub enum TerseErrors {
    /// A pushed frame or an output slice does not have the number of
    /// values the store was fixed to at first push
    ///
    /// # Arguments
    /// - 1st argument is the number of values expected
    /// - 2nd argument is the number of values found
    ShapeMismatch(usize, usize),
    /// The product of the dimensions does not match the number of
    /// values per frame
    ///
    /// # Arguments
    /// - 1st argument is the number of values per frame
    /// - 2nd argument is the dimension product
    DimensionsMismatch(usize, usize),
    /// Dimensions can be set only once; all frames share them
    DimensionsAlreadySet,
    /// The pushed frame's signedness differs from the stored one, or
    /// signed data was unpacked into an unsigned output
    SignednessMismatch,
    /// A block would need more bits per value than the header grammar
    /// can announce
    WidthOverflow(u32),
    /// The requested frame does not exist
    ///
    /// # Arguments
    /// - 1st argument is the requested frame index
    /// - 2nd argument is the number of frames stored
    FrameIndexOutOfRange(usize, usize),
    /// A required attribute is absent from the `Terse` header element
    MissingAttribute(&'static str),
    /// An attribute value could not be parsed as an integer
    ParseError(ParseIntError),
    /// The header element is structurally broken
    MalformedHeader(&'static str),
    /// The payload ended before the announced number of bytes
    ///
    /// # Arguments
    /// - 1st argument is the number of bytes expected
    /// - 2nd argument is the number of bytes present
    BufferShort(usize, usize),
    /// An error from the underlying stream
    IoErrors(std::io::Error)
}

impl Debug for TerseErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            TerseErrors::ShapeMismatch(expected, found) => {
                writeln!(
                    f,
                    "Frame length mismatch, store holds frames of {expected} values but {found} were given"
                )
            }
            TerseErrors::DimensionsMismatch(values, product) => {
                writeln!(
                    f,
                    "Dimension product {product} does not match {values} values per frame"
                )
            }
            TerseErrors::DimensionsAlreadySet => {
                writeln!(f, "Dimensions are already set and cannot be overwritten")
            }
            TerseErrors::SignednessMismatch => {
                writeln!(
                    f,
                    "Signed/unsigned mismatch, signed data cannot be handled as unsigned"
                )
            }
            TerseErrors::WidthOverflow(width) => {
                writeln!(
                    f,
                    "Block needs {width} bits per value, more than the representable 73"
                )
            }
            TerseErrors::FrameIndexOutOfRange(index, count) => {
                writeln!(f, "Frame {index} requested but only {count} frames stored")
            }
            TerseErrors::MissingAttribute(name) => {
                writeln!(f, "Required header attribute `{name}` is missing")
            }
            TerseErrors::ParseError(err) => {
                writeln!(f, "Could not parse header attribute: {err}")
            }
            TerseErrors::MalformedHeader(msg) => {
                writeln!(f, "Malformed Terse header: {msg}")
            }
            TerseErrors::BufferShort(expected, found) => {
                writeln!(
                    f,
                    "Payload too short, expected {expected} bytes but found {found}"
                )
            }
            TerseErrors::IoErrors(err) => {
                writeln!(f, "I/O error {err}")
            }
        }
    }
}

impl Display for TerseErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

impl std::error::Error for TerseErrors {}

impl From<ParseIntError> for TerseErrors {
    fn from(value: ParseIntError) -> Self {
        TerseErrors::ParseError(value)
    }
}

impl From<std::io::Error> for TerseErrors {
    fn from(value: std::io::Error) -> Self {
        TerseErrors::IoErrors(value)
    }
}
