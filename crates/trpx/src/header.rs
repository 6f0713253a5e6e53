/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The self-describing `<Terse .../>` element preceding the payload
//!
//! A stored object is a single self-closing XML element followed by
//! `memory_size` raw payload bytes. The element carries everything
//! needed to reconstruct a store, e.g.
//!
//! ```text
//! <Terse prolix_bits="12" signed="0" block="12" memory_size="91388"
//!        number_of_values="262144" dimensions="512 512" number_of_frames="2"/>
//! ```
//!
//! The parser tolerates attribute order, whitespace and either quote
//! style; the emitter always writes the attributes in the order above.

use std::io::Read;

use log::warn;

use crate::errors::TerseErrors;

// element bodies are tiny; anything past this is not a Terse header
const MAX_ELEMENT_SIZE: usize = 1 << 16;

/// Parsed form of the `Terse` header element.
#[derive(Debug)]
pub(crate) struct TerseHeader {
    pub prolix_bits:      u32,
    pub signed:           bool,
    pub block:            usize,
    pub memory_size:      usize,
    pub number_of_values: usize,
    pub dimensions:       Vec<usize>,
    pub number_of_frames: usize
}

impl TerseHeader {
    /// Render the element exactly as it is written to a stream.
    pub fn encode(&self) -> String {
        let mut out = format!(
            "<Terse prolix_bits=\"{}\" signed=\"{}\" block=\"{}\" memory_size=\"{}\" number_of_values=\"{}\"",
            self.prolix_bits,
            u8::from(self.signed),
            self.block,
            self.memory_size,
            self.number_of_values
        );

        if !self.dimensions.is_empty() {
            out.push_str(" dimensions=\"");
            for (i, dim) in self.dimensions.iter().enumerate() {
                if i != 0 {
                    out.push(' ');
                }
                out.push_str(&dim.to_string());
            }
            out.push('"');
        }
        out.push_str(&format!(
            " number_of_frames=\"{}\"/>",
            self.number_of_frames
        ));
        out
    }

    /// Scan `src` for the next `Terse` element and parse it, leaving
    /// the stream positioned on the first payload byte.
    pub fn decode<R: Read>(src: &mut R) -> Result<TerseHeader, TerseErrors> {
        let body = read_element(src, "Terse")?;
        Self::parse(&body)
    }

    /// Parse the attribute text of a self-closing `Terse` element.
    fn parse(body: &str) -> Result<TerseHeader, TerseErrors> {
        let mut prolix_bits = None;
        let mut signed = None;
        let mut block = None;
        let mut memory_size = None;
        let mut number_of_values = None;
        let mut dimensions = Vec::new();
        let mut number_of_frames = None;

        let mut rest = body.trim_start();

        while !rest.is_empty() {
            let eq = rest
                .find('=')
                .ok_or(TerseErrors::MalformedHeader("attribute without `=`"))?;
            let name = rest[..eq].trim();
            let after = rest[eq + 1..].trim_start();

            let quote = after
                .chars()
                .next()
                .ok_or(TerseErrors::MalformedHeader("attribute without a value"))?;
            if quote != '"' && quote != '\'' {
                return Err(TerseErrors::MalformedHeader(
                    "attribute value is not quoted"
                ));
            }
            let close = after[1..]
                .find(quote)
                .ok_or(TerseErrors::MalformedHeader("unterminated attribute value"))?;
            let value = &after[1..1 + close];

            match name {
                "prolix_bits" => prolix_bits = Some(value.trim().parse::<u32>()?),
                "signed" => {
                    signed = Some(match value.trim() {
                        "0" => false,
                        "1" => true,
                        _ => {
                            return Err(TerseErrors::MalformedHeader(
                                "signed attribute must be 0 or 1"
                            ))
                        }
                    })
                }
                "block" => block = Some(value.trim().parse::<usize>()?),
                "memory_size" => memory_size = Some(value.trim().parse::<usize>()?),
                "number_of_values" => number_of_values = Some(value.trim().parse::<usize>()?),
                "dimensions" => {
                    dimensions = value
                        .split_whitespace()
                        .map(str::parse::<usize>)
                        .collect::<Result<Vec<usize>, _>>()?
                }
                "number_of_frames" => number_of_frames = Some(value.trim().parse::<usize>()?),
                _ => warn!("Ignoring unknown Terse attribute `{name}`")
            }

            rest = after[1 + close + 1..].trim_start();
        }

        let header = TerseHeader {
            prolix_bits:      prolix_bits.ok_or(TerseErrors::MissingAttribute("prolix_bits"))?,
            signed:           signed.ok_or(TerseErrors::MissingAttribute("signed"))?,
            block:            block.ok_or(TerseErrors::MissingAttribute("block"))?,
            memory_size:      memory_size.ok_or(TerseErrors::MissingAttribute("memory_size"))?,
            number_of_values: number_of_values
                .ok_or(TerseErrors::MissingAttribute("number_of_values"))?,
            dimensions,
            // a plain single-frame object may omit the frame count
            number_of_frames: number_of_frames.unwrap_or(1)
        };

        if header.block == 0 {
            return Err(TerseErrors::MalformedHeader("block size must be positive"));
        }
        if !header.dimensions.is_empty() {
            let product: usize = header.dimensions.iter().product();
            if product != header.number_of_values {
                return Err(TerseErrors::DimensionsMismatch(
                    header.number_of_values,
                    product
                ));
            }
        }
        Ok(header)
    }
}

/// Read bytes until the self-closing element named `name` has been
/// consumed, returning its attribute text. Elements with other names
/// are skipped, as is anything between elements.
fn read_element<R: Read>(src: &mut R, name: &str) -> Result<String, TerseErrors> {
    loop {
        // scan for the next element start
        loop {
            match read_byte(src)? {
                Some(b'<') => break,
                Some(_) => continue,
                None => {
                    return Err(TerseErrors::MalformedHeader(
                        "stream contains no Terse element"
                    ))
                }
            }
        }

        let mut element = Vec::new();
        loop {
            match read_byte(src)? {
                Some(b'>') => break,
                Some(byte) => element.push(byte),
                None => {
                    return Err(TerseErrors::MalformedHeader(
                        "unterminated element in stream"
                    ))
                }
            }
            if element.len() > MAX_ELEMENT_SIZE {
                return Err(TerseErrors::MalformedHeader("element too large"));
            }
        }

        let text = String::from_utf8_lossy(&element).into_owned();
        let rest = match text.strip_prefix(name) {
            Some(rest)
                if rest.is_empty()
                    || !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_') =>
            {
                rest
            }
            _ => continue
        };
        return match rest.trim_end().strip_suffix('/') {
            Some(body) => Ok(body.to_string()),
            None => Err(TerseErrors::MalformedHeader(
                "Terse element is not self-closing"
            ))
        };
    }
}

fn read_byte<R: Read>(src: &mut R) -> Result<Option<u8>, TerseErrors> {
    let mut byte = [0_u8; 1];
    loop {
        match src.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into())
        }
    }
}
