/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::io::Cursor;

use nanorand::{Rng, WyRand};
use trpx::{Terse, TerseErrors};

#[test]
fn counting_frame_round_trips() {
    let numbers: Vec<i32> = (-500..500).collect();

    let mut terse = Terse::from_values(&numbers).unwrap();
    assert_eq!(terse.prolix_bits(), 10);
    assert!(terse.is_signed());

    let restored: Vec<i32> = terse.unpack(0).unwrap();
    assert_eq!(numbers, restored);

    // well under a third of the raw 4 bytes per value
    let ratio = terse.terse_size() as f64 / (numbers.len() * 4) as f64;
    assert!(ratio < 0.32, "compression ratio {ratio} regressed");
}

#[test]
fn empty_frames_cost_one_bit_per_block() {
    let zeros = vec![0_u32; 262144];

    let mut terse = Terse::from_values(&zeros).unwrap();
    assert_eq!(terse.prolix_bits(), 0);
    assert_eq!(terse.terse_size(), 2732);
    assert_eq!(terse.unpack::<u32>(0).unwrap(), zeros);
}

#[test]
fn hot_pixel_frame_round_trips() {
    let mut frame = [0_u16; 12];
    frame[11] = 65535;

    let mut terse = Terse::from_values(&frame).unwrap();
    assert_eq!(terse.prolix_bits(), 16);
    assert_eq!(terse.unpack::<u16>(0).unwrap(), frame);
}

#[test]
fn packed_bytes_are_stable() {
    // 3, 4, 2 at block size 3: header "0" + width 3, then the three
    // 3-bit fields, all least-significant-bit-first
    let mut terse = Terse::with_block_size(3);
    terse.push_frame(&[3_u8, 4, 2]).unwrap();

    let mut file = Vec::new();
    terse.write(&mut file).unwrap();

    let expected_header = "<Terse prolix_bits=\"3\" signed=\"0\" block=\"3\" memory_size=\"2\" \
                           number_of_values=\"3\" number_of_frames=\"1\"/>";
    assert_eq!(&file[..expected_header.len()], expected_header.as_bytes());
    assert_eq!(&file[expected_header.len()..], &[0x36, 0x0A]);
}

#[test]
fn frames_share_one_shape() {
    let mut terse = Terse::with_block_size(3);
    terse.push_frame(&[1_u32, 2, 3]).unwrap();

    assert!(matches!(
        terse.push_frame(&[1_u32, 2]),
        Err(TerseErrors::ShapeMismatch(3, 2))
    ));
    assert!(matches!(
        terse.push_frame(&[1_i32, 2, 3]),
        Err(TerseErrors::SignednessMismatch)
    ));

    let mut out = [0_u32; 2];
    assert!(matches!(
        terse.unpack_into(0, &mut out),
        Err(TerseErrors::ShapeMismatch(3, 2))
    ));
    assert!(matches!(
        terse.unpack::<u32>(1),
        Err(TerseErrors::FrameIndexOutOfRange(1, 1))
    ));
}

#[test]
fn later_frames_unpack_without_earlier_ones() {
    let mut terse = Terse::with_block_size(3);
    terse.push_frame(&[1_u32, 2, 3]).unwrap();
    terse.push_frame(&[1_000_000_u32, 2, 3]).unwrap();

    assert_eq!(terse.number_of_frames(), 2);
    // frame 1 first, so its offset is resolved lazily
    assert_eq!(terse.unpack::<u32>(1).unwrap(), vec![1_000_000, 2, 3]);
    assert_eq!(terse.unpack::<u32>(0).unwrap(), vec![1, 2, 3]);
}

#[test]
fn lazy_and_sequential_resolution_agree() {
    // a frame length that leaves a short final block
    let frames: Vec<Vec<u16>> = (0..4)
        .map(|f| (0..1000).map(|i| ((i * 31 + f * 7) % 1021) as u16).collect())
        .collect();

    let build = || {
        let mut terse = Terse::with_block_size(12);
        for frame in &frames {
            terse.push_frame(frame).unwrap();
        }
        terse
    };

    // jump straight to the last frame on one store
    let mut direct = build();
    assert_eq!(direct.unpack::<u16>(3).unwrap(), frames[3]);

    // walk every frame in order on another
    let mut sequential = build();
    for (index, frame) in frames.iter().enumerate() {
        assert_eq!(&sequential.unpack::<u16>(index).unwrap(), frame);
    }

    // and once more after a write/read cycle, where nothing is resolved
    let mut file = Vec::new();
    direct.write(&mut file).unwrap();
    let mut reread = Terse::read(Cursor::new(&file)).unwrap();
    assert_eq!(reread.unpack::<u16>(2).unwrap(), frames[2]);
    assert_eq!(reread.unpack::<u16>(0).unwrap(), frames[0]);
}

#[test]
fn pushing_a_frame_twice_stores_it_twice() {
    let frame: Vec<i16> = (-100..100).map(|i| i * 3).collect();

    let mut terse = Terse::new();
    terse.push_frame(&frame).unwrap();
    terse.push_frame(&frame).unwrap();

    assert_eq!(terse.unpack::<i16>(0).unwrap(), frame);
    assert_eq!(terse.unpack::<i16>(1).unwrap(), frame);
}

#[test]
fn max_bits_only_grows() {
    let mut terse = Terse::new();
    terse.push_frame(&[1_000_000_u32; 10]).unwrap();
    let wide = terse.prolix_bits();
    assert_eq!(wide, 20);

    terse.push_frame(&[1_u32; 10]).unwrap();
    assert_eq!(terse.prolix_bits(), wide);

    terse.push_frame(&[u32::MAX; 10]).unwrap();
    assert_eq!(terse.prolix_bits(), 32);
}

#[test]
fn narrow_outputs_saturate() {
    let mut terse = Terse::with_block_size(2);
    terse.push_frame(&[i32::MIN, i32::MAX]).unwrap();
    assert_eq!(terse.prolix_bits(), 32);

    assert_eq!(
        terse.unpack::<i16>(0).unwrap(),
        vec![i16::MIN, i16::MAX]
    );
    assert_eq!(terse.unpack::<i32>(0).unwrap(), vec![i32::MIN, i32::MAX]);

    let mut unsigned = Terse::new();
    unsigned
        .push_frame(&[0_u32, 200, 300, 70_000, u32::MAX])
        .unwrap();
    assert_eq!(
        unsigned.unpack::<u8>(0).unwrap(),
        vec![0, 200, 255, 255, 255]
    );
    assert_eq!(
        unsigned.unpack::<u16>(0).unwrap(),
        vec![0, 200, 300, 65535, 65535]
    );
}

#[test]
fn signed_data_will_not_unpack_unsigned() {
    let mut terse = Terse::from_values(&[-1_i32, 2, 3]).unwrap();
    assert!(matches!(
        terse.unpack::<u32>(0),
        Err(TerseErrors::SignednessMismatch)
    ));
    // signed and float outputs are fine
    assert_eq!(terse.unpack::<i64>(0).unwrap(), vec![-1, 2, 3]);
    assert_eq!(terse.unpack::<f32>(0).unwrap(), vec![-1.0, 2.0, 3.0]);
}

#[test]
fn unsigned_all_ones_unpacks_as_minus_one() {
    // a saturated detector pixel keeps every bit set; sign extension
    // turns it into -1 in signed outputs, which stays recognisable
    let mut terse = Terse::from_values(&[u16::MAX, 17]).unwrap();
    assert_eq!(terse.unpack::<i32>(0).unwrap(), vec![-1, 17]);
    assert_eq!(terse.unpack::<u32>(0).unwrap(), vec![65535, 17]);
}

#[test]
fn floats_restore_signed_values_exactly() {
    let numbers: Vec<i32> = (-500..500).collect();
    let mut terse = Terse::from_values(&numbers).unwrap();

    let floats: Vec<f64> = terse.unpack(0).unwrap();
    for (float, int) in floats.iter().zip(&numbers) {
        assert_eq!(*float, f64::from(*int));
    }
}

#[test]
fn all_block_sizes_round_trip() {
    let mut rng = WyRand::new_seed(0x7e5e);

    for block in [1_usize, 2, 12, 64] {
        let values: Vec<i32> = (0..997)
            .map(|_| {
                // mostly small counts, occasional hot pixels
                if rng.generate::<u8>() < 8 {
                    rng.generate::<i32>()
                } else {
                    i32::from(rng.generate::<u8>() % 50) - 25
                }
            })
            .collect();

        let mut terse = Terse::with_block_size(block);
        terse.push_frame(&values).unwrap();
        assert_eq!(terse.unpack::<i32>(0).unwrap(), values, "block size {block}");

        // the advertised size bound holds (one slack byte for frames
        // ending on a byte boundary)
        let bound = (values.len() as f64 * (4.0 + 12.0 / (block as f64 * 8.0))).ceil();
        assert!(terse.terse_size() <= bound as usize + 1);
    }
}

#[test]
fn random_unsigned_frames_round_trip() {
    let mut rng = WyRand::new_seed(0xdead_beef);

    for _ in 0..8 {
        let values: Vec<u64> = (0..503).map(|_| rng.generate::<u64>()).collect();
        let mut terse = Terse::from_values(&values).unwrap();
        assert_eq!(terse.unpack::<u64>(0).unwrap(), values);
    }
}

#[test]
fn random_tiny_type_frames_round_trip() {
    let mut rng = WyRand::new_seed(42);

    let values: Vec<i8> = (0..10_000).map(|_| rng.generate::<i8>()).collect();
    let mut terse = Terse::from_values(&values).unwrap();
    assert_eq!(terse.unpack::<i8>(0).unwrap(), values);
    assert!(terse.prolix_bits() <= 8);
}

#[test]
fn file_round_trip_keeps_everything() {
    let frame: Vec<u16> = (0..64 * 32).map(|i| (i % 1000) as u16).collect();

    let mut terse = Terse::with_block_size(12);
    terse.set_dimensions(&[64, 32]).unwrap();
    terse.push_frame(&frame).unwrap();
    terse.push_frame(&frame).unwrap();

    let mut file = Vec::new();
    let written = terse.write(&mut file).unwrap();
    assert_eq!(written, file.len());

    let mut reread = Terse::read(Cursor::new(&file)).unwrap();
    assert_eq!(reread.number_of_values(), frame.len());
    assert_eq!(reread.number_of_frames(), 2);
    assert_eq!(reread.block_size(), 12);
    assert_eq!(reread.prolix_bits(), terse.prolix_bits());
    assert_eq!(reread.dimensions(), &[64, 32]);
    assert!(!reread.is_signed());
    assert_eq!(reread.unpack::<u16>(1).unwrap(), frame);
}

#[test]
fn stacked_stores_read_back_to_back() {
    let first = Terse::from_values(&[1_u8, 2, 3]).unwrap();
    let second = Terse::from_values(&[9_u8, 8, 7, 6]).unwrap();

    let mut file = Vec::new();
    first.write(&mut file).unwrap();
    second.write(&mut file).unwrap();

    let mut cursor = Cursor::new(&file);
    let mut a = Terse::read(&mut cursor).unwrap();
    let mut b = Terse::read(&mut cursor).unwrap();

    assert_eq!(a.unpack::<u8>(0).unwrap(), vec![1, 2, 3]);
    assert_eq!(b.unpack::<u8>(0).unwrap(), vec![9, 8, 7, 6]);
}

#[test]
fn truncated_files_are_rejected() {
    let terse = Terse::from_values(&[1000_u32; 100]).unwrap();
    let mut file = Vec::new();
    terse.write(&mut file).unwrap();

    file.truncate(file.len() - 10);
    assert!(matches!(
        Terse::read(Cursor::new(&file)),
        Err(TerseErrors::BufferShort(_, _))
    ));
}

#[test]
fn dimensions_are_fixed_once() {
    let mut terse = Terse::new();
    terse.set_dimensions(&[4, 2]).unwrap();
    assert!(matches!(
        terse.set_dimensions(&[2, 4]),
        Err(TerseErrors::DimensionsAlreadySet)
    ));
    // eight values expected now
    assert!(matches!(
        terse.push_frame(&[1_u8, 2, 3]),
        Err(TerseErrors::DimensionsMismatch(3, 8))
    ));
    terse.push_frame(&[1_u8, 2, 3, 4, 5, 6, 7, 8]).unwrap();

    let mut late = Terse::from_values(&[1_u8, 2, 3]).unwrap();
    assert!(matches!(
        late.set_dimensions(&[2, 2]),
        Err(TerseErrors::DimensionsMismatch(3, 4))
    ));
    late.set_dimensions(&[3]).unwrap();
    assert_eq!(late.dimensions(), &[3]);
}
