#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let block = usize::from(data[0] % 65) + 1;
    let values: Vec<i16> = data[1..]
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    let mut terse = trpx::Terse::with_block_size(block);
    terse.push_frame(&values).unwrap();

    let decoded = terse
        .unpack::<i16>(0)
        .expect("Failed to unpack freshly packed data!");
    assert!(
        values == decoded,
        "The unpacked data doesn't match the original data!"
    );
});
