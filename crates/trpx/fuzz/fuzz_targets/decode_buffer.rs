#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut terse) = trpx::Terse::read(std::io::Cursor::new(data)) {
        if terse.number_of_values() < 1 << 20 && terse.number_of_frames() < 64 {
            for frame in 0..terse.number_of_frames() {
                let _ = terse.unpack::<i64>(frame);
                let _ = terse.unpack::<u8>(frame);
            }
        }
    }
});
