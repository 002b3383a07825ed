//! Fuzz target: tensor arena bump allocator
//!
//! Interprets the input as an arena size followed by a sequence of carve
//! lengths and verifies:
//! - No panics on any size or request
//! - Regions stay inside the buffer and never overlap
//! - A failed carve leaves usage unchanged
//! - `footprint` predicts exactly what a carve consumes
//!
//! cargo fuzz run fuzz_arena_carve

#![no_main]

use libfuzzer_sys::fuzz_target;
use persondetect::engine::TensorArena;

fuzz_target!(|data: &[u8]| {
    let Some((size, rest)) = data.split_first_chunk::<2>() else {
        return;
    };
    let mut arena = TensorArena::new(usize::from(u16::from_le_bytes(*size)));
    let mut last_end = 0;

    for chunk in rest.chunks_exact(2) {
        let len = usize::from(u16::from_le_bytes([chunk[0], chunk[1]]));
        let before = arena.used();
        let predicted = arena.footprint(&[len]);
        match arena.carve(len) {
            Ok(region) => {
                assert_eq!(predicted, Some(arena.used()));
                assert!(region.offset >= last_end);
                assert_eq!(arena.slice(region).len(), len);
                last_end = region.end();
            }
            Err(_) => {
                assert_eq!(arena.used(), before);
                assert!(predicted.is_none_or(|p| p > arena.capacity()));
            }
        }
        assert!(arena.used() <= arena.capacity());
    }
});
