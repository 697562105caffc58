//! Property-based tests for memory maps and image flattening

use dfu_image::{FirmwareImage, ImageKind, MBR_SIZE, MemoryMap, UICR_BASE};
use proptest::prelude::*;

fn arb_segment() -> impl Strategy<Value = (u32, Vec<u8>)> {
    (0u32..0x0010_0000, prop::collection::vec(any::<u8>(), 1..80))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_ihex_preserves_single_segment((address, data) in arb_segment()) {
        let mut map = MemoryMap::new();
        map.insert(address, &data);

        let text = map.to_ihex().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let back = MemoryMap::from_ihex(&text).map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(back.read(address, data.len()), Some(data));
    }

    #[test]
    fn prop_flatten_covers_span(a in arb_segment(), b in arb_segment()) {
        let mut map = MemoryMap::new();
        map.insert(a.0, &a.1);
        map.insert(b.0, &b.1);

        let start = a.0.min(b.0);
        let end = (u64::from(a.0) + a.1.len() as u64).max(u64::from(b.0) + b.1.len() as u64);
        let flat = map.flatten_from(0);

        prop_assert!(flat.is_some());
        if let Some((flat_start, bytes)) = flat {
            prop_assert_eq!(flat_start, start);
            prop_assert_eq!(bytes.len() as u64, end - u64::from(start));
        }
    }

    #[test]
    fn prop_softdevice_never_starts_inside_mbr((address, data) in arb_segment()) {
        let mut map = MemoryMap::new();
        map.insert(address, &data);

        let reaches_past_mbr = u64::from(address) + data.len() as u64 > u64::from(MBR_SIZE);
        match FirmwareImage::from_memory_map(ImageKind::SoftStack, &map) {
            Ok(image) => {
                prop_assert!(reaches_past_mbr);
                prop_assert!(image.load_address().unwrap_or(0) >= MBR_SIZE);
            }
            Err(_) => prop_assert!(!reaches_past_mbr),
        }
    }

    #[test]
    fn prop_uicr_records_do_not_change_image(
        (address, data) in arb_segment(),
        uicr_offset in 0u32..0x1000,
    ) {
        let mut code_only = MemoryMap::new();
        code_only.insert(address, &data);
        let mut with_uicr = code_only.clone();
        with_uicr.insert(UICR_BASE + uicr_offset, &[0x00, 0x10, 0x00, 0x00]);

        let plain = FirmwareImage::from_memory_map(ImageKind::Bootloader, &code_only)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let stripped = FirmwareImage::from_memory_map(ImageKind::Bootloader, &with_uicr)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(stripped, plain);
    }
}
