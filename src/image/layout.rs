//! Fixed flash layout of the combined image
//!
//! The combined image always holds the bootloader, the partition table and
//! the application firmware, in that address order. [`MergePlan`] can only be
//! built in that order.

use crate::errors::{PackagerError, Result};
use crate::image::segment::{FlashSegment, Segment};
use crate::models::SegmentRole;
use std::path::{Path, PathBuf};

/// Flash address of the second stage bootloader
pub const BOOTLOADER_ADDR: u32 = 0x1000;
/// Flash address of the partition table
pub const PARTITION_TABLE_ADDR: u32 = 0x8000;
/// Flash address of the factory application
pub const APP_ADDR: u32 = 0x10000;

/// Erased flash value used to pad gaps between segments
pub const FLASH_FILL_BYTE: u8 = 0xFF;

/// Format a flash address the way merge tools expect it
pub fn format_address(addr: u32) -> String {
    format!("0x{:x}", addr)
}

/// Everything a merger needs to produce one combined image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    output_dir: PathBuf,
    output_name: String,
    segments: [FlashSegment; 3],
}

impl MergePlan {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        output_name: impl Into<String>,
        bootloader: impl Into<PathBuf>,
        partition_table: impl Into<PathBuf>,
        firmware: impl Into<PathBuf>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            output_name: output_name.into(),
            segments: [
                FlashSegment::new(SegmentRole::Bootloader, BOOTLOADER_ADDR, bootloader),
                FlashSegment::new(
                    SegmentRole::PartitionTable,
                    PARTITION_TABLE_ADDR,
                    partition_table,
                ),
                FlashSegment::new(SegmentRole::Firmware, APP_ADDR, firmware),
            ],
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// Path the merged image is expected at
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }

    /// Segments in ascending address order
    pub fn segments(&self) -> &[FlashSegment] {
        &self.segments
    }

    pub fn bin_paths(&self) -> Vec<&Path> {
        self.segments.iter().map(|s| s.path.as_path()).collect()
    }

    pub fn hex_addresses(&self) -> Vec<String> {
        self.segments
            .iter()
            .map(|s| format_address(s.address))
            .collect()
    }

    /// Fail on the first input file that does not exist
    pub fn check_inputs(&self) -> Result<()> {
        for segment in &self.segments {
            if !segment.path.is_file() {
                return Err(PackagerError::MissingMergeInput(segment.path.clone()));
            }
        }
        Ok(())
    }

    /// Load all inputs into memory
    pub fn load_segments(&self) -> Result<Vec<Segment<'static>>> {
        self.segments
            .iter()
            .map(|s| s.load().map_err(PackagerError::from))
            .collect()
    }
}

/// Lay segments out in one buffer whose first byte maps to `flash_base`.
///
/// Gaps are filled with [`FLASH_FILL_BYTE`]. Segments must be sorted by
/// address and must not overlap.
pub fn merge_segments(segments: &[Segment<'_>], flash_base: u32) -> Result<Vec<u8>> {
    let mut image: Vec<u8> = Vec::new();
    let mut previous_end = flash_base as u64;

    for segment in segments {
        if segment.addr < flash_base {
            return Err(PackagerError::Layout(format!(
                "segment at {} lies below flash base {}",
                format_address(segment.addr),
                format_address(flash_base)
            )));
        }
        if (segment.addr as u64) < previous_end {
            return Err(PackagerError::Layout(format!(
                "segment at {} overlaps the previous segment ending at 0x{:x}",
                format_address(segment.addr),
                previous_end
            )));
        }

        let start = (segment.addr - flash_base) as usize;
        image.resize(start, FLASH_FILL_BYTE);
        image.extend_from_slice(segment.data());
        previous_end = segment.end();
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_order_is_fixed() {
        let plan = MergePlan::new("bin", "GW90.bin", "bin/bl.bin", "bin/pt.bin", "bin/fw.bin");

        let roles: Vec<_> = plan.segments().iter().map(|s| s.role).collect();
        assert_eq!(
            roles,
            vec![
                SegmentRole::Bootloader,
                SegmentRole::PartitionTable,
                SegmentRole::Firmware
            ]
        );
        assert_eq!(plan.hex_addresses(), vec!["0x1000", "0x8000", "0x10000"]);
        assert_eq!(
            plan.bin_paths(),
            vec![
                Path::new("bin/bl.bin"),
                Path::new("bin/pt.bin"),
                Path::new("bin/fw.bin")
            ]
        );
        assert_eq!(plan.output_path(), PathBuf::from("bin/GW90.bin"));
    }

    #[test]
    fn test_merge_pads_gaps_with_erased_flash() {
        let bootloader = [0xAA; 4];
        let table = [0xBB; 2];
        let app = [0xCC; 3];
        let segments = [
            Segment::new(BOOTLOADER_ADDR, &bootloader),
            Segment::new(PARTITION_TABLE_ADDR, &table),
            Segment::new(APP_ADDR, &app),
        ];

        let image = merge_segments(&segments, 0).unwrap();

        assert_eq!(image.len(), APP_ADDR as usize + app.len());
        assert!(image[..0x1000].iter().all(|b| *b == FLASH_FILL_BYTE));
        assert_eq!(&image[0x1000..0x1004], &bootloader);
        assert_eq!(image[0x1004], FLASH_FILL_BYTE);
        assert_eq!(&image[0x8000..0x8002], &table);
        assert_eq!(&image[0x10000..], &app);
    }

    #[test]
    fn test_merge_with_flash_base() {
        let bootloader = [1u8, 2, 3];
        let app = [4u8];
        let segments = [
            Segment::new(BOOTLOADER_ADDR, &bootloader),
            Segment::new(0x1010, &app),
        ];

        let image = merge_segments(&segments, BOOTLOADER_ADDR).unwrap();
        assert_eq!(&image[..3], &bootloader);
        assert_eq!(image.len(), 0x11);
        assert_eq!(image[0x10], 4);
    }

    #[test]
    fn test_merge_rejects_overlap() {
        let big = vec![0u8; 0x8000];
        let table = [0u8; 16];
        let segments = [
            Segment::new(BOOTLOADER_ADDR, &big),
            Segment::new(PARTITION_TABLE_ADDR, &table),
        ];

        let err = merge_segments(&segments, 0).unwrap_err();
        assert!(matches!(err, PackagerError::Layout(_)));
    }

    #[test]
    fn test_merge_rejects_segment_below_base() {
        let data = [0u8; 4];
        let segments = [Segment::new(BOOTLOADER_ADDR, &data)];
        assert!(merge_segments(&segments, PARTITION_TABLE_ADDR).is_err());
    }

    #[test]
    fn test_check_inputs_reports_first_missing() {
        let plan = MergePlan::new(
            "/nonexistent",
            "x.bin",
            "/nonexistent/bl.bin",
            "/nonexistent/pt.bin",
            "/nonexistent/fw.bin",
        );
        match plan.check_inputs() {
            Err(PackagerError::MissingMergeInput(path)) => {
                assert_eq!(path, PathBuf::from("/nonexistent/bl.bin"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
