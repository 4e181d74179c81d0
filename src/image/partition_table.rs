//! Partition table inspection
//!
//! Uses the esp-idf-part crate to parse the binary partition table produced by
//! the build so obvious layout mistakes show up before flashing.

use crate::errors::{PackagerError, Result};
use crate::image::layout::format_address;
use esp_idf_part::{PartitionTable, Type};
use std::path::Path;

/// One partition table entry in display form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionEntry {
    pub name: String,
    pub kind: String,
    pub offset: u32,
    pub size: u32,
    pub is_app: bool,
}

/// Parse a binary partition table
pub fn read_partition_table(path: &Path) -> Result<PartitionTable> {
    let data = std::fs::read(path)?;
    PartitionTable::try_from_bytes(data)
        .map_err(|e| PackagerError::PartitionTable(format!("{}: {}", path.display(), e)))
}

/// Flatten a table into display entries
pub fn entries(table: &PartitionTable) -> Vec<PartitionEntry> {
    table
        .partitions()
        .iter()
        .map(|p| PartitionEntry {
            name: p.name().to_string(),
            kind: format!("{:?}/{:?}", p.ty(), p.subtype()),
            offset: p.offset(),
            size: p.size(),
            is_app: matches!(p.ty(), Type::App),
        })
        .collect()
}

/// Check that an app partition starts at `app_offset` and can hold `app_len`
/// bytes. Returns human readable warnings; an empty list means the layout is fine.
pub fn check_app_partition(
    entries: &[PartitionEntry],
    app_offset: u32,
    app_len: u64,
) -> Vec<String> {
    let Some(app) = entries.iter().find(|e| e.is_app && e.offset == app_offset) else {
        return vec![format!(
            "no app partition starts at {}, the merged image may not boot",
            format_address(app_offset)
        )];
    };

    if app_len > app.size as u64 {
        vec![format!(
            "firmware is {} bytes but partition '{}' only holds {} bytes",
            app_len, app.name, app.size
        )]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esp_idf_part::{AppType, DataType, Flags, Partition, SubType};
    use tempfile::TempDir;

    fn sample_table() -> PartitionTable {
        PartitionTable::new(vec![
            Partition::new(
                String::from("nvs"),
                Type::Data,
                SubType::Data(DataType::Nvs),
                0x9000,
                0x6000,
                Flags::empty(),
            ),
            Partition::new(
                String::from("factory"),
                Type::App,
                SubType::App(AppType::Factory),
                0x1_0000,
                0x10_0000,
                Flags::empty(),
            ),
        ])
    }

    #[test]
    fn test_read_binary_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("partitions.bin");
        std::fs::write(&path, sample_table().to_bin().unwrap()).unwrap();

        let table = read_partition_table(&path).unwrap();
        let entries = entries(&table);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "nvs");
        assert!(!entries[0].is_app);
        assert_eq!(entries[1].name, "factory");
        assert_eq!(entries[1].offset, 0x1_0000);
        assert!(entries[1].is_app);
    }

    #[test]
    fn test_check_app_partition() {
        let entries = entries(&sample_table());

        assert!(check_app_partition(&entries, 0x1_0000, 1024).is_empty());

        let too_big = check_app_partition(&entries, 0x1_0000, 0x20_0000);
        assert_eq!(too_big.len(), 1);
        assert!(too_big[0].contains("factory"));

        let wrong_offset = check_app_partition(&entries, 0x2_0000, 1024);
        assert!(wrong_offset[0].contains("0x20000"));
    }
}
