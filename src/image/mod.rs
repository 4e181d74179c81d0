//! Combined flash image handling

pub mod layout;
pub mod partition_table;
pub mod segment;

// Re-export commonly used types
pub use layout::{
    APP_ADDR, BOOTLOADER_ADDR, MergePlan, PARTITION_TABLE_ADDR, format_address, merge_segments,
};
pub use segment::{FlashSegment, Segment};
