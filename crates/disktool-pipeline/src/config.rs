//! Source configuration

use disktool_core::limits::validate_sector_size;
use disktool_core::Result;

/// Configuration for opening a source
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Memory-map regular image files instead of issuing positional reads
    pub use_mmap: bool,

    /// Logical block size to use instead of the detected one
    pub logical_block_size: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            use_mmap: true,
            logical_block_size: None,
        }
    }
}

impl SourceConfig {
    /// Override the logical block size
    pub fn with_logical_block_size(mut self, block_size: u64) -> Self {
        self.logical_block_size = Some(block_size);
        self
    }

    /// Reject overrides that are not a supported sector size
    pub fn validate(&self) -> Result<()> {
        if let Some(block_size) = self.logical_block_size {
            validate_sector_size(block_size)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SourceConfig::default();
        assert!(config.use_mmap);
        assert!(config.logical_block_size.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_block_size_override_validation() {
        assert!(SourceConfig::default()
            .with_logical_block_size(4096)
            .validate()
            .is_ok());
        assert!(SourceConfig::default()
            .with_logical_block_size(520)
            .validate()
            .is_err());
    }
}
