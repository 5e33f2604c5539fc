use std::str::FromStr;

use crate::errors::PriceHubError;

/// Asset class, used to bucket output files by directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    Equities,
    Crypto,
    Fx,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Equities => "equities",
            AssetType::Crypto => "crypto",
            AssetType::Fx => "fx",
        }
    }
}

impl FromStr for AssetType {
    type Err = PriceHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equities" => Ok(AssetType::Equities),
            "crypto" => Ok(AssetType::Crypto),
            "fx" => Ok(AssetType::Fx),
            _ => Err(PriceHubError::DataError(format!(
                "Unknown asset type: {}",
                s
            ))),
        }
    }
}

/// Output format for the file sink: delimited text or columnar binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Arrow,
}

impl FileFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Arrow => "arrow",
        }
    }
}

impl FromStr for FileFormat {
    type Err = PriceHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "arrow" => Ok(FileFormat::Arrow),
            _ => Err(PriceHubError::DataError(format!("Unknown format: {}", s))),
        }
    }
}

/// Persistence-side settings for one pipeline run.
pub struct Config {
    pub output_dir: String,
    pub asset_type: AssetType,
    pub file_format: FileFormat,
    pub db_path: String,
}

impl Config {
    pub fn new() -> Self {
        Self {
            output_dir: "data".to_string(),
            asset_type: AssetType::Equities,
            file_format: FileFormat::Csv,
            db_path: "data/prices.db".to_string(),
        }
    }

    pub fn with_output_dir(mut self, dir: &str) -> Self {
        self.output_dir = dir.to_string();
        self
    }

    pub fn with_asset_type(mut self, asset_type: AssetType) -> Self {
        self.asset_type = asset_type;
        self
    }

    pub fn with_file_format(mut self, format: FileFormat) -> Self {
        self.file_format = format;
        self
    }

    pub fn with_db_path(mut self, path: &str) -> Self {
        self.db_path = path.to_string();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
