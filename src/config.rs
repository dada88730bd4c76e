use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_VALUES_FILE: &str = "LifeExpectancyWorldBank.csv";
const DEFAULT_SHAPES_FILE: &str = "countries.geo.json";
const DEFAULT_LOG_FILE: &str = "lifexp-map.log";

/// Where the input files and the log live. Fixed at startup, no overrides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub values_file: String,
    pub shapes_file: String,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            values_file: DEFAULT_VALUES_FILE.to_string(),
            shapes_file: DEFAULT_SHAPES_FILE.to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    pub fn values_path(&self) -> PathBuf {
        self.data_dir.join(&self.values_file)
    }

    pub fn shapes_path(&self) -> PathBuf {
        self.data_dir.join(&self.shapes_file)
    }
}
