use std::path::PathBuf;
use std::time::Duration;

use crate::app::AppConfig;

#[derive(Clone, Debug)]
pub struct GlobalArgs {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub timeout: Duration,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, data_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            api_url,
            data_dir,
            timeout,
        }
    }

    #[must_use]
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            api_url: self.api_url.clone(),
            data_dir: self.data_dir.clone(),
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            "https://api.opoadmin.dev/api".to_string(),
            PathBuf::from("/tmp/opoadmin"),
            Duration::from_secs(10),
        );
        assert_eq!(args.api_url, "https://api.opoadmin.dev/api");

        let config = args.app_config();
        assert_eq!(config.api_url, args.api_url);
        assert_eq!(config.data_dir, args.data_dir);
        assert_eq!(config.timeout, args.timeout);
    }
}
