use anyhow::{Context, Error};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub fn load_toml<T, P: AsRef<Path>>(path: P) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let s = fs::read_to_string(path)
        .with_context(|| format!("can't read file {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("can't parse TOML content from {}", path.display()))
}

pub fn save_toml<T, P: AsRef<Path>>(data: &T, path: P) -> Result<(), Error>
where
    T: Serialize,
{
    let path = path.as_ref();
    let s = toml::to_string(data).context("can't convert to TOML format")?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("can't create directory {}", parent.display()))?;
    }

    fs::write(path, &s).with_context(|| format!("can't write to file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn save_creates_missing_directories() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("nested").join("sample.toml");
        let sample = Sample {
            name: "inbox".to_string(),
            count: 2,
        };

        save_toml(&sample, &path)?;

        assert_eq!(load_toml::<Sample, _>(&path)?, sample);
        Ok(())
    }

    #[test]
    fn load_reports_the_offending_path() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("broken.toml");
        fs::write(&path, "name = ")?;

        let err = load_toml::<Sample, _>(&path).unwrap_err();

        assert!(format!("{}", err).contains("broken.toml"));
        Ok(())
    }
}
