use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use omrin_core::CoordinatorOptions;
use omrin_provider::BASE_URL;

const DEFAULT_UPDATE_INTERVAL_HOURS: u64 = 12;
const DEFAULT_COOLDOWN_SECS: u64 = 10;
const DEFAULT_LOG_FILE: &str = "omrin.log";

/// Values read from the environment (and `.env`) at startup.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub postal_code: String,
    pub house_number: String,
    pub date_format: Option<String>,
    pub update_interval: Duration,
    pub cooldown: Duration,
    pub immediate: bool,
    pub base_url: String,
    pub log_file: PathBuf,
}

impl Settings {
    pub(crate) fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let update_interval_hours = lookup("OMRIN_UPDATE_INTERVAL_HOURS")
            .map_or(Ok(DEFAULT_UPDATE_INTERVAL_HOURS), |raw| raw.trim().parse())
            .context("OMRIN_UPDATE_INTERVAL_HOURS must be a whole number of hours")?;
        if update_interval_hours == 0 {
            anyhow::bail!("OMRIN_UPDATE_INTERVAL_HOURS must be at least 1");
        }

        let cooldown_secs = lookup("OMRIN_REFRESH_COOLDOWN_SECS")
            .map_or(Ok(DEFAULT_COOLDOWN_SECS), |raw| raw.trim().parse())
            .context("OMRIN_REFRESH_COOLDOWN_SECS must be a whole number of seconds")?;

        let immediate = lookup("OMRIN_REFRESH_IMMEDIATE")
            .map_or(Ok(true), |raw| raw.trim().to_lowercase().parse())
            .context("OMRIN_REFRESH_IMMEDIATE must be true or false")?;

        Ok(Self {
            postal_code: lookup("OMRIN_POSTAL_CODE").context("OMRIN_POSTAL_CODE must be set")?,
            house_number: lookup("OMRIN_HOUSE_NUMBER").context("OMRIN_HOUSE_NUMBER must be set")?,
            date_format: lookup("OMRIN_DATE_FORMAT").filter(|format| !format.is_empty()),
            update_interval: Duration::from_secs(update_interval_hours * 60 * 60),
            cooldown: Duration::from_secs(cooldown_secs),
            immediate,
            base_url: lookup("OMRIN_BASE_URL").unwrap_or_else(|| BASE_URL.to_owned()),
            log_file: lookup("OMRIN_LOG_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from),
        })
    }

    pub(crate) fn coordinator_options(&self) -> CoordinatorOptions {
        CoordinatorOptions {
            update_interval: self.update_interval,
            cooldown: self.cooldown,
            immediate: self.immediate,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_address_is_set() {
        let settings =
            settings(&[("OMRIN_POSTAL_CODE", "8921AB"), ("OMRIN_HOUSE_NUMBER", "12")]).unwrap();

        assert_eq!(settings.update_interval, Duration::from_secs(12 * 60 * 60));
        assert_eq!(settings.cooldown, Duration::from_secs(10));
        assert!(settings.coordinator_options().immediate);
        assert_eq!(settings.base_url, BASE_URL);
        assert_eq!(settings.date_format, None);
        assert_eq!(settings.log_file, PathBuf::from("omrin.log"));
    }

    #[test]
    fn reads_overrides() {
        let settings = settings(&[
            ("OMRIN_POSTAL_CODE", "8921AB"),
            ("OMRIN_HOUSE_NUMBER", "12a"),
            ("OMRIN_DATE_FORMAT", "%d-%m-%Y"),
            ("OMRIN_UPDATE_INTERVAL_HOURS", "1"),
            ("OMRIN_REFRESH_COOLDOWN_SECS", "0"),
            ("OMRIN_REFRESH_IMMEDIATE", "False"),
        ])
        .unwrap();

        assert_eq!(settings.date_format.as_deref(), Some("%d-%m-%Y"));
        assert_eq!(settings.coordinator_options().update_interval, Duration::from_secs(3600));
        assert_eq!(settings.coordinator_options().cooldown, Duration::ZERO);
        assert!(!settings.coordinator_options().immediate);
    }

    #[test]
    fn address_is_required() {
        assert!(settings(&[("OMRIN_HOUSE_NUMBER", "12")]).is_err());
        assert!(settings(&[("OMRIN_POSTAL_CODE", "8921AB")]).is_err());
    }

    #[test]
    fn rejects_bad_interval() {
        let base = [("OMRIN_POSTAL_CODE", "8921AB"), ("OMRIN_HOUSE_NUMBER", "12")];
        assert!(settings(&[base[0], base[1], ("OMRIN_UPDATE_INTERVAL_HOURS", "soon")]).is_err());
        assert!(settings(&[base[0], base[1], ("OMRIN_UPDATE_INTERVAL_HOURS", "0")]).is_err());
    }

    #[test]
    fn rejects_bad_immediate_flag() {
        let base = [("OMRIN_POSTAL_CODE", "8921AB"), ("OMRIN_HOUSE_NUMBER", "12")];
        assert!(settings(&[base[0], base[1], ("OMRIN_REFRESH_IMMEDIATE", "later")]).is_err());
    }
}
