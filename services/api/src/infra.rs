use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::NaiveDate;
use clinic_rota::calendar;
use clinic_rota::error::AppError;
use clinic_rota::workflows::roster::SchedulingWindow;
use clinic_rota::workflows::store::{StaffingStore, StoreConfiguration};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use crate::seed::sample_configuration;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    calendar::parse_iso_date(raw).ok_or_else(|| format!("failed to parse '{raw}' as YYYY-MM-DD"))
}

/// Build a store from a JSON configuration file, or from the sample roster when no file is
/// given. The configured window applies unless the file supplies its own.
pub(crate) fn load_store(
    config_path: Option<&Path>,
    window: &SchedulingWindow,
) -> Result<StaffingStore, AppError> {
    let mut store = StaffingStore::new();
    store.set_window(*window);

    let configuration = match config_path {
        Some(path) => {
            info!(path = %path.display(), "loading store configuration");
            let reader = BufReader::new(File::open(path)?);
            StoreConfiguration::from_reader(reader)?
        }
        None => sample_configuration(window)?,
    };
    store.apply_configuration(configuration)?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn window() -> SchedulingWindow {
        SchedulingWindow::new(
            NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date"),
            NaiveDate::from_ymd_opt(2026, 3, 27).expect("valid date"),
        )
        .expect("valid window")
    }

    #[test]
    fn parse_date_reports_the_raw_value() {
        assert!(parse_date("2026-01-12").is_ok());
        let message = parse_date("next week").expect_err("not a date");
        assert!(message.contains("next week"));
    }

    #[test]
    fn configuration_file_keeps_configured_window_when_it_has_none() {
        let path = std::env::temp_dir().join(format!("clinic-rota-api-{}.json", std::process::id()));
        let mut file = File::create(&path).expect("create config");
        file.write_all(br#"{ "providers": [{ "id": "KC" }] }"#)
            .expect("write config");

        let store = load_store(Some(&path), &window()).expect("store loads");
        std::fs::remove_file(&path).ok();

        assert_eq!(store.providers().len(), 1);
        assert_eq!(store.window().map(|window| window.end()), Some(window().end()));
    }

    #[test]
    fn malformed_configuration_file_is_a_seed_error() {
        let path = std::env::temp_dir().join(format!("clinic-rota-api-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").expect("write config");

        let result = load_store(Some(&path), &window());
        std::fs::remove_file(&path).ok();

        match result {
            Err(AppError::Seed(_)) => {}
            Err(other) => panic!("expected seed error, got {other}"),
            Ok(_) => panic!("expected seed error, got a store"),
        }
    }
}
