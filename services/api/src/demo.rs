use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use clap::Args;
use clinic_rota::calendar;
use clinic_rota::config::AppConfig;
use clinic_rota::error::AppError;
use clinic_rota::workflows::coverage::{FairnessRow, SiteGaps, WeekBoard};
use clinic_rota::workflows::roster::RosterImporter;
use clinic_rota::workflows::store::StaffingStore;
use clinic_rota::workflows::vacation::{VacationBlock, VacationDraft};

use crate::infra::load_store;

const DEMO_APPROVER: &str = "chief";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// JSON store configuration to load instead of the bundled sample roster
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Site schedule CSV (date, block, site_type, site, provider, role)
    #[arg(long)]
    pub(crate) schedule_csv: Option<PathBuf>,
    /// Call roster CSV (date, label, type, provider)
    #[arg(long)]
    pub(crate) calls_csv: Option<PathBuf>,
    /// Week to render on the coverage board (YYYY-MM-DD). Defaults to the window's first week.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) week_start: Option<NaiveDate>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        config,
        schedule_csv,
        calls_csv,
        week_start,
    } = args;

    let app_config = AppConfig::load()?;
    let config_path = config.or(app_config.scheduling.config_path);
    let mut store = load_store(config_path.as_deref(), &app_config.scheduling.window)?;

    if let Some(path) = schedule_csv {
        let schedule = RosterImporter::schedule_from_path(&path)?;
        println!(
            "Imported {} site assignments from {}",
            schedule.len(),
            path.display()
        );
        store.set_schedule(schedule);
    }
    if let Some(path) = calls_csv {
        let calls = RosterImporter::calls_from_path(&path)?;
        println!("Imported {} call assignments from {}", calls.len(), path.display());
        store.set_call_assignments(calls);
    }

    let changes = Arc::new(AtomicUsize::new(0));
    let counter = changes.clone();
    let subscription = store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::Relaxed);
    });

    println!("Clinic rota demo");
    if let Some(window) = store.window() {
        println!(
            "- Scheduling window {} to {} ({} weeks)",
            calendar::format_display(window.start()),
            calendar::format_display(window.end()),
            window.weeks().len()
        );
    }
    println!(
        "- {} providers | {} holidays",
        store.providers().len(),
        store.get_state().holidays.len()
    );

    run_vacation_scenario(&mut store)?;

    if let Some(year) = store.active_year() {
        println!("\nAllowances for {}", year);
        for row in store.allowance_overview(year) {
            match row.allowance {
                Some(record) => println!(
                    "  - {}: {:.1} of {:.1} days left | AM {} | PM {}",
                    row.provider.display_label(),
                    record.days_available(),
                    record.days_total,
                    quota_label(record.am_available()),
                    quota_label(record.pm_available())
                ),
                None => println!("  - {}: no allowance on file", row.provider.display_label()),
            }
        }
    }

    render_fairness("Weekend call", &store.weekend_call_deltas());
    render_fairness("Hospital days", &store.hospital_day_deltas());

    match store.week_board(week_start) {
        Ok(board) => {
            render_board(&board);
            match store.coverage_gaps(Some(board.week_start)) {
                Ok(gaps) => render_gaps(&gaps),
                Err(err) => println!("  Coverage gaps unavailable: {}", err),
            }
        }
        Err(err) => println!("\nCoverage board unavailable: {}", err),
    }

    subscription.unsubscribe();
    println!(
        "\n{} state changes broadcast during the demo",
        changes.load(Ordering::Relaxed)
    );
    Ok(())
}

/// Draft, submit and approve a full day for the first provider, then try to book the first
/// holiday in the window.
fn run_vacation_scenario(store: &mut StaffingStore) -> Result<(), AppError> {
    let Some(provider) = store.providers().first().map(|provider| provider.id.clone()) else {
        println!("\nNo providers configured; skipping the vacation walkthrough");
        return Ok(());
    };
    let Some(window) = store.window().copied() else {
        return Ok(());
    };
    let holidays = store.get_state().holidays;
    let Some(day) = calendar::weekdays_between(window.start(), window.end())
        .into_iter()
        .find(|date| holidays.iter().all(|holiday| holiday.date != *date))
    else {
        println!("\nNo open weekday in the window; skipping the vacation walkthrough");
        return Ok(());
    };

    println!("\nVacation walkthrough for {}", provider);
    let draft = VacationDraft::new(provider.as_str(), VacationBlock::FullDay, day, day)
        .with_notes("demo request");
    let request = store.create_vacation_draft(draft)?;
    println!(
        "- Drafted {} for {} ({})",
        request.id,
        calendar::format_display(request.start_date),
        request.block
    );
    let request = store.submit_vacation_request(&request.id, provider.as_str())?;
    println!("- {} is now {}", request.id, request.status);

    match store.approve_vacation_request(&request.id, DEMO_APPROVER) {
        Ok(approved) => println!(
            "- {} {} by {}",
            approved.id,
            approved.status,
            approved.approver_id.as_deref().unwrap_or(DEMO_APPROVER)
        ),
        Err(err) => println!("- Approval rejected: {}", err),
    }

    if let Some(holiday) = holidays.first() {
        let draft = VacationDraft::new(provider.as_str(), VacationBlock::Am, holiday.date, holiday.date);
        match store.create_vacation_draft(draft) {
            Ok(request) => println!("- Unexpectedly drafted {} on {}", request.id, holiday.name),
            Err(err) => println!(
                "- AM request on {} rejected ({}): {}",
                holiday.name,
                err.kind().label(),
                err
            ),
        }
    }
    Ok(())
}

fn quota_label(available: Option<f64>) -> String {
    available.map_or_else(|| "untracked".to_string(), |units| format!("{:.1}", units))
}

fn render_fairness(title: &str, rows: &[FairnessRow]) {
    println!("\n{} fairness (actual vs target)", title);
    if rows.is_empty() {
        println!("  (no providers)");
        return;
    }
    for row in rows {
        println!(
            "  - {}: {} vs {:.1} ({:+.1})",
            row.provider, row.actual, row.target, row.delta
        );
    }
}

fn render_board(board: &WeekBoard) {
    println!(
        "\nCoverage board for the week of {}",
        calendar::format_display(board.week_start)
    );
    for day in &board.days {
        println!("  {}", day.display);
        for (label, slots) in [("AM", &day.am), ("PM", &day.pm)] {
            if slots.is_empty() {
                continue;
            }
            let entries: Vec<String> = slots
                .iter()
                .map(|slot| format!("{} {}", slot.site, slot.display_provider()))
                .collect();
            println!("    {}: {}", label, entries.join(", "));
        }
    }

    let calls = &board.calls;
    if calls.is_empty() {
        println!("  No call coverage this week");
        return;
    }
    for (label, provider) in &calls.weekday_noninvasive {
        println!("  Call {} (non-invasive): {}", label, provider);
    }
    for (label, provider) in &calls.weekday_interventional {
        println!("  Call {} (interventional): {}", label, provider);
    }
    for slot in &calls.weekend_noninvasive {
        println!("  Weekend {} (non-invasive): {}", slot.label, slot.provider);
    }
    for slot in &calls.weekend_interventional {
        println!("  Weekend {} (interventional): {}", slot.label, slot.provider);
    }
}

fn render_gaps(report: &[SiteGaps]) {
    if report.is_empty() {
        println!("  Every known site is staffed on open days");
        return;
    }
    println!("  Unstaffed sessions:");
    for site in report {
        let slots: Vec<String> = site
            .gaps
            .iter()
            .map(|slot| {
                format!(
                    "{} {}",
                    calendar::format_display(slot.date),
                    slot.block.label()
                )
            })
            .collect();
        println!("    {}: {}", site.site, slots.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untracked_quotas_are_labelled() {
        assert_eq!(quota_label(None), "untracked");
        assert_eq!(quota_label(Some(17.5)), "17.5");
    }

    #[test]
    fn scenario_approves_one_day_against_the_sample_roster() {
        let window = clinic_rota::workflows::roster::SchedulingWindow::new(
            NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date"),
            NaiveDate::from_ymd_opt(2026, 3, 27).expect("valid date"),
        )
        .expect("valid window");
        let mut store = load_store(None, &window).expect("sample store loads");

        run_vacation_scenario(&mut store).expect("scenario runs");

        let vacations = store.vacations();
        assert_eq!(vacations.len(), 1);
        assert_eq!(vacations[0].status.to_string(), "APPROVED");
        let record = store
            .allowance_summary(&vacations[0].provider_id, 2026)
            .expect("allowance on file");
        assert!((record.days_used - 3.0).abs() < 1e-9);
    }
}
