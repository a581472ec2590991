use chrono::NaiveDate;
use clinic_rota::calendar;
use clinic_rota::workflows::roster::SchedulingWindow;
use clinic_rota::workflows::store::StoreConfiguration;
use serde_json::json;

/// Three-provider roster with a first week of site and call coverage, anchored on the
/// Monday of the window's first week.
pub(crate) fn sample_configuration(
    window: &SchedulingWindow,
) -> Result<StoreConfiguration, serde_json::Error> {
    let monday = calendar::iso_week_start(window.start()).unwrap_or(window.start());
    let day = |offset: i64| {
        calendar::shift_days(monday, offset)
            .map(calendar::to_iso_date)
            .unwrap_or_default()
    };
    let year = window.active_year();

    serde_json::from_value(json!({
        "window": {
            "start": calendar::to_iso_date(window.start()),
            "end": calendar::to_iso_date(window.end()),
        },
        "providers": [
            { "id": "JOO", "initials": "JOO", "fullName": "Joon Oh", "type": "MD" },
            { "id": "KC", "initials": "KC", "fullName": "Kara Chen", "type": "APN" },
            { "id": "APZ", "initials": "APZ", "fullName": "Aparna Zhao", "type": "MD" }
        ],
        "allowances": [
            { "providerId": "JOO", "year": year, "days_total": 20, "days_used": 2, "am_quota": 20, "pm_quota": 20, "am_used": 2, "pm_used": 1 },
            { "providerId": "KC", "year": year, "days_total": 18, "days_used": 1, "am_quota": 18, "pm_quota": 18, "am_used": 1, "pm_used": 0 },
            { "providerId": "APZ", "year": year, "days_total": 22, "days_used": 4, "am_quota": 22, "pm_quota": 22, "am_used": 3, "pm_used": 3 }
        ],
        "holidays": holidays_within(window),
        "scheduleAssignments": [
            { "date": day(0), "block": "AM", "siteType": "office", "site": "HH OFFICE", "provider": "JOO", "role": "MD" },
            { "date": day(0), "block": "PM", "siteType": "office", "site": "SVI DR", "provider": "KC", "role": "APN" },
            { "date": day(1), "block": "AM", "siteType": "hospital", "site": "WT HOSP", "provider": "APZ", "role": "MD" },
            { "date": day(2), "block": "PM", "siteType": "hospital", "site": "RMC", "provider": "JOO", "role": "MD" }
        ],
        "callAssignments": [
            { "date": day(0), "label": "Mon", "type": "weekday_noninvasive", "provider": "JOO" },
            { "date": day(1), "label": "Tue", "type": "weekday_interventional", "provider": "APZ" },
            { "date": day(4), "label": "Fri", "type": "weekend_noninvasive", "provider": "KC" },
            { "date": day(5), "label": "Sat", "type": "weekend_noninvasive", "provider": "JOO" },
            { "date": day(5), "label": "Sat INT", "type": "weekend_interventional", "provider": "APZ" }
        ],
        "fairnessTargets": {
            "weekendCall": { "JOO": 3, "KC": 2, "APZ": 4 },
            "hospitalDays": { "JOO": 10, "KC": 0, "APZ": 12 }
        }
    }))
}

/// Office closures observed by the practice, limited to the window.
fn holidays_within(window: &SchedulingWindow) -> Vec<serde_json::Value> {
    const CLOSURES: [(i32, u32, u32, &str); 2] = [
        (2026, 1, 19, "MLK Day"),
        (2026, 2, 16, "Presidents Day"),
    ];
    CLOSURES
        .iter()
        .filter_map(|(year, month, day, name)| {
            NaiveDate::from_ymd_opt(*year, *month, *day)
                .filter(|date| window.contains(*date))
                .map(|date| {
                    json!({
                        "date": calendar::to_iso_date(date),
                        "name": name,
                        "is_office_closed": true,
                        "extend_weekend": true,
                    })
                })
        })
        .collect()
}
