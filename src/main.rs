use std::env;

use anganwadi_attendance::{
    ApiClient, AttendanceController, AttendanceFilter, Config, FileCapture, HistoryView, JsonFileStore, PersonKind,
    RoleConfig, RowAction, StaticToken, SubjectId, SystemClock, WindowKind, logger,
};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    logger::init(&config.log_dir, config.log_echo);
    logger::info("Attendance client started");

    let kind: PersonKind = match env::var("ATTENDANCE_ROLE").unwrap_or_else(|_| "student".to_string()).parse() {
        Ok(kind) => kind,
        Err(e) => {
            logger::error(e.to_string());
            std::process::exit(2);
        }
    };

    let auth = StaticToken::from_config(&config);
    if config.api_token.is_none() {
        logger::error("No API_TOKEN or encrypted token configured");
        std::process::exit(2);
    }

    let backend = match ApiClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            logger::error(format!("Could not build HTTP client: {}", e));
            std::process::exit(1);
        }
    };

    let image_path = env::var("VERIFY_IMAGE_PATH").unwrap_or_default();

    logger::info(format!(
        "Role: {}, API_BASE_URL: {}, ATTENDANCE_TZ: {}, MARKER_STORE_PATH: {}",
        kind,
        config.api_base_url,
        config.time_zone,
        config.marker_store_path.display()
    ));

    let controller = AttendanceController::new(
        RoleConfig::for_kind(kind),
        backend,
        auth,
        FileCapture::new(&image_path),
        JsonFileStore::new(&config.marker_store_path),
        SystemClock::new(config.time_zone),
    )
    .with_upload_timeout(config.request_timeout);

    let mounted = controller.mount().await;
    if mounted.daily_reset {
        println!("New day: daily state reset");
    }
    if let Some(message) = controller.roster_error() {
        println!("{}", message);
    }

    for (index, row) in controller.rows().iter().enumerate() {
        let action = match &row.action {
            RowAction::Verify(_) => "[Verify]".to_string(),
            RowAction::InProgress(stage) => format!("[{}...]", stage),
            RowAction::None => String::new(),
        };
        println!(
            "{}. {} ({}) {} {}",
            index + 1,
            row.person.display_name(),
            row.key,
            row.status,
            action
        );
    }

    if controller.role().shows_history {
        let filter = match env::var("HISTORY_FILTER").ok().map(|v| v.parse::<WindowKind>()) {
            Some(Ok(kind)) => AttendanceFilter { kind, date: env::var("HISTORY_DATE").ok() },
            Some(Err(e)) => {
                logger::warn(format!("{}; showing today", e));
                AttendanceFilter::default()
            }
            None => AttendanceFilter::default(),
        };

        println!("Filter By: {}", filter.kind.label());
        match controller.history(&filter) {
            HistoryView::NoRecords => println!("No attendance records found"),
            HistoryView::Records(records) => {
                for record in records {
                    println!(
                        "#{} subject {} on {} ({:?})",
                        record.id,
                        record.subject_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
                        record.attendance_date,
                        record.attendance_mode
                    );
                }
            }
        }
    }

    if let Ok(raw_id) = env::var("VERIFY_SUBJECT_ID") {
        let Ok(id) = raw_id.trim().parse::<i64>() else {
            logger::error(format!("VERIFY_SUBJECT_ID '{}' is not a number", raw_id));
            std::process::exit(2);
        };

        let outcome = controller.verify(SubjectId(id)).await;
        if let Some(message) = outcome.user_message() {
            println!("{}", message);
        }
        logger::info(format!("Verification of {} finished: {:?}", id, outcome));
    }
}
