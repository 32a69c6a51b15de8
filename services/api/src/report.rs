use crate::cli::{DeleteArgs, MoveArgs};
use crate::infra::build_engine;
use job_board::board::{
    AnalyticsReport, Application, ApplicationId, BoardColumn, BoardEngine, DashboardSummary,
    HttpApplicationStore,
};
use job_board::config::AppConfig;
use job_board::error::AppError;
use job_board::telemetry;

async fn loaded_engine() -> Result<BoardEngine<HttpApplicationStore>, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let engine = build_engine(&config.store)?;
    let report = engine.load().await?;
    if !report.rejected.is_empty() {
        println!(
            "Skipped {} malformed record(s) from {}",
            report.rejected.len(),
            config.store.base_url
        );
    }
    Ok(engine)
}

pub(crate) async fn run_board() -> Result<(), AppError> {
    let engine = loaded_engine().await?;
    println!("{}", render_board(&engine.board()));
    Ok(())
}

pub(crate) async fn run_dashboard() -> Result<(), AppError> {
    let engine = loaded_engine().await?;
    println!("{}", render_dashboard(&engine.dashboard()));
    Ok(())
}

pub(crate) async fn run_analytics() -> Result<(), AppError> {
    let engine = loaded_engine().await?;
    println!("{}", render_analytics(&engine.analytics()));
    Ok(())
}

pub(crate) async fn run_move(args: MoveArgs) -> Result<(), AppError> {
    let engine = loaded_engine().await?;
    let moved = engine
        .request_transition(ApplicationId(args.id), args.status)
        .await?;

    println!("Moved {} to {}", card_line(&moved), moved.status);
    println!("{}", render_board(&engine.board()));
    Ok(())
}

pub(crate) async fn run_delete(args: DeleteArgs) -> Result<(), AppError> {
    let engine = loaded_engine().await?;
    let removed = engine.delete(ApplicationId(args.id)).await?;

    println!("Deleted {}", card_line(&removed));
    Ok(())
}

fn card_line(application: &Application) -> String {
    let mut line = format!(
        "#{} {} @ {}",
        application.id, application.title, application.company
    );
    if let Some(work_model) = application.work_model {
        line.push_str(&format!(" [{}]", work_model.label()));
    }
    if let Some(created_at) = application.created_at {
        line.push_str(&format!(" (added {created_at})"));
    }
    line
}

pub(crate) fn render_board(columns: &[BoardColumn]) -> String {
    let mut lines = Vec::new();
    for column in columns {
        lines.push(format!("{} ({})", column.status_label, column.count));
        if column.cards.is_empty() {
            lines.push("  (empty)".to_string());
        }
        for card in &column.cards {
            lines.push(format!("  - {}", card_line(card)));
        }
    }
    lines.join("\n")
}

pub(crate) fn render_dashboard(summary: &DashboardSummary) -> String {
    let mut lines = vec![
        "Dashboard".to_string(),
        format!("Total applications: {}", summary.total),
        format!("Interviews: {}", summary.interviews),
        format!("Offers: {}", summary.offers),
        format!("Response rate: {}%", summary.response_rate),
        String::new(),
        "Recent applications".to_string(),
    ];

    if summary.recent.is_empty() {
        lines.push("- none yet".to_string());
    }
    for application in &summary.recent {
        lines.push(format!(
            "- {} ({})",
            card_line(application),
            application.status.label()
        ));
    }
    lines.join("\n")
}

pub(crate) fn render_analytics(report: &AnalyticsReport) -> String {
    let mut lines = vec![
        "Analytics".to_string(),
        format!("Total applications: {}", report.total),
        format!("Most common status: {}", report.most_common_label()),
        format!("Conversion rate: {}%", report.conversion_rate),
        String::new(),
        "By status".to_string(),
    ];

    for entry in &report.status_counts {
        lines.push(format!("- {}: {}", entry.status_label, entry.count));
    }

    lines.push(String::new());
    lines.push("By work model".to_string());
    for entry in &report.work_models {
        lines.push(format!("- {}: {}", entry.label, entry.count));
    }

    lines.push(String::new());
    lines.push("By month".to_string());
    for entry in &report.monthly {
        lines.push(format!("- {}: {}", entry.label, entry.count));
    }

    lines.join("\n")
}
