use attendance_etl::adapters::sources::{parse_roster, SourceFormat};
use attendance_etl::config::args::{Command, ImportArgs, MarkArgs, ReportKind, TemplateArgs};
use attendance_etl::config::toml_config::TomlConfig;
use attendance_etl::config::{ImportOverrides, ReportSettings};
use attendance_etl::core::export;
use attendance_etl::core::status::normalize_status;
use attendance_etl::core::Storage;
use attendance_etl::utils::error::{EtlError, Result};
use attendance_etl::utils::logger;
use attendance_etl::utils::validation::{parse_iso_date, parse_year_month, Validate};
use attendance_etl::{
    AttendanceImportPipeline, AttendanceStatus, CliConfig, Employee, ImportEngine, ImportSettings, JsonFileRepository,
    LocalStorage, MarkingService, ReportService,
};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    logger::init_logger(cli.log_format, cli.verbose);
    tracing::info!("Starting attendance-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let file_config = match load_file_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    let outcome = match cli.command {
        Command::Import(args) => run_import(args, &file_config).await,
        Command::Report { kind } => run_report(kind, &file_config).await,
        Command::Mark(args) => run_mark(args, &file_config).await,
        Command::Template(args) => run_template(args, &file_config).await,
    };

    if let Err(e) = outcome {
        exit_with(&e);
    }
}

fn load_file_config(path: Option<&str>) -> Result<TomlConfig> {
    let Some(path) = path else {
        return Ok(TomlConfig::default());
    };

    tracing::info!("📁 Loading configuration from: {}", path);
    let config = TomlConfig::from_file(path)?;
    config.validate()?;
    Ok(config)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Storage for paths given on the command line; relative paths resolve against the working directory.
fn working_dir_storage() -> LocalStorage {
    LocalStorage::new(".")
}

fn store_repository(store_path: &str) -> JsonFileRepository<LocalStorage> {
    JsonFileRepository::new(working_dir_storage(), store_path)
}

async fn run_import(args: ImportArgs, file_config: &TomlConfig) -> Result<()> {
    let settings = ImportSettings::resolve(ImportOverrides::from(args), file_config, today())?;
    tracing::info!(
        "📋 Importing {} against {} (fallback date {}, {})",
        settings.rows_file,
        settings.roster_file,
        settings.fallback_date,
        if settings.commit { "commit" } else { "preview" }
    );

    let monitor_enabled = settings.monitor;
    let repository = store_repository(&settings.store_path);
    let pipeline = AttendanceImportPipeline::new(working_dir_storage(), repository, settings);
    let engine = ImportEngine::new_with_monitoring(pipeline, monitor_enabled);

    let outcome = engine.run().await?;
    let summary = &outcome.summary;

    println!(
        "✅ {} valid records, {} errors",
        summary.valid_records, summary.errors
    );
    for line in &outcome.error_digest {
        println!("   {}", line);
    }
    if summary.committed > 0 {
        println!("💾 Committed {} records", summary.committed);
    }
    println!("📁 Import bundle saved to: {}", summary.bundle_path);
    Ok(())
}

async fn read_roster(roster_file: &str) -> Result<Vec<Employee>> {
    let format = SourceFormat::from_path("import.roster_file", roster_file)?;
    let data = working_dir_storage().read_file(roster_file).await?;
    parse_roster(&data, format)
}

async fn write_output(output_dir: &str, file_name: &str, contents: &str) -> Result<String> {
    let path = Path::new(output_dir).join(file_name).to_string_lossy().into_owned();
    working_dir_storage().write_file(&path, contents.as_bytes()).await?;
    Ok(path)
}

async fn run_report(kind: ReportKind, file_config: &TomlConfig) -> Result<()> {
    match kind {
        ReportKind::Daily { date, source } => {
            let date = parse_iso_date("date", &date)?;
            let settings = ReportSettings::resolve(source.roster, source.store, source.output, file_config)?;
            let roster = read_roster(&settings.roster_file).await?;

            let service = ReportService::new(store_repository(&settings.store_path));
            let report = service.daily(&roster, date, source.employee.as_deref()).await?;

            let csv = export::daily_report_csv(&report)?;
            let path = write_output(&settings.output_path, &export::daily_report_filename(date), &csv).await?;

            let summary = &report.summary;
            println!(
                "📅 {}: {} employees, {} marked, {} present, {} absent",
                date, summary.total_employees, summary.total_marked, summary.total_present, summary.total_absent
            );
            println!("📁 Report saved to: {}", path);
        }
        ReportKind::Monthly { month, source } => {
            let (year, month) = parse_year_month("month", &month)?;
            let settings = ReportSettings::resolve(source.roster, source.store, source.output, file_config)?;
            let roster = read_roster(&settings.roster_file).await?;

            let service = ReportService::new(store_repository(&settings.store_path));
            let report = service.monthly(&roster, year, month, source.employee.as_deref()).await?;

            let csv = export::monthly_report_csv(&report)?;
            let path = write_output(&settings.output_path, &export::monthly_report_filename(year, month), &csv).await?;

            let summary = &report.summary;
            println!(
                "📅 {:04}-{:02} ({} days): {} employees, average {}%, {} present days, {} absent days",
                year,
                month,
                report.total_days,
                summary.total_employees,
                summary.average_attendance,
                summary.total_present_days,
                summary.total_absent_days
            );
            println!("📁 Report saved to: {}", path);
        }
        ReportKind::Roster { date, source } => {
            let date = parse_iso_date("date", &date)?;
            let settings = ReportSettings::resolve(source.roster, source.store, source.output, file_config)?;
            let roster = read_roster(&settings.roster_file).await?;

            let service = MarkingService::new(store_repository(&settings.store_path));
            let day = service.roster_day(&roster, date).await?;

            for entry in day
                .entries
                .iter()
                .filter(|e| source.employee.as_deref().is_none_or(|id| e.employee_id == id))
            {
                println!("   {:<8} {:<24} {:<16} {}", entry.employee_id, entry.employee_name, entry.department_name, entry.status);
            }

            let csv = export::roster_day_csv(&day)?;
            let path = write_output(&settings.output_path, &export::roster_day_filename(date), &csv).await?;

            let summary = &day.summary;
            println!(
                "📅 {}: {} employees, {} present, {} absent, {} not marked",
                date, summary.total, summary.present, summary.absent, summary.not_marked
            );
            println!("📁 Report saved to: {}", path);
        }
    }
    Ok(())
}

fn parse_status(token: &str) -> Result<AttendanceStatus> {
    normalize_status(token).map_err(|reason| EtlError::ValidationError {
        message: reason.to_string(),
    })
}

async fn run_mark(args: MarkArgs, file_config: &TomlConfig) -> Result<()> {
    let date = match args.date {
        Some(text) => parse_iso_date("date", &text)?,
        None => today(),
    };
    let status = parse_status(&args.status)?;
    let settings = ReportSettings::resolve(args.roster, args.store, None, file_config)?;
    let roster = read_roster(&settings.roster_file).await?;
    let service = MarkingService::new(store_repository(&settings.store_path));

    match args.employee {
        Some(employee_id) => {
            let stored = service.mark(&roster, &employee_id, date, status).await?;
            println!(
                "✏️ Marked {} {} for {} (record {})",
                stored.record.employee_name, status, date, stored.id
            );
        }
        None => {
            let marked = service.mark_unmarked(&roster, date, status).await?;
            if marked.is_empty() {
                println!("ℹ️ No unmarked employees found for {}", date);
            } else {
                println!("✏️ Marked {} employees {} for {}", marked.len(), status, date);
            }
        }
    }
    Ok(())
}

async fn run_template(args: TemplateArgs, file_config: &TomlConfig) -> Result<()> {
    let date = match args.date {
        Some(text) => parse_iso_date("date", &text)?,
        None => today(),
    };
    let output = args
        .output
        .or_else(|| file_config.output.path.clone())
        .unwrap_or_else(|| attendance_etl::config::DEFAULT_OUTPUT_PATH.to_string());

    let csv = export::template_csv(date)?;
    let path = write_output(&output, &export::template_filename(date), &csv).await?;
    println!("📥 Template saved to: {}", path);
    Ok(())
}

fn exit_with(e: &EtlError) -> ! {
    tracing::error!(
        "❌ attendance-etl failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}
