//! Seeds the sample school, persists it and writes the sample reports.

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::db::{SchoolStore, SqliteStore};
use crate::model::{ConflictKind, School};
use crate::report::{
    course_report_file, course_schedule_file, teacher_schedule_file, ExportBatch, ExportSummary,
};
use crate::seed::{sample_school, SampleSchool};

/// Runs the whole bootstrap against the configured database and output directory.
pub fn run(config: &AppConfig) -> anyhow::Result<Vec<ExportSummary>> {
    let mut store = SqliteStore::open_target(&config.database)
        .with_context(|| format!("Failed to open database {}", config.database))?;
    store
        .provision()
        .context("Failed to provision school tables")?;

    let sample = sample_school().context("Failed to build sample records")?;
    let mut school = sample.school.clone();
    store
        .commit(&mut school)
        .context("Failed to commit sample records")?;

    log_conflicts(&school);

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let batch = sample_exports(&school, &sample, &config.output_dir)?;
    let summaries = batch.run(&school).context("Failed to export reports")?;

    info!(
        "Bootstrap finished, {} reports in {}",
        summaries.len(),
        config.output_dir.display()
    );
    Ok(summaries)
}

/// The five sample exports: student lists and schedules for Python and C,
/// and the schedule of Agustin Olmedo.
pub fn sample_exports(
    school: &School,
    sample: &SampleSchool,
    output_dir: &Path,
) -> anyhow::Result<ExportBatch> {
    let mut batch = ExportBatch::new();

    for course in [sample.python, sample.c] {
        let entity = school.course(course)?;
        batch.course_report(output_dir.join(course_report_file(entity)), course);
    }
    for course in [sample.python, sample.c] {
        let entity = school.course(course)?;
        batch.course_schedule(output_dir.join(course_schedule_file(entity)), course);
    }

    let olmedo = school.teacher(sample.olmedo)?;
    batch.teacher_schedule(
        output_dir.join(teacher_schedule_file(olmedo)),
        sample.olmedo,
    );

    Ok(batch)
}

fn log_conflicts(school: &School) {
    for conflict in school.schedule_conflicts() {
        let owner = match conflict.kind {
            ConflictKind::Teacher(teacher) => school
                .teacher(teacher)
                .map(|t| format!("teacher {}", t))
                .unwrap_or_default(),
            ConflictKind::Course(course) => school
                .course(course)
                .map(|c| format!("course {}", c))
                .unwrap_or_default(),
        };
        warn!(
            "Schedule slots #{} and #{} overlap for {}",
            conflict.first.index(),
            conflict.second.index(),
            owner
        );
    }
}
