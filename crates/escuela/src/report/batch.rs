/// Sequential export of several reports with up-front path validation
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use tracing::info;

use super::{
    CourseReport, CourseScheduleReport, ExportSummary, Report, TeacherScheduleReport,
};
use crate::error::ReportError;
use crate::model::{CourseKey, School, TeacherKey};

/// One report paired with the entity it exports.
#[derive(Debug, Clone)]
pub enum ExportJob {
    Course(CourseReport, CourseKey),
    CourseSchedule(CourseScheduleReport, CourseKey),
    TeacherSchedule(TeacherScheduleReport, TeacherKey),
}

impl ExportJob {
    pub fn path(&self) -> &Path {
        match self {
            ExportJob::Course(report, _) => report.path(),
            ExportJob::CourseSchedule(report, _) => report.path(),
            ExportJob::TeacherSchedule(report, _) => report.path(),
        }
    }

    pub fn run(&self, school: &School) -> Result<ExportSummary, ReportError> {
        match self {
            ExportJob::Course(report, course) => report.export(school, *course),
            ExportJob::CourseSchedule(report, course) => report.export(school, *course),
            ExportJob::TeacherSchedule(report, teacher) => report.export(school, *teacher),
        }
    }
}

/// A list of exports that must each target a distinct file.
#[derive(Debug, Clone, Default)]
pub struct ExportBatch {
    jobs: Vec<ExportJob>,
}

impl ExportBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, job: ExportJob) -> &mut Self {
        self.jobs.push(job);
        self
    }

    pub fn course_report(&mut self, path: impl Into<PathBuf>, course: CourseKey) -> &mut Self {
        self.push(ExportJob::Course(CourseReport::new(path), course))
    }

    pub fn course_schedule(&mut self, path: impl Into<PathBuf>, course: CourseKey) -> &mut Self {
        self.push(ExportJob::CourseSchedule(
            CourseScheduleReport::new(path),
            course,
        ))
    }

    pub fn teacher_schedule(
        &mut self,
        path: impl Into<PathBuf>,
        teacher: TeacherKey,
    ) -> &mut Self {
        self.push(ExportJob::TeacherSchedule(
            TeacherScheduleReport::new(path),
            teacher,
        ))
    }

    pub fn jobs(&self) -> &[ExportJob] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Rejects the batch if two jobs write the same destination.
    ///
    /// Paths are compared after dropping `.` components; symlinks and
    /// `..` are not resolved.
    pub fn validate(&self) -> Result<(), ReportError> {
        let mut seen = HashSet::new();
        for job in &self.jobs {
            let normalized: PathBuf = job
                .path()
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect();
            if !seen.insert(normalized) {
                return Err(ReportError::DuplicatePath {
                    path: job.path().to_path_buf(),
                });
            }
        }
        Ok(())
    }

    /// Validates, then runs every job in order, stopping at the first failure.
    pub fn run(&self, school: &School) -> Result<Vec<ExportSummary>, ReportError> {
        self.validate()?;

        let mut summaries = Vec::with_capacity(self.jobs.len());
        for job in &self.jobs {
            summaries.push(job.run(school)?);
        }

        info!("Exported {} reports", summaries.len());
        Ok(summaries)
    }
}
