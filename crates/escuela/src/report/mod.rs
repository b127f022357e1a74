//! CSV reports over the school records graph.
//!
//! Each report is built with a destination path and exports one root entity:
//!
//! - [`CourseReport`]: one row per student of a course, `first last`
//! - [`CourseScheduleReport`]: one row per slot of a course, `day,start,end,teacher`
//! - [`TeacherScheduleReport`]: one row per slot of a teacher, `day,start,end,course`
//!
//! Files have no header row. Times are written as `HH:MM:SS`.

mod batch;
mod writer;

pub use batch::{ExportBatch, ExportJob};

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ReportError;
use crate::model::{format_time, Course, CourseKey, ScheduleSlot, School, Teacher, TeacherKey};

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// A report that turns one root entity into CSV rows.
pub trait Report {
    /// Handle of the entity the report starts from
    type Root: Copy + std::fmt::Debug;

    /// Destination file.
    fn path(&self) -> &Path;

    /// Builds every row without touching the file system.
    ///
    /// Fails with [`ReportError::InvalidArgument`] if `root` is not part of `school`.
    fn rows(&self, school: &School, root: Self::Root) -> Result<Vec<Vec<String>>, ReportError>;

    /// Creates or truncates the destination and writes all rows.
    fn export(&self, school: &School, root: Self::Root) -> Result<ExportSummary, ReportError> {
        let rows = self.rows(school, root)?;
        debug!("Exporting {:?} to {}", root, self.path().display());
        let written = writer::write_rows(self.path(), &rows)?;
        info!("Wrote {} rows to {}", written, self.path().display());
        Ok(ExportSummary {
            path: self.path().to_path_buf(),
            rows: written,
        })
    }
}

fn slot_times(slot: &ScheduleSlot) -> [String; 3] {
    [
        slot.day.to_string(),
        format_time(slot.start),
        format_time(slot.end),
    ]
}

/// Lists the students of a course.
#[derive(Debug, Clone)]
pub struct CourseReport {
    path: PathBuf,
}

impl CourseReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Report for CourseReport {
    type Root = CourseKey;

    fn path(&self) -> &Path {
        &self.path
    }

    fn rows(&self, school: &School, course: CourseKey) -> Result<Vec<Vec<String>>, ReportError> {
        Ok(school
            .course_students(course)?
            .into_iter()
            .map(|student| vec![student.full_name()])
            .collect())
    }
}

/// Lists the schedule of a course with the teacher of each slot.
#[derive(Debug, Clone)]
pub struct CourseScheduleReport {
    path: PathBuf,
}

impl CourseScheduleReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Report for CourseScheduleReport {
    type Root = CourseKey;

    fn path(&self) -> &Path {
        &self.path
    }

    fn rows(&self, school: &School, course: CourseKey) -> Result<Vec<Vec<String>>, ReportError> {
        Ok(school
            .course_slots(course)?
            .into_iter()
            .map(|slot| {
                let teacher = school
                    .teacher_of(slot)
                    .map(Teacher::full_name)
                    .unwrap_or_default();
                let [day, start, end] = slot_times(slot);
                vec![day, start, end, teacher]
            })
            .collect())
    }
}

/// Lists the schedule of a teacher with the course of each slot.
#[derive(Debug, Clone)]
pub struct TeacherScheduleReport {
    path: PathBuf,
}

impl TeacherScheduleReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Report for TeacherScheduleReport {
    type Root = TeacherKey;

    fn path(&self) -> &Path {
        &self.path
    }

    fn rows(&self, school: &School, teacher: TeacherKey) -> Result<Vec<Vec<String>>, ReportError> {
        Ok(school
            .teacher_slots(teacher)?
            .into_iter()
            .map(|slot| {
                let course = school
                    .course_of(slot)
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                let [day, start, end] = slot_times(slot);
                vec![day, start, end, course]
            })
            .collect())
    }
}

/// `curso_<CourseName>.csv`
pub fn course_report_file(course: &Course) -> String {
    format!("curso_{}.csv", course.name)
}

/// `curso_horario_<CourseName>.csv`
pub fn course_schedule_file(course: &Course) -> String {
    format!("curso_horario_{}.csv", course.name)
}

/// `profesor_horario_<First Last>.csv`
pub fn teacher_schedule_file(teacher: &Teacher) -> String {
    format!("profesor_horario_{}.csv", teacher.full_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Student, StudentKey};
    use chrono::NaiveTime;
    use std::fs;
    use tempfile::tempdir;

    fn at(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
    }

    struct Fixture {
        school: School,
        python: CourseKey,
        olmedo: TeacherKey,
        juan: StudentKey,
    }

    fn fixture() -> Fixture {
        let mut school = School::new();
        let python = school.add_course(Course::new("Python"));
        let juan = school.add_student(Student::new("Juan", "Perez"));
        school.set_student_course(juan, Some(python)).unwrap();
        let olmedo = school.add_teacher(Teacher::new("Agustin", "Olmedo"));
        let slot = school.add_slot(ScheduleSlot::new(1, at(16), at(18)));
        school.set_slot_course(slot, Some(python)).unwrap();
        school.set_slot_teacher(slot, Some(olmedo)).unwrap();
        Fixture {
            school,
            python,
            olmedo,
            juan,
        }
    }

    #[test]
    fn test_course_report_lists_students() {
        let fx = fixture();
        let dir = tempdir().unwrap();
        let path = dir.path().join("curso_Python.csv");

        let summary = CourseReport::new(&path).export(&fx.school, fx.python).unwrap();

        assert_eq!(summary.rows, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "Juan Perez\n");
    }

    #[test]
    fn test_course_schedule_report_names_teacher() {
        let fx = fixture();
        let dir = tempdir().unwrap();
        let path = dir.path().join("curso_horario_Python.csv");

        CourseScheduleReport::new(&path)
            .export(&fx.school, fx.python)
            .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "1,16:00:00,18:00:00,Agustin Olmedo\n"
        );
    }

    #[test]
    fn test_teacher_schedule_report_names_course() {
        let fx = fixture();
        let rows = TeacherScheduleReport::new("unused.csv")
            .rows(&fx.school, fx.olmedo)
            .unwrap();
        assert_eq!(rows, [["1", "16:00:00", "18:00:00", "Python"]]);
    }

    #[test]
    fn test_slot_without_teacher_renders_empty_field() {
        let mut fx = fixture();
        let slot = fx.school.add_slot(ScheduleSlot::new(3, at(8), at(10)));
        fx.school.set_slot_course(slot, Some(fx.python)).unwrap();

        let rows = CourseScheduleReport::new("unused.csv")
            .rows(&fx.school, fx.python)
            .unwrap();

        assert_eq!(rows[0], ["3", "08:00:00", "10:00:00", ""]);
        assert_eq!(rows[1][3], "Agustin Olmedo");
    }

    #[test]
    fn test_reassigned_student_moves_between_reports() {
        let mut fx = fixture();
        let c = fx.school.add_course(Course::new("C"));
        fx.school.set_student_course(fx.juan, Some(c)).unwrap();

        let report = CourseReport::new("unused.csv");
        assert!(report.rows(&fx.school, fx.python).unwrap().is_empty());
        assert_eq!(report.rows(&fx.school, c).unwrap(), [["Juan Perez"]]);
    }

    #[test]
    fn test_export_twice_is_byte_identical() {
        let fx = fixture();
        let dir = tempdir().unwrap();
        let path = dir.path().join("curso_horario_Python.csv");
        let report = CourseScheduleReport::new(&path);

        report.export(&fx.school, fx.python).unwrap();
        let first = fs::read(&path).unwrap();
        report.export(&fx.school, fx.python).unwrap();

        assert_eq!(fs::read(&path).unwrap(), first);
    }

    #[test]
    fn test_empty_course_gives_empty_files() {
        let mut fx = fixture();
        let java = fx.school.add_course(Course::new("Java"));
        let dir = tempdir().unwrap();
        let students = dir.path().join("curso_Java.csv");
        let schedule = dir.path().join("curso_horario_Java.csv");

        CourseReport::new(&students).export(&fx.school, java).unwrap();
        CourseScheduleReport::new(&schedule)
            .export(&fx.school, java)
            .unwrap();

        assert_eq!(fs::metadata(&students).unwrap().len(), 0);
        assert_eq!(fs::metadata(&schedule).unwrap().len(), 0);
    }

    #[test]
    fn test_unknown_root_is_invalid_argument_and_writes_nothing() {
        let fx = fixture();
        let dir = tempdir().unwrap();
        let path = dir.path().join("profesor_horario_Nadie.csv");

        let err = TeacherScheduleReport::new(&path)
            .export(&fx.school, TeacherKey(5))
            .unwrap_err();

        assert!(err.is_invalid_argument());
        assert!(!path.exists());
    }

    #[test]
    fn test_file_names() {
        let fx = fixture();
        let python = fx.school.course(fx.python).unwrap();
        let olmedo = fx.school.teacher(fx.olmedo).unwrap();

        assert_eq!(course_report_file(python), "curso_Python.csv");
        assert_eq!(course_schedule_file(python), "curso_horario_Python.csv");
        assert_eq!(
            teacher_schedule_file(olmedo),
            "profesor_horario_Agustin Olmedo.csv"
        );
    }
}
