/// In-memory store keyed by identity
use std::collections::BTreeMap;

use tracing::info;

use super::{
    write_school, CommitSummary, DbCourse, DbScheduleSlot, DbStudent, DbTeacher, RowSink,
    SchoolStore, StoreRows,
};
use crate::error::{EntityKind, StoreError};
use crate::model::{Course, ScheduleSlot, School, Student, Teacher};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Tables,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    courses: BTreeMap<i64, DbCourse>,
    students: BTreeMap<i64, DbStudent>,
    teachers: BTreeMap<i64, DbTeacher>,
    slots: BTreeMap<i64, DbScheduleSlot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots_where(&self, owner: impl Fn(&DbScheduleSlot) -> bool) -> Vec<DbScheduleSlot> {
        let mut slots: Vec<DbScheduleSlot> =
            self.tables.slots.values().filter(|&s| owner(s)).cloned().collect();
        slots.sort_by_key(|s| s.start_time);
        slots
    }
}

fn next_id<T>(table: &BTreeMap<i64, T>) -> i64 {
    table.keys().next_back().map_or(1, |id| id + 1)
}

/// Allocates the identity for a row: a fresh one for inserts, the existing
/// one for updates (which must already be present).
fn row_id<T>(table: &BTreeMap<i64, T>, id: Option<i64>, kind: EntityKind) -> Result<i64, StoreError> {
    match id {
        None => Ok(next_id(table)),
        Some(id) if table.contains_key(&id) => Ok(id),
        Some(id) => Err(StoreError::DanglingReference { kind, id }),
    }
}

impl RowSink for Tables {
    fn put_course(&mut self, course: &Course) -> Result<i64, StoreError> {
        let id = row_id(&self.courses, course.id(), EntityKind::Course)?;
        self.courses.insert(
            id,
            DbCourse {
                id,
                name: course.name.clone(),
            },
        );
        Ok(id)
    }

    fn put_student(
        &mut self,
        student: &Student,
        course_id: Option<i64>,
    ) -> Result<i64, StoreError> {
        let id = row_id(&self.students, student.id(), EntityKind::Student)?;
        self.students.insert(
            id,
            DbStudent {
                id,
                first_name: student.first_name.clone(),
                last_name: student.last_name.clone(),
                course_id,
            },
        );
        Ok(id)
    }

    fn put_teacher(&mut self, teacher: &Teacher) -> Result<i64, StoreError> {
        let id = row_id(&self.teachers, teacher.id(), EntityKind::Teacher)?;
        self.teachers.insert(
            id,
            DbTeacher {
                id,
                first_name: teacher.first_name.clone(),
                last_name: teacher.last_name.clone(),
            },
        );
        Ok(id)
    }

    fn put_slot(
        &mut self,
        slot: &ScheduleSlot,
        course_id: Option<i64>,
        teacher_id: Option<i64>,
    ) -> Result<i64, StoreError> {
        let id = row_id(&self.slots, slot.id(), EntityKind::ScheduleSlot)?;
        self.slots.insert(
            id,
            DbScheduleSlot {
                id,
                day: slot.day,
                start_time: slot.start,
                end_time: slot.end,
                course_id,
                teacher_id,
            },
        );
        Ok(id)
    }
}

impl SchoolStore for MemoryStore {
    fn provision(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    fn commit(&mut self, school: &mut School) -> Result<CommitSummary, StoreError> {
        // Work on a copy so a failure leaves the stored rows untouched.
        let mut staged = self.tables.clone();
        let (ids, summary) = write_school(school, &mut staged)?;
        self.tables = staged;
        ids.apply(school);

        info!(
            "Committed school records in memory ({} inserted, {} updated)",
            summary.inserted, summary.updated
        );
        Ok(summary)
    }

    fn rows(&self) -> Result<StoreRows, StoreError> {
        Ok(StoreRows {
            courses: self.tables.courses.values().cloned().collect(),
            students: self.tables.students.values().cloned().collect(),
            teachers: self.tables.teachers.values().cloned().collect(),
            slots: self.tables.slots.values().cloned().collect(),
        })
    }

    fn students_for_course(&self, course_id: i64) -> Result<Vec<DbStudent>, StoreError> {
        Ok(self
            .tables
            .students
            .values()
            .filter(|s| s.course_id == Some(course_id))
            .cloned()
            .collect())
    }

    fn slots_for_course(&self, course_id: i64) -> Result<Vec<DbScheduleSlot>, StoreError> {
        Ok(self.slots_where(|s| s.course_id == Some(course_id)))
    }

    fn slots_for_teacher(&self, teacher_id: i64) -> Result<Vec<DbScheduleSlot>, StoreError> {
        Ok(self.slots_where(|s| s.teacher_id == Some(teacher_id)))
    }
}
