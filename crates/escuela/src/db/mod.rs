//! Storage collaborators for the school records graph.
//!
//! A store provisions its tables, persists a [`School`] as one unit of work
//! (assigning identities to new entities), and resolves associations by
//! identity. [`SqliteStore`] keeps the rows in SQLite; [`MemoryStore`] keeps
//! them in ordered maps.

mod memory;
mod sqlite;
mod types;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use types::{CommitSummary, DbCourse, DbScheduleSlot, DbStudent, DbTeacher, StoreRows};

use std::collections::HashMap;

use crate::error::{EntityKind, StoreError};
use crate::model::{
    Course, CourseKey, ScheduleSlot, School, SlotKey, Student, StudentKey, Teacher, TeacherKey,
};

/// Persistence service required by the bootstrap.
pub trait SchoolStore {
    /// Creates the tables if they do not exist yet.
    fn provision(&mut self) -> Result<(), StoreError>;

    /// Persists every entity of `school` in one transaction.
    ///
    /// Entities without identity are inserted and receive one; the others are
    /// rewritten in place. Identities are only handed back to `school` once
    /// the whole unit of work succeeded.
    fn commit(&mut self, school: &mut School) -> Result<CommitSummary, StoreError>;

    /// All stored rows, each table ordered by id.
    fn rows(&self) -> Result<StoreRows, StoreError>;

    /// Students of a course, ordered by id.
    fn students_for_course(&self, course_id: i64) -> Result<Vec<DbStudent>, StoreError>;

    /// Slots of a course, ordered by start time.
    fn slots_for_course(&self, course_id: i64) -> Result<Vec<DbScheduleSlot>, StoreError>;

    /// Slots of a teacher, ordered by start time.
    fn slots_for_teacher(&self, teacher_id: i64) -> Result<Vec<DbScheduleSlot>, StoreError>;

    /// Rebuilds the full entity graph from the stored rows.
    fn load(&self) -> Result<School, StoreError> {
        school_from_rows(self.rows()?)
    }
}

/// Write side of a unit of work. `None` identities mean insert.
trait RowSink {
    fn put_course(&mut self, course: &Course) -> Result<i64, StoreError>;

    fn put_student(&mut self, student: &Student, course_id: Option<i64>)
        -> Result<i64, StoreError>;

    fn put_teacher(&mut self, teacher: &Teacher) -> Result<i64, StoreError>;

    fn put_slot(
        &mut self,
        slot: &ScheduleSlot,
        course_id: Option<i64>,
        teacher_id: Option<i64>,
    ) -> Result<i64, StoreError>;
}

/// Identities produced by a unit of work, indexed by handle.
#[derive(Debug, Default)]
struct Identities {
    courses: Vec<i64>,
    students: Vec<i64>,
    teachers: Vec<i64>,
    slots: Vec<i64>,
}

impl Identities {
    fn apply(self, school: &mut School) {
        for (i, id) in self.courses.into_iter().enumerate() {
            school.assign_course_id(CourseKey(i), id);
        }
        for (i, id) in self.students.into_iter().enumerate() {
            school.assign_student_id(StudentKey(i), id);
        }
        for (i, id) in self.teachers.into_iter().enumerate() {
            school.assign_teacher_id(TeacherKey(i), id);
        }
        for (i, id) in self.slots.into_iter().enumerate() {
            school.assign_slot_id(SlotKey(i), id);
        }
    }
}

fn tally(summary: &mut CommitSummary, id: Option<i64>) {
    if id.is_some() {
        summary.updated += 1;
    } else {
        summary.inserted += 1;
    }
}

fn resolve(ids: &[i64], index: Option<usize>, kind: EntityKind) -> Result<Option<i64>, StoreError> {
    index
        .map(|i| ids.get(i).copied().ok_or(StoreError::MissingIdentity { kind }))
        .transpose()
}

/// Writes parents before children so every foreign key resolves.
fn write_school(
    school: &School,
    sink: &mut impl RowSink,
) -> Result<(Identities, CommitSummary), StoreError> {
    let mut ids = Identities::default();
    let mut summary = CommitSummary::default();

    for (_, course) in school.courses() {
        tally(&mut summary, course.id());
        ids.courses.push(sink.put_course(course)?);
    }
    for (_, teacher) in school.teachers() {
        tally(&mut summary, teacher.id());
        ids.teachers.push(sink.put_teacher(teacher)?);
    }
    for (_, student) in school.students() {
        let course_id = resolve(
            &ids.courses,
            student.course().map(CourseKey::index),
            EntityKind::Course,
        )?;
        tally(&mut summary, student.id());
        ids.students.push(sink.put_student(student, course_id)?);
    }
    for (_, slot) in school.slots() {
        let course_id = resolve(
            &ids.courses,
            slot.course().map(CourseKey::index),
            EntityKind::Course,
        )?;
        let teacher_id = resolve(
            &ids.teachers,
            slot.teacher().map(TeacherKey::index),
            EntityKind::Teacher,
        )?;
        tally(&mut summary, slot.id());
        ids.slots.push(sink.put_slot(slot, course_id, teacher_id)?);
    }

    Ok((ids, summary))
}

/// Builds a [`School`] whose handles follow row id order.
pub fn school_from_rows(rows: StoreRows) -> Result<School, StoreError> {
    let mut school = School::new();
    let mut courses = HashMap::new();
    let mut teachers = HashMap::new();

    for row in rows.courses {
        let key = school.add_course(Course::new(row.name));
        school.assign_course_id(key, row.id);
        courses.insert(row.id, key);
    }
    for row in rows.teachers {
        let key = school.add_teacher(Teacher::new(row.first_name, row.last_name));
        school.assign_teacher_id(key, row.id);
        teachers.insert(row.id, key);
    }
    for row in rows.students {
        let key = school.add_student(Student::new(row.first_name, row.last_name));
        school.assign_student_id(key, row.id);
        if let Some(course_id) = row.course_id {
            let course = lookup(&courses, course_id, EntityKind::Course)?;
            school.set_student_course(key, Some(course))?;
        }
    }
    for row in rows.slots {
        let key = school.add_slot(ScheduleSlot::new(row.day, row.start_time, row.end_time));
        school.assign_slot_id(key, row.id);
        if let Some(course_id) = row.course_id {
            let course = lookup(&courses, course_id, EntityKind::Course)?;
            school.set_slot_course(key, Some(course))?;
        }
        if let Some(teacher_id) = row.teacher_id {
            let teacher = lookup(&teachers, teacher_id, EntityKind::Teacher)?;
            school.set_slot_teacher(key, Some(teacher))?;
        }
    }

    Ok(school)
}

fn lookup<K: Copy>(keys: &HashMap<i64, K>, id: i64, kind: EntityKind) -> Result<K, StoreError> {
    keys.get(&id)
        .copied()
        .ok_or(StoreError::DanglingReference { kind, id })
}
