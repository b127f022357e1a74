/// SQLite-backed store
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Row};
use tracing::{debug, info};

use super::{
    write_school, CommitSummary, DbCourse, DbScheduleSlot, DbStudent, DbTeacher, RowSink,
    SchoolStore, StoreRows,
};
use crate::error::{EntityKind, StoreError};
use crate::model::{Course, ScheduleSlot, School, Student, Teacher};

const SCHEMA_SQL: &str = include_str!("../../sql/init_school.sql");

const SLOT_COLUMNS: &str = "id, day, start_time, end_time, course_id, teacher_id";

pub struct SqliteStore {
    db: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a database file. Call [`SchoolStore::provision`] before use.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path.as_ref())?;
        debug!("Opened school database at {}", db_path.as_ref().display());
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Opens `:memory:` as an in-memory database and anything else as a file path.
    pub fn open_target(target: &str) -> Result<Self, StoreError> {
        if target == ":memory:" {
            Self::open_in_memory()
        } else {
            Self::open(target)
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.db.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn query_slots(&self, sql: &str, owner_id: i64) -> Result<Vec<DbScheduleSlot>, StoreError> {
        let db = self.lock()?;
        let mut stmt = db.prepare(sql)?;
        let slots = stmt.query_map([owner_id], slot_row)?;
        Ok(slots.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl SchoolStore for SqliteStore {
    fn provision(&mut self) -> Result<(), StoreError> {
        self.lock()?.execute_batch(SCHEMA_SQL)?;
        info!("Provisioned school tables");
        Ok(())
    }

    fn commit(&mut self, school: &mut School) -> Result<CommitSummary, StoreError> {
        let (ids, summary) = {
            let mut db = self.lock()?;
            let tx = db.transaction()?;
            // Dropping `tx` on error rolls the whole unit of work back.
            let written = write_school(school, &mut SqliteSink { conn: &tx })?;
            tx.commit()?;
            written
        };
        ids.apply(school);

        info!(
            "Committed school records ({} inserted, {} updated)",
            summary.inserted, summary.updated
        );
        Ok(summary)
    }

    fn rows(&self) -> Result<StoreRows, StoreError> {
        let db = self.lock()?;

        let courses = db
            .prepare("SELECT id, name FROM course ORDER BY id")?
            .query_map([], course_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let students = db
            .prepare("SELECT id, first_name, last_name, course_id FROM student ORDER BY id")?
            .query_map([], student_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let teachers = db
            .prepare("SELECT id, first_name, last_name FROM teacher ORDER BY id")?
            .query_map([], teacher_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let slots = db
            .prepare(&format!(
                "SELECT {SLOT_COLUMNS} FROM schedule_slot ORDER BY id"
            ))?
            .query_map([], slot_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(StoreRows {
            courses,
            students,
            teachers,
            slots,
        })
    }

    fn students_for_course(&self, course_id: i64) -> Result<Vec<DbStudent>, StoreError> {
        let db = self.lock()?;
        let mut stmt = db.prepare(
            "SELECT id, first_name, last_name, course_id
             FROM student
             WHERE course_id = ?
             ORDER BY id",
        )?;
        let students = stmt.query_map([course_id], student_row)?;
        Ok(students.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn slots_for_course(&self, course_id: i64) -> Result<Vec<DbScheduleSlot>, StoreError> {
        self.query_slots(
            &format!(
                "SELECT {SLOT_COLUMNS} FROM schedule_slot WHERE course_id = ? ORDER BY start_time, id"
            ),
            course_id,
        )
    }

    fn slots_for_teacher(&self, teacher_id: i64) -> Result<Vec<DbScheduleSlot>, StoreError> {
        self.query_slots(
            &format!(
                "SELECT {SLOT_COLUMNS} FROM schedule_slot WHERE teacher_id = ? ORDER BY start_time, id"
            ),
            teacher_id,
        )
    }
}

struct SqliteSink<'a> {
    conn: &'a Connection,
}

impl SqliteSink<'_> {
    /// Fails when an UPDATE touched nothing, i.e. the identity is unknown here.
    fn expect_row(changed: usize, kind: EntityKind, id: i64) -> Result<i64, StoreError> {
        if changed == 0 {
            Err(StoreError::DanglingReference { kind, id })
        } else {
            Ok(id)
        }
    }
}

impl RowSink for SqliteSink<'_> {
    fn put_course(&mut self, course: &Course) -> Result<i64, StoreError> {
        match course.id() {
            None => {
                self.conn
                    .execute("INSERT INTO course (name) VALUES (?1)", [&course.name])?;
                Ok(self.conn.last_insert_rowid())
            }
            Some(id) => {
                let changed = self
                    .conn
                    .execute("UPDATE course SET name = ?1 WHERE id = ?2", (&course.name, id))?;
                Self::expect_row(changed, EntityKind::Course, id)
            }
        }
    }

    fn put_student(
        &mut self,
        student: &Student,
        course_id: Option<i64>,
    ) -> Result<i64, StoreError> {
        match student.id() {
            None => {
                self.conn.execute(
                    "INSERT INTO student (first_name, last_name, course_id) VALUES (?1, ?2, ?3)",
                    (&student.first_name, &student.last_name, course_id),
                )?;
                Ok(self.conn.last_insert_rowid())
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE student SET first_name = ?1, last_name = ?2, course_id = ?3
                     WHERE id = ?4",
                    (&student.first_name, &student.last_name, course_id, id),
                )?;
                Self::expect_row(changed, EntityKind::Student, id)
            }
        }
    }

    fn put_teacher(&mut self, teacher: &Teacher) -> Result<i64, StoreError> {
        match teacher.id() {
            None => {
                self.conn.execute(
                    "INSERT INTO teacher (first_name, last_name) VALUES (?1, ?2)",
                    (&teacher.first_name, &teacher.last_name),
                )?;
                Ok(self.conn.last_insert_rowid())
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE teacher SET first_name = ?1, last_name = ?2 WHERE id = ?3",
                    (&teacher.first_name, &teacher.last_name, id),
                )?;
                Self::expect_row(changed, EntityKind::Teacher, id)
            }
        }
    }

    fn put_slot(
        &mut self,
        slot: &ScheduleSlot,
        course_id: Option<i64>,
        teacher_id: Option<i64>,
    ) -> Result<i64, StoreError> {
        match slot.id() {
            None => {
                self.conn.execute(
                    "INSERT INTO schedule_slot (day, start_time, end_time, course_id, teacher_id)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    (slot.day, slot.start, slot.end, course_id, teacher_id),
                )?;
                Ok(self.conn.last_insert_rowid())
            }
            Some(id) => {
                let changed = self.conn.execute(
                    "UPDATE schedule_slot
                     SET day = ?1, start_time = ?2, end_time = ?3, course_id = ?4, teacher_id = ?5
                     WHERE id = ?6",
                    (slot.day, slot.start, slot.end, course_id, teacher_id, id),
                )?;
                Self::expect_row(changed, EntityKind::ScheduleSlot, id)
            }
        }
    }
}

fn course_row(row: &Row<'_>) -> rusqlite::Result<DbCourse> {
    Ok(DbCourse {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn student_row(row: &Row<'_>) -> rusqlite::Result<DbStudent> {
    Ok(DbStudent {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        course_id: row.get(3)?,
    })
}

fn teacher_row(row: &Row<'_>) -> rusqlite::Result<DbTeacher> {
    Ok(DbTeacher {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
    })
}

fn slot_row(row: &Row<'_>) -> rusqlite::Result<DbScheduleSlot> {
    Ok(DbScheduleSlot {
        id: row.get(0)?,
        day: row.get(1)?,
        start_time: row.get(2)?,
        end_time: row.get(3)?,
        course_id: row.get(4)?,
        teacher_id: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(hour: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
    }

    fn store() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.provision().unwrap();
        store
    }

    #[test]
    fn test_provision_is_idempotent() {
        let mut store = store();
        store.provision().unwrap();
        assert_eq!(store.rows().unwrap(), StoreRows::default());
    }

    #[test]
    fn test_commit_assigns_identities_in_registration_order() {
        let mut store = store();
        let mut school = School::new();
        let c = school.add_course(Course::new("C"));
        let elber = school.add_student(Student::new("Elber", "Galarga"));
        let alan = school.add_student(Student::new("Alan", "Brito"));
        school.set_student_course(alan, Some(c)).unwrap();
        school.set_student_course(elber, Some(c)).unwrap();

        let summary = store.commit(&mut school).unwrap();

        assert_eq!(summary, CommitSummary { inserted: 3, updated: 0 });
        assert_eq!(school.course(c).unwrap().id(), Some(1));
        assert_eq!(school.student(elber).unwrap().id(), Some(1));
        assert_eq!(school.student(alan).unwrap().id(), Some(2));

        let names: Vec<String> = store
            .students_for_course(1)
            .unwrap()
            .into_iter()
            .map(|s| s.first_name)
            .collect();
        assert_eq!(names, ["Elber", "Alan"]);
    }

    #[test]
    fn test_second_commit_updates_reassigned_student() {
        let mut store = store();
        let mut school = School::new();
        let c = school.add_course(Course::new("C"));
        let java = school.add_course(Course::new("Java"));
        let alan = school.add_student(Student::new("Alan", "Brito"));
        school.set_student_course(alan, Some(c)).unwrap();
        store.commit(&mut school).unwrap();

        school.set_student_course(alan, Some(java)).unwrap();
        let summary = store.commit(&mut school).unwrap();

        assert_eq!(summary, CommitSummary { inserted: 0, updated: 3 });
        assert!(store.students_for_course(1).unwrap().is_empty());
        assert_eq!(store.students_for_course(2).unwrap().len(), 1);
        assert_eq!(school.student(alan).unwrap().id(), Some(1));
    }

    #[test]
    fn test_slots_come_back_ordered_by_start_time() {
        let mut store = store();
        let mut school = School::new();
        let python = school.add_course(Course::new("Python"));
        let cueva = school.add_teacher(Teacher::new("Soyla", "Cueva"));
        for (day, start, end) in [(4, 20, 22), (1, 16, 18)] {
            let slot = school.add_slot(ScheduleSlot::new(day, at(start), at(end)));
            school.set_slot_course(slot, Some(python)).unwrap();
            school.set_slot_teacher(slot, Some(cueva)).unwrap();
        }
        store.commit(&mut school).unwrap();

        let by_course: Vec<i32> = store
            .slots_for_course(1)
            .unwrap()
            .iter()
            .map(|s| s.day)
            .collect();
        let by_teacher = store.slots_for_teacher(1).unwrap();

        assert_eq!(by_course, [1, 4]);
        assert_eq!(by_teacher[0].start_time, at(16));
        assert_eq!(by_teacher[1].end_time, at(22));
    }

    #[test]
    fn test_failed_commit_leaves_identities_unassigned() {
        let mut store = store();
        let mut school = School::new();
        let python = school.add_course(Course::new("Python"));
        // An identity this database never issued.
        school.assign_course_id(python, 42);
        let juan = school.add_student(Student::new("Juan", "Perez"));
        school.set_student_course(juan, Some(python)).unwrap();

        let err = store.commit(&mut school).unwrap_err();

        assert!(matches!(
            err,
            StoreError::DanglingReference {
                kind: EntityKind::Course,
                id: 42
            }
        ));
        assert_eq!(school.student(juan).unwrap().id(), None);
        assert!(store.rows().unwrap().students.is_empty());
    }

    #[test]
    fn test_load_round_trips_the_graph() {
        let mut store = store();
        let mut school = School::new();
        let python = school.add_course(Course::new("Python"));
        let juan = school.add_student(Student::new("Juan", "Perez"));
        school.set_student_course(juan, Some(python)).unwrap();
        store.commit(&mut school).unwrap();

        let loaded = store.load().unwrap();
        let python = loaded.find_course("Python").unwrap();
        let students = loaded.course_students(python).unwrap();

        assert_eq!(students.len(), 1);
        assert_eq!(students[0].full_name(), "Juan Perez");
        assert_eq!(students[0].id(), Some(1));
    }
}
