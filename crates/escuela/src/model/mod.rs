/// In-memory entity graph for courses, students, teachers and schedule slots
mod types;

pub use types::{
    format_time, Course, CourseKey, ScheduleSlot, SlotKey, Student, StudentKey, Teacher,
    TeacherKey, TIME_FORMAT,
};

use crate::error::{EntityKind, ModelError};

/// Owns every entity and keeps both sides of each association consistent.
///
/// Parents hold the handles of their children; children hold a non-owning
/// handle to their parent. All association changes go through the `set_*`
/// methods, which update both sides in one step.
#[derive(Debug, Clone, Default)]
pub struct School {
    courses: Vec<Course>,
    students: Vec<Student>,
    teachers: Vec<Teacher>,
    slots: Vec<ScheduleSlot>,
}

/// Which shared owner makes two slots collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    Teacher(TeacherKey),
    Course(CourseKey),
}

/// Two slots on the same day whose time ranges intersect and share an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotConflict {
    pub first: SlotKey,
    pub second: SlotKey,
    pub kind: ConflictKind,
}

impl School {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a course. Any collections carried by the value are discarded.
    pub fn add_course(&mut self, mut course: Course) -> CourseKey {
        course.students.clear();
        course.slots.clear();
        self.courses.push(course);
        CourseKey(self.courses.len() - 1)
    }

    /// Registers a student without a course; use [`School::set_student_course`] to enroll it.
    pub fn add_student(&mut self, mut student: Student) -> StudentKey {
        student.course = None;
        self.students.push(student);
        StudentKey(self.students.len() - 1)
    }

    pub fn add_teacher(&mut self, mut teacher: Teacher) -> TeacherKey {
        teacher.slots.clear();
        self.teachers.push(teacher);
        TeacherKey(self.teachers.len() - 1)
    }

    pub fn add_slot(&mut self, mut slot: ScheduleSlot) -> SlotKey {
        slot.course = None;
        slot.teacher = None;
        self.slots.push(slot);
        SlotKey(self.slots.len() - 1)
    }

    pub fn course(&self, key: CourseKey) -> Result<&Course, ModelError> {
        self.courses.get(key.0).ok_or(ModelError::UnknownEntity {
            kind: EntityKind::Course,
            index: key.0,
        })
    }

    pub fn student(&self, key: StudentKey) -> Result<&Student, ModelError> {
        self.students.get(key.0).ok_or(ModelError::UnknownEntity {
            kind: EntityKind::Student,
            index: key.0,
        })
    }

    pub fn teacher(&self, key: TeacherKey) -> Result<&Teacher, ModelError> {
        self.teachers.get(key.0).ok_or(ModelError::UnknownEntity {
            kind: EntityKind::Teacher,
            index: key.0,
        })
    }

    pub fn slot(&self, key: SlotKey) -> Result<&ScheduleSlot, ModelError> {
        self.slots.get(key.0).ok_or(ModelError::UnknownEntity {
            kind: EntityKind::ScheduleSlot,
            index: key.0,
        })
    }

    /// Mutable access to a course's scalar fields.
    pub fn course_mut(&mut self, key: CourseKey) -> Result<&mut Course, ModelError> {
        self.courses.get_mut(key.0).ok_or(ModelError::UnknownEntity {
            kind: EntityKind::Course,
            index: key.0,
        })
    }

    pub fn student_mut(&mut self, key: StudentKey) -> Result<&mut Student, ModelError> {
        self.students.get_mut(key.0).ok_or(ModelError::UnknownEntity {
            kind: EntityKind::Student,
            index: key.0,
        })
    }

    pub fn teacher_mut(&mut self, key: TeacherKey) -> Result<&mut Teacher, ModelError> {
        self.teachers.get_mut(key.0).ok_or(ModelError::UnknownEntity {
            kind: EntityKind::Teacher,
            index: key.0,
        })
    }

    pub fn slot_mut(&mut self, key: SlotKey) -> Result<&mut ScheduleSlot, ModelError> {
        self.slots.get_mut(key.0).ok_or(ModelError::UnknownEntity {
            kind: EntityKind::ScheduleSlot,
            index: key.0,
        })
    }

    /// Moves a student into `course`, or out of any course when `None`.
    pub fn set_student_course(
        &mut self,
        student: StudentKey,
        course: Option<CourseKey>,
    ) -> Result<(), ModelError> {
        let previous = self.student(student)?.course;
        if let Some(course) = course {
            self.course(course)?;
        }
        if previous == course {
            return Ok(());
        }

        if let Some(previous) = previous {
            self.courses[previous.0].students.retain(|&k| k != student);
        }
        if let Some(course) = course {
            self.courses[course.0].students.push(student);
        }
        self.students[student.0].course = course;
        Ok(())
    }

    pub fn set_slot_course(
        &mut self,
        slot: SlotKey,
        course: Option<CourseKey>,
    ) -> Result<(), ModelError> {
        let previous = self.slot(slot)?.course;
        if let Some(course) = course {
            self.course(course)?;
        }
        if previous == course {
            return Ok(());
        }

        if let Some(previous) = previous {
            self.courses[previous.0].slots.retain(|&k| k != slot);
        }
        if let Some(course) = course {
            self.courses[course.0].slots.push(slot);
        }
        self.slots[slot.0].course = course;
        Ok(())
    }

    pub fn set_slot_teacher(
        &mut self,
        slot: SlotKey,
        teacher: Option<TeacherKey>,
    ) -> Result<(), ModelError> {
        let previous = self.slot(slot)?.teacher;
        if let Some(teacher) = teacher {
            self.teacher(teacher)?;
        }
        if previous == teacher {
            return Ok(());
        }

        if let Some(previous) = previous {
            self.teachers[previous.0].slots.retain(|&k| k != slot);
        }
        if let Some(teacher) = teacher {
            self.teachers[teacher.0].slots.push(slot);
        }
        self.slots[slot.0].teacher = teacher;
        Ok(())
    }

    /// Students of a course, ordered by identity ascending.
    ///
    /// Students not yet committed have no identity and follow the persisted
    /// ones in registration order.
    pub fn course_students(&self, course: CourseKey) -> Result<Vec<&Student>, ModelError> {
        let mut keys = self.course(course)?.students.clone();
        keys.sort_by_key(|&k| {
            let id = self.students[k.0].id;
            (id.is_none(), id, k)
        });
        Ok(keys.into_iter().map(|k| &self.students[k.0]).collect())
    }

    /// Slots of a course, ordered by start time ascending (ties keep insertion order).
    pub fn course_slots(&self, course: CourseKey) -> Result<Vec<&ScheduleSlot>, ModelError> {
        let keys = &self.course(course)?.slots;
        Ok(self.slots_by_start(keys))
    }

    /// Slots of a teacher, ordered by start time ascending (ties keep insertion order).
    pub fn teacher_slots(&self, teacher: TeacherKey) -> Result<Vec<&ScheduleSlot>, ModelError> {
        let keys = &self.teacher(teacher)?.slots;
        Ok(self.slots_by_start(keys))
    }

    fn slots_by_start(&self, keys: &[SlotKey]) -> Vec<&ScheduleSlot> {
        let mut slots: Vec<&ScheduleSlot> = keys.iter().map(|k| &self.slots[k.0]).collect();
        slots.sort_by_key(|slot| slot.start);
        slots
    }

    pub fn student_course(&self, student: StudentKey) -> Result<Option<&Course>, ModelError> {
        Ok(self
            .student(student)?
            .course
            .map(|k| &self.courses[k.0]))
    }

    pub fn slot_course(&self, slot: SlotKey) -> Result<Option<&Course>, ModelError> {
        Ok(self.slot(slot)?.course.map(|k| &self.courses[k.0]))
    }

    pub fn slot_teacher(&self, slot: SlotKey) -> Result<Option<&Teacher>, ModelError> {
        Ok(self.slot(slot)?.teacher.map(|k| &self.teachers[k.0]))
    }

    /// Resolves the course a slot belongs to from a borrowed slot.
    pub fn course_of(&self, slot: &ScheduleSlot) -> Option<&Course> {
        slot.course.and_then(|k| self.courses.get(k.0))
    }

    /// Resolves the teacher of a borrowed slot.
    pub fn teacher_of(&self, slot: &ScheduleSlot) -> Option<&Teacher> {
        slot.teacher.and_then(|k| self.teachers.get(k.0))
    }

    pub fn courses(&self) -> impl Iterator<Item = (CourseKey, &Course)> {
        self.courses.iter().enumerate().map(|(i, c)| (CourseKey(i), c))
    }

    pub fn students(&self) -> impl Iterator<Item = (StudentKey, &Student)> {
        self.students.iter().enumerate().map(|(i, s)| (StudentKey(i), s))
    }

    pub fn teachers(&self) -> impl Iterator<Item = (TeacherKey, &Teacher)> {
        self.teachers.iter().enumerate().map(|(i, t)| (TeacherKey(i), t))
    }

    pub fn slots(&self) -> impl Iterator<Item = (SlotKey, &ScheduleSlot)> {
        self.slots.iter().enumerate().map(|(i, s)| (SlotKey(i), s))
    }

    /// Finds a course by name (first registered match).
    pub fn find_course(&self, name: &str) -> Option<CourseKey> {
        self.courses().find(|(_, c)| c.name == name).map(|(k, _)| k)
    }

    /// Finds a teacher by "first last" (first registered match).
    pub fn find_teacher(&self, full_name: &str) -> Option<TeacherKey> {
        self.teachers()
            .find(|(_, t)| t.full_name() == full_name)
            .map(|(k, _)| k)
    }

    /// Lists double-bookings of a teacher or a course.
    ///
    /// Nothing prevents such slots from being created; this only reports them.
    pub fn schedule_conflicts(&self) -> Vec<SlotConflict> {
        let mut conflicts = Vec::new();
        for (i, a) in self.slots.iter().enumerate() {
            for (j, b) in self.slots.iter().enumerate().skip(i + 1) {
                if !a.overlaps(b) {
                    continue;
                }
                let (first, second) = (SlotKey(i), SlotKey(j));
                if let (Some(ta), Some(tb)) = (a.teacher, b.teacher) {
                    if ta == tb {
                        conflicts.push(SlotConflict {
                            first,
                            second,
                            kind: ConflictKind::Teacher(ta),
                        });
                    }
                }
                if let (Some(ca), Some(cb)) = (a.course, b.course) {
                    if ca == cb {
                        conflicts.push(SlotConflict {
                            first,
                            second,
                            kind: ConflictKind::Course(ca),
                        });
                    }
                }
            }
        }
        conflicts
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
            && self.students.is_empty()
            && self.teachers.is_empty()
            && self.slots.is_empty()
    }

    // Identities are write-once: an entity that already has one keeps it.

    pub(crate) fn assign_course_id(&mut self, key: CourseKey, id: i64) {
        if let Some(course) = self.courses.get_mut(key.0) {
            course.id.get_or_insert(id);
        }
    }

    pub(crate) fn assign_student_id(&mut self, key: StudentKey, id: i64) {
        if let Some(student) = self.students.get_mut(key.0) {
            student.id.get_or_insert(id);
        }
    }

    pub(crate) fn assign_teacher_id(&mut self, key: TeacherKey, id: i64) {
        if let Some(teacher) = self.teachers.get_mut(key.0) {
            teacher.id.get_or_insert(id);
        }
    }

    pub(crate) fn assign_slot_id(&mut self, key: SlotKey, id: i64) {
        if let Some(slot) = self.slots.get_mut(key.0) {
            slot.id.get_or_insert(id);
        }
    }
}
