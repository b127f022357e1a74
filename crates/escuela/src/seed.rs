/// Sample records used by the bootstrap run
use chrono::NaiveTime;

use crate::error::ModelError;
use crate::model::{Course, CourseKey, ScheduleSlot, School, Student, Teacher, TeacherKey};

/// The sample school plus handles to the entities the bootstrap exports.
#[derive(Debug, Clone)]
pub struct SampleSchool {
    pub school: School,
    pub python: CourseKey,
    pub c: CourseKey,
    pub java: CourseKey,
    pub olmedo: TeacherKey,
    pub cueva: TeacherKey,
}

fn hour(hour: u32) -> Result<NaiveTime, ModelError> {
    NaiveTime::from_hms_opt(hour, 0, 0).ok_or(ModelError::InvalidTime {
        hour,
        minute: 0,
        second: 0,
    })
}

/// Three courses, four students, two teachers and four slots.
pub fn sample_school() -> Result<SampleSchool, ModelError> {
    let mut school = School::new();

    let python = school.add_course(Course::new("Python"));
    let c = school.add_course(Course::new("C"));
    let java = school.add_course(Course::new("Java"));

    for (first, last, course) in [
        ("Juan", "Perez", python),
        ("Elber", "Galarga", c),
        ("Alan", "Brito", c),
        ("John", "Doe", java),
    ] {
        let student = school.add_student(Student::new(first, last));
        school.set_student_course(student, Some(course))?;
    }

    let olmedo = school.add_teacher(Teacher::new("Agustin", "Olmedo"));
    let cueva = school.add_teacher(Teacher::new("Soyla", "Cueva"));

    for (day, start, end, course, teacher) in [
        (1, 16, 18, python, olmedo),
        (2, 18, 20, c, olmedo),
        (1, 16, 20, java, cueva),
        (4, 20, 22, python, cueva),
    ] {
        let slot = school.add_slot(ScheduleSlot::new(day, hour(start)?, hour(end)?));
        school.set_slot_course(slot, Some(course))?;
        school.set_slot_teacher(slot, Some(teacher))?;
    }

    Ok(SampleSchool {
        school,
        python,
        c,
        java,
        olmedo,
        cueva,
    })
}
