use std::fs;

use chrono::NaiveTime;
use escuela::model::{Course, ScheduleSlot, Student, Teacher};
use escuela::seed::sample_school;
use escuela::{
    CourseReport, CourseScheduleReport, MemoryStore, Report, School, SchoolStore, SqliteStore,
    TeacherScheduleReport,
};
use tempfile::tempdir;

fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

#[test]
fn test_python_course_scenario() {
    let mut school = School::new();
    let python = school.add_course(Course::new("Python"));
    let juan = school.add_student(Student::new("Juan", "Perez"));
    school.set_student_course(juan, Some(python)).unwrap();
    let olmedo = school.add_teacher(Teacher::new("Agustin", "Olmedo"));
    let slot = school.add_slot(ScheduleSlot::new(1, at(16), at(18)));
    school.set_slot_course(slot, Some(python)).unwrap();
    school.set_slot_teacher(slot, Some(olmedo)).unwrap();

    let mut store = SqliteStore::open_in_memory().unwrap();
    store.provision().unwrap();
    store.commit(&mut school).unwrap();

    let dir = tempdir().unwrap();
    let students = dir.path().join("curso_Python.csv");
    let schedule = dir.path().join("curso_horario_Python.csv");
    CourseReport::new(&students).export(&school, python).unwrap();
    CourseScheduleReport::new(&schedule)
        .export(&school, python)
        .unwrap();

    assert_eq!(fs::read_to_string(&students).unwrap(), "Juan Perez\n");
    assert_eq!(
        fs::read_to_string(&schedule).unwrap(),
        "1,16:00:00,18:00:00,Agustin Olmedo\n"
    );
}

#[test]
fn test_sample_reports_survive_a_reload() {
    let sample = sample_school().unwrap();
    let mut school = sample.school.clone();
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.provision().unwrap();
    store.commit(&mut school).unwrap();

    let loaded = store.load().unwrap();
    let c = loaded.find_course("C").unwrap();
    let olmedo = loaded.find_teacher("Agustin Olmedo").unwrap();
    let cueva = loaded.find_teacher("Soyla Cueva").unwrap();

    assert_eq!(
        CourseReport::new("x.csv").rows(&loaded, c).unwrap(),
        CourseReport::new("x.csv").rows(&school, sample.c).unwrap()
    );
    assert_eq!(
        CourseReport::new("x.csv").rows(&loaded, c).unwrap(),
        [["Elber Galarga"], ["Alan Brito"]]
    );
    assert_eq!(
        TeacherScheduleReport::new("x.csv")
            .rows(&loaded, olmedo)
            .unwrap(),
        [
            ["1", "16:00:00", "18:00:00", "Python"],
            ["2", "18:00:00", "20:00:00", "C"],
        ]
    );
    assert_eq!(
        TeacherScheduleReport::new("x.csv")
            .rows(&loaded, cueva)
            .unwrap(),
        [
            ["1", "16:00:00", "20:00:00", "Java"],
            ["4", "20:00:00", "22:00:00", "Python"],
        ]
    );
}

#[test]
fn test_both_stores_agree() {
    let mut in_sqlite = sample_school().unwrap().school;
    let mut in_memory = in_sqlite.clone();

    let mut sqlite = SqliteStore::open_in_memory().unwrap();
    sqlite.provision().unwrap();
    sqlite.commit(&mut in_sqlite).unwrap();

    let mut memory = MemoryStore::new();
    memory.provision().unwrap();
    memory.commit(&mut in_memory).unwrap();

    assert_eq!(sqlite.rows().unwrap(), memory.rows().unwrap());
    for course_id in 1..=3 {
        assert_eq!(
            sqlite.students_for_course(course_id).unwrap(),
            memory.students_for_course(course_id).unwrap()
        );
        assert_eq!(
            sqlite.slots_for_course(course_id).unwrap(),
            memory.slots_for_course(course_id).unwrap()
        );
    }
}

#[test]
fn test_reassignment_is_persisted() {
    let sample = sample_school().unwrap();
    let mut school = sample.school.clone();
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.provision().unwrap();
    store.commit(&mut school).unwrap();

    let (alan, _) = school
        .students()
        .find(|(_, s)| s.full_name() == "Alan Brito")
        .unwrap();
    school.set_student_course(alan, Some(sample.java)).unwrap();
    store.commit(&mut school).unwrap();

    let reloaded = store.load().unwrap();
    let c = reloaded.find_course("C").unwrap();
    let java = reloaded.find_course("Java").unwrap();
    let report = CourseReport::new("x.csv");

    assert_eq!(report.rows(&reloaded, c).unwrap(), [["Elber Galarga"]]);
    assert_eq!(
        report.rows(&reloaded, java).unwrap(),
        [["Alan Brito"], ["John Doe"]]
    );
}
