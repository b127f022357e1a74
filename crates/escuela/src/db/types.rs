/// Row types for the school tables
use chrono::NaiveTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbCourse {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbStudent {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub course_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbTeacher {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbScheduleSlot {
    pub id: i64,
    pub day: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub course_id: Option<i64>,
    pub teacher_id: Option<i64>,
}

/// Every row of every table, each list ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreRows {
    pub courses: Vec<DbCourse>,
    pub students: Vec<DbStudent>,
    pub teachers: Vec<DbTeacher>,
    pub slots: Vec<DbScheduleSlot>,
}

/// What a commit wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Rows created for entities that had no identity yet
    pub inserted: usize,
    /// Rows rewritten for entities that were already persisted
    pub updated: usize,
}
