/// Entity types for the school records model
use std::fmt;

use chrono::NaiveTime;

macro_rules! entity_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position of the entity in registration order.
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

entity_key!(
    /// Handle to a [`Course`] registered in a [`super::School`]
    CourseKey
);
entity_key!(
    /// Handle to a [`Student`] registered in a [`super::School`]
    StudentKey
);
entity_key!(
    /// Handle to a [`Teacher`] registered in a [`super::School`]
    TeacherKey
);
entity_key!(
    /// Handle to a [`ScheduleSlot`] registered in a [`super::School`]
    SlotKey
);

/// A named group that owns students and schedule slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub(crate) id: Option<i64>,
    pub name: String,
    // Insertion order; accessors apply the relationship ordering.
    pub(crate) students: Vec<StudentKey>,
    pub(crate) slots: Vec<SlotKey>,
}

impl Course {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            students: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Storage identity, `None` until the course is first committed.
    pub fn id(&self) -> Option<i64> {
        self.id
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A person enrolled in at most one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub(crate) id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub(crate) course: Option<CourseKey>,
}

impl Student {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            course: None,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// The course this student belongs to, if any.
    pub fn course(&self) -> Option<CourseKey> {
        self.course
    }

    /// "first last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// A person who owns schedule slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teacher {
    pub(crate) id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub(crate) slots: Vec<SlotKey>,
}

impl Teacher {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            slots: Vec::new(),
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// "first last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for Teacher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// A (day, start, end) interval linking one course to one teacher.
///
/// Both references are optional at the type level; the schedule reports
/// render a missing side as an empty field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub(crate) id: Option<i64>,
    /// Day-of-week code, stored and exported as-is
    pub day: i32,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub(crate) course: Option<CourseKey>,
    pub(crate) teacher: Option<TeacherKey>,
}

impl ScheduleSlot {
    pub fn new(day: i32, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            id: None,
            day,
            start,
            end,
            course: None,
            teacher: None,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn course(&self) -> Option<CourseKey> {
        self.course
    }

    pub fn teacher(&self) -> Option<TeacherKey> {
        self.teacher
    }

    /// True if both slots fall on the same day and their `[start, end)` ranges intersect.
    pub fn overlaps(&self, other: &ScheduleSlot) -> bool {
        self.day == other.day && self.start < other.end && other.start < self.end
    }
}

/// Time format used wherever a slot boundary is rendered as text.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Renders a time of day as 24-hour `HH:MM:SS`.
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}
