//! School records (courses, students, teachers, schedule slots) with SQLite
//! or in-memory persistence and header-less CSV reports.

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod report;
pub mod seed;

pub use config::AppConfig;
pub use db::{MemoryStore, SchoolStore, SqliteStore};
pub use error::{ConfigError, ModelError, ReportError, StoreError};
pub use model::School;
pub use report::{CourseReport, CourseScheduleReport, Report, TeacherScheduleReport};
