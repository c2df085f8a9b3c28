//! Data models for recruitment entities.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `User`, `Role`: identity records and the auth form payloads
//! - `Job`, `JobQuery`, `JobForm`: postings and their filters
//! - `Application`, `Upload`: applications and multipart uploads
//! - `Interview`: scheduling records
//! - `DashboardStats`, `Activity`, `Faq`, `ChatReply`: dashboard and chatbot

pub mod application;
pub mod dashboard;
pub mod interview;
pub mod job;
pub mod user;

pub use application::{
    Application, ApplicationForm, ApplicationQuery, ApplicationStatus, CustomAnswer, RatingInput,
    ResumeFile, Upload,
};
pub use dashboard::{Activity, Breakdown, ChatReply, DashboardStats, Faq, FaqEntry, Overview, TopJob};
pub use interview::{Interview, InterviewQuery, InterviewStatus, InterviewType, ScheduleInterview};
pub use job::{Company, Job, JobForm, JobLocation, JobQuery, JobStatus, JobType, Salary, Skill, SortOrder};
pub use user::{
    Address, Education, LoginForm, PasswordChange, ProfileUpdate, RegisterForm, Role, User, UserProfile,
};
