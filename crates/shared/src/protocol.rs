use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    ExperienceLevel, InterviewId, InterviewStatus, InterviewType, QuestionId, ResumeId, UserId,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

/// Returned by both `/api/login` and `/api/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResumeResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub resume_id: ResumeId,
    #[serde(default)]
    pub text_preview: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartInterviewRequest {
    pub job_role: String,
    pub experience_level: ExperienceLevel,
    pub interview_type: InterviewType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub id: QuestionId,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub topic: Option<String>,
}

/// The deployed service emits `interview_id`; the alias keeps `id` working
/// for implementations that follow the published contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartInterviewResponse {
    #[serde(alias = "interview_id")]
    pub id: InterviewId,
    pub questions: Vec<InterviewQuestion>,
    #[serde(default)]
    pub total_questions: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponseRequest {
    pub question_id: QuestionId,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponseResponse {
    pub completed: bool,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub next_question: Option<usize>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One past attempt as listed by `/api/interview-history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSummary {
    pub id: InterviewId,
    pub job_role: String,
    pub experience_level: ExperienceLevel,
    pub interview_type: InterviewType,
    pub status: InterviewStatus,
    #[serde(default)]
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewHistoryResponse {
    pub interviews: Vec<InterviewSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub answer: String,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Full stored record from `/api/interview/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewRecord {
    pub id: InterviewId,
    pub job_role: String,
    pub experience_level: ExperienceLevel,
    pub interview_type: InterviewType,
    pub status: InterviewStatus,
    pub questions: Vec<InterviewQuestion>,
    #[serde(default)]
    pub responses: Vec<SubmittedAnswer>,
    #[serde(default)]
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}
