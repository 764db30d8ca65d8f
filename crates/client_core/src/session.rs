//! Session controller: owns all client state, drives view selection, and
//! serializes interactions with the interview service.
//!
//! Every mutating command follows the same discipline: entry guards run
//! first (no request in flight, required fields present), then `loading` is
//! set immediately before the single `.await` and cleared immediately after
//! it, with nothing fallible between set and clear. A failed request is
//! terminal for that attempt; the surfaced message lands in
//! [`Session::alert`] and the prior state is otherwise unchanged.

use shared::{
    domain::{ExperienceLevel, InterviewId, InterviewType},
    protocol::{
        AuthResponse, InterviewQuestion, InterviewRecord, InterviewSummary, LoginRequest,
        RegisterRequest, StartInterviewRequest, SubmitResponseRequest, UserProfile,
    },
};
use tracing::{debug, info, warn};

use crate::{
    error::{CommandError, ServiceError},
    service::{InterviewService, ResumeUpload},
    token_store::TokenStore,
};

const LOGIN_FALLBACK: &str = "Login failed. Please try again.";
const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";
const UPLOAD_FALLBACK: &str = "Resume upload failed. Please try again.";
const START_FALLBACK: &str = "Could not start the interview. Please try again.";
const SUBMIT_FALLBACK: &str = "Could not submit your answer. Please try again.";
const HISTORY_FALLBACK: &str = "Could not load your interview history.";
const FETCH_FALLBACK: &str = "Could not load that interview.";

/// The display states of the client, one of which is active at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Login,
    Register,
    Dashboard,
    Interview,
    FeedbackReview,
}

impl View {
    pub fn is_authenticated(self) -> bool {
        !matches!(self, Self::Login | Self::Register)
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::Dashboard => "dashboard",
            Self::Interview => "interview",
            Self::FeedbackReview => "feedback-review",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// What the user wants the next interview to look like.
#[derive(Debug, Clone, Default)]
pub struct InterviewSetup {
    pub job_role: String,
    pub experience_level: ExperienceLevel,
    pub interview_type: InterviewType,
}

/// A resume file selected in the UI but not yet uploaded.
#[derive(Debug, Clone)]
pub struct SelectedResume {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// The server-issued interview plus the controller-owned cursor through it.
#[derive(Debug, Clone)]
pub struct ActiveInterview {
    pub id: InterviewId,
    pub questions: Vec<InterviewQuestion>,
    pub question_index: usize,
    pub responses: Vec<String>,
    pub current_answer: String,
}

impl ActiveInterview {
    fn new(id: InterviewId, questions: Vec<InterviewQuestion>) -> Self {
        Self {
            id,
            questions,
            question_index: 0,
            responses: Vec::new(),
            current_answer: String::new(),
        }
    }

    pub fn current_question(&self) -> Option<&InterviewQuestion> {
        self.questions.get(self.question_index)
    }

    /// 1-based progress for display: `(current, total)`.
    pub fn progress(&self) -> (usize, usize) {
        (self.question_index + 1, self.questions.len())
    }
}

/// Root state aggregate, owned by the controller.
#[derive(Debug, Default)]
pub struct Session {
    pub auth_token: Option<String>,
    pub current_user: Option<UserProfile>,
    pub view: View,
    pub loading: bool,
    /// Surfaced error text: backend `detail` verbatim, or a per-operation
    /// fallback.
    pub alert: Option<String>,
    pub login_form: LoginForm,
    pub register_form: RegisterForm,
    pub setup: InterviewSetup,
    pub selected_resume: Option<SelectedResume>,
    pub resume_uploaded: bool,
    pub resume_preview: Option<String>,
    pub interview: Option<ActiveInterview>,
    pub feedback: Option<String>,
    pub history: Vec<InterviewSummary>,
}

/// Drives a [`Session`] through its state machine, one request at a time.
pub struct SessionController<S, T> {
    service: S,
    tokens: T,
    session: Session,
}

impl<S: InterviewService, T: TokenStore> SessionController<S, T> {
    pub fn new(service: S, tokens: T) -> Self {
        Self {
            service,
            tokens,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    // ---- view toggles ------------------------------------------------------

    pub fn show_register(&mut self) {
        if self.session.view == View::Login {
            self.session.alert = None;
            self.session.view = View::Register;
        }
    }

    pub fn show_login(&mut self) {
        if self.session.view == View::Register {
            self.session.alert = None;
            self.session.view = View::Login;
        }
    }

    // ---- form scratch state ------------------------------------------------

    pub fn set_login_form(&mut self, email: impl Into<String>, password: impl Into<String>) {
        self.session.login_form = LoginForm {
            email: email.into(),
            password: password.into(),
        };
    }

    pub fn set_register_form(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) {
        self.session.register_form = RegisterForm {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        };
    }

    pub fn set_job_role(&mut self, job_role: impl Into<String>) {
        self.session.setup.job_role = job_role.into();
    }

    pub fn set_experience_level(&mut self, level: ExperienceLevel) {
        self.session.setup.experience_level = level;
    }

    pub fn set_interview_type(&mut self, interview_type: InterviewType) {
        self.session.setup.interview_type = interview_type;
    }

    pub fn select_resume(&mut self, filename: impl Into<String>, bytes: Vec<u8>) {
        self.session.selected_resume = Some(SelectedResume {
            filename: filename.into(),
            bytes,
        });
    }

    pub fn set_current_answer(&mut self, answer: impl Into<String>) {
        if let Some(interview) = self.session.interview.as_mut() {
            interview.current_answer = answer.into();
        }
    }

    pub fn clear_alert(&mut self) {
        self.session.alert = None;
    }

    // ---- authentication ----------------------------------------------------

    pub async fn submit_login(&mut self) -> Result<(), CommandError> {
        self.ensure_idle()?;
        self.ensure_view(View::Login)?;
        let email = self.session.login_form.email.trim().to_string();
        if email.is_empty() || self.session.login_form.password.is_empty() {
            return Err(CommandError::Validation(
                "Email and password are required.".into(),
            ));
        }
        let request = LoginRequest {
            email,
            password: self.session.login_form.password.clone(),
        };

        self.session.alert = None;
        self.session.loading = true;
        let result = self.service.login(&request).await;
        self.session.loading = false;

        match result {
            Ok(auth) => {
                self.install_auth(auth);
                Ok(())
            }
            // Failed attempt: form fields stay put for correction.
            Err(err) => Err(self.surface(err, LOGIN_FALLBACK)),
        }
    }

    pub async fn submit_registration(&mut self) -> Result<(), CommandError> {
        self.ensure_idle()?;
        self.ensure_view(View::Register)?;
        let form = &self.session.register_form;
        let name = form.name.trim().to_string();
        let email = form.email.trim().to_string();
        if name.is_empty() || email.is_empty() || form.password.is_empty() {
            return Err(CommandError::Validation(
                "Name, email and password are required.".into(),
            ));
        }
        let request = RegisterRequest {
            name,
            email,
            password: form.password.clone(),
        };

        self.session.alert = None;
        self.session.loading = true;
        let result = self.service.register(&request).await;
        self.session.loading = false;

        match result {
            Ok(auth) => {
                self.install_auth(auth);
                Ok(())
            }
            Err(err) => Err(self.surface(err, REGISTER_FALLBACK)),
        }
    }

    fn install_auth(&mut self, auth: AuthResponse) {
        if let Err(err) = self.tokens.store(&auth.access_token) {
            // A broken durable slot only costs the user the next silent
            // sign-in, so the session proceeds.
            warn!(error = %err, "failed to persist session token");
        }
        info!(user = %auth.user.email, "session authenticated");
        self.session.auth_token = Some(auth.access_token);
        self.session.current_user = Some(auth.user);
        self.session.login_form = LoginForm::default();
        self.session.register_form = RegisterForm::default();
        self.session.alert = None;
        self.session.view = View::Dashboard;
    }

    /// Silent re-authentication at startup. Exactly one validation call; any
    /// failure clears the durable slot and stays anonymous without an alert.
    pub async fn rehydrate(&mut self) {
        let token = match self.tokens.load() {
            Ok(Some(token)) => token,
            Ok(None) => return,
            Err(err) => {
                warn!(error = %err, "failed to read persisted token");
                return;
            }
        };

        self.session.loading = true;
        let result = self.service.interview_history(&token).await;
        self.session.loading = false;

        match result {
            Ok(history) => {
                info!("session rehydrated from persisted token");
                self.session.auth_token = Some(token);
                self.session.history = history.interviews;
                self.session.view = View::Dashboard;
            }
            Err(err) => {
                debug!(error = %err, "persisted token rejected, staying anonymous");
                if let Err(err) = self.tokens.clear() {
                    warn!(error = %err, "failed to clear rejected token");
                }
            }
        }
    }

    pub fn logout(&mut self) {
        if !self.session.view.is_authenticated() {
            return;
        }
        if let Err(err) = self.tokens.clear() {
            warn!(error = %err, "failed to clear persisted token");
        }
        info!("session logged out");
        self.session = Session::default();
    }

    // ---- dashboard ---------------------------------------------------------

    pub async fn upload_resume(&mut self) -> Result<(), CommandError> {
        self.ensure_idle()?;
        self.ensure_view(View::Dashboard)?;
        let Some(resume) = self.session.selected_resume.clone() else {
            return Err(CommandError::Validation("Select a resume file first.".into()));
        };
        if !resume.filename.to_ascii_lowercase().ends_with(".pdf") {
            return Err(CommandError::Validation("Only PDF files are allowed.".into()));
        }
        let token = self.bearer()?;
        let upload = ResumeUpload {
            filename: resume.filename,
            bytes: resume.bytes,
        };

        self.session.alert = None;
        self.session.loading = true;
        let result = self.service.upload_resume(&token, upload).await;
        self.session.loading = false;

        match result {
            Ok(response) => {
                debug!(resume_id = %response.resume_id, "resume uploaded");
                self.session.resume_uploaded = true;
                self.session.resume_preview = response.text_preview;
                self.session.selected_resume = None;
                Ok(())
            }
            Err(err) => Err(self.surface(err, UPLOAD_FALLBACK)),
        }
    }

    /// Note: deliberately not gated on `resume_uploaded`; the service owns
    /// that requirement and its refusal is surfaced like any other failure.
    pub async fn start_interview(&mut self) -> Result<(), CommandError> {
        self.ensure_idle()?;
        self.ensure_view(View::Dashboard)?;
        let job_role = self.session.setup.job_role.trim().to_string();
        if job_role.is_empty() {
            return Err(CommandError::Validation(
                "Enter the job role to interview for.".into(),
            ));
        }
        let token = self.bearer()?;
        let request = StartInterviewRequest {
            job_role,
            experience_level: self.session.setup.experience_level,
            interview_type: self.session.setup.interview_type,
        };

        self.session.alert = None;
        self.session.loading = true;
        let result = self.service.start_interview(&token, &request).await;
        self.session.loading = false;

        match result {
            Ok(response) if response.questions.is_empty() => {
                // An interview with no questions could never be answered.
                warn!(interview_id = %response.id, "service returned an empty interview");
                self.session.alert = Some(START_FALLBACK.to_string());
                Err(CommandError::Service(START_FALLBACK.to_string()))
            }
            Ok(response) => {
                info!(
                    interview_id = %response.id,
                    questions = response.questions.len(),
                    "interview started"
                );
                self.session.interview =
                    Some(ActiveInterview::new(response.id, response.questions));
                self.session.feedback = None;
                self.session.view = View::Interview;
                Ok(())
            }
            Err(err) => Err(self.surface(err, START_FALLBACK)),
        }
    }

    pub async fn refresh_history(&mut self) -> Result<(), CommandError> {
        self.ensure_idle()?;
        self.ensure_view(View::Dashboard)?;
        let token = self.bearer()?;

        self.session.alert = None;
        self.session.loading = true;
        let result = self.service.interview_history(&token).await;
        self.session.loading = false;

        match result {
            Ok(history) => {
                self.session.history = history.interviews;
                Ok(())
            }
            Err(err) => Err(self.surface(err, HISTORY_FALLBACK)),
        }
    }

    /// Fetch the stored record of a past attempt (questions, answers,
    /// feedback) for review on the dashboard.
    pub async fn review_past_interview(
        &mut self,
        interview_id: &InterviewId,
    ) -> Result<InterviewRecord, CommandError> {
        self.ensure_idle()?;
        self.ensure_view(View::Dashboard)?;
        let token = self.bearer()?;

        self.session.alert = None;
        self.session.loading = true;
        let result = self.service.fetch_interview(&token, interview_id).await;
        self.session.loading = false;

        result.map_err(|err| self.surface(err, FETCH_FALLBACK))
    }

    // ---- interview ---------------------------------------------------------

    pub async fn submit_answer(&mut self) -> Result<(), CommandError> {
        self.ensure_idle()?;
        self.ensure_view(View::Interview)?;
        let token = self.bearer()?;
        let Some(interview) = self.session.interview.as_ref() else {
            return Err(CommandError::Validation("No interview in progress.".into()));
        };
        let answer = interview.current_answer.trim().to_string();
        if answer.is_empty() {
            return Err(CommandError::Validation("Answer cannot be blank.".into()));
        }
        let Some(question) = interview.current_question() else {
            return Err(CommandError::Validation(
                "No question awaiting an answer.".into(),
            ));
        };
        let request = SubmitResponseRequest {
            question_id: question.id.clone(),
            answer: answer.clone(),
        };

        self.session.alert = None;
        self.session.loading = true;
        let result = self.service.submit_response(&token, &request).await;
        self.session.loading = false;

        match result {
            Ok(response) => {
                // The guards above ensure the aggregate is still present.
                if let Some(interview) = self.session.interview.as_mut() {
                    interview.responses.push(answer);
                    interview.current_answer.clear();
                    if response.completed {
                        info!(
                            interview_id = %interview.id,
                            answered = interview.responses.len(),
                            "interview completed"
                        );
                        self.session.feedback = response.feedback;
                        self.session.view = View::FeedbackReview;
                    } else {
                        interview.question_index += 1;
                        debug!(
                            question_index = interview.question_index,
                            "advanced to next question"
                        );
                    }
                }
                Ok(())
            }
            // Failure leaves the answer text in place for a retry.
            Err(err) => Err(self.surface(err, SUBMIT_FALLBACK)),
        }
    }

    // ---- feedback review ---------------------------------------------------

    pub fn finish_review(&mut self) {
        if self.session.view != View::FeedbackReview {
            return;
        }
        self.session.interview = None;
        self.session.feedback = None;
        self.session.alert = None;
        self.session.view = View::Dashboard;
    }

    pub fn practice_again(&mut self) {
        self.finish_review();
    }

    // ---- shared guards -----------------------------------------------------

    fn ensure_idle(&self) -> Result<(), CommandError> {
        if self.session.loading {
            Err(CommandError::RequestInFlight)
        } else {
            Ok(())
        }
    }

    fn ensure_view(&self, expected: View) -> Result<(), CommandError> {
        if self.session.view == expected {
            Ok(())
        } else {
            Err(CommandError::Validation(format!(
                "This action is only available from the {expected} view."
            )))
        }
    }

    fn bearer(&self) -> Result<String, CommandError> {
        self.session
            .auth_token
            .clone()
            .ok_or_else(|| CommandError::Validation("Not signed in.".into()))
    }

    /// Record a failed request: alert carries the backend `detail` verbatim
    /// when present, otherwise the per-operation fallback.
    fn surface(&mut self, err: ServiceError, fallback: &str) -> CommandError {
        let message = err.surface(fallback);
        warn!(error = %err, surfaced = %message, "request failed");
        self.session.alert = Some(message.clone());
        CommandError::Service(message)
    }
}
