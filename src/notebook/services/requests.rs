//! Request payloads accepted by the notebook review service.

use crate::notebook::domain::{Evaluation, NotebookContent, NotebookDomainError, NotebookId};
use crate::volunteer::domain::VolunteerId;

/// Request payload for importing a scanned notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportNotebookRequest {
    student_name: String,
    prison_unit: String,
    student_registration: Option<String>,
    subjects: Vec<String>,
    answers: Vec<String>,
    relevant_content: Option<String>,
}

impl ImportNotebookRequest {
    /// Creates a request with the required student and unit fields.
    #[must_use]
    pub fn new(student_name: impl Into<String>, prison_unit: impl Into<String>) -> Self {
        Self {
            student_name: student_name.into(),
            prison_unit: prison_unit.into(),
            student_registration: None,
            subjects: Vec::new(),
            answers: Vec::new(),
            relevant_content: None,
        }
    }

    /// Sets the student registration number.
    #[must_use]
    pub fn with_student_registration(mut self, registration: impl Into<String>) -> Self {
        self.student_registration = Some(registration.into());
        self
    }

    /// Sets the subject labels.
    #[must_use]
    pub fn with_subjects(mut self, subjects: impl IntoIterator<Item = String>) -> Self {
        self.subjects = subjects.into_iter().collect();
        self
    }

    /// Sets the free-text answers.
    #[must_use]
    pub fn with_answers(mut self, answers: impl IntoIterator<Item = String>) -> Self {
        self.answers = answers.into_iter().collect();
        self
    }

    /// Sets the relevant-content note.
    #[must_use]
    pub fn with_relevant_content(mut self, note: impl Into<String>) -> Self {
        self.relevant_content = Some(note.into());
        self
    }

    pub(super) fn into_content(self) -> Result<NotebookContent, NotebookDomainError> {
        let mut content = NotebookContent::new(self.student_name, self.prison_unit)?
            .with_subjects(self.subjects)?
            .with_answers(self.answers)?;
        if let Some(registration) = self.student_registration {
            content = content.with_student_registration(registration)?;
        }
        if let Some(note) = self.relevant_content {
            content = content.with_relevant_content(note);
        }
        Ok(content)
    }
}

/// Request payload for submitting a notebook evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluateNotebookRequest {
    volunteer_id: VolunteerId,
    notebook_id: NotebookId,
    conclusion: String,
    content_excluded: bool,
    corrected_subjects: Vec<String>,
    corrected_answers: Vec<String>,
}

impl EvaluateNotebookRequest {
    /// Creates a request carrying the evaluator, notebook, and conclusion.
    #[must_use]
    pub fn new(
        volunteer_id: VolunteerId,
        notebook_id: NotebookId,
        conclusion: impl Into<String>,
    ) -> Self {
        Self {
            volunteer_id,
            notebook_id,
            conclusion: conclusion.into(),
            content_excluded: false,
            corrected_subjects: Vec::new(),
            corrected_answers: Vec::new(),
        }
    }

    /// Marks the notebook content as excluded from publication.
    #[must_use]
    pub const fn excluding_content(mut self) -> Self {
        self.content_excluded = true;
        self
    }

    /// Sets the corrected subject labels.
    #[must_use]
    pub fn with_corrected_subjects(mut self, subjects: impl IntoIterator<Item = String>) -> Self {
        self.corrected_subjects = subjects.into_iter().collect();
        self
    }

    /// Sets the corrected answers.
    #[must_use]
    pub fn with_corrected_answers(mut self, answers: impl IntoIterator<Item = String>) -> Self {
        self.corrected_answers = answers.into_iter().collect();
        self
    }

    /// Returns the evaluating volunteer.
    #[must_use]
    pub const fn volunteer_id(&self) -> VolunteerId {
        self.volunteer_id
    }

    /// Returns the evaluated notebook.
    #[must_use]
    pub const fn notebook_id(&self) -> NotebookId {
        self.notebook_id
    }

    pub(super) fn to_evaluation(&self) -> Result<Evaluation, NotebookDomainError> {
        Ok(Evaluation::new(self.conclusion.as_str())?
            .with_content_excluded(self.content_excluded)
            .with_corrected_subjects(self.corrected_subjects.iter().cloned())?
            .with_corrected_answers(self.corrected_answers.iter().cloned())?)
    }
}
