//! Notebook content and evaluation value objects.

use super::NotebookDomainError;
use serde::{Deserialize, Serialize};

/// Maximum number of subject labels a notebook carries.
pub const MAX_SUBJECTS: usize = 10;

/// Maximum number of free-text answers a notebook carries.
pub const MAX_ANSWERS: usize = 13;

/// Maximum length, in characters, of the student name and prison unit.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length, in characters, of a student registration number.
pub const MAX_REGISTRATION_LEN: usize = 64;

/// Immutable content captured when a notebook is imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookContent {
    student_name: String,
    student_registration: Option<String>,
    prison_unit: String,
    subjects: Vec<String>,
    answers: Vec<String>,
    relevant_content: Option<String>,
}

impl NotebookContent {
    /// Creates content with the required student and unit fields.
    ///
    /// # Errors
    ///
    /// Returns [`NotebookDomainError::EmptyStudentName`] or
    /// [`NotebookDomainError::EmptyPrisonUnit`] when either value is blank,
    /// and [`NotebookDomainError::TooLong`] when either exceeds
    /// [`MAX_NAME_LEN`] characters.
    pub fn new(
        student_name: impl Into<String>,
        prison_unit: impl Into<String>,
    ) -> Result<Self, NotebookDomainError> {
        let student = normalize_required(student_name.into())
            .ok_or(NotebookDomainError::EmptyStudentName)?;
        ensure_fits("student name", &student, MAX_NAME_LEN)?;
        let unit =
            normalize_required(prison_unit.into()).ok_or(NotebookDomainError::EmptyPrisonUnit)?;
        ensure_fits("prison unit", &unit, MAX_NAME_LEN)?;

        Ok(Self {
            student_name: student,
            student_registration: None,
            prison_unit: unit,
            subjects: Vec::new(),
            answers: Vec::new(),
            relevant_content: None,
        })
    }

    /// Sets the student's registration number within the prison system.
    ///
    /// # Errors
    ///
    /// Returns [`NotebookDomainError::TooLong`] when the number exceeds
    /// [`MAX_REGISTRATION_LEN`] characters.
    pub fn with_student_registration(
        mut self,
        registration: impl Into<String>,
    ) -> Result<Self, NotebookDomainError> {
        let normalized = normalize_required(registration.into());
        if let Some(value) = &normalized {
            ensure_fits("student registration", value, MAX_REGISTRATION_LEN)?;
        }
        self.student_registration = normalized;
        Ok(self)
    }

    /// Sets the subject labels.
    ///
    /// # Errors
    ///
    /// Returns [`NotebookDomainError::TooManySubjects`] when more than
    /// [`MAX_SUBJECTS`] labels are supplied.
    pub fn with_subjects(
        mut self,
        subjects: impl IntoIterator<Item = String>,
    ) -> Result<Self, NotebookDomainError> {
        self.subjects = bounded_subjects(subjects)?;
        Ok(self)
    }

    /// Sets the free-text answers.
    ///
    /// # Errors
    ///
    /// Returns [`NotebookDomainError::TooManyAnswers`] when more than
    /// [`MAX_ANSWERS`] answers are supplied.
    pub fn with_answers(
        mut self,
        answers: impl IntoIterator<Item = String>,
    ) -> Result<Self, NotebookDomainError> {
        self.answers = bounded_answers(answers)?;
        Ok(self)
    }

    /// Sets the relevant-content note.
    #[must_use]
    pub fn with_relevant_content(mut self, note: impl Into<String>) -> Self {
        self.relevant_content = normalize_required(note.into());
        self
    }

    /// Returns the student name.
    #[must_use]
    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    /// Returns the student registration number, if recorded.
    #[must_use]
    pub fn student_registration(&self) -> Option<&str> {
        self.student_registration.as_deref()
    }

    /// Returns the prison unit.
    #[must_use]
    pub fn prison_unit(&self) -> &str {
        &self.prison_unit
    }

    /// Returns the subject labels.
    #[must_use]
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Returns the free-text answers.
    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// Returns the relevant-content note, if any.
    #[must_use]
    pub fn relevant_content(&self) -> Option<&str> {
        self.relevant_content.as_deref()
    }
}

/// The evaluator's assessment of a notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    conclusion: String,
    content_excluded: bool,
    corrected_subjects: Vec<String>,
    corrected_answers: Vec<String>,
}

impl Evaluation {
    /// Creates an evaluation with the given conclusion.
    ///
    /// # Errors
    ///
    /// Returns [`NotebookDomainError::EmptyConclusion`] when the conclusion
    /// is blank.
    pub fn new(conclusion: impl Into<String>) -> Result<Self, NotebookDomainError> {
        let normalized =
            normalize_required(conclusion.into()).ok_or(NotebookDomainError::EmptyConclusion)?;
        Ok(Self {
            conclusion: normalized,
            content_excluded: false,
            corrected_subjects: Vec::new(),
            corrected_answers: Vec::new(),
        })
    }

    /// Marks whether the notebook content must be excluded from publication.
    #[must_use]
    pub const fn with_content_excluded(mut self, excluded: bool) -> Self {
        self.content_excluded = excluded;
        self
    }

    /// Sets the corrected subject labels.
    ///
    /// # Errors
    ///
    /// Returns [`NotebookDomainError::TooManySubjects`] when more than
    /// [`MAX_SUBJECTS`] labels are supplied.
    pub fn with_corrected_subjects(
        mut self,
        subjects: impl IntoIterator<Item = String>,
    ) -> Result<Self, NotebookDomainError> {
        self.corrected_subjects = bounded_subjects(subjects)?;
        Ok(self)
    }

    /// Sets the corrected answers.
    ///
    /// # Errors
    ///
    /// Returns [`NotebookDomainError::TooManyAnswers`] when more than
    /// [`MAX_ANSWERS`] answers are supplied.
    pub fn with_corrected_answers(
        mut self,
        answers: impl IntoIterator<Item = String>,
    ) -> Result<Self, NotebookDomainError> {
        self.corrected_answers = bounded_answers(answers)?;
        Ok(self)
    }

    /// Returns the evaluator's conclusion.
    #[must_use]
    pub fn conclusion(&self) -> &str {
        &self.conclusion
    }

    /// Returns whether the notebook content is excluded.
    #[must_use]
    pub const fn content_excluded(&self) -> bool {
        self.content_excluded
    }

    /// Returns the corrected subject labels.
    #[must_use]
    pub fn corrected_subjects(&self) -> &[String] {
        &self.corrected_subjects
    }

    /// Returns the corrected answers.
    #[must_use]
    pub fn corrected_answers(&self) -> &[String] {
        &self.corrected_answers
    }
}

fn normalize_required(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Column limits count characters, not bytes.
fn ensure_fits(field: &'static str, value: &str, max: usize) -> Result<(), NotebookDomainError> {
    let length = value.chars().count();
    if length > max {
        return Err(NotebookDomainError::TooLong { field, length, max });
    }
    Ok(())
}

fn bounded_subjects(
    subjects: impl IntoIterator<Item = String>,
) -> Result<Vec<String>, NotebookDomainError> {
    let collected: Vec<String> = subjects.into_iter().collect();
    if collected.len() > MAX_SUBJECTS {
        return Err(NotebookDomainError::TooManySubjects {
            count: collected.len(),
            max: MAX_SUBJECTS,
        });
    }
    Ok(collected)
}

fn bounded_answers(
    answers: impl IntoIterator<Item = String>,
) -> Result<Vec<String>, NotebookDomainError> {
    let collected: Vec<String> = answers.into_iter().collect();
    if collected.len() > MAX_ANSWERS {
        return Err(NotebookDomainError::TooManyAnswers {
            count: collected.len(),
            max: MAX_ANSWERS,
        });
    }
    Ok(collected)
}
