//! `PostgreSQL` repository implementation for notebook storage.
//!
//! Lifecycle transitions are issued as one `UPDATE ... WHERE ... RETURNING`
//! statement each. The `WHERE` clause carries the whole precondition, so a
//! concurrent transition either sees the row still matching and wins, or sees
//! it already changed and returns no row.

use super::{
    models::{NewNotebookRow, NotebookRow, NotebookWithReserverRow},
    schema::notebooks,
};
use crate::notebook::{
    domain::{Evaluation, Notebook, NotebookContent, NotebookId, PersistedNotebookData},
    ports::{
        NotebookRepository, NotebookRepositoryError, NotebookRepositoryResult,
        NotebookWithReserver, TransitionOutcome,
    },
};
use crate::volunteer::domain::{PersistedVolunteerData, Volunteer, VolunteerEmail, VolunteerId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::Value;

/// `PostgreSQL` connection pool type used by notebook adapters.
pub type NotebookPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed notebook repository.
#[derive(Debug, Clone)]
pub struct PostgresNotebookRepository {
    pool: NotebookPgPool,
}

impl PostgresNotebookRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: NotebookPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> NotebookRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> NotebookRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(NotebookRepositoryError::persistence)?;
            operation(&mut connection)
        })
        .await
        .map_err(NotebookRepositoryError::persistence)?
    }
}

#[async_trait]
impl NotebookRepository for PostgresNotebookRepository {
    async fn import(&self, notebook: &Notebook) -> NotebookRepositoryResult<()> {
        let notebook_id = notebook.id();
        let new_row = to_new_row(notebook)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(notebooks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        NotebookRepositoryError::DuplicateNotebook(notebook_id)
                    }
                    _ => NotebookRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: NotebookId) -> NotebookRepositoryResult<Option<Notebook>> {
        self.run_blocking(move |connection| {
            let row = notebooks::table
                .filter(notebooks::id.eq(id.into_inner()))
                .select(NotebookRow::as_select())
                .first::<NotebookRow>(connection)
                .optional()
                .map_err(NotebookRepositoryError::persistence)?;
            row.map(row_to_notebook).transpose()
        })
        .await
    }

    async fn find_with_reserver(
        &self,
        id: NotebookId,
    ) -> NotebookRepositoryResult<Option<NotebookWithReserver>> {
        self.run_blocking(move |connection| {
            let row = find_notebook_with_reserver(connection, id)?;
            row.map(row_to_notebook_with_reserver).transpose()
        })
        .await
    }

    async fn claim_for_volunteer(
        &self,
        notebook_id: NotebookId,
        volunteer_id: VolunteerId,
        reserved_at: DateTime<Utc>,
    ) -> NotebookRepositoryResult<TransitionOutcome> {
        self.run_blocking(move |connection| {
            let row = diesel::update(
                notebooks::table
                    .filter(notebooks::id.eq(notebook_id.into_inner()))
                    .filter(notebooks::reserved_at.is_null())
                    .filter(notebooks::evaluated_at.is_null()),
            )
            .set((
                notebooks::reserved_by.eq(volunteer_id.into_inner()),
                notebooks::reserved_at.eq(reserved_at),
            ))
            .returning(NotebookRow::as_returning())
            .get_result::<NotebookRow>(connection)
            .optional()
            .map_err(NotebookRepositoryError::persistence)?;
            row_to_outcome(row)
        })
        .await
    }

    async fn evaluate(
        &self,
        notebook_id: NotebookId,
        evaluator: VolunteerId,
        evaluation: &Evaluation,
        evaluated_at: DateTime<Utc>,
    ) -> NotebookRepositoryResult<TransitionOutcome> {
        let conclusion = evaluation.conclusion().to_owned();
        let content_excluded = evaluation.content_excluded();
        let corrected_subjects = strings_to_json(evaluation.corrected_subjects())?;
        let corrected_answers = strings_to_json(evaluation.corrected_answers())?;

        self.run_blocking(move |connection| {
            let row = diesel::update(
                notebooks::table
                    .filter(notebooks::id.eq(notebook_id.into_inner()))
                    .filter(notebooks::evaluated_at.is_null())
                    .filter(notebooks::reserved_by.eq(evaluator.into_inner())),
            )
            .set((
                notebooks::evaluated_at.eq(evaluated_at),
                notebooks::conclusion.eq(&conclusion),
                notebooks::content_excluded.eq(content_excluded),
                notebooks::corrected_subjects.eq(&corrected_subjects),
                notebooks::corrected_answers.eq(&corrected_answers),
            ))
            .returning(NotebookRow::as_returning())
            .get_result::<NotebookRow>(connection)
            .optional()
            .map_err(NotebookRepositoryError::persistence)?;
            row_to_outcome(row)
        })
        .await
    }

    async fn list_available(&self) -> NotebookRepositoryResult<Vec<Notebook>> {
        self.run_blocking(move |connection| {
            let rows = notebooks::table
                .filter(notebooks::reserved_at.is_null())
                .filter(notebooks::evaluated_at.is_null())
                .order((notebooks::created_at.asc(), notebooks::id.asc()))
                .select(NotebookRow::as_select())
                .load::<NotebookRow>(connection)
                .map_err(NotebookRepositoryError::persistence)?;
            rows.into_iter().map(row_to_notebook).collect()
        })
        .await
    }

    async fn list_reserved_by(
        &self,
        volunteer_id: VolunteerId,
    ) -> NotebookRepositoryResult<Vec<Notebook>> {
        self.run_blocking(move |connection| {
            let rows = notebooks::table
                .filter(notebooks::reserved_by.eq(volunteer_id.into_inner()))
                .filter(notebooks::evaluated_at.is_null())
                .order((notebooks::reserved_at.asc(), notebooks::id.asc()))
                .select(NotebookRow::as_select())
                .load::<NotebookRow>(connection)
                .map_err(NotebookRepositoryError::persistence)?;
            rows.into_iter().map(row_to_notebook).collect()
        })
        .await
    }

    async fn count_evaluated_by(
        &self,
        volunteer_id: VolunteerId,
    ) -> NotebookRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let count = notebooks::table
                .filter(notebooks::reserved_by.eq(volunteer_id.into_inner()))
                .filter(notebooks::evaluated_at.is_not_null())
                .count()
                .get_result::<i64>(connection)
                .map_err(NotebookRepositoryError::persistence)?;
            u64::try_from(count).map_err(NotebookRepositoryError::invalid_persisted_data)
        })
        .await
    }
}

fn to_new_row(notebook: &Notebook) -> NotebookRepositoryResult<NewNotebookRow> {
    let content = notebook.content();
    Ok(NewNotebookRow {
        id: notebook.id().into_inner(),
        student_name: content.student_name().to_owned(),
        student_registration: content.student_registration().map(str::to_owned),
        prison_unit: content.prison_unit().to_owned(),
        subjects: strings_to_json(content.subjects())?,
        answers: strings_to_json(content.answers())?,
        relevant_content: content.relevant_content().map(str::to_owned),
        created_at: notebook.created_at(),
    })
}

fn strings_to_json(values: &[String]) -> NotebookRepositoryResult<Value> {
    serde_json::to_value(values).map_err(NotebookRepositoryError::persistence)
}

fn json_to_strings(value: Value) -> NotebookRepositoryResult<Vec<String>> {
    serde_json::from_value(value).map_err(NotebookRepositoryError::invalid_persisted_data)
}

fn row_to_outcome(row: Option<NotebookRow>) -> NotebookRepositoryResult<TransitionOutcome> {
    match row {
        Some(updated) => Ok(TransitionOutcome::applied(row_to_notebook(updated)?)),
        None => Ok(TransitionOutcome::Rejected),
    }
}

fn row_to_notebook(row: NotebookRow) -> NotebookRepositoryResult<Notebook> {
    let NotebookRow {
        id,
        student_name,
        student_registration,
        prison_unit,
        subjects,
        answers,
        relevant_content,
        reserved_by,
        reserved_at,
        evaluated_at,
        conclusion,
        content_excluded,
        corrected_subjects,
        corrected_answers,
        created_at,
    } = row;

    let parsed_subjects = json_to_strings(subjects)?;
    let parsed_answers = json_to_strings(answers)?;
    let mut content = NotebookContent::new(student_name, prison_unit)
        .and_then(|base| base.with_subjects(parsed_subjects))
        .and_then(|base| base.with_answers(parsed_answers))
        .map_err(NotebookRepositoryError::invalid_persisted_data)?;
    if let Some(registration) = student_registration {
        content = content
            .with_student_registration(registration)
            .map_err(NotebookRepositoryError::invalid_persisted_data)?;
    }
    if let Some(note) = relevant_content {
        content = content.with_relevant_content(note);
    }

    let evaluation = conclusion
        .map(|text| {
            build_evaluation(
                text,
                content_excluded.unwrap_or(false),
                corrected_subjects,
                corrected_answers,
            )
        })
        .transpose()?;

    Notebook::from_persisted(PersistedNotebookData {
        id: NotebookId::from_uuid(id),
        content,
        reserved_by: reserved_by.map(VolunteerId::from_uuid),
        reserved_at,
        evaluation,
        evaluated_at,
        created_at,
    })
    .map_err(NotebookRepositoryError::invalid_persisted_data)
}

fn build_evaluation(
    conclusion: String,
    content_excluded: bool,
    corrected_subjects: Option<Value>,
    corrected_answers: Option<Value>,
) -> NotebookRepositoryResult<Evaluation> {
    let subjects = corrected_subjects
        .map(json_to_strings)
        .transpose()?
        .unwrap_or_default();
    let answers = corrected_answers
        .map(json_to_strings)
        .transpose()?
        .unwrap_or_default();

    Evaluation::new(conclusion)
        .and_then(|evaluation| evaluation.with_corrected_subjects(subjects))
        .and_then(|evaluation| evaluation.with_corrected_answers(answers))
        .map(|evaluation| evaluation.with_content_excluded(content_excluded))
        .map_err(NotebookRepositoryError::invalid_persisted_data)
}

fn row_to_notebook_with_reserver(
    row: NotebookWithReserverRow,
) -> NotebookRepositoryResult<NotebookWithReserver> {
    let NotebookWithReserverRow {
        notebook: notebook_row,
        reserver_name,
        reserver_email,
        reserver_created_at,
    } = row;
    let notebook = row_to_notebook(notebook_row)?;

    let reserver = match (
        notebook.reserved_by(),
        reserver_name,
        reserver_email,
        reserver_created_at,
    ) {
        (Some(volunteer_id), Some(name), Some(email), Some(created_at)) => {
            let parsed_email = VolunteerEmail::new(email)
                .map_err(NotebookRepositoryError::invalid_persisted_data)?;
            Some(Volunteer::from_persisted(PersistedVolunteerData {
                id: volunteer_id,
                name,
                email: parsed_email,
                created_at,
            }))
        }
        _ => None,
    };

    Ok(NotebookWithReserver { notebook, reserver })
}

fn find_notebook_with_reserver(
    connection: &mut PgConnection,
    id: NotebookId,
) -> NotebookRepositoryResult<Option<NotebookWithReserverRow>> {
    let query = diesel::sql_query(concat!(
        "SELECT n.id, n.student_name, n.student_registration, n.prison_unit, n.subjects, ",
        "n.answers, n.relevant_content, n.reserved_by, n.reserved_at, n.evaluated_at, ",
        "n.conclusion, n.content_excluded, n.corrected_subjects, n.corrected_answers, ",
        "n.created_at, v.name AS reserver_name, v.email AS reserver_email, ",
        "v.created_at AS reserver_created_at ",
        "FROM notebooks n ",
        "LEFT JOIN volunteers v ON v.id = n.reserved_by ",
        "WHERE n.id = $1",
    ))
    .bind::<diesel::sql_types::Uuid, _>(id.into_inner());

    query
        .get_result::<NotebookWithReserverRow>(connection)
        .optional()
        .map_err(NotebookRepositoryError::persistence)
}
