//! Conditional updates and listings against a real `PostgreSQL` store.

use crate::postgres::helpers::{BoxError, StoreContext, store};
use cadernos::notebook::{
    domain::{
        Evaluation, MAX_NAME_LEN, MAX_REGISTRATION_LEN, Notebook, NotebookContent, NotebookId,
        NotebookState,
    },
    ports::{NotebookRepository, NotebookRepositoryError, TransitionOutcome},
};
use cadernos::volunteer::{
    domain::{MAX_EMAIL_LEN, MAX_VOLUNTEER_NAME_LEN, Volunteer, VolunteerEmail, VolunteerId},
    ports::VolunteerDirectory,
};
use chrono::Utc;
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;

fn import(context: &StoreContext, student: &str) -> Notebook {
    let content = NotebookContent::new(student, "Penitenciária Central do Estado")
        .and_then(|content| content.with_subjects(vec!["Geografia".to_owned()]))
        .and_then(|content| content.with_answers(vec!["Resposta".to_owned(); 13]))
        .expect("valid content");
    let notebook = Notebook::import(content, &DefaultClock);
    context
        .rt
        .block_on(context.notebooks.import(&notebook))
        .expect("import notebook");
    notebook
}

fn find(context: &StoreContext, id: NotebookId) -> Notebook {
    context
        .rt
        .block_on(context.notebooks.find_by_id(id))
        .expect("find notebook")
        .expect("notebook exists")
}

#[rstest]
fn imported_notebook_round_trips(store: Result<StoreContext, BoxError>) -> Result<(), BoxError> {
    let context = store?;
    let notebook = import(&context, "Lucia");

    let stored = find(&context, notebook.id());
    assert_eq!(stored.state(), NotebookState::Available);
    assert_eq!(stored.content(), notebook.content());

    let duplicate = context.rt.block_on(context.notebooks.import(&notebook));
    assert!(matches!(
        duplicate,
        Err(NotebookRepositoryError::DuplicateNotebook(id)) if id == notebook.id()
    ));
    Ok(())
}

#[rstest]
fn claim_then_evaluate_persists_every_field(
    store: Result<StoreContext, BoxError>,
) -> Result<(), BoxError> {
    let context = store?;
    let volunteer = context.register_volunteer("Marta")?;
    let notebook = import(&context, "Nelson");

    let claimed = context
        .rt
        .block_on(
            context
                .notebooks
                .claim_for_volunteer(notebook.id(), volunteer.id(), Utc::now()),
        )
        .expect("claim")
        .into_notebook()
        .expect("claim applies");
    assert_eq!(claimed.state(), NotebookState::Reserved);
    assert_eq!(claimed.reserved_by(), Some(volunteer.id()));

    let evaluation = Evaluation::new("Texto coeso")
        .and_then(|evaluation| evaluation.with_corrected_subjects(vec!["História".to_owned()]))
        .map(|evaluation| evaluation.with_content_excluded(true))
        .expect("valid evaluation");
    let evaluated = context
        .rt
        .block_on(context.notebooks.evaluate(
            notebook.id(),
            volunteer.id(),
            &evaluation,
            Utc::now(),
        ))
        .expect("evaluate")
        .into_notebook()
        .expect("evaluation applies");
    assert_eq!(evaluated.state(), NotebookState::Evaluated);
    assert_eq!(evaluated.evaluation(), Some(&evaluation));
    assert_eq!(find(&context, notebook.id()), evaluated);

    let count = context
        .rt
        .block_on(context.notebooks.count_evaluated_by(volunteer.id()))
        .expect("count");
    assert_eq!(count, 1);
    Ok(())
}

#[rstest]
fn transitions_reject_when_the_predicate_fails(
    store: Result<StoreContext, BoxError>,
) -> Result<(), BoxError> {
    let context = store?;
    let owner = context.register_volunteer("Oscar")?;
    let rival = context.register_volunteer("Patricia")?;
    let notebook = import(&context, "Quintino");
    let evaluation = Evaluation::new("Bom").expect("valid evaluation");

    let unreserved = context
        .rt
        .block_on(
            context
                .notebooks
                .evaluate(notebook.id(), owner.id(), &evaluation, Utc::now()),
        )
        .expect("evaluate");
    assert_eq!(unreserved, TransitionOutcome::Rejected);

    let first = context
        .rt
        .block_on(
            context
                .notebooks
                .claim_for_volunteer(notebook.id(), owner.id(), Utc::now()),
        )
        .expect("claim");
    assert!(first.is_applied());
    let second = context
        .rt
        .block_on(
            context
                .notebooks
                .claim_for_volunteer(notebook.id(), rival.id(), Utc::now()),
        )
        .expect("claim");
    assert_eq!(second, TransitionOutcome::Rejected);

    let by_rival = context
        .rt
        .block_on(
            context
                .notebooks
                .evaluate(notebook.id(), rival.id(), &evaluation, Utc::now()),
        )
        .expect("evaluate");
    assert_eq!(by_rival, TransitionOutcome::Rejected);

    let missing = context
        .rt
        .block_on(
            context
                .notebooks
                .claim_for_volunteer(NotebookId::new(), owner.id(), Utc::now()),
        )
        .expect("claim");
    assert_eq!(missing, TransitionOutcome::Rejected);
    assert_eq!(find(&context, notebook.id()).reserved_by(), Some(owner.id()));
    Ok(())
}

#[rstest]
fn concurrent_claims_have_exactly_one_winner(
    store: Result<StoreContext, BoxError>,
) -> Result<(), BoxError> {
    let context = store?;
    let notebook = import(&context, "Raquel");
    let volunteers: Vec<VolunteerId> = (0..8)
        .map(|index| {
            context
                .register_volunteer(&format!("Concorrente{index}"))
                .map(|volunteer| volunteer.id())
        })
        .collect::<Result<_, _>>()?;

    let repository = Arc::new(context.notebooks.clone());
    let outcomes = context.rt.block_on(async {
        let barrier = Arc::new(tokio::sync::Barrier::new(volunteers.len()));
        let handles: Vec<_> = volunteers
            .iter()
            .map(|&volunteer| {
                let repo = Arc::clone(&repository);
                let gate = Arc::clone(&barrier);
                let notebook_id = notebook.id();
                tokio::spawn(async move {
                    gate.wait().await;
                    repo.claim_for_volunteer(notebook_id, volunteer, Utc::now())
                        .await
                })
            })
            .collect();
        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            outcomes.push(handle.await.expect("task joins").expect("claim"));
        }
        outcomes
    });

    let winners: Vec<Notebook> = outcomes
        .into_iter()
        .filter_map(TransitionOutcome::into_notebook)
        .collect();
    assert_eq!(winners.len(), 1);
    let winner = winners.first().and_then(Notebook::reserved_by);
    assert_eq!(find(&context, notebook.id()).reserved_by(), winner);
    Ok(())
}

#[rstest]
fn concurrent_evaluations_record_exactly_one_verdict(
    store: Result<StoreContext, BoxError>,
) -> Result<(), BoxError> {
    let context = store?;
    let owner = context.register_volunteer("Renata")?;
    let notebook = import(&context, "Sebastião");
    let claimed = context.rt.block_on(context.notebooks.claim_for_volunteer(
        notebook.id(),
        owner.id(),
        Utc::now(),
    ))?;
    assert!(claimed.is_applied());

    // Half the submissions come from the reserver, half from strangers.
    let submissions: Vec<(VolunteerId, Evaluation)> = (0..8)
        .map(|index| {
            let evaluator = if index < 4 {
                owner.id()
            } else {
                VolunteerId::new()
            };
            Evaluation::new(format!("Parecer {index}")).map(|evaluation| (evaluator, evaluation))
        })
        .collect::<Result<_, _>>()?;

    let repository = Arc::new(context.notebooks.clone());
    let outcomes = context.rt.block_on(async {
        let barrier = Arc::new(tokio::sync::Barrier::new(submissions.len()));
        let handles: Vec<_> = submissions
            .iter()
            .cloned()
            .map(|(evaluator, evaluation)| {
                let repo = Arc::clone(&repository);
                let gate = Arc::clone(&barrier);
                let notebook_id = notebook.id();
                tokio::spawn(async move {
                    gate.wait().await;
                    repo.evaluate(notebook_id, evaluator, &evaluation, Utc::now())
                        .await
                })
            })
            .collect();
        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            outcomes.push(handle.await.expect("task joins").expect("evaluate"));
        }
        outcomes
    });

    let verdicts: Vec<Notebook> = outcomes
        .into_iter()
        .filter_map(TransitionOutcome::into_notebook)
        .collect();
    assert_eq!(verdicts.len(), 1, "exactly one evaluation applies");
    let stored = find(&context, notebook.id());
    assert_eq!(stored.state(), NotebookState::Evaluated);
    assert_eq!(stored.evaluation(), verdicts.first().and_then(Notebook::evaluation));
    assert_eq!(
        context
            .rt
            .block_on(context.notebooks.count_evaluated_by(owner.id()))?,
        1
    );
    Ok(())
}

#[rstest]
fn longest_accepted_text_fits_the_columns(
    store: Result<StoreContext, BoxError>,
) -> Result<(), BoxError> {
    let context = store?;
    let content = NotebookContent::new("ã".repeat(MAX_NAME_LEN), "õ".repeat(MAX_NAME_LEN))?
        .with_student_registration("9".repeat(MAX_REGISTRATION_LEN))?;
    let notebook = Notebook::import(content, &DefaultClock);
    context.rt.block_on(context.notebooks.import(&notebook))?;
    assert_eq!(find(&context, notebook.id()).content(), notebook.content());

    let name = "é".repeat(MAX_VOLUNTEER_NAME_LEN);
    let email = VolunteerEmail::new(format!("{}@example.org", "v".repeat(MAX_EMAIL_LEN - 12)))?;
    let volunteer = Volunteer::new(name, email, &DefaultClock)?;
    context.rt.block_on(context.volunteers.register(&volunteer))?;
    Ok(())
}

#[rstest]
fn listings_follow_storage_order(store: Result<StoreContext, BoxError>) -> Result<(), BoxError> {
    let context = store?;
    let volunteer = context.register_volunteer("Silvia")?;
    let first = import(&context, "Tadeu");
    let reserved = import(&context, "Umberto");
    let second = import(&context, "Vanessa");
    let claimed = context
        .rt
        .block_on(
            context
                .notebooks
                .claim_for_volunteer(reserved.id(), volunteer.id(), Utc::now()),
        )
        .expect("claim");
    assert!(claimed.is_applied());

    let available: Vec<_> = context
        .rt
        .block_on(context.notebooks.list_available())
        .expect("list available")
        .iter()
        .map(Notebook::id)
        .collect();
    assert_eq!(available, vec![first.id(), second.id()]);

    let mine: Vec<_> = context
        .rt
        .block_on(context.notebooks.list_reserved_by(volunteer.id()))
        .expect("list reserved")
        .iter()
        .map(Notebook::id)
        .collect();
    assert_eq!(mine, vec![reserved.id()]);
    Ok(())
}

#[rstest]
fn find_with_reserver_joins_the_volunteer(
    store: Result<StoreContext, BoxError>,
) -> Result<(), BoxError> {
    let context = store?;
    let volunteer = context.register_volunteer("Wesley")?;
    let notebook = import(&context, "Yolanda");

    let unreserved = context
        .rt
        .block_on(context.notebooks.find_with_reserver(notebook.id()))
        .expect("find")
        .expect("notebook exists");
    assert!(unreserved.reserver.is_none());

    let claimed = context
        .rt
        .block_on(
            context
                .notebooks
                .claim_for_volunteer(notebook.id(), volunteer.id(), Utc::now()),
        )
        .expect("claim");
    assert!(claimed.is_applied());

    let joined = context
        .rt
        .block_on(context.notebooks.find_with_reserver(notebook.id()))
        .expect("find")
        .expect("notebook exists");
    let reserver = joined.reserver.expect("reserver joined");
    assert_eq!(reserver.id(), volunteer.id());
    assert_eq!(reserver.email(), volunteer.email());

    let missing = context
        .rt
        .block_on(context.notebooks.find_with_reserver(NotebookId::new()))
        .expect("find");
    assert!(missing.is_none());
    Ok(())
}

#[rstest]
fn schema_rejects_evaluation_without_reservation(
    store: Result<StoreContext, BoxError>,
) -> Result<(), BoxError> {
    let context = store?;
    let notebook = import(&context, "Zeca");

    let result = context.execute_raw(&format!(
        "UPDATE notebooks SET evaluated_at = NOW(), conclusion = 'Bom', \
         content_excluded = FALSE WHERE id = '{}'",
        notebook.id()
    ));
    assert!(result.is_err(), "lifecycle check constraint should fire");
    assert_eq!(find(&context, notebook.id()).state(), NotebookState::Available);
    Ok(())
}
