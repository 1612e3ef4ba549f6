//! Two volunteers racing for the same notebook.

use crate::in_memory::helpers::{ReviewDesk, TestResult, desk, runtime};
use cadernos::notebook::{
    domain::NotebookState,
    services::{EvaluateNotebookRequest, NotebookReviewError},
};
use cadernos::volunteer::domain::VolunteerId;
use rstest::rstest;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Both volunteers reserve at once; only the winner may evaluate, and the
/// loser's later evaluation sees the notebook as already evaluated.
#[rstest]
fn simultaneous_reservations_then_evaluation(
    runtime: TestResult<Runtime>,
    desk: ReviewDesk,
) -> TestResult {
    let rt = runtime?;
    let first = rt.block_on(desk.register("Vitoria"))?;
    let second = rt.block_on(desk.register("Valdir"))?;
    let notebook = rt.block_on(desk.import("Nicolau"))?;
    let notebook_id = notebook.id();

    assert_eq!(rt.block_on(desk.service.count_evaluated_by(first))?, 0);
    assert_eq!(rt.block_on(desk.service.count_evaluated_by(second))?, 0);

    let (first_joined, second_joined) = rt.block_on(async {
        let barrier = Arc::new(tokio::sync::Barrier::new(2));
        let spawn_reserve = |volunteer: VolunteerId| {
            let service = Arc::clone(&desk.service);
            let gate = Arc::clone(&barrier);
            tokio::spawn(async move {
                gate.wait().await;
                service.reserve(volunteer, notebook_id).await
            })
        };
        let first_handle = spawn_reserve(first);
        let second_handle = spawn_reserve(second);
        (first_handle.await, second_handle.await)
    });
    let (winner, loser, loser_error) = match (first_joined?, second_joined?) {
        (Ok(reserved), Err(error)) => {
            assert_eq!(reserved.reserved_by(), Some(first));
            (first, second, error)
        }
        (Err(error), Ok(reserved)) => {
            assert_eq!(reserved.reserved_by(), Some(second));
            (second, first, error)
        }
        (first_outcome, second_outcome) => {
            return Err(format!(
                "expected exactly one winner, got {first_outcome:?} and {second_outcome:?}"
            )
            .into());
        }
    };
    assert!(matches!(
        loser_error,
        NotebookReviewError::AlreadyReservedOrEvaluated(id) if id == notebook_id
    ));

    let evaluated = rt.block_on(
        desk.service
            .evaluate(EvaluateNotebookRequest::new(winner, notebook_id, "Good")),
    )?;
    assert_eq!(evaluated.state(), NotebookState::Evaluated);
    assert!(evaluated.evaluated_at().is_some());

    let retry = rt.block_on(
        desk.service
            .evaluate(EvaluateNotebookRequest::new(loser, notebook_id, "Also good")),
    );
    assert!(matches!(
        retry,
        Err(NotebookReviewError::AlreadyEvaluated(id)) if id == notebook_id
    ));

    assert_eq!(rt.block_on(desk.service.count_evaluated_by(winner))?, 1);
    assert_eq!(rt.block_on(desk.service.count_evaluated_by(loser))?, 0);
    Ok(())
}

/// The loser cannot evaluate while the winner still holds the reservation.
#[rstest]
fn loser_cannot_evaluate_an_open_reservation(
    runtime: TestResult<Runtime>,
    desk: ReviewDesk,
) -> TestResult {
    let rt = runtime?;
    let owner = rt.block_on(desk.register("Rosa"))?;
    let other = rt.block_on(desk.register("Romeu"))?;
    let notebook = rt.block_on(desk.import("Raimundo"))?;

    rt.block_on(desk.service.reserve(owner, notebook.id()))?;
    let result = rt.block_on(
        desk.service
            .evaluate(EvaluateNotebookRequest::new(other, notebook.id(), "Bom")),
    );
    assert!(result.is_err_and(|error| error.is_forbidden()));

    let current = rt
        .block_on(desk.service.find_notebook(notebook.id()))?
        .ok_or("notebook should exist")?;
    assert_eq!(current.state(), NotebookState::Reserved);
    assert_eq!(current.reserved_by(), Some(owner));
    Ok(())
}
