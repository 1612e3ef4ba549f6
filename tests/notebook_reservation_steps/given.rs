//! Given steps for notebook reservation BDD scenarios.

use super::world::{ReservationWorld, run_async};
use cadernos::notebook::services::ImportNotebookRequest;
use cadernos::volunteer::{
    domain::{Volunteer, VolunteerEmail},
    ports::VolunteerDirectory,
};
use eyre::WrapErr;
use mockable::DefaultClock;
use rstest_bdd_macros::given;

#[given(r#"a volunteer named "{name}""#)]
fn volunteer_named(world: &mut ReservationWorld, name: String) -> Result<(), eyre::Report> {
    let email = VolunteerEmail::new(format!("{}@example.org", name.to_lowercase()))?;
    let volunteer = Volunteer::new(name.as_str(), email, &DefaultClock)?;
    run_async(world.volunteers.register(&volunteer)).wrap_err("register scenario volunteer")?;
    world.named_volunteers.insert(name, volunteer.id());
    Ok(())
}

#[given(r#"an imported notebook for student "{student}""#)]
fn imported_notebook(world: &mut ReservationWorld, student: String) -> Result<(), eyre::Report> {
    let request = ImportNotebookRequest::new(student, "Penitenciária Estadual de Maringá")
        .with_subjects(vec!["Redação".to_owned()])
        .with_answers(vec!["Uma resposta".to_owned()]);
    let notebook =
        run_async(world.service.import_notebook(request)).wrap_err("import scenario notebook")?;
    world.notebook = Some(notebook);
    Ok(())
}

#[given(r#""{name}" has reserved the notebook"#)]
fn has_reserved(world: &mut ReservationWorld, name: String) -> Result<(), eyre::Report> {
    let volunteer = world.volunteer(&name)?;
    let notebook_id = world.notebook()?.id();
    let reserved = run_async(world.service.reserve(volunteer, notebook_id))
        .wrap_err("reserve notebook in scenario setup")?;
    world.notebook = Some(reserved);
    Ok(())
}
