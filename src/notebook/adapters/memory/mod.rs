//! In-memory notebook adapters.

mod notebook;

pub use notebook::InMemoryNotebookRepository;
