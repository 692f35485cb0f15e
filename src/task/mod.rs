pub mod config;
pub mod language;
pub mod table;
pub mod view;

pub use config::{CodeTemplate, PerLanguage, ReadTask, TaskCatalog, TaskConfig, TaskKind, TaskPayload, WriteTask};
pub use language::{sequence_for, Group, Language, LanguageSequence, EXAMPLE_TASKS};
pub use table::Table;
pub use view::{ReadView, TaskAnswer, TaskView, WriteView};
