pub mod command;
pub mod daily;
pub mod diff;
pub mod error;
pub mod fs;
pub mod heading;
pub mod host;
pub mod image;
pub mod lines;
pub mod numeral;
pub mod pipeline;
pub mod report;
pub mod section;

pub use command::{run_command, Command, CommandOutcome};
pub use daily::{resolve, resolve_with, Direction};
pub use error::{ExitCode, RewriteError, RewriteResult};
pub use host::{Document, FileDocument, MemoryDocument, Navigator, RecordingNavigator, WriteOptions};
pub use markdown_rewrite_config::{Config, DailySettings, ModifySettings};
pub use pipeline::{apply_transform, Transform, TransformOutcome};
pub use report::{Diagnostic, RewriteReport};
