pub mod markdown;
pub mod simple;
pub mod text;

pub use markdown::MarkdownFormatter;
pub use simple::SimpleFormatter;
pub use text::ReportFormatter;
