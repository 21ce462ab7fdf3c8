// Tool implementations

pub mod bash;
pub mod calculator;
pub mod edit;
pub mod model_list;
pub mod read;
pub mod shell;
pub mod write;

pub use bash::BashTool;
pub use calculator::CalculatorTool;
pub use edit::FileEditTool;
pub use model_list::ModelListTool;
pub use read::FileReadTool;
pub use shell::ShellTool;
pub use write::FileWriteTool;
