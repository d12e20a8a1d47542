pub mod compile;
pub mod completion;
pub mod event_file;

/// Commands accepted by `workspace/executeCommand`
pub mod commands {
    pub const COMPILE: &str = "taikou5.compile";
    pub const RELOAD_SNIPPETS: &str = "taikou5.reloadSnippets";

    pub const ALL: &[&str] = &[COMPILE, RELOAD_SNIPPETS];
}
