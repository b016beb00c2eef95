pub mod db;
pub mod reachability;
pub mod story_llm;

pub use db::DbAdapter;
pub use reachability::HttpReachability;
pub use story_llm::OpenAiStoryAdapter;
