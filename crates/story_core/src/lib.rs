pub mod catalog;
pub mod decision;
pub mod domain;
pub mod generation;
pub mod history;
pub mod languages;
pub mod memory;
pub mod orchestrator;
pub mod ports;
pub mod vocabulary;

pub use decision::decide_story_source;
pub use domain::{
    DecisionContext, Level, Phase, SavedWord, Story, StorySegment, StorySource, UserProfile,
    WordAnalysis,
};
pub use orchestrator::{fallback_story_for, StoryOrchestrator};
pub use ports::{
    AlwaysOnline, Clock, GenerationError, NetworkProbe, PortError, PortResult, StoryCache,
    StoryGenerator, SystemClock, VocabularyStore,
};
