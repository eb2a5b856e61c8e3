// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoostFloor, Location, MatchConfig, MatchResult, MatchScore, Profile, Skill, SkillLevel,
    WeightVector,
};
pub use requests::MatchRequest;
pub use responses::{ErrorResponse, MatchResponse, SimilarityResponse};
