pub mod use_cases;

pub use use_cases::analysis_session::{
    AnalysisReport, AnalysisRequest, AnalysisSession, RankingReport, RankingRequest,
};
