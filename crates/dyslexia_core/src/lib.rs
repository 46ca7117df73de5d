pub mod assessment;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod quiz;
pub mod settings;
pub mod validation;

pub use domain::{
    AuthSession, Level, LevelAssessment, LibraryWord, Material, MaterialKind, NewUser, OcrImport,
    OcrStatus, ProgressRecord, Quiz, QuizQuestion, QuizResult, User, UserCredentials,
};
pub use metrics::DashboardMetrics;
pub use ports::{DatabaseService, LevelAssessmentService, OcrService, PortError, PortResult};
pub use settings::UserSettings;
