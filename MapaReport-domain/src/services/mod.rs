pub mod analysis;
pub mod assembler;
pub mod classifier;
pub mod criteria;
pub mod identity;
pub mod interpreter;
pub mod mapa;
pub mod narrative;

// Domain services
// This module contains business logic implementations.

// Re-export service traits and factory functions
pub use analysis::analyze;
pub use assembler::{assemble, assemble_at};
pub use classifier::{classify_blood_pressure, classify_dipping, classify_hypertensive_load, classify_pulse_pressure};
pub use criteria::{MedicalCriteria, MEDICAL_CRITERIA};
pub use identity::validate_identity;
pub use interpreter::{interpret, interpret_analysis};
pub use mapa::{create_default_mapa_service, MapaService, MapaServiceError, MapaServiceTrait};
pub use narrative::{
    AnalysisOutcome, NarrativeConfig, NarrativeError, NarrativeServiceTrait, OpenRouterNarrativeClient,
};

// Re-export mock service factory functions when the mock feature is enabled
#[cfg(feature = "mock")]
pub use mapa::create_mock_mapa_service;
