/// Wizard aggregate
pub mod aggregate;

/// Commands
pub mod commands;

/// Events
pub mod events;

/// Input DTOs
pub mod inputs;

/// Addresses, prescriptions, products and cards
pub mod models;

/// Field validation
pub mod validation;

/// View (read model)
pub mod view;

/// Delivery comparison data
pub mod summary;

/// CQRS setup
pub mod cqrs;

/// Session runner
pub mod session;


pub use aggregate::{AppState, MedicationType, Services, Step, Wizard, AGGREGATE_TYPE};
pub use commands::Command;
pub use events::Event;
pub use models::{
    Address, CardDetails, Coordinates, Dimensions, NonPrescriptionItem, Prescription,
    DEFAULT_PRESCRIPTION_FEE,
};
pub use session::{Dispatch, PendingEstimate, WizardService};
pub use summary::{DeliverySummary, MethodTotal};
pub use view::{MemViewRepository, Query, View};
