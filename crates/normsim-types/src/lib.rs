//! Shared type definitions for the normsim simulation viewer.
//!
//! This crate is the single source of truth for the records that flow from
//! the transcript parser to the renderer. Types defined here flow downstream
//! to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`country`] -- The four state actors and utterance speakers
//! - [`norms`] -- Norm vectors and the per-run posture board
//! - [`records`] -- Utterance, analyst update, and the emitted [`Record`]
//! - [`ids`] -- Type-safe UUID wrappers for run and session identifiers

pub mod country;
pub mod ids;
pub mod norms;
pub mod records;

// Re-export all public types at crate root for convenience.
pub use country::{Country, Speaker};
pub use ids::{RunId, SessionId};
pub use norms::{NormBoard, NormPatch, NormVector};
pub use records::{AnalystUpdate, CountryUtterance, Record};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the renderer.

    #[test]
    fn export_bindings() {
        // ts-rs writes the bindings to `bindings/` relative to the crate
        // root when `export_all` is called.
        use ts_rs::TS;

        let _ = crate::ids::RunId::export_all();
        let _ = crate::ids::SessionId::export_all();

        let _ = crate::country::Country::export_all();
        let _ = crate::country::Speaker::export_all();

        let _ = crate::norms::NormVector::export_all();
        let _ = crate::norms::NormPatch::export_all();
        let _ = crate::norms::NormBoard::export_all();

        let _ = crate::records::CountryUtterance::export_all();
        let _ = crate::records::AnalystUpdate::export_all();
        let _ = crate::records::Record::export_all();
    }
}
