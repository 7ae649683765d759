//! Norm vectors and the running posture board.
//!
//! A [`NormVector`] is one actor's ideological posture across ten
//! constructivist norms. Values are meant to sit in `[-1, 1]` but nothing in
//! this crate clamps them; the analyst model is the authority.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::country::Country;
use crate::records::AnalystUpdate;

/// Ten-field posture record for one country. Every dimension is always set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NormVector {
    /// Commitment to acting through multilateral institutions.
    pub multilateral_cooperation: f64,
    /// Sovereignty understood as a responsibility to protect.
    pub sovereignty_as_responsibility: f64,
    /// Human rights as universal rather than culturally relative.
    pub human_rights_universalism: f64,
    /// Preference for diplomacy over coercion.
    pub diplomatic_engagement: f64,
    /// Willingness to champion new norms internationally.
    pub norm_entrepreneurship: f64,
    /// Resolving disputes through peaceful means.
    pub peaceful_dispute_resolution: f64,
    /// Cooperation without expecting immediate return.
    pub diffuse_reciprocity: f64,
    /// Identification with a wider international community.
    pub collective_identity_formation: f64,
    /// Legitimacy derived from consensus rather than power.
    pub legitimacy_through_consensus: f64,
    /// Openness and accountability in governance.
    pub transparency_accountability: f64,
}

impl NormVector {
    /// Wire names of the ten dimensions.
    pub const DIMENSIONS: [&'static str; 10] = [
        "multilateral_cooperation",
        "sovereignty_as_responsibility",
        "human_rights_universalism",
        "diplomatic_engagement",
        "norm_entrepreneurship",
        "peaceful_dispute_resolution",
        "diffuse_reciprocity",
        "collective_identity_formation",
        "legitimacy_through_consensus",
        "transparency_accountability",
    ];

    /// Starting posture of a country at the beginning of a simulation.
    pub const fn baseline(country: Country) -> Self {
        match country {
            Country::China => Self {
                multilateral_cooperation: -0.2,
                sovereignty_as_responsibility: -0.8,
                human_rights_universalism: -0.6,
                diplomatic_engagement: 0.3,
                norm_entrepreneurship: -0.5,
                peaceful_dispute_resolution: 0.0,
                diffuse_reciprocity: 0.4,
                collective_identity_formation: -0.3,
                legitimacy_through_consensus: -0.4,
                transparency_accountability: -0.5,
            },
            Country::Usa => Self {
                multilateral_cooperation: 0.5,
                sovereignty_as_responsibility: 0.6,
                human_rights_universalism: 0.8,
                diplomatic_engagement: 0.4,
                norm_entrepreneurship: 0.7,
                peaceful_dispute_resolution: 0.5,
                diffuse_reciprocity: 0.3,
                collective_identity_formation: 0.7,
                legitimacy_through_consensus: 0.4,
                transparency_accountability: 0.6,
            },
            Country::Russia => Self {
                multilateral_cooperation: -0.3,
                sovereignty_as_responsibility: -0.9,
                human_rights_universalism: -0.7,
                diplomatic_engagement: 0.2,
                norm_entrepreneurship: -0.4,
                peaceful_dispute_resolution: -0.2,
                diffuse_reciprocity: 0.1,
                collective_identity_formation: -0.6,
                legitimacy_through_consensus: -0.5,
                transparency_accountability: -0.8,
            },
            Country::Eu => Self {
                multilateral_cooperation: 0.9,
                sovereignty_as_responsibility: 0.7,
                human_rights_universalism: 0.8,
                diplomatic_engagement: 0.7,
                norm_entrepreneurship: 0.8,
                peaceful_dispute_resolution: 0.9,
                diffuse_reciprocity: 0.8,
                collective_identity_formation: 0.9,
                legitimacy_through_consensus: 0.8,
                transparency_accountability: 0.7,
            },
        }
    }
}

/// The dimensions an analyst reported for one country.
///
/// Analysts often report only the norms that moved this round. Absent
/// dimensions are `None` and keep their previous value when the patch is
/// applied with [`NormPatch::apply_to`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(default)]
pub struct NormPatch {
    /// New `multilateral_cooperation`, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multilateral_cooperation: Option<f64>,
    /// New `sovereignty_as_responsibility`, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sovereignty_as_responsibility: Option<f64>,
    /// New `human_rights_universalism`, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub human_rights_universalism: Option<f64>,
    /// New `diplomatic_engagement`, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diplomatic_engagement: Option<f64>,
    /// New `norm_entrepreneurship`, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub norm_entrepreneurship: Option<f64>,
    /// New `peaceful_dispute_resolution`, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peaceful_dispute_resolution: Option<f64>,
    /// New `diffuse_reciprocity`, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diffuse_reciprocity: Option<f64>,
    /// New `collective_identity_formation`, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collective_identity_formation: Option<f64>,
    /// New `legitimacy_through_consensus`, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legitimacy_through_consensus: Option<f64>,
    /// New `transparency_accountability`, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transparency_accountability: Option<f64>,
}

impl NormPatch {
    /// Overlay the reported dimensions onto `base`.
    pub fn apply_to(&self, base: NormVector) -> NormVector {
        NormVector {
            multilateral_cooperation: self
                .multilateral_cooperation
                .unwrap_or(base.multilateral_cooperation),
            sovereignty_as_responsibility: self
                .sovereignty_as_responsibility
                .unwrap_or(base.sovereignty_as_responsibility),
            human_rights_universalism: self
                .human_rights_universalism
                .unwrap_or(base.human_rights_universalism),
            diplomatic_engagement: self
                .diplomatic_engagement
                .unwrap_or(base.diplomatic_engagement),
            norm_entrepreneurship: self
                .norm_entrepreneurship
                .unwrap_or(base.norm_entrepreneurship),
            peaceful_dispute_resolution: self
                .peaceful_dispute_resolution
                .unwrap_or(base.peaceful_dispute_resolution),
            diffuse_reciprocity: self.diffuse_reciprocity.unwrap_or(base.diffuse_reciprocity),
            collective_identity_formation: self
                .collective_identity_formation
                .unwrap_or(base.collective_identity_formation),
            legitimacy_through_consensus: self
                .legitimacy_through_consensus
                .unwrap_or(base.legitimacy_through_consensus),
            transparency_accountability: self
                .transparency_accountability
                .unwrap_or(base.transparency_accountability),
        }
    }
}

impl From<NormVector> for NormPatch {
    fn from(v: NormVector) -> Self {
        Self {
            multilateral_cooperation: Some(v.multilateral_cooperation),
            sovereignty_as_responsibility: Some(v.sovereignty_as_responsibility),
            human_rights_universalism: Some(v.human_rights_universalism),
            diplomatic_engagement: Some(v.diplomatic_engagement),
            norm_entrepreneurship: Some(v.norm_entrepreneurship),
            peaceful_dispute_resolution: Some(v.peaceful_dispute_resolution),
            diffuse_reciprocity: Some(v.diffuse_reciprocity),
            collective_identity_formation: Some(v.collective_identity_formation),
            legitimacy_through_consensus: Some(v.legitimacy_through_consensus),
            transparency_accountability: Some(v.transparency_accountability),
        }
    }
}

/// Current posture of every country over the course of one run.
///
/// Seeded from [`NormVector::baseline`]; each analyst update merges its
/// patches onto the current postures. Dimensions and countries an update
/// does not mention keep their previous values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NormBoard {
    /// Latest known vector per country.
    pub postures: BTreeMap<Country, NormVector>,
    /// Iteration of the last update applied, if any.
    pub last_iteration: Option<u32>,
}

impl Default for NormBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl NormBoard {
    /// Board holding the baseline posture of all four countries.
    pub fn new() -> Self {
        Self {
            postures: Country::ALL
                .iter()
                .map(|&c| (c, NormVector::baseline(c)))
                .collect(),
            last_iteration: None,
        }
    }

    /// Apply an analyst update, returning how many countries changed.
    pub fn apply(&mut self, update: &AnalystUpdate) -> usize {
        let mut changed = 0_usize;
        for (country, patch) in &update.norm_updates {
            let previous = self
                .postures
                .get(country)
                .copied()
                .unwrap_or_else(|| NormVector::baseline(*country));
            let merged = patch.apply_to(previous);
            if merged != previous {
                changed = changed.saturating_add(1);
            }
            self.postures.insert(*country, merged);
        }
        self.last_iteration = Some(update.iteration);
        changed
    }

    /// Current posture of one country.
    pub fn get(&self, country: Country) -> Option<&NormVector> {
        self.postures.get(&country)
    }
}
