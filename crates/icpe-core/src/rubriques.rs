//! Waste-related rubriques kept by the enrichment step.
//!
//! Entries whose code is not listed here are dropped before classification.
//! The list is wider than the classification table: `2515` and `2517` handle
//! inert materials but carry no waste-handling category, so their rows are
//! kept without enrichment.

pub const RELEVANT_RUBRIQUES: &[&str] = &[
    "2515", "2517", "2710", "2711", "2712", "2713", "2714", "2715", "2716", "2717", "2718",
    "2719", "2720", "2730", "2731", "2740", "2750", "2751", "2752", "2760", "2770", "2771",
    "2780", "2781", "2782", "2790", "2791", "2792", "2793", "2794", "2795", "2797", "2798",
    "3510", "3520", "3531", "3532", "3540", "3550", "3560",
];

#[must_use]
pub fn is_relevant(code: &str) -> bool {
    RELEVANT_RUBRIQUES.contains(&code)
}
