/// Column-name constants for reset-datakit.
/// Single source of truth - exported to Python via PyO3.

// ── Activity record columns ─────────────────────────────────────────────────
pub mod activity {
    pub const VENDOR: &str = "Vendor";
    pub const PROGRAM: &str = "Program";
    pub const STORE: &str = "Store";
    pub const BAY: &str = "Bay";
    pub const LOCATION: &str = "Location";
    pub const FINISH_TIME: &str = "FinishTime";

    /// Dimension columns coerced to trimmed, uppercased text.
    pub const DIMENSIONS: [&str; 5] = [VENDOR, PROGRAM, STORE, BAY, LOCATION];
}

// ── Reset/Update log columns ────────────────────────────────────────────────
pub mod reset {
    pub const VENDOR: &str = "Vendor";
    pub const PROGRAM: &str = "Program";
    pub const STORE: &str = "Store";

    pub const DIMENSIONS: [&str; 3] = [VENDOR, PROGRAM, STORE];
}

// ── Workbook sheet names ────────────────────────────────────────────────────
pub mod sheet {
    pub const DATA: &str = "Data";
    pub const SUMMARY: &str = "Summary";
    pub const RESET_UPDATE: &str = "Reset_Update";
}

// ── Chart output columns ────────────────────────────────────────────────────
pub mod chart {
    pub const MONTH: &str = "Month";
    pub const MAINTENANCE_COUNT: &str = "Maintenance Count";
    pub const RESET_COUNT: &str = "Reset Count";
}

// ── Localized column aliases ────────────────────────────────────────────────
//
// Bilingual exports arrive with French headers. Each alias maps to its
// canonical column and is applied only when the canonical column is absent.
pub mod aliases {
    use super::activity;

    pub const ACTIVITY: [(&str, &str); 6] = [
        ("Fournisseur", activity::VENDOR),
        ("Programme", activity::PROGRAM),
        ("Titre", activity::STORE),
        ("Valeur de numérisation", activity::BAY),
        ("Emplacement", activity::LOCATION),
        ("Finalisé le", activity::FINISH_TIME),
    ];

    pub const RESET: [(&str, &str); 3] = [
        ("Fournisseur", activity::VENDOR),
        ("Programme", activity::PROGRAM),
        ("Magasin", activity::STORE),
    ];
}
