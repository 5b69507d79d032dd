//! Fixture catalog loaded in mock mode
//!
//! A handful of realistic rows per distributor so search, counts and samples
//! have something to return without live feeds.

use fflbro_domain::ProductFields;
use rust_decimal::Decimal;

/// One fixture row, keyed by distributor slug and item number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureProduct {
    pub distributor: &'static str,
    pub item_number: &'static str,
    pub fields: ProductFields,
}

fn row(
    distributor: &'static str,
    item_number: &'static str,
    manufacturer: &str,
    description: &str,
    cents: i64,
    quantity: u32,
) -> FixtureProduct {
    FixtureProduct {
        distributor,
        item_number,
        fields: ProductFields::new(manufacturer, description, Decimal::new(cents, 2), quantity),
    }
}

/// The mock catalog.
pub fn fixture_catalog() -> Vec<FixtureProduct> {
    vec![
        row("lipseys", "GLK-19-GEN5", "Glock", "G19 Gen5 9mm pistol", 43890, 15),
        row("lipseys", "SIG-P365", "SIG Sauer", "P365 9mm micro-compact", 59999, 4),
        row("lipseys", "RUG-10-22", "Ruger", "10/22 Carbine .22 LR", 29900, 0),
        row("rsr", "SIG-P320-C", "Sig Sauer", "P320 Compact 9mm", 54900, 7),
        row("rsr", "HLS-507C", "Holosun", "507C red dot for SIG P365", 29999, 12),
        row("davidsons", "SW-MP9-SHIELD", "Smith & Wesson", "M&P9 Shield Plus", 47900, 9),
        row("zanders", "FED-9-124", "Federal", "9mm 124gr FMJ, 50 rounds", 1899, 240),
        row("sports_south", "HRN-308-168", "Hornady", ".308 Win 168gr ELD Match", 3499, 60),
        row("orion", "MAG-PMAG-30", "Magpul", "PMAG 30 Gen M3 5.56", 1595, 0),
    ]
}
