//! Unit conversion between recipe units and stock units

use shared::models::{InventoryItem, Unit};

/// Convert `quantity` expressed in `from` into the stock unit of `item`
///
/// Returns `None` when the units cannot be related (e.g. ml → g, or a
/// bottle conversion without `equivalent_ml`).
pub fn convert(quantity: f64, from: Unit, item: &InventoryItem) -> Option<f64> {
    convert_units(quantity, from, item.unit, item.equivalent_ml, item.equivalent_gr)
}

pub(crate) fn convert_units(
    quantity: f64,
    from: Unit,
    to: Unit,
    equivalent_ml: f64,
    equivalent_gr: f64,
) -> Option<f64> {
    if from == to {
        return Some(quantity);
    }

    // normalize to the base unit of each family
    let (base, family) = match from {
        Unit::Ml => (quantity, Unit::Ml),
        Unit::L => (quantity * 1000.0, Unit::Ml),
        Unit::G => (quantity, Unit::G),
        Unit::Kg => (quantity * 1000.0, Unit::G),
        Unit::Unit | Unit::Bottle => return None,
    };

    match (family, to) {
        (Unit::Ml, Unit::Ml) | (Unit::G, Unit::G) => Some(base),
        (Unit::Ml, Unit::L) | (Unit::G, Unit::Kg) => Some(base / 1000.0),
        (Unit::Ml, Unit::Bottle) if equivalent_ml > 0.0 => Some(base / equivalent_ml),
        (Unit::G, Unit::Unit) if equivalent_gr > 0.0 => Some(base / equivalent_gr),
        _ => None,
    }
}
