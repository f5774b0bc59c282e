use super::year_ts::YearTs;

#[derive(Debug, Clone, PartialEq)]
pub struct HeatBalance {
    pub demand: YearTs,
    pub heat_yield: YearTs,
    /// Demand not covered by electrically derived heat; met by the boiler.
    pub shortfall: YearTs,
    pub surplus: YearTs,
}

/// Compares scaled heat demand with heat recovered from electrical loads.
///
/// Fixed loads yield `fixed_yield` kW of heat per kW; served flexible and
/// curtailable load (heat pump and immersion) yield `flex_yield` per kW.
pub fn heat_balance(
    demand: YearTs,
    fixed_load: &YearTs,
    flex_and_mop_load: &YearTs,
    fixed_yield: f64,
    flex_yield: f64,
) -> HeatBalance {
    let heat_yield = fixed_load.zip_map(flex_and_mop_load, |fixed, flex| {
        fixed_yield * fixed + flex_yield * flex
    });
    let shortfall = demand.zip_map(&heat_yield, |d, y| (d - y).max(0.0));
    let surplus = demand.zip_map(&heat_yield, |d, y| (y - d).max(0.0));
    HeatBalance {
        demand,
        heat_yield,
        shortfall,
        surplus,
    }
}
