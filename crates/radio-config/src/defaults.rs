//! Construction of the default parameter table (§6) in one call site, grounded on
//! `sonido-config::chain::EffectChain::from_preset`'s pattern of building a populated
//! structure from a fixed list of entries rather than scattering literals through `main`.

use radio_core::param::{NumericParam, Parameter};
use radio_core::ParameterStore;

use crate::error::{ConfigError, Result};

/// One row of the default parameter table: a name, an initial value, clamp bounds, and a
/// step ladder.
struct NumericRow {
    name: &'static str,
    init: f64,
    min: f64,
    max: f64,
    steps: &'static [f64],
}

/// The §6 default parameter table. Kept as a single literal list so the duplicate-name check in
/// [`try_build_default_store`] has something to check against, and so the §8 regression test has
/// one place to diff against.
///
/// Two resolved ambiguities from §6's table:
/// - `sdr_cf` init: the table gives two alternates (88.3 MHz / 133.2 MHz); 88.3 MHz (a real FM
///   broadcast frequency) is used as the single startup default.
/// - `spkr_volume` init: the table gives "0.5 or 100" against a documented `[0, 100]` range used
///   everywhere downstream (`AdjustVolume` divides by 100, §4.2). `0.5` only makes sense on a
///   `[0, 1]` scale, which this parameter doesn't use, so `50.0` (half volume, expressed on the
///   scale the rest of the system actually uses) is the default.
const NUMERIC_ROWS: &[NumericRow] = &[
    NumericRow {
        name: "sdr_cf",
        init: 88.3e6,
        min: 30e6,
        max: 1766e6,
        steps: &[1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9],
    },
    NumericRow {
        name: "sdr_fs",
        init: 0.25e6,
        min: 0.0,
        max: 2e9,
        steps: &[1.0],
    },
    NumericRow {
        name: "sdr_dig_bw",
        init: 150e3,
        min: 1e3,
        max: 250e3,
        steps: &[10.0, 100.0, 1e3, 1e4, 1e5],
    },
    NumericRow {
        name: "sdr_squelch",
        init: -20.0,
        min: -40.0,
        max: 2.0,
        steps: &[0.01, 0.1, 1.0, 10.0],
    },
    NumericRow {
        name: "sdr_chunk_sz",
        init: 16384.0,
        min: 1.0,
        max: 1e9,
        steps: &[1.0],
    },
    NumericRow {
        name: "spkr_volume",
        init: 50.0,
        min: 0.0,
        max: 100.0,
        steps: &[1.0, 10.0],
    },
    NumericRow {
        name: "spkr_chunk_sz",
        init: 4096.0,
        min: 1.0,
        max: 1e9,
        steps: &[1.0],
    },
    NumericRow {
        name: "spkr_fs",
        init: 44100.0,
        min: 1.0,
        max: 1e9,
        steps: &[1.0],
    },
];

/// The labeled `Device` cells (§3/§4.3): opaque handles whose real control surface is the
/// `SdrControl`/`DemodControl` trait interfaces, not this cell.
const DEVICE_ROWS: &[(&str, &str)] = &[("sdr", "SdrControl"), ("demod", "DemodControl")];

fn check_unique_names() -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for row in NUMERIC_ROWS {
        if !seen.insert(row.name) {
            return Err(ConfigError::DuplicateParameter(row.name.to_string()));
        }
    }
    for (name, _) in DEVICE_ROWS {
        if !seen.insert(*name) {
            return Err(ConfigError::DuplicateParameter(name.to_string()));
        }
    }
    Ok(())
}

/// Build a `ParameterStore` populated with the §6 default table, checking for duplicate names
/// first (a configuration error per §7 — "pin registered twice" generalizes to "parameter
/// registered twice" here, since both are startup-time uniqueness violations over a literal
/// table).
pub fn try_build_default_store() -> Result<ParameterStore> {
    check_unique_names()?;

    let store = ParameterStore::new();
    for row in NUMERIC_ROWS {
        store.register(
            row.name,
            Parameter::Numeric(NumericParam::new(row.init, row.min, row.max, row.steps.to_vec())),
        );
    }
    for (name, label) in DEVICE_ROWS {
        store.register(*name, Parameter::Device(label));
    }
    Ok(store)
}

/// Build a `ParameterStore` populated with the §6 default table.
///
/// # Panics
///
/// Panics if [`NUMERIC_ROWS`]/[`DEVICE_ROWS`] contain a duplicate name — a bug in this literal
/// table, not a condition that can arise at runtime, so it is not worth threading a `Result`
/// through every call site that just wants the defaults.
pub fn build_default_store() -> ParameterStore {
    try_build_default_store().expect("default parameter table contains a duplicate name")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_default_row_is_present_with_documented_values() {
        let store = build_default_store();

        let expectations: &[(&str, f64, f64, f64, &[f64])] = &[
            ("sdr_cf", 88.3e6, 30e6, 1766e6, &[1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9]),
            ("sdr_fs", 0.25e6, 0.0, 2e9, &[1.0]),
            ("sdr_dig_bw", 150e3, 1e3, 250e3, &[10.0, 100.0, 1e3, 1e4, 1e5]),
            ("sdr_squelch", -20.0, -40.0, 2.0, &[0.01, 0.1, 1.0, 10.0]),
            ("sdr_chunk_sz", 16384.0, 1.0, 1e9, &[1.0]),
            ("spkr_volume", 50.0, 0.0, 100.0, &[1.0, 10.0]),
            ("spkr_chunk_sz", 4096.0, 1.0, 1e9, &[1.0]),
            ("spkr_fs", 44100.0, 1.0, 1e9, &[1.0]),
        ];

        for (name, init, min, max, steps) in expectations {
            assert!(store.contains(name), "missing default parameter '{name}'");
            assert_eq!(store.get_numeric(name).unwrap(), *init, "wrong init for '{name}'");
            let (got_min, got_max, got_steps) = store
                .with_numeric_mut(name, |p| (p.min(), p.max(), p.steps().to_vec()))
                .unwrap();
            assert_eq!(got_min, *min, "wrong min for '{name}'");
            assert_eq!(got_max, *max, "wrong max for '{name}'");
            assert_eq!(&got_steps, steps, "wrong step ladder for '{name}'");
        }
    }

    #[test]
    fn device_cells_are_registered() {
        let store = build_default_store();
        assert!(store.contains("sdr"));
        assert!(store.contains("demod"));
    }

    #[test]
    fn unique_names_check_passes_on_the_real_table() {
        assert!(check_unique_names().is_ok());
    }
}
