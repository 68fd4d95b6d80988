//! Unit spellings used by the archives, mapped onto canonical symbols.

use tracing::warn;

use super::Table;

/// A column unit after normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// Canonical symbol (`"d"`, `"deg"`, `"earthRad"`, ...).
    Recognized(String),
    /// Spelling that is neither canonical nor a known alias.
    Unrecognized(String),
}

impl Unit {
    pub fn symbol(&self) -> &str {
        match self {
            Unit::Recognized(s) | Unit::Unrecognized(s) => s,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, Unit::Recognized(_))
    }
}

/// Archive spelling -> canonical symbol. `None` drops the unit (epochs,
/// dimensionless microlensing parameters, sexagesimal strings).
const ALIASES: &[(&str, Option<&str>)] = &[
    ("--", None),
    ("---", None),
    ("BJD", None),
    ("BKJD", None),
    ("BJD-2454833", None),
    ("pi_E", None),
    ("pi_EE", None),
    ("pi_EN", None),
    ("pi_rel", None),
    ("sexagesimal", None),
    ("D_L", Some("pc")),
    ("D_S", Some("pc")),
    ("micro_as", Some("uas")),
    ("microas", Some("uas")),
    ("Earth flux", Some("earthFlux")),
    ("Earth Flux", Some("earthFlux")),
    ("Fearth", Some("earthFlux")),
    ("M_E", Some("earthMass")),
    ("Earth Mass", Some("earthMass")),
    ("Mearth", Some("earthMass")),
    ("M_J", Some("jupiterMass")),
    ("Mjupiter", Some("jupiterMass")),
    ("Jupiter Mass", Some("jupiterMass")),
    ("R_Earth", Some("earthRad")),
    ("Rearth", Some("earthRad")),
    ("Earth Radius", Some("earthRad")),
    ("Jupiter Radius", Some("jupiterRad")),
    ("Rjupiter", Some("jupiterRad")),
    ("R_Sun", Some("solRad")),
    ("Rstar", Some("solRad")),
    ("Solar Radius", Some("solRad")),
    ("solarradius", Some("solRad")),
    ("Solar mass", Some("solMass")),
    ("Solar Mass", Some("solMass")),
    ("a_perp", Some("AU")),
    ("arc-sec/year", Some("arcsec/yr")),
    ("cm/s**2", Some("dex(cm/s2)")),
    ("dexincgs", Some("dex(cm/s2)")),
    ("log10(cm/s**2)", Some("dex(cm/s2)")),
    ("log(cm/s**2)", Some("dex(cm/s2)")),
    ("g/cm**3", Some("g/cm3")),
    ("days", Some("d")),
    ("day", Some("d")),
    ("degrees", Some("deg")),
    ("degree", Some("deg")),
    ("hours", Some("h")),
    ("hrs", Some("h")),
    ("hr", Some("h")),
    ("kelvin", Some("K")),
    ("logLsun", Some("dex(solLum)")),
    ("log(Lsun)", Some("dex(solLum)")),
    ("log(Solar)", Some("dex(solLum)")),
    ("mags", Some("mag")),
    ("perc", Some("%")),
    ("percent", Some("%")),
    ("seconds", Some("s")),
    ("sec", Some("s")),
    ("dex", Some("dex")),
];

/// Symbols accepted as-is.
const CANONICAL: &[&str] = &[
    "%", "AU", "au", "d", "deg", "arcmin", "arcsec", "arcsec/yr", "mas", "mas/yr", "uas", "h",
    "min", "s", "yr", "K", "mag", "pc", "kpc", "km/s", "m/s", "ppm", "Jy", "mJy", "electron/s",
    "erg/s/cm2", "earthFlux", "earthMass", "earthRad", "jupiterMass", "jupiterRad", "solMass",
    "solRad", "solLum", "dex", "dex(cm/s2)", "dex(solLum)", "g/cm3", "rad",
];

/// Normalise one unit string. Blank strings mean "no unit".
pub fn normalize(raw: &str) -> Option<Unit> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some((_, mapped)) = ALIASES.iter().find(|(alias, _)| *alias == raw) {
        return mapped.map(|s| Unit::Recognized(s.to_string()));
    }
    if CANONICAL.contains(&raw) {
        return Some(Unit::Recognized(raw.to_string()));
    }
    Some(Unit::Unrecognized(raw.to_string()))
}

/// Re-normalise every column unit in place, warning about unknown spellings.
pub fn normalize_table(table: &mut Table) {
    for column in table.columns_mut() {
        let Some(unit) = column.unit.take() else {
            continue;
        };
        column.unit = normalize(unit.symbol());
        if let Some(Unit::Unrecognized(raw)) = &column.unit {
            warn!(column = %column.name, unit = %raw, "unrecognized unit");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn test_aliases() {
        assert_eq!(normalize("days"), Some(Unit::Recognized("d".into())));
        assert_eq!(
            normalize("Earth Radius"),
            Some(Unit::Recognized("earthRad".into()))
        );
        assert_eq!(normalize(" degrees "), Some(Unit::Recognized("deg".into())));
        assert_eq!(normalize("BJD"), None);
        assert_eq!(normalize(""), None);
    }

    #[test]
    fn test_canonical_passthrough() {
        assert_eq!(normalize("mas/yr"), Some(Unit::Recognized("mas/yr".into())));
    }

    #[test]
    fn test_unknown_spelling() {
        let unit = normalize("furlongs/fortnight").unwrap();
        assert!(!unit.is_recognized());
        assert_eq!(unit.symbol(), "furlongs/fortnight");
    }

    #[test]
    fn test_normalize_table() {
        let mut period = Column::new("koi_period");
        period.unit = Some(Unit::Unrecognized("days".into()));
        let mut epoch = Column::new("koi_time0bk");
        epoch.unit = Some(Unit::Unrecognized("BKJD".into()));
        let mut table = Table::new(vec![period, epoch, Column::new("kepid")]);

        normalize_table(&mut table);

        assert_eq!(
            table.column("koi_period").unwrap().unit,
            Some(Unit::Recognized("d".into()))
        );
        assert_eq!(table.column("koi_time0bk").unwrap().unit, None);
        assert_eq!(table.column("kepid").unwrap().unit, None);
        assert!(table.unrecognized_units().is_empty());
    }
}
