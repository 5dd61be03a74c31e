use crate::ifc::model::Attribute;

/// An IfcSIUnit, e.g. `(MASSUNIT, KILO, GRAM)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiUnit {
    pub unit_type: &'static str,
    pub prefix: Option<&'static str>,
    pub name: &'static str,
}

impl SiUnit {
    pub const fn new(unit_type: &'static str, prefix: Option<&'static str>, name: &'static str) -> Self {
        Self {
            unit_type,
            prefix,
            name,
        }
    }

    /// IfcSIUnit attributes; `Dimensions` is derived.
    pub fn attributes(&self) -> Vec<Attribute> {
        vec![
            Attribute::Derived,
            Attribute::enumeration(self.unit_type),
            self.prefix.map_or(Attribute::Unset, Attribute::enumeration),
            Attribute::enumeration(self.name),
        ]
    }
}

pub const METRE: SiUnit = SiUnit::new("LENGTHUNIT", None, "METRE");
pub const SQUARE_METRE: SiUnit = SiUnit::new("AREAUNIT", None, "SQUARE_METRE");
pub const CUBIC_METRE: SiUnit = SiUnit::new("VOLUMEUNIT", None, "CUBIC_METRE");
pub const KILOGRAM: SiUnit = SiUnit::new("MASSUNIT", Some("KILO"), "GRAM");

/// Units every generated project declares.
pub const PROJECT_UNITS: [SiUnit; 4] = [METRE, SQUARE_METRE, CUBIC_METRE, KILOGRAM];

const SI_NAMES: &[(&str, &str)] = &[
    ("METRE", "LENGTHUNIT"),
    ("SQUARE_METRE", "AREAUNIT"),
    ("CUBIC_METRE", "VOLUMEUNIT"),
    ("GRAM", "MASSUNIT"),
    ("SECOND", "TIMEUNIT"),
    ("PASCAL", "PRESSUREUNIT"),
    ("JOULE", "ENERGYUNIT"),
    ("WATT", "POWERUNIT"),
    ("NEWTON", "FORCEUNIT"),
    ("KELVIN", "THERMODYNAMICTEMPERATUREUNIT"),
    ("DEGREE_CELSIUS", "THERMODYNAMICTEMPERATUREUNIT"),
    ("RADIAN", "PLANEANGLEUNIT"),
    ("STERADIAN", "SOLIDANGLEUNIT"),
    ("HERTZ", "FREQUENCYUNIT"),
    ("AMPERE", "ELECTRICCURRENTUNIT"),
    ("VOLT", "ELECTRICVOLTAGEUNIT"),
    ("OHM", "ELECTRICRESISTANCEUNIT"),
    ("MOLE", "AMOUNTOFSUBSTANCEUNIT"),
    ("CANDELA", "LUMINOUSINTENSITYUNIT"),
    ("LUMEN", "LUMINOUSFLUXUNIT"),
    ("LUX", "ILLUMINANCEUNIT"),
];

const PREFIXES: &[&str] = &[
    "EXA", "PETA", "TERA", "GIGA", "MEGA", "KILO", "HECTO", "DECA", "DECI", "CENTI", "MILLI",
    "MICRO", "NANO", "PICO", "FEMTO", "ATTO",
];

const SYMBOLS: &[(&str, Option<&str>, &str)] = &[
    ("m", None, "METRE"),
    ("mm", Some("MILLI"), "METRE"),
    ("m2", None, "SQUARE_METRE"),
    ("m²", None, "SQUARE_METRE"),
    ("m3", None, "CUBIC_METRE"),
    ("m³", None, "CUBIC_METRE"),
    ("g", None, "GRAM"),
    ("kg", Some("KILO"), "GRAM"),
    ("s", None, "SECOND"),
    ("Pa", None, "PASCAL"),
    ("kPa", Some("KILO"), "PASCAL"),
    ("MPa", Some("MEGA"), "PASCAL"),
    ("GPa", Some("GIGA"), "PASCAL"),
    ("J", None, "JOULE"),
    ("kJ", Some("KILO"), "JOULE"),
    ("MJ", Some("MEGA"), "JOULE"),
    ("W", None, "WATT"),
    ("kW", Some("KILO"), "WATT"),
    ("N", None, "NEWTON"),
    ("kN", Some("KILO"), "NEWTON"),
    ("K", None, "KELVIN"),
    ("°C", None, "DEGREE_CELSIUS"),
    ("degC", None, "DEGREE_CELSIUS"),
];

fn si_name(name: &str) -> Option<(&'static str, &'static str)> {
    SI_NAMES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .copied()
}

fn prefix(name: &str) -> Option<&'static str> {
    PREFIXES.iter().find(|p| p.eq_ignore_ascii_case(name)).copied()
}

/// Reads a template `Unit` cell: `GIGA PASCAL`, `METRE` or a symbol like `kg`.
/// `unitless` and anything unrecognised give `None`.
pub fn parse_unit(text: &str) -> Option<SiUnit> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("unitless") {
        return None;
    }

    if let Some((_, symbol_prefix, name)) = SYMBOLS.iter().find(|(symbol, _, _)| *symbol == text) {
        let (name, unit_type) = si_name(name)?;
        let symbol_prefix = (*symbol_prefix).and_then(prefix);
        return Some(SiUnit::new(unit_type, symbol_prefix, name));
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let parsed = match words.as_slice() {
        [name] => si_name(name).map(|(name, unit_type)| SiUnit::new(unit_type, None, name)),
        [p, name] => prefix(p)
            .zip(si_name(name))
            .map(|(p, (name, unit_type))| SiUnit::new(unit_type, Some(p), name)),
        _ => None,
    };

    if parsed.is_none() {
        tracing::debug!("Unit '{}' is not an SI unit; leaving property unitless", text);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_names() {
        assert_eq!(
            parse_unit("GIGA PASCAL"),
            Some(SiUnit::new("PRESSUREUNIT", Some("GIGA"), "PASCAL"))
        );
        assert_eq!(parse_unit("kilo gram"), Some(KILOGRAM));
        assert_eq!(parse_unit("METRE"), Some(METRE));
    }

    #[test]
    fn test_symbols() {
        assert_eq!(parse_unit("kg"), Some(KILOGRAM));
        assert_eq!(parse_unit("m³"), Some(CUBIC_METRE));
        assert_eq!(
            parse_unit("MJ"),
            Some(SiUnit::new("ENERGYUNIT", Some("MEGA"), "JOULE"))
        );
    }

    #[test]
    fn test_unitless_and_unknown() {
        assert_eq!(parse_unit("unitless"), None);
        assert_eq!(parse_unit(""), None);
        assert_eq!(parse_unit("kg CO2 eq"), None);
        assert_eq!(parse_unit("BOGUS PASCAL"), None);
    }

    #[test]
    fn test_attributes_mark_dimensions_derived() {
        let attributes = KILOGRAM.attributes();
        assert_eq!(attributes[0], Attribute::Derived);
        assert_eq!(attributes[2], Attribute::enumeration("KILO"));
        assert_eq!(METRE.attributes()[2], Attribute::Unset);
    }
}
