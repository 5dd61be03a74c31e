use crate::utils::error::{EpdIfcError, Result};

/// Underlying EXPRESS type of an IFC defined type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Boolean,
    Logical,
    Integer,
    Real,
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    Boolean(bool),
    /// `None` is UNKNOWN.
    Logical(Option<bool>),
    Integer(i64),
    Real(f64),
    String(String),
}

/// A value wrapped in its defined type, e.g. `IFCMASSMEASURE(14.5)`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfcValue {
    pub type_name: &'static str,
    pub value: PrimitiveValue,
}

impl IfcValue {
    pub fn label(text: impl Into<String>) -> Self {
        Self {
            type_name: "IfcLabel",
            value: PrimitiveValue::String(text.into()),
        }
    }
}

const DEFINED_TYPES: &[(&str, Primitive)] = &[
    ("IfcBoolean", Primitive::Boolean),
    ("IfcLogical", Primitive::Logical),
    // strings
    ("IfcLabel", Primitive::String),
    ("IfcText", Primitive::String),
    ("IfcIdentifier", Primitive::String),
    ("IfcURIReference", Primitive::String),
    ("IfcDate", Primitive::String),
    ("IfcDateTime", Primitive::String),
    ("IfcTime", Primitive::String),
    ("IfcDuration", Primitive::String),
    ("IfcDescriptiveMeasure", Primitive::String),
    ("IfcGloballyUniqueId", Primitive::String),
    ("IfcLanguageId", Primitive::String),
    // integers
    ("IfcInteger", Primitive::Integer),
    ("IfcPositiveInteger", Primitive::Integer),
    ("IfcTimeStamp", Primitive::Integer),
    ("IfcDayInMonthNumber", Primitive::Integer),
    ("IfcMonthInYearNumber", Primitive::Integer),
    ("IfcDimensionCount", Primitive::Integer),
    // reals
    ("IfcReal", Primitive::Real),
    ("IfcNumericMeasure", Primitive::Real),
    ("IfcCountMeasure", Primitive::Real),
    ("IfcParameterValue", Primitive::Real),
    ("IfcContextDependentMeasure", Primitive::Real),
    ("IfcRatioMeasure", Primitive::Real),
    ("IfcPositiveRatioMeasure", Primitive::Real),
    ("IfcNormalisedRatioMeasure", Primitive::Real),
    ("IfcLengthMeasure", Primitive::Real),
    ("IfcPositiveLengthMeasure", Primitive::Real),
    ("IfcNonNegativeLengthMeasure", Primitive::Real),
    ("IfcAreaMeasure", Primitive::Real),
    ("IfcVolumeMeasure", Primitive::Real),
    ("IfcMassMeasure", Primitive::Real),
    ("IfcMassDensityMeasure", Primitive::Real),
    ("IfcMassFlowRateMeasure", Primitive::Real),
    ("IfcMassPerLengthMeasure", Primitive::Real),
    ("IfcAreaDensityMeasure", Primitive::Real),
    ("IfcMolecularWeightMeasure", Primitive::Real),
    ("IfcAmountOfSubstanceMeasure", Primitive::Real),
    ("IfcPlaneAngleMeasure", Primitive::Real),
    ("IfcPositivePlaneAngleMeasure", Primitive::Real),
    ("IfcSolidAngleMeasure", Primitive::Real),
    ("IfcTimeMeasure", Primitive::Real),
    ("IfcFrequencyMeasure", Primitive::Real),
    ("IfcRotationalFrequencyMeasure", Primitive::Real),
    ("IfcLinearVelocityMeasure", Primitive::Real),
    ("IfcThermodynamicTemperatureMeasure", Primitive::Real),
    ("IfcThermalConductivityMeasure", Primitive::Real),
    ("IfcThermalTransmittanceMeasure", Primitive::Real),
    ("IfcThermalResistanceMeasure", Primitive::Real),
    ("IfcThermalExpansionCoefficientMeasure", Primitive::Real),
    ("IfcSpecificHeatCapacityMeasure", Primitive::Real),
    ("IfcHeatingValueMeasure", Primitive::Real),
    ("IfcIsothermalMoistureCapacityMeasure", Primitive::Real),
    ("IfcMoistureDiffusivityMeasure", Primitive::Real),
    ("IfcVaporPermeabilityMeasure", Primitive::Real),
    ("IfcPressureMeasure", Primitive::Real),
    ("IfcForceMeasure", Primitive::Real),
    ("IfcModulusOfElasticityMeasure", Primitive::Real),
    ("IfcDynamicViscosityMeasure", Primitive::Real),
    ("IfcKinematicViscosityMeasure", Primitive::Real),
    ("IfcEnergyMeasure", Primitive::Real),
    ("IfcPowerMeasure", Primitive::Real),
    ("IfcVolumetricFlowRateMeasure", Primitive::Real),
    ("IfcSoundPowerMeasure", Primitive::Real),
    ("IfcSoundPressureMeasure", Primitive::Real),
    ("IfcElectricCurrentMeasure", Primitive::Real),
    ("IfcElectricVoltageMeasure", Primitive::Real),
    ("IfcLuminousFluxMeasure", Primitive::Real),
    ("IfcIlluminanceMeasure", Primitive::Real),
    ("IfcMonetaryMeasure", Primitive::Real),
];

/// Canonical spelling and primitive of a defined type. Lookup ignores case.
pub fn defined_type(data_type: &str) -> Result<(&'static str, Primitive)> {
    let data_type = data_type.trim();
    DEFINED_TYPES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(data_type))
        .copied()
        .ok_or_else(|| EpdIfcError::UnknownDataType {
            data_type: data_type.to_string(),
        })
}

/// Text written where a value is absent.
pub const MISSING_VALUE: &str = "NaN";

/// Converts template text into `data_type`. Absent or empty text gives the
/// type's placeholder (`false`, `0`, `0.0`, `"NaN"`, UNKNOWN).
pub fn convert(data_type: &str, raw: Option<&str>) -> Result<IfcValue> {
    let (type_name, primitive) = defined_type(data_type)?;
    let raw = raw.filter(|r| !r.is_empty());

    let value = match (primitive, raw) {
        (Primitive::Boolean, None) => PrimitiveValue::Boolean(false),
        (Primitive::Logical, None) => PrimitiveValue::Logical(None),
        (Primitive::Integer, None) => PrimitiveValue::Integer(0),
        (Primitive::Real, None) => PrimitiveValue::Real(0.0),
        (Primitive::String, None) => PrimitiveValue::String(MISSING_VALUE.to_string()),

        (Primitive::Boolean, Some(text)) => PrimitiveValue::Boolean(parse_bool(text)),
        (Primitive::Logical, Some(text)) => {
            if text.trim().eq_ignore_ascii_case("unknown") {
                PrimitiveValue::Logical(None)
            } else {
                PrimitiveValue::Logical(Some(parse_bool(text)))
            }
        }
        (Primitive::Integer, Some(text)) => PrimitiveValue::Integer(
            text.trim()
                .parse::<i64>()
                .map_err(|e| EpdIfcError::conversion(type_name, text, e.to_string()))?,
        ),
        (Primitive::Real, Some(text)) => {
            let number = text
                .trim()
                .parse::<f64>()
                .map_err(|e| EpdIfcError::conversion(type_name, text, e.to_string()))?;
            if !number.is_finite() {
                return Err(EpdIfcError::conversion(
                    type_name,
                    text,
                    "value is not a finite number",
                ));
            }
            PrimitiveValue::Real(number)
        }
        (Primitive::String, Some(text)) => PrimitiveValue::String(text.to_string()),
    };

    Ok(IfcValue { type_name, value })
}

/// `convert`, falling back to an `IfcLabel` of the raw text.
pub fn convert_or_label(data_type: &str, raw: Option<&str>) -> IfcValue {
    match convert(data_type, raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Falling back to IfcLabel: {}", e);
            IfcValue::label(raw.filter(|r| !r.is_empty()).unwrap_or(MISSING_VALUE))
        }
    }
}

fn parse_bool(text: &str) -> bool {
    matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "t" | "yes"
    )
}
