//! Fixed medical criteria table for ABPM classification

use crate::entities::MeasurementPeriod;

/// Systolic/diastolic pair at or above which a period is hypertensive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureThreshold {
    pub systolic: f64,
    pub diastolic: f64,
}

/// Closed-open percentage band as listed in the criteria table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloodPressureCriteria {
    pub twenty_four_hour: PressureThreshold,
    pub day: PressureThreshold,
    pub night: PressureThreshold,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DippingCriteria {
    pub normal: Band,
    pub reduced: Band,
    pub extreme: Band,
    pub non_dipper: Band,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLimit {
    /// Informational reference value, not used for classification
    pub normal: f64,
    /// Values strictly above this are elevated
    pub elevated_above: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MedicalCriteria {
    pub blood_pressure: BloodPressureCriteria,
    pub dipping: DippingCriteria,
    pub pulse_pressure: ReferenceLimit,
    pub hypertensive_load: ReferenceLimit,
}

impl MedicalCriteria {
    pub fn threshold(&self, period: MeasurementPeriod) -> PressureThreshold {
        match period {
            MeasurementPeriod::TwentyFourHour => self.blood_pressure.twenty_four_hour,
            MeasurementPeriod::Day => self.blood_pressure.day,
            MeasurementPeriod::Night => self.blood_pressure.night,
        }
    }
}

pub const MEDICAL_CRITERIA: MedicalCriteria = MedicalCriteria {
    blood_pressure: BloodPressureCriteria {
        twenty_four_hour: PressureThreshold { systolic: 130.0, diastolic: 80.0 },
        day: PressureThreshold { systolic: 135.0, diastolic: 85.0 },
        night: PressureThreshold { systolic: 120.0, diastolic: 70.0 },
    },
    dipping: DippingCriteria {
        normal: Band { min: 10.0, max: 20.0 },
        reduced: Band { min: 1.0, max: 10.0 },
        extreme: Band { min: 20.0, max: 100.0 },
        non_dipper: Band { min: -100.0, max: 1.0 },
    },
    pulse_pressure: ReferenceLimit { normal: 50.0, elevated_above: 55.0 },
    hypertensive_load: ReferenceLimit { normal: 25.0, elevated_above: 40.0 },
};
