use crate::error::IngestError;

/// Vehicle type labels, indexed by the `vehicleType` code.
pub static VEHICLE_TYPES: &[&str] = &[
    "Other",
    "Large Bus",
    "Truck",
    "Car",
    "Minibus",
    "Small Truck",
    "Pedestrian",
    "Two-wheeler",
    "Tricycle",
    "SUV/MPV",
    "Medium Bus",
    "Motor Vehicle",
    "Non-motor Vehicle",
    "Small Car",
    "Mini Car",
    "Pickup",
    "Container Truck",
    "Mini Truck",
    "Slag Car",
    "Crane",
    "Oil Tank Truck",
    "Hazardous Chemicals Vehicle",
];

pub static VEHICLE_COLORS: &[(&str, &str)] = &[
    ("unknown", "Unknown"),
    ("white", "White"),
    ("silver", "Silver"),
    ("gray", "Gray"),
    ("black", "Black"),
    ("red", "Red"),
    ("deepBlue", "Dark Blue"),
    ("blue", "Blue"),
    ("yellow", "Yellow"),
    ("green", "Green"),
    ("brown", "Brown"),
    ("pink", "Pink"),
    ("purple", "Purple"),
    ("deepGray", "Dark Gray"),
    ("cyan", "Cyan"),
    ("orange", "Orange"),
];

/// Logo labels keyed by brand code, sorted by code.
pub static VEHICLE_LOGOS: &[(u32, &str)] = &[
    (0, "Other"),
    (1, "Volkswagen"),
    (2, "Buick"),
    (3, "BMW"),
    (4, "Honda"),
    (5, "Peugeot"),
    (6, "Toyota"),
    (7, "Ford"),
    (8, "Nissan"),
    (9, "Audi"),
    (10, "Mazda"),
    (11, "Chevrolet"),
    (12, "Citroen"),
    (13, "Hyundai"),
    (14, "Chery"),
    (15, "Kia"),
    (16, "Roewe"),
    (17, "Mitsubishi"),
    (18, "Skoda"),
    (19, "Geely"),
    (20, "Zhonghua"),
    (21, "Volvo"),
    (22, "Lexus"),
    (23, "Fiat"),
    (24, "Emgrand"),
    (25, "Dongfeng"),
    (26, "BYD"),
    (27, "Suzuki"),
    (28, "Jinbei"),
    (29, "Haima"),
    (30, "SGMW"),
    (31, "JAC"),
    (32, "Subaru"),
    (33, "Englon"),
    (34, "Great Wall"),
    (35, "Hafei"),
    (36, "Isuzu"),
    (37, "Southeast"),
    (38, "Changan"),
    (39, "Foton"),
    (40, "Xiali"),
    (41, "Mercedes-Benz"),
    (42, "FAW"),
    (43, "Naveco"),
    (44, "Lifan"),
    (45, "Besturn"),
    (46, "Crown"),
    (47, "Renault"),
    (48, "JMC"),
    (49, "MG"),
    (50, "Kama"),
    (51, "Zotye"),
    (52, "Changhe"),
    (53, "King Long"),
    (54, "Huizhong"),
    (55, "Sunlong"),
    (56, "Higer"),
    (57, "Yutong"),
    (58, "Sinotruk"),
    (59, "Beiben"),
    (60, "Xingma"),
    (61, "Yuejin"),
    (62, "Huanghai"),
    (63, "Old Wallon"),
    (64, "Changan Commercial"),
    (65, "Porsche"),
    (66, "Cadillac"),
    (67, "Infiniti"),
    (68, "Geely Gleagle"),
    (69, "Jeep"),
    (70, "Land Rover"),
];

/// Code to label tables used while decoding `vehicleInfo`.
#[derive(Debug, Clone, Copy)]
pub struct LookupTables {
    pub vehicle_types: &'static [&'static str],
    pub vehicle_colors: &'static [(&'static str, &'static str)],
    pub vehicle_logos: &'static [(u32, &'static str)],
}

impl Default for LookupTables {
    fn default() -> Self {
        LookupTables {
            vehicle_types: VEHICLE_TYPES,
            vehicle_colors: VEHICLE_COLORS,
            vehicle_logos: VEHICLE_LOGOS,
        }
    }
}

impl LookupTables {
    pub fn vehicle_type(&self, code: i64) -> Result<&'static str, IngestError> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.vehicle_types.get(i))
            .copied()
            .ok_or_else(|| unknown("vehicle type", code))
    }

    pub fn vehicle_color(&self, code: &str) -> Result<&'static str, IngestError> {
        self.vehicle_colors
            .iter()
            .find(|(key, _)| *key == code)
            .map(|(_, label)| *label)
            .ok_or_else(|| unknown("vehicle color", code))
    }

    pub fn vehicle_logo(&self, code: i64) -> Result<&'static str, IngestError> {
        u32::try_from(code)
            .ok()
            .and_then(|c| {
                self.vehicle_logos
                    .binary_search_by_key(&c, |(key, _)| *key)
                    .ok()
            })
            .map(|i| self.vehicle_logos[i].1)
            .ok_or_else(|| unknown("vehicle logo", code))
    }
}

fn unknown(table: &'static str, code: impl ToString) -> IngestError {
    IngestError::Lookup {
        table,
        code: code.to_string(),
    }
}
