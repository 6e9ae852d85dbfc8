use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use std::fmt;

/// Timestamp reported by the camera. Devices without a configured timezone
/// send no offset, so both shapes are kept as received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    Zoned(DateTime<FixedOffset>),
    Local(NaiveDateTime),
}

impl EventTime {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(t) = DateTime::parse_from_rfc3339(s) {
            return Some(EventTime::Zoned(t));
        }
        if let Ok(t) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
            return Some(EventTime::Zoned(t));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(EventTime::Local)
    }

    /// Wall-clock time as the camera saw it.
    pub fn local(&self) -> NaiveDateTime {
        match self {
            EventTime::Zoned(t) => t.naive_local(),
            EventTime::Local(t) => *t,
        }
    }

    pub fn folder_name(&self) -> String {
        self.local().format("%Y-%m-%d_%H-%M-%S").to_string()
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Zoned(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S%.f%:z")),
            EventTime::Local(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleInfo {
    pub vehicle_type: &'static str,
    pub color: &'static str,
    pub speed: i64,
    pub logo: &'static str,
    // Sub-logo and model come from tags the firmware misspells; their meaning
    // upstream is not documented, so the model stays a raw code.
    pub sub_logo: &'static str,
    pub model: i64,
}

/// One plate recognition report, built per request and dropped after logging.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionEvent {
    pub date_time: EventTime,
    pub license_plate: String,
    pub plate_type: String,
    pub plate_color: String,
    pub speed_limit: String,
    pub vehicle: Option<VehicleInfo>,
}

const ABSENT: &str = "null";

impl fmt::Display for DetectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dateTime={} licensePlate={} plateType={} plateColor={} speedLimit={}",
            self.date_time, self.license_plate, self.plate_type, self.plate_color, self.speed_limit
        )?;
        match &self.vehicle {
            Some(v) => write!(
                f,
                " vehicleType={} vehicleColor={} vehicleSpeed={} vehicleLogoRecog={} vehicleSubLogoRecog={} vehicleModel={}",
                v.vehicle_type, v.color, v.speed, v.logo, v.sub_logo, v.model
            ),
            None => write!(
                f,
                " vehicleType={a} vehicleColor={a} vehicleSpeed={a} vehicleLogoRecog={a} vehicleSubLogoRecog={a} vehicleModel={a}",
                a = ABSENT
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureKind {
    LicensePlate,
    Detection,
}

impl PictureKind {
    pub fn from_field(name: &str) -> Option<Self> {
        match name {
            "licensePlatePicture.jpg" => Some(PictureKind::LicensePlate),
            "detectionPicture.jpg" => Some(PictureKind::Detection),
            _ => None,
        }
    }
}

impl fmt::Display for PictureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PictureKind::LicensePlate => write!(f, "licensePlatePicture"),
            PictureKind::Detection => write!(f, "detectionPicture"),
        }
    }
}

/// An attached image with the filename the client sent.
#[derive(Debug, Clone)]
pub struct Picture {
    pub kind: PictureKind,
    pub filename: String,
    pub data: Vec<u8>,
}
